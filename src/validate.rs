//! Response envelope validation.
//!
//! Two checks, applied after decoding and before an operation reports
//! success:
//!
//! - [`expect_success`]: the envelope's `responseCode` must equal the
//!   `SUCCESS` sentinel; every other value is an error.
//! - [`expect_count`]: additionally, the envelope's `count` must equal the
//!   expected value. Single-entity mutations pass 1; a SUCCESS code with a
//!   different count means the operation silently applied to the wrong
//!   number of entities and must fail.
//!
//! Both are pure functions over the [`Envelope`] contract; no side effects.

use crate::envelope::Envelope;
use crate::error::{QualysError, Result};

/// The only response code treated as non-error.
pub const SUCCESS: &str = "SUCCESS";

/// Fails with [`QualysError::Unsuccessful`] unless the response code is
/// [`SUCCESS`].
pub fn expect_success<E: Envelope>(envelope: &E) -> Result<()> {
    let code = envelope.response_code();
    if code != SUCCESS {
        return Err(QualysError::Unsuccessful {
            code: code.to_string(),
        });
    }
    Ok(())
}

/// Fails unless the response code is [`SUCCESS`] *and* the count equals
/// `expected`.
///
/// An absent count is treated as 0, so a mutation acknowledgement that
/// omits the element fails an expected-count check rather than passing
/// silently.
pub fn expect_count<E: Envelope>(envelope: &E, expected: u32) -> Result<()> {
    expect_success(envelope)?;
    let actual = envelope.count().unwrap_or(0);
    if actual != expected {
        return Err(QualysError::CountMismatch { expected, actual });
    }
    Ok(())
}
