//! HTTP Basic authentication for the Qualys API.
//!
//! The Qualys QPS REST endpoints authenticate every request with a
//! `Authorization: Basic base64(username:password)` header; there is no
//! token exchange and no session state. `Credentials` holds the pair,
//! immutable after construction, and computes the header value on demand.

use base64::{engine::general_purpose::STANDARD, Engine as _};

/// A Qualys username/password pair.
///
/// Constructed once from resolved configuration and moved into
/// [`QualysClient`](crate::client::QualysClient); nothing mutates it
/// afterwards. The `Debug` impl redacts the password so credentials don't
/// leak into logs or panic messages.
#[derive(Clone)]
pub struct Credentials {
    username: String,
    password: String,
}

impl Credentials {
    /// Creates a credential pair.
    pub fn new(username: &str, password: &str) -> Self {
        Credentials {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    /// Returns the account username.
    pub fn username(&self) -> &str {
        &self.username
    }

    /// Computes the value of the `Authorization` header:
    /// `Basic ` followed by the standard (padded) base64 encoding of
    /// `username:password`.
    pub fn header_value(&self) -> String {
        let raw = format!("{}:{}", self.username, self.password);
        format!("Basic {}", STANDARD.encode(raw))
    }
}

impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}
