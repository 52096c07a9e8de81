//! Typed error hierarchy for the qualys-am crate.
//!
//! Every failure boundary in the adapter gets its own `QualysError` variant:
//! transport (non-2xx status or network failure), codec (malformed or
//! unexpected XML), and the Qualys response contract (`responseCode` not
//! `SUCCESS`, or a count that does not match what the operation expected).
//!
//! Propagation policy: each layer returns the first error encountered to its
//! caller without masking. No layer retries, and no layer downgrades an
//! error to a warning. The `#[source]` attributes let callers traverse the
//! full cause chain via `Error::source()`.

use reqwest::StatusCode;

/// Unified error type for all qualys-am library operations.
#[derive(Debug, thiserror::Error)]
pub enum QualysError {
    /// The Qualys API returned a non-2xx HTTP status code.
    ///
    /// Carries the full request URL and the raw response body: Qualys
    /// error bodies contain diagnostic detail (e.g. `INVALID_CREDENTIALS`
    /// envelopes) that a bare status code would discard.
    #[error("\"{url}\" returned non-success status {status}: {body}")]
    Transport {
        /// The full URL of the failed request.
        url: String,
        /// The HTTP status code returned by the API.
        status: StatusCode,
        /// The raw response body text, or an empty string if unreadable.
        body: String,
    },

    /// A network-level failure occurred (DNS resolution, TCP connection,
    /// TLS handshake, timeout). No HTTP status code is available because
    /// the request did not complete.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// XML deserialization failed: the response body was malformed or did
    /// not match the expected envelope shape. A response missing the
    /// mandatory `responseCode` element also surfaces here.
    #[error("failed to decode response envelope: {0}")]
    Decode(#[from] quick_xml::DeError),

    /// XML serialization of a request payload failed.
    #[error("failed to encode request: {0}")]
    Encode(#[from] quick_xml::SeError),

    /// The response envelope carried a `responseCode` other than `SUCCESS`.
    #[error("non-successful response code: {code}")]
    Unsuccessful {
        /// The response code the API returned (e.g. `INVALID_REQUEST`).
        code: String,
    },

    /// The response code indicated success but the envelope's `count` did
    /// not match what the operation expected. This guards against silent
    /// partial application: a deactivation that reports SUCCESS with
    /// count 0 touched nothing. An absent count is treated as 0.
    #[error("expected exactly {expected} affected, got {actual}")]
    CountMismatch {
        /// The count the operation required.
        expected: u32,
        /// The count the envelope actually carried (0 when absent).
        actual: u32,
    },

    /// The envelope reported success with the expected count, but the
    /// payload element the operation needs (a tag id, a host id) was not
    /// present. This is a contract violation on the server side.
    #[error("response reported success but no {element} payload was returned")]
    MissingPayload {
        /// The XML element that should have carried the payload.
        element: &'static str,
    },

    /// Configuration failure: unreadable or unparsable config file, or
    /// required credentials missing after flag/env/file resolution.
    #[error("configuration error: {message}")]
    Config {
        /// Human-readable description of what went wrong.
        message: String,
        /// The underlying I/O or parse error, if any.
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

/// Convenience alias used throughout the library.
pub type Result<T> = std::result::Result<T, QualysError>;

#[cfg(test)]
mod tests {
    use super::*;
    use std::error::Error;

    #[test]
    fn transport_error_includes_url_and_status() {
        let err = QualysError::Transport {
            url: "https://qualysapi.example.com/qps/rest/2.0/search/am/tag".to_string(),
            status: StatusCode::UNAUTHORIZED,
            body: "<ServiceResponse><responseCode>INVALID_CREDENTIALS</responseCode></ServiceResponse>"
                .to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("401"), "display should include status code");
        assert!(
            msg.contains("search/am/tag"),
            "display should include the request URL"
        );
        assert!(
            msg.contains("INVALID_CREDENTIALS"),
            "display should include the response body"
        );
    }

    #[test]
    fn unsuccessful_error_names_the_code() {
        let err = QualysError::Unsuccessful {
            code: "INVALID_REQUEST".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "non-successful response code: INVALID_REQUEST"
        );
    }

    #[test]
    fn count_mismatch_reports_both_counts() {
        let err = QualysError::CountMismatch {
            expected: 1,
            actual: 0,
        };
        let msg = err.to_string();
        assert!(msg.contains("exactly 1"), "display should include expected");
        assert!(msg.contains("got 0"), "display should include actual");
    }

    #[test]
    fn decode_error_wraps_quick_xml() {
        let de_err = quick_xml::de::from_str::<String>("<unclosed>").unwrap_err();
        let err = QualysError::Decode(de_err);
        assert!(
            err.to_string().contains("failed to decode response envelope"),
            "display should indicate decode failure"
        );
        assert!(
            err.source().is_some(),
            "Decode variant should chain to the quick-xml error"
        );
    }

    #[test]
    fn config_error_with_source_chains_correctly() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "no such file");
        let err = QualysError::Config {
            message: "could not read config file".to_string(),
            source: Some(Box::new(io_err)),
        };
        assert!(err.to_string().contains("could not read config file"));
        assert!(
            err.source().is_some(),
            "Config error with source should have a chained cause"
        );
    }

    #[test]
    fn error_is_send_and_sync() {
        // QualysError must be Send + Sync for use across async task boundaries.
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<QualysError>();
    }
}
