//! Authenticated HTTP transport for the Qualys QPS REST API.
//!
//! `QualysClient` wraps a `reqwest::Client` with the three headers every
//! Qualys request needs (a client-identifying `X-Requested-With`,
//! `Content-Type: text/xml`, and Basic authorization) and treats any
//! non-2xx status as an error carrying the URL and status for diagnostics.
//!
//! The client is stateless beyond the immutable credentials and base URL
//! captured at construction: no session, no token refresh, no retry. One
//! outbound call per invocation.

use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use std::time::Duration;
use tracing::{debug, error};

use crate::auth::Credentials;
use crate::envelope::EMPTY_SERVICE_REQUEST;
use crate::error::{QualysError, Result};

/// Production Qualys API base. The platform-specific host (`qg1`/`qg2`/...)
/// varies by subscription; this default matches the US platform 2.
pub const DEFAULT_API_URL: &str = "https://qualysapi.qg2.apps.qualys.com/";

/// The `X-Requested-With` value identifying this client to the API.
/// Qualys rejects requests without this header.
const REQUESTED_WITH: &str = "qualys-am";

/// Connect timeout: TCP + TLS handshake only.
const API_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Overall request timeout including the full response body. Search
/// responses are small XML documents; a minute is ample.
const API_REQUEST_TIMEOUT: Duration = Duration::from_secs(60);

fn build_api_client() -> Client {
    Client::builder()
        .connect_timeout(API_CONNECT_TIMEOUT)
        .timeout(API_REQUEST_TIMEOUT)
        .build()
        .expect("failed to build HTTP client for the Qualys API")
}

/// Authenticated HTTP client for the Qualys QPS REST API.
///
/// `base_url` is stored as a `String` rather than a constant so tests can
/// point the client at a local wiremock server via [`with_base_url`].
///
/// [`with_base_url`]: QualysClient::with_base_url
pub struct QualysClient {
    client: Client,
    base_url: String,
    credentials: Credentials,
}

impl QualysClient {
    /// Creates a client against the production API base URL.
    pub fn new(credentials: Credentials) -> Self {
        Self::with_base_url(credentials, DEFAULT_API_URL)
    }

    /// Creates a client against a custom base URL: a non-default Qualys
    /// platform, or a mock server in tests.
    pub fn with_base_url(credentials: Credentials, base_url: &str) -> Self {
        QualysClient {
            client: build_api_client(),
            base_url: base_url.to_string(),
            credentials,
        }
    }

    /// Sends an authenticated POST to `path` (relative to the base URL, no
    /// leading slash) and returns the raw response body.
    ///
    /// When `body` is `None` a minimal empty `ServiceRequest` envelope is
    /// sent; the by-id endpoints take no payload but still require a valid
    /// XML body.
    ///
    /// # Errors
    ///
    /// - [`QualysError::Transport`] — the API answered with a non-2xx
    ///   status. The error carries the URL, status, and response body.
    /// - [`QualysError::Network`] — the request never completed (DNS, TCP,
    ///   TLS, timeout).
    pub async fn post(&self, path: &str, body: Option<String>) -> Result<String> {
        let url = format!("{}{}", self.base_url, path);
        let body = body.unwrap_or_else(|| EMPTY_SERVICE_REQUEST.to_string());

        debug!(%url, "dispatching request");
        let response = self
            .client
            .post(&url)
            .header("X-Requested-With", REQUESTED_WITH)
            .header(CONTENT_TYPE, "text/xml")
            .header(AUTHORIZATION, self.credentials.header_value())
            .body(body)
            .send()
            .await?;

        let status = response.status();
        // Read the body before the status check so error envelopes keep
        // their diagnostic detail.
        let text = response.text().await?;

        if !status.is_success() {
            error!(%url, %status, "non-success status code");
            return Err(QualysError::Transport {
                url,
                status,
                body: text,
            });
        }

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_is_prepended_verbatim() {
        // Paths are suffixes: the base URL keeps its trailing slash and the
        // path carries none, matching the Qualys path constants.
        let client = QualysClient::new(Credentials::new("u", "p"));
        assert_eq!(client.base_url, DEFAULT_API_URL);
        assert!(client.base_url.ends_with('/'));
    }

    #[test]
    fn with_base_url_overrides_default() {
        let client =
            QualysClient::with_base_url(Credentials::new("u", "p"), "http://127.0.0.1:9999/");
        assert_eq!(client.base_url, "http://127.0.0.1:9999/");
    }
}
