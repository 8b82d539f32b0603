//! Language service error types.

use thiserror::Error;

/// Errors talking to the language service.
#[derive(Error, Debug)]
pub enum LlmError {
    /// Transport failure (DNS, TLS, timeout, connection reset).
    #[error("request to language service failed: {0}")]
    Http(#[from] reqwest::Error),

    /// The service answered with a non-success status.
    #[error("language service returned {status}: {body}")]
    Api {
        /// HTTP status code.
        status: u16,
        /// Error message from the response body.
        body: String,
    },

    /// The response did not have the expected shape.
    #[error("malformed response from language service: {0}")]
    MalformedResponse(String),

    /// No API key configured.
    #[error("no API key configured for the language service")]
    MissingApiKey,
}

impl LlmError {
    pub fn api(status: u16, body: impl Into<String>) -> Self {
        Self::Api {
            status,
            body: body.into(),
        }
    }
}
