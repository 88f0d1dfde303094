//! Store errors.

use thiserror::Error;

/// Record store failures. Never shown to end users.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Transport or decoding failure.
    #[error("store request failed")]
    Http(#[source] reqwest::Error),

    /// The store answered with a non-success status.
    #[error("store returned status {status}")]
    Status {
        /// HTTP status code.
        status: u16,

        /// Response body, for logs.
        body: String,
    },

    /// The store answered with a body of the wrong shape.
    #[error("malformed store response")]
    Malformed(#[source] serde_json::Error),
}

impl From<reqwest::Error> for StoreError {
    fn from(error: reqwest::Error) -> Self {
        Self::Http(error)
    }
}

impl From<serde_json::Error> for StoreError {
    fn from(error: serde_json::Error) -> Self {
        Self::Malformed(error)
    }
}
