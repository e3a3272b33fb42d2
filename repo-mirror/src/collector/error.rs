//! Collector error types.

use thiserror::Error;

/// Errors that can occur while collecting repositories from Bitbucket.
#[derive(Debug, Error)]
pub enum CollectError {
    /// Bitbucket answered with an error status.
    #[error("Bitbucket API returned HTTP {status} for {url}: {body}")]
    HttpStatus {
        status: u16,
        url: String,
        body: String,
    },

    /// The request could not be sent or its body could not be read.
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    /// A page body was not the expected JSON shape.
    #[error("Failed to decode repository page from {url}: {source}")]
    DecodeError {
        url: String,
        #[source]
        source: serde_json::Error,
    },

    /// A record could not be serialized.
    #[error("Failed to serialize record: {0}")]
    SerializeError(#[source] serde_json::Error),

    /// The configured API URL is unusable.
    #[error("Invalid API URL '{url}': {message}")]
    InvalidUrl { url: String, message: String },

    /// Writing the output file failed.
    #[error("Failed to write '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl CollectError {
    /// Returns true if Bitbucket rejected a page request.
    #[must_use]
    pub fn is_http_status(&self) -> bool {
        matches!(self, Self::HttpStatus { .. })
    }
}
