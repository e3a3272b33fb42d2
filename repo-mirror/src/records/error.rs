//! Records file error types.

use thiserror::Error;

/// Errors that can occur while reading or writing a records file.
#[derive(Debug, Error)]
pub enum RecordsError {
    /// Failed to read the records file.
    #[error("Failed to read records file '{path}': {source}")]
    IoError {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The records file is not a valid JSON array of records.
    #[error("Failed to parse records file '{path}': {source}")]
    JsonError {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    /// A record failed validation.
    #[error("Invalid record #{index} in '{path}': {message}")]
    ValidationError {
        path: String,
        index: usize,
        message: String,
    },
}
