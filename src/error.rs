//! Error types for Commentary.

use thiserror::Error;

/// Library-level error type for Commentary operations.
#[derive(Error, Debug)]
pub enum CommentaryError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Resource not found: {0}")]
    ResourceNotFound(String),

    #[error("Completion service error{}: {message}", status_suffix(.status))]
    Service { status: Option<u16>, message: String },

    #[error("Completion service failed after {attempts} attempt(s): {last_error}")]
    RetryExhausted { attempts: u32, last_error: String },

    #[error("Unexpected output from {stage} stage: {output:?}")]
    MalformedOutput { stage: String, output: String },

    #[error("Pipeline exceeded its deadline of {0} seconds")]
    DeadlineExceeded(u64),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

fn status_suffix(status: &Option<u16>) -> String {
    status.map(|s| format!(" (HTTP {})", s)).unwrap_or_default()
}

/// Result type alias for Commentary operations.
pub type Result<T> = std::result::Result<T, CommentaryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_display() {
        let err = CommentaryError::Service {
            status: Some(503),
            message: "overloaded".to_string(),
        };
        assert_eq!(err.to_string(), "Completion service error (HTTP 503): overloaded");

        let err = CommentaryError::Service {
            status: None,
            message: "no choices".to_string(),
        };
        assert_eq!(err.to_string(), "Completion service error: no choices");
    }
}
