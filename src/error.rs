//! Error types for keyword highlighting

use thiserror::Error;

/// Result type alias for highlighter operations
pub type Result<T> = std::result::Result<T, HighlightError>;

/// Highlighter error types
#[derive(Error, Debug)]
pub enum HighlightError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid pattern `{pattern}`: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    #[error("Invalid TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("Invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Invalid format: expected an array of keyword styles")]
    NotAnArray,

    #[error("Invalid keyword style at index {index}: {reason}")]
    InvalidRule { index: usize, reason: String },

    #[error("{0}")]
    Message(String),
}

impl HighlightError {
    /// The offending pattern, if this is a pattern error
    pub fn pattern(&self) -> Option<&str> {
        match self {
            HighlightError::Pattern { pattern, .. } => Some(pattern),
            _ => None,
        }
    }
}
