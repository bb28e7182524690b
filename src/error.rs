//! Error types for hashpill

use thiserror::Error;

/// Result type alias for hashpill operations
pub type Result<T> = std::result::Result<T, HighlightError>;

/// Highlighting error types
///
/// None of these are fatal to text entry: the worst outcome of any of them
/// is that no highlight is drawn.
#[derive(Error, Debug)]
pub enum HighlightError {
    #[error("invalid token pattern: {0}")]
    Pattern(#[from] regex::Error),

    #[error("change notification registration failed: {0}")]
    Subscription(String),

    #[error("invalid configuration: {0}")]
    Config(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Message(String),
}
