use thiserror::Error;

/// Result type for classification operations
pub type Result<T> = std::result::Result<T, ClassifierError>;

/// Errors that can occur while building or applying classification rules
#[derive(Error, Debug)]
pub enum ClassifierError {
    /// A rule pattern failed to compile
    #[error("Invalid rule pattern `{pattern}`: {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: regex::Error,
    },

    /// A rules file did not parse as the expected JSON shape
    #[error("Invalid rules file: {0}")]
    InvalidRules(#[from] serde_json::Error),

    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}
