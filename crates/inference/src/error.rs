use thiserror::Error;

/// Result type for inference operations
pub type Result<T> = std::result::Result<T, InferenceError>;

/// Errors that can occur while analyzing a chunk
#[derive(Error, Debug)]
pub enum InferenceError {
    /// The backend failed to produce a response
    #[error("Backend error: {0}")]
    Backend(String),

    /// IO error occurred
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl InferenceError {
    /// Create a backend error
    pub fn backend(msg: impl Into<String>) -> Self {
        Self::Backend(msg.into())
    }
}
