use thiserror::Error;

/// Errors originating from the core viewport model.
#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("invalid viewport: {reason}")]
    InvalidViewport { reason: String },
}
