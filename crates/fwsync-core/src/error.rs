use thiserror::Error;

/// Core error types for fwsync domain operations
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Invalid IPv4 address: {0:?}")]
    InvalidAddress(String),
}

impl CoreError {
    /// Create a new InvalidAddress error
    pub fn invalid_address(address: impl Into<String>) -> Self {
        Self::InvalidAddress(address.into())
    }
}

/// Convenience result type for core operations
pub type Result<T> = std::result::Result<T, CoreError>;
