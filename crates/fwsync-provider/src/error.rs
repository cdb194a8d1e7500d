//! Provider error types.
//!
//! Every remote call the engine makes can fail with one of these. The engine
//! never retries them; recovery is the next invocation's problem.

use thiserror::Error;

/// Errors that can occur during provider operations.
#[derive(Debug, Error)]
pub enum ProviderError {
    /// Failed to obtain or refresh an access token.
    #[error("Authentication error: {message}")]
    Auth {
        /// Description of the authentication failure.
        message: String,
    },

    /// The request never produced an HTTP response (DNS, TLS, timeout).
    #[error("Transport error: {message}")]
    Transport {
        /// Description of the transport failure.
        message: String,
    },

    /// The provider answered with a non-success status.
    #[error("Provider returned {status} for {operation}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Which call failed (for error reports).
        operation: String,
        /// Response body excerpt.
        body: String,
    },

    /// The response body did not match the expected shape.
    #[error("Invalid provider response: {message}")]
    InvalidResponse {
        /// Description of the mismatch.
        message: String,
    },
}

impl ProviderError {
    /// Creates a new `Auth` error.
    #[must_use]
    pub fn auth(message: impl Into<String>) -> Self {
        Self::Auth {
            message: message.into(),
        }
    }

    /// Creates a new `Transport` error.
    #[must_use]
    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
        }
    }

    /// Creates a new `Status` error.
    #[must_use]
    pub fn status(status: u16, operation: impl Into<String>, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            operation: operation.into(),
            body: body.into(),
        }
    }

    /// Creates a new `InvalidResponse` error.
    #[must_use]
    pub fn invalid_response(message: impl Into<String>) -> Self {
        Self::InvalidResponse {
            message: message.into(),
        }
    }

    /// Returns `true` for errors where the provider was reached but refused
    /// the request (as opposed to transport-level failures).
    #[must_use]
    pub fn is_status(&self) -> bool {
        matches!(self, Self::Status { .. })
    }
}
