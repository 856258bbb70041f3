//! Custom error types for the common library
//!
//! This module defines the errors raised when the portal talks to its
//! upstream services (the CMS and the lead-search webhook).

use thiserror::Error;

/// Custom error type for outbound HTTP calls
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request never produced a response (DNS, connect, timeout)
    #[error("Transport error: {0}")]
    Transport(#[source] reqwest::Error),

    /// The upstream answered with a non-success status
    #[error("Unexpected HTTP status: {0}")]
    Status(u16),

    /// The response body could not be decoded
    #[error("Failed to decode response: {0}")]
    Decode(String),

    /// Configuration error
    #[error("Client configuration error: {0}")]
    Configuration(String),
}

impl From<reqwest::Error> for ClientError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            ClientError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            ClientError::Status(status.as_u16())
        } else {
            ClientError::Transport(err)
        }
    }
}

/// Type alias for Result with ClientError
pub type ClientResult<T> = Result<T, ClientError>;
