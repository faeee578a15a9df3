//! Error types for the PokeAPI client
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Client Error Enum ==
/// Unified error type for the caching client.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Network failure, timeout or unreadable body
    #[error("Transport error for {url}: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// Upstream answered with a non-2xx status
    #[error("Upstream returned status {status} for {url}")]
    Remote { status: u16, url: String },

    /// Upstream has no such resource
    #[error("{resource} not found: {identifier}")]
    NotFound {
        resource: &'static str,
        identifier: String,
    },

    /// Payload did not match the expected shape
    #[error("Failed to decode response for {url}: {reason}")]
    Decode { url: String, reason: String },

    /// Invalid construction parameters
    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl ClientError {
    /// Returns the upstream status code, if the error carries one.
    pub fn status(&self) -> Option<u16> {
        match self {
            ClientError::Remote { status, .. } => Some(*status),
            ClientError::NotFound { .. } => Some(404),
            _ => None,
        }
    }
}

// == Result Type Alias ==
/// Convenience Result type for the client.
pub type Result<T> = std::result::Result<T, ClientError>;
