//! Transport error types

use std::time::Duration;
use thiserror::Error;

use crate::domain::PeerAddress;

/// Errors that can occur while requesting a report from a peer
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Failed to connect to {address}: {message}")]
    Connect { address: PeerAddress, message: String },

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Remote error {status}: {message}")]
    Remote { status: u16, message: String },

    #[error("Invalid report: {0}")]
    Decode(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
}

impl TransportError {
    /// Check if a later attempt could plausibly succeed
    pub fn is_retryable(&self) -> bool {
        match self {
            TransportError::Connect { .. } => true,
            TransportError::Timeout(_) => true,
            TransportError::Remote { status, .. } => *status >= 500,
            TransportError::Decode(_) => false,
            TransportError::Network(_) => true,
        }
    }
}
