//! Poller error types

use thiserror::Error;

use crate::domain::PeerId;

/// Errors surfaced by the report poller
#[derive(Debug, Error)]
pub enum PollerError {
    /// The membership source registered a peer that is already live
    #[error("Peer {0} was added twice")]
    DuplicatePeer(PeerId),

    #[error("Poller has already been started")]
    AlreadyStarted,

    #[error("Invalid poller configuration: {0}")]
    InvalidConfig(String),
}

impl PollerError {
    /// Check if this error means the membership source and poller have diverged
    pub fn is_contract_violation(&self) -> bool {
        matches!(self, PollerError::DuplicatePeer(_))
    }
}
