//! Static membership from configuration

use tracing::{debug, info};

use super::events::{MembershipEvent, apply_event};
use crate::config::PeerEntry;
use crate::domain::{PeerAddress, PeerId};
use crate::poller::{PollerError, ReportPoller};

/// Fixed peer list, typically read from the config file or command line
#[derive(Debug, Clone, Default)]
pub struct StaticMembership {
    peers: Vec<PeerEntry>,
}

impl StaticMembership {
    pub fn new(peers: Vec<PeerEntry>) -> Self {
        Self { peers }
    }

    pub fn peers(&self) -> &[PeerEntry] {
        &self.peers
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// One `Added` event per configured peer
    pub fn events(&self) -> Vec<MembershipEvent> {
        self.peers
            .iter()
            .map(|p| MembershipEvent::Added {
                peer_id: PeerId::new(p.id.clone()),
                address: PeerAddress::new(p.address.clone()),
            })
            .collect()
    }

    /// Register every configured peer with the poller
    pub async fn seed(&self, poller: &ReportPoller) -> Result<usize, PollerError> {
        debug!(count = self.peers.len(), "StaticMembership::seed: called");
        for event in self.events() {
            apply_event(poller, event).await?;
        }
        info!(count = self.peers.len(), "Registered static peers");
        Ok(self.peers.len())
    }
}
