//! Per-peer scheduling state

use std::sync::Arc;
use std::time::Duration;

use tokio::time::Instant;

use crate::domain::{PeerAddress, PeerId};

/// Immutable identity of a registered peer
///
/// Shared between the registry and whatever currently holds the peer's
/// [`PeerPullState`]. A peer is live only while the registry still holds this
/// exact allocation, so work issued before a remove/re-add cycle is recognised
/// as stale even though the peer ID matches.
#[derive(Debug)]
pub struct PeerIdentity {
    pub peer_id: PeerId,
    pub address: PeerAddress,
}

impl PeerIdentity {
    pub fn new(peer_id: PeerId, address: PeerAddress) -> Self {
        Self { peer_id, address }
    }
}

/// Scheduling state for one peer
///
/// Not `Clone`: at any moment it is owned either by the pull queue or by the
/// single in-flight pull for that peer.
#[derive(Debug)]
pub struct PeerPullState {
    peer: Arc<PeerIdentity>,
    last_pull_time: Option<Instant>,
    next_due_time: Instant,
}

impl PeerPullState {
    /// Fresh state for a newly added peer, due immediately
    pub fn new(peer: Arc<PeerIdentity>, now: Instant) -> Self {
        Self {
            peer,
            last_pull_time: None,
            next_due_time: now,
        }
    }

    pub fn peer(&self) -> &Arc<PeerIdentity> {
        &self.peer
    }

    pub fn peer_id(&self) -> &PeerId {
        &self.peer.peer_id
    }

    pub fn address(&self) -> &PeerAddress {
        &self.peer.address
    }

    /// Completion time of the last successful pull, `None` if never pulled
    pub fn last_pull_time(&self) -> Option<Instant> {
        self.last_pull_time
    }

    pub fn next_due_time(&self) -> Instant {
        self.next_due_time
    }

    /// Overdue entries are due; only entries whose due time lies in the future are not
    pub fn is_due(&self, now: Instant) -> bool {
        self.next_due_time <= now
    }

    /// Record a successful pull completed at `now`
    pub fn record_success(&mut self, now: Instant, poll_period: Duration) {
        self.last_pull_time = Some(now);
        self.next_due_time = now + poll_period;
    }

    /// Push the due time out without touching `last_pull_time`
    pub fn defer(&mut self, now: Instant, poll_period: Duration) {
        self.next_due_time = now + poll_period;
    }
}
