//! Pull queue and poller statistics

use std::collections::VecDeque;

use serde::Serialize;
use tokio::time::Instant;

use crate::domain::PeerId;

use super::state::PeerPullState;

/// Work list of peers awaiting their next pull
///
/// Approximately ordered by due time: new peers go to the front due "now",
/// completed peers go to the back due one poll period later.
#[derive(Debug, Default)]
pub struct PullQueue {
    entries: VecDeque<PeerPullState>,
}

impl PullQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a newly added peer ahead of everything else
    pub fn push_front(&mut self, state: PeerPullState) {
        self.entries.push_front(state);
    }

    /// Re-insert a peer after a pull completed
    pub fn push_back(&mut self, state: PeerPullState) {
        self.entries.push_back(state);
    }

    /// Pop the front entry if it is due at `now`
    ///
    /// Returns `None` when the queue is empty or the front is not yet due; in
    /// the latter case the rest of the queue is treated as not due either.
    pub fn pop_due(&mut self, now: Instant) -> Option<PeerPullState> {
        if !self.entries.front()?.is_due(now) {
            return None;
        }
        self.entries.pop_front()
    }

    /// Due time of the front entry
    pub fn front_due_time(&self) -> Option<Instant> {
        self.entries.front().map(PeerPullState::next_due_time)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Queued peer IDs, front first (may include stale entries)
    pub fn peer_ids(&self) -> Vec<PeerId> {
        self.entries.iter().map(|s| s.peer_id().clone()).collect()
    }
}

/// Statistics for the poller
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct PollerStats {
    pub registered: usize,
    pub queued: usize,
    pub in_flight: usize,
    pub peak_in_flight: usize,
    pub total_dispatched: u64,
    pub total_succeeded: u64,
    pub total_failed: u64,
    pub total_stale_discarded: u64,
}
