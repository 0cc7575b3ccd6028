//! Membership events and the event feed

use futures::{Stream, StreamExt};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info};

use crate::domain::{PeerAddress, PeerId};
use crate::poller::{PollerError, ReportPoller};

/// A peer joined or left the cluster
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
pub enum MembershipEvent {
    Added { peer_id: PeerId, address: PeerAddress },
    Removed { peer_id: PeerId },
}

impl MembershipEvent {
    pub fn peer_id(&self) -> &PeerId {
        match self {
            Self::Added { peer_id, .. } | Self::Removed { peer_id } => peer_id,
        }
    }
}

/// Apply one membership event to the poller
pub async fn apply_event(poller: &ReportPoller, event: MembershipEvent) -> Result<(), PollerError> {
    debug!(?event, "apply_event: called");
    match event {
        MembershipEvent::Added { peer_id, address } => poller.add_peer(peer_id, address).await,
        MembershipEvent::Removed { peer_id } => {
            poller.remove_peer(&peer_id).await;
            Ok(())
        }
    }
}

/// Forward a stream of membership events into the poller
///
/// Runs until the stream ends. A duplicate add aborts the feed with the
/// error, since the source and the poller no longer agree on membership.
pub async fn follow_events<S>(poller: &ReportPoller, events: S) -> Result<usize, PollerError>
where
    S: Stream<Item = MembershipEvent>,
{
    let mut events = std::pin::pin!(events);
    let mut applied = 0;

    while let Some(event) = events.next().await {
        let peer_id = event.peer_id().clone();
        if let Err(e) = apply_event(poller, event).await {
            error!(%peer_id, error = %e, "Membership feed diverged from poller, stopping feed");
            return Err(e);
        }
        applied += 1;
    }

    info!(applied, "Membership feed ended");
    Ok(applied)
}
