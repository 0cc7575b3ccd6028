//! Pull dispatcher: issues report requests off the scheduling task

use std::sync::Arc;

use tokio::sync::mpsc;
use tracing::debug;

use crate::domain::ResourceReport;
use crate::rpc::{ReportClientPool, TransportError};

use super::state::PeerPullState;

/// Outcome of one report request, delivered back to the scheduling task
#[derive(Debug)]
pub struct PullCompletion {
    pub pull: PeerPullState,
    pub result: Result<ResourceReport, TransportError>,
}

/// Fires report requests and routes their outcomes to the scheduler
#[derive(Clone)]
pub struct Dispatcher {
    pool: Arc<dyn ReportClientPool>,
    completion_tx: mpsc::Sender<PullCompletion>,
}

impl Dispatcher {
    pub fn new(pool: Arc<dyn ReportClientPool>, completion_tx: mpsc::Sender<PullCompletion>) -> Self {
        Self { pool, completion_tx }
    }

    /// Start a pull for `pull` without waiting for it
    ///
    /// The caller must already hold one unit of admission capacity for it;
    /// exactly one [`PullCompletion`] is produced per call unless the poller
    /// has stopped, in which case the outcome is dropped.
    pub fn dispatch(&self, pull: PeerPullState) {
        debug!(peer_id = %pull.peer_id(), address = %pull.address(), "Dispatcher::dispatch: called");
        let pool = Arc::clone(&self.pool);
        let completion_tx = self.completion_tx.clone();

        tokio::spawn(async move {
            let result = match pool.get_or_connect(pull.address()) {
                Ok(client) => client.request_report().await,
                Err(e) => Err(e),
            };

            let peer_id = pull.peer_id().clone();
            if completion_tx.send(PullCompletion { pull, result }).await.is_err() {
                debug!(%peer_id, "Dispatcher::dispatch: poller stopped, dropping outcome");
            }
        });
    }
}
