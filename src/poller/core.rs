//! Report poller implementation

use std::sync::Arc;

use tokio::sync::{Mutex, mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::domain::{PeerAddress, PeerId};
use crate::rpc::{ReportClientPool, TransportError};
use crate::sink::ReportSink;

use super::admission::AdmissionController;
use super::config::{FailurePolicy, PollerConfig};
use super::dispatch::{Dispatcher, PullCompletion};
use super::error::PollerError;
use super::queue::{PollerStats, PullQueue};
use super::registry::PeerRegistry;
use super::state::PeerPullState;

/// Registry, queue and admission counter
///
/// Always mutated together under one lock so that "registered" and "queued
/// or in flight" are never observed out of step.
struct PollerState {
    registry: PeerRegistry,
    queue: PullQueue,
    admission: AdmissionController,
    stats: PollerStats,
    /// Dispatch is only allowed between start and stop
    accepting: bool,
}

impl PollerState {
    fn new(max_concurrent_pulls: usize) -> Self {
        Self {
            registry: PeerRegistry::new(),
            queue: PullQueue::new(),
            admission: AdmissionController::new(max_concurrent_pulls),
            stats: PollerStats::default(),
            accepting: false,
        }
    }

    /// Register a peer and put it at the front of the queue, due now
    fn add(&mut self, peer_id: PeerId, address: PeerAddress, now: Instant) -> Result<(), PollerError> {
        let identity = self.registry.add(peer_id, address)?;
        self.queue.push_front(PeerPullState::new(identity, now));
        Ok(())
    }

    /// Pop due peers and take admission capacity for each
    ///
    /// Stale entries are discarded without consuming capacity. Stops at the
    /// first entry that is not yet due.
    fn take_due(&mut self, now: Instant) -> Vec<PeerPullState> {
        let mut batch = Vec::new();
        if !self.accepting {
            return batch;
        }

        while self.admission.has_capacity() {
            let Some(pull) = self.queue.pop_due(now) else {
                break;
            };

            if !self.registry.is_live(pull.peer()) {
                debug!(peer_id = %pull.peer_id(), "Peer removed while queued, discarding");
                self.stats.total_stale_discarded += 1;
                continue;
            }

            if !self.admission.try_acquire() {
                self.queue.push_front(pull);
                break;
            }

            self.stats.total_dispatched += 1;
            batch.push(pull);
        }

        if !self.queue.is_empty() && !self.admission.has_capacity() {
            debug!(
                queued = self.queue.len(),
                in_flight = self.admission.in_flight(),
                "Admission saturated, leaving peers queued"
            );
        }

        batch
    }

    /// Apply the outcome of one pull; releases its admission capacity
    fn complete(
        &mut self,
        mut pull: PeerPullState,
        outcome: Result<(), TransportError>,
        now: Instant,
        config: &PollerConfig,
    ) {
        self.admission.release();

        let succeeded = match outcome {
            Ok(()) => {
                self.stats.total_succeeded += 1;
                true
            }
            Err(e) => {
                self.stats.total_failed += 1;
                warn!(
                    peer_id = %pull.peer_id(),
                    address = %pull.address(),
                    error = %e,
                    "Couldn't get resource report from peer"
                );
                false
            }
        };

        if !self.registry.is_live(pull.peer()) {
            debug!(peer_id = %pull.peer_id(), "Pull finished, but peer was already removed. Ignoring");
            self.stats.total_stale_discarded += 1;
            return;
        }

        if succeeded {
            pull.record_success(now, config.poll_period());
        } else if config.failure_policy == FailurePolicy::Requeue {
            pull.defer(now, config.poll_period());
        } else {
            debug!(peer_id = %pull.peer_id(), "Peer not re-enqueued after failed pull");
            return;
        }

        self.queue.push_back(pull);
    }

    fn stats(&self) -> PollerStats {
        PollerStats {
            registered: self.registry.len(),
            queued: self.queue.len(),
            in_flight: self.admission.in_flight(),
            peak_in_flight: self.admission.peak_in_flight(),
            ..self.stats.clone()
        }
    }
}

/// State shared between the public handle and the scheduling task
struct Shared {
    config: PollerConfig,
    state: Mutex<PollerState>,
    dispatcher: Dispatcher,
    sink: Arc<dyn ReportSink>,
}

impl Shared {
    /// One scheduling attempt: dispatch every due peer admission allows
    async fn try_pull(&self) {
        let batch = {
            let mut state = self.state.lock().await;
            state.take_due(Instant::now())
        };

        if !batch.is_empty() {
            debug!(count = batch.len(), "Shared::try_pull: dispatching");
        }
        for pull in batch {
            self.dispatcher.dispatch(pull);
        }
    }

    async fn handle_completion(&self, completion: PullCompletion) {
        let PullCompletion { pull, result } = completion;
        debug!(peer_id = %pull.peer_id(), ok = result.is_ok(), "Shared::handle_completion: called");

        let outcome = result.map(|report| self.sink.update_from_report(report));

        let mut state = self.state.lock().await;
        state.complete(pull, outcome, Instant::now(), &self.config);
    }
}

enum Lifecycle {
    Idle(mpsc::Receiver<PullCompletion>),
    Running {
        shutdown_tx: oneshot::Sender<()>,
        task: JoinHandle<()>,
    },
    Stopped,
}

/// Periodically pulls resource reports from every registered peer while
/// keeping at most `max_concurrent_pulls` requests in flight.
///
/// Membership changes arrive through [`add_peer`](Self::add_peer) and
/// [`remove_peer`](Self::remove_peer); the scheduling task started by
/// [`start`](Self::start) handles ticks and pull completions.
pub struct ReportPoller {
    shared: Arc<Shared>,
    lifecycle: Mutex<Lifecycle>,
}

impl ReportPoller {
    /// Create a new poller; nothing is dispatched until `start`
    pub fn new(
        config: PollerConfig,
        pool: Arc<dyn ReportClientPool>,
        sink: Arc<dyn ReportSink>,
    ) -> Result<Self, PollerError> {
        debug!(?config, "ReportPoller::new: called");
        config.validate()?;

        let (completion_tx, completion_rx) = mpsc::channel(config.completion_buffer);
        let shared = Arc::new(Shared {
            state: Mutex::new(PollerState::new(config.max_concurrent_pulls)),
            dispatcher: Dispatcher::new(pool, completion_tx),
            sink,
            config,
        });

        Ok(Self {
            shared,
            lifecycle: Mutex::new(Lifecycle::Idle(completion_rx)),
        })
    }

    /// Spawn the scheduling task and begin ticking
    pub async fn start(&self) -> Result<(), PollerError> {
        debug!("ReportPoller::start: called");
        let mut lifecycle = self.lifecycle.lock().await;

        let completions = match std::mem::replace(&mut *lifecycle, Lifecycle::Stopped) {
            Lifecycle::Idle(completions) => completions,
            other => {
                debug!("ReportPoller::start: not idle, rejecting");
                *lifecycle = other;
                return Err(PollerError::AlreadyStarted);
            }
        };

        self.shared.state.lock().await.accepting = true;

        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let task = tokio::spawn(run(Arc::clone(&self.shared), completions, shutdown_rx));
        *lifecycle = Lifecycle::Running { shutdown_tx, task };
        Ok(())
    }

    /// Halt the tick and wait for the scheduling task to exit
    ///
    /// Pulls already in flight are left to finish; their outcomes are dropped.
    pub async fn stop(&self) {
        debug!("ReportPoller::stop: called");
        let mut lifecycle = self.lifecycle.lock().await;
        self.shared.state.lock().await.accepting = false;

        match std::mem::replace(&mut *lifecycle, Lifecycle::Stopped) {
            Lifecycle::Running { shutdown_tx, task } => {
                let _ = shutdown_tx.send(());
                if let Err(e) = task.await {
                    error!(error = %e, "ReportPoller scheduling task failed");
                }
            }
            Lifecycle::Idle(_) => debug!("ReportPoller::stop: never started"),
            Lifecycle::Stopped => debug!("ReportPoller::stop: already stopped"),
        }
    }

    pub async fn is_running(&self) -> bool {
        matches!(*self.lifecycle.lock().await, Lifecycle::Running { .. })
    }

    /// Register a peer and try to pull from it right away
    ///
    /// Fails with [`PollerError::DuplicatePeer`] if the peer is already
    /// registered: the membership source and the poller have diverged.
    pub async fn add_peer(&self, peer_id: PeerId, address: PeerAddress) -> Result<(), PollerError> {
        debug!(%peer_id, %address, "ReportPoller::add_peer: called");
        {
            let mut state = self.shared.state.lock().await;
            if let Err(e) = state.add(peer_id, address, Instant::now()) {
                error!(error = %e, "Membership source registered a live peer again");
                return Err(e);
            }
        }

        // Out-of-band attempt so the new peer does not wait for the next tick
        self.shared.try_pull().await;
        Ok(())
    }

    /// Deregister a peer; queued or in-flight work for it is discarded lazily
    pub async fn remove_peer(&self, peer_id: &PeerId) -> bool {
        debug!(%peer_id, "ReportPoller::remove_peer: called");
        let removed = self.shared.state.lock().await.registry.remove(peer_id);
        if !removed {
            debug!(%peer_id, "ReportPoller::remove_peer: not registered");
        }
        removed
    }

    pub async fn contains(&self, peer_id: &PeerId) -> bool {
        self.shared.state.lock().await.registry.contains(peer_id)
    }

    /// Registered peers in sorted order
    pub async fn peers(&self) -> Vec<PeerId> {
        self.shared.state.lock().await.registry.peer_ids()
    }

    /// Peers waiting in the queue, front first
    pub async fn queued_peers(&self) -> Vec<PeerId> {
        self.shared.state.lock().await.queue.peer_ids()
    }

    pub async fn stats(&self) -> PollerStats {
        self.shared.state.lock().await.stats()
    }

    pub fn config(&self) -> &PollerConfig {
        &self.shared.config
    }
}

/// Scheduling task: ticks, completions and shutdown
async fn run(
    shared: Arc<Shared>,
    mut completions: mpsc::Receiver<PullCompletion>,
    mut shutdown_rx: oneshot::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(shared.config.tick_interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    info!(
        max_concurrent_pulls = shared.config.max_concurrent_pulls,
        poll_period_ms = shared.config.poll_period_ms,
        tick_interval_ms = shared.config.tick_interval_ms,
        failure_policy = %shared.config.failure_policy,
        "ReportPoller started"
    );

    loop {
        tokio::select! {
            biased;

            _ = &mut shutdown_rx => break,

            Some(completion) = completions.recv() => {
                shared.handle_completion(completion).await;
            }

            _ = ticker.tick() => {}
        }

        shared.try_pull().await;
    }

    info!("ReportPoller stopped");
}
