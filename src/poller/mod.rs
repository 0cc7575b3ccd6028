//! Admission-controlled periodic report poller
//!
//! Keeps every registered peer in exactly one place: waiting in the pull
//! queue or in flight. Each tick pops due peers from the front of the queue
//! while admission capacity lasts; completed pulls go to the back of the queue,
//! due one poll period later.

mod admission;
mod config;
mod core;
mod dispatch;
mod error;
mod queue;
mod registry;
mod state;

pub use admission::AdmissionController;
pub use config::{FailurePolicy, PollerConfig};
pub use core::ReportPoller;
pub use dispatch::{Dispatcher, PullCompletion};
pub use error::PollerError;
pub use queue::{PollerStats, PullQueue};
pub use registry::PeerRegistry;
pub use state::{PeerIdentity, PeerPullState};
