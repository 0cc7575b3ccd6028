//! reportpoller - admission-controlled periodic resource report poller
//!
//! Keeps a set of cluster peers and pulls a resource usage report from each
//! of them once per poll period, without ever having more than a fixed number
//! of report requests in flight.
//!
//! # Modules
//!
//! - [`poller`] - peer registry, pull queue, admission control and scheduling
//! - [`rpc`] - report client traits and the HTTP transport
//! - [`sink`] - where pulled reports go
//! - [`membership`] - feeding peer add/remove events into the poller
//! - [`domain`] - peer IDs, addresses and the report payload
//! - [`config`] - configuration types and loading
//! - [`cli`] - command-line interface

pub mod cli;
pub mod config;
pub mod domain;
pub mod membership;
pub mod poller;
pub mod rpc;
pub mod sink;

// Re-export commonly used types
pub use config::{Config, PeerEntry, TransportConfig};
pub use domain::{PeerAddress, PeerId, ResourceReport};
pub use membership::{MembershipEvent, StaticMembership, apply_event, follow_events};
pub use poller::{FailurePolicy, PollerConfig, PollerError, PollerStats, ReportPoller};
pub use rpc::{HttpClientPool, ReportClient, ReportClientPool, TransportError};
pub use sink::{ClusterResourceView, ReportSink};
