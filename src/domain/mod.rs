//! Domain types for the report poller
//!
//! Peer identities, network addresses and the resource report payload
//! pulled from every peer.

mod id;
mod report;

pub use id::{PeerAddress, PeerId};
pub use report::ResourceReport;
