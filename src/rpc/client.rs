//! ReportClient and ReportClientPool trait definitions

use std::sync::Arc;

use async_trait::async_trait;

use super::TransportError;
use crate::domain::{PeerAddress, ResourceReport};

/// Client bound to a single peer's report endpoint
///
/// Each call is one independent request. Timeout policy belongs to the
/// implementation; the poller waits for whatever outcome it returns.
#[async_trait]
pub trait ReportClient: Send + Sync {
    /// Ask the peer for its current resource report
    async fn request_report(&self) -> Result<ResourceReport, TransportError>;
}

/// Hands out clients by peer address, reusing connections where possible
pub trait ReportClientPool: Send + Sync {
    /// Get the cached client for `address`, creating it on first use
    fn get_or_connect(&self, address: &PeerAddress) -> Result<Arc<dyn ReportClient>, TransportError>;
}
