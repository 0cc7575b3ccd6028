//! Destinations for pulled resource reports

mod cluster_view;

pub use cluster_view::ClusterResourceView;

use crate::domain::ResourceReport;

/// Incorporates a pulled report into cluster-wide resource state
///
/// Called from the poller's scheduling task, so implementations must not
/// block.
pub trait ReportSink: Send + Sync {
    fn update_from_report(&self, report: ResourceReport);
}
