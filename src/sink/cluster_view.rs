//! In-memory view of the latest report from every peer

use std::collections::BTreeMap;
use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use super::ReportSink;
use crate::domain::{PeerId, ResourceReport};

/// Latest resource report per peer
///
/// Cloning is cheap; clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct ClusterResourceView {
    reports: Arc<DashMap<PeerId, ResourceReport>>,
}

impl ClusterResourceView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Latest report for a peer
    pub fn get(&self, peer_id: &PeerId) -> Option<ResourceReport> {
        self.reports.get(peer_id).map(|r| r.value().clone())
    }

    /// Forget a peer, e.g. after it left the cluster
    pub fn forget(&self, peer_id: &PeerId) -> bool {
        self.reports.remove(peer_id).is_some()
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Copy of every report, keyed by peer
    pub fn snapshot(&self) -> BTreeMap<PeerId, ResourceReport> {
        self.reports
            .iter()
            .map(|entry| (entry.key().clone(), entry.value().clone()))
            .collect()
    }

    /// Sum of a resource's total and available capacity across all peers
    pub fn cluster_totals(&self, resource: &str) -> (f64, f64) {
        self.reports.iter().fold((0.0, 0.0), |(total, available), entry| {
            let report = entry.value();
            (
                total + report.resources_total.get(resource).copied().unwrap_or(0.0),
                available + report.resources_available.get(resource).copied().unwrap_or(0.0),
            )
        })
    }
}

impl ReportSink for ClusterResourceView {
    fn update_from_report(&self, report: ResourceReport) {
        debug!(node_id = %report.node_id, "ClusterResourceView::update_from_report: called");
        // Out-of-order delivery must not roll a peer back to an older snapshot
        match self.reports.entry(report.node_id.clone()) {
            Entry::Occupied(mut entry) => {
                if entry.get().collected_at > report.collected_at {
                    debug!(node_id = %report.node_id, "ClusterResourceView::update_from_report: older than stored, ignoring");
                    return;
                }
                entry.insert(report);
            }
            Entry::Vacant(entry) => {
                entry.insert(report);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    #[test]
    fn test_update_and_get() {
        let view = ClusterResourceView::new();
        view.update_from_report(ResourceReport::new(PeerId::new("a")).with_resource("CPU", 8.0, 8.0));

        let report = view.get(&PeerId::new("a")).unwrap();
        assert_eq!(report.resources_total.get("CPU"), Some(&8.0));
        assert_eq!(view.len(), 1);
    }

    #[test]
    fn test_newer_report_replaces_older() {
        let view = ClusterResourceView::new();
        let first = ResourceReport::new(PeerId::new("a")).with_resource("CPU", 8.0, 8.0);
        let mut second = ResourceReport::new(PeerId::new("a")).with_resource("CPU", 8.0, 2.0);
        second.collected_at = first.collected_at + Duration::seconds(1);

        view.update_from_report(first);
        view.update_from_report(second);

        assert_eq!(view.get(&PeerId::new("a")).unwrap().resources_available.get("CPU"), Some(&2.0));
    }

    #[test]
    fn test_stale_report_ignored() {
        let view = ClusterResourceView::new();
        let fresh = ResourceReport::new(PeerId::new("a")).with_resource("CPU", 8.0, 1.0);
        let mut stale = ResourceReport::new(PeerId::new("a")).with_resource("CPU", 8.0, 7.0);
        stale.collected_at = fresh.collected_at - Duration::seconds(10);

        view.update_from_report(fresh);
        view.update_from_report(stale);

        assert_eq!(view.get(&PeerId::new("a")).unwrap().resources_available.get("CPU"), Some(&1.0));
    }

    #[test]
    fn test_cluster_totals_and_snapshot() {
        let view = ClusterResourceView::new();
        view.update_from_report(ResourceReport::new(PeerId::new("a")).with_resource("CPU", 8.0, 2.0));
        view.update_from_report(ResourceReport::new(PeerId::new("b")).with_resource("CPU", 4.0, 4.0));

        assert_eq!(view.cluster_totals("CPU"), (12.0, 6.0));
        assert_eq!(view.cluster_totals("GPU"), (0.0, 0.0));

        let snapshot = view.snapshot();
        assert_eq!(snapshot.keys().cloned().collect::<Vec<_>>(), vec![PeerId::new("a"), PeerId::new("b")]);
    }

    #[test]
    fn test_clones_share_state() {
        let view = ClusterResourceView::new();
        let clone = view.clone();
        clone.update_from_report(ResourceReport::new(PeerId::new("a")));

        assert_eq!(view.len(), 1);
        assert!(view.forget(&PeerId::new("a")));
        assert!(clone.is_empty());
    }
}
