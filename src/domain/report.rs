//! Resource report payload

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::PeerId;

/// Resource usage snapshot reported by a single peer
///
/// Quantities are keyed by resource name (`CPU`, `GPU`, `memory`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceReport {
    /// Peer that produced the report
    pub node_id: PeerId,

    /// Total capacity per resource
    #[serde(default)]
    pub resources_total: BTreeMap<String, f64>,

    /// Currently unallocated capacity per resource
    #[serde(default)]
    pub resources_available: BTreeMap<String, f64>,

    /// Outstanding demand per resource
    #[serde(default)]
    pub resource_load: BTreeMap<String, f64>,

    /// When the peer collected the snapshot
    #[serde(default = "Utc::now")]
    pub collected_at: DateTime<Utc>,
}

impl ResourceReport {
    /// Create an empty report for a peer
    pub fn new(node_id: PeerId) -> Self {
        Self {
            node_id,
            resources_total: BTreeMap::new(),
            resources_available: BTreeMap::new(),
            resource_load: BTreeMap::new(),
            collected_at: Utc::now(),
        }
    }

    /// Set total and available capacity for a resource
    pub fn with_resource(mut self, name: impl Into<String>, total: f64, available: f64) -> Self {
        let name = name.into();
        self.resources_total.insert(name.clone(), total);
        self.resources_available.insert(name, available);
        self
    }

    /// Set outstanding load for a resource
    pub fn with_load(mut self, name: impl Into<String>, load: f64) -> Self {
        self.resource_load.insert(name.into(), load);
        self
    }

    /// Fraction of a resource currently in use, if the peer reports it
    pub fn utilization(&self, name: &str) -> Option<f64> {
        let total = *self.resources_total.get(name)?;
        if total <= 0.0 {
            return None;
        }
        let available = self.resources_available.get(name).copied().unwrap_or(0.0);
        Some(((total - available) / total).clamp(0.0, 1.0))
    }
}
