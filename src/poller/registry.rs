//! Peer registry: the single source of truth for peer liveness

use std::collections::HashMap;
use std::sync::Arc;

use tracing::debug;

use crate::domain::{PeerAddress, PeerId};

use super::error::PollerError;
use super::state::PeerIdentity;

/// Mapping from peer ID to the identity of the live registration
#[derive(Debug, Default)]
pub struct PeerRegistry {
    peers: HashMap<PeerId, Arc<PeerIdentity>>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a peer, rejecting IDs that are already live
    pub fn add(&mut self, peer_id: PeerId, address: PeerAddress) -> Result<Arc<PeerIdentity>, PollerError> {
        debug!(%peer_id, %address, "PeerRegistry::add: called");
        if self.peers.contains_key(&peer_id) {
            return Err(PollerError::DuplicatePeer(peer_id));
        }

        let identity = Arc::new(PeerIdentity::new(peer_id.clone(), address));
        self.peers.insert(peer_id, Arc::clone(&identity));
        Ok(identity)
    }

    /// Erase a registration; queued and in-flight work is reclaimed lazily
    pub fn remove(&mut self, peer_id: &PeerId) -> bool {
        debug!(%peer_id, "PeerRegistry::remove: called");
        self.peers.remove(peer_id).is_some()
    }

    pub fn contains(&self, peer_id: &PeerId) -> bool {
        self.peers.contains_key(peer_id)
    }

    /// Check that `peer` is the current registration for its ID
    pub fn is_live(&self, peer: &PeerIdentity) -> bool {
        self.peers
            .get(&peer.peer_id)
            .is_some_and(|live| std::ptr::eq(Arc::as_ptr(live), peer))
    }

    pub fn get(&self, peer_id: &PeerId) -> Option<&Arc<PeerIdentity>> {
        self.peers.get(peer_id)
    }

    pub fn len(&self) -> usize {
        self.peers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.peers.is_empty()
    }

    /// Registered peer IDs in sorted order
    pub fn peer_ids(&self) -> Vec<PeerId> {
        let mut ids: Vec<_> = self.peers.keys().cloned().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::collections::HashSet;

    fn addr() -> PeerAddress {
        PeerAddress::new("127.0.0.1:8076")
    }

    #[test]
    fn test_add_and_contains() {
        let mut registry = PeerRegistry::new();
        registry.add(PeerId::new("a"), addr()).unwrap();

        assert!(registry.contains(&PeerId::new("a")));
        assert!(!registry.contains(&PeerId::new("b")));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_duplicate_add_rejected() {
        let mut registry = PeerRegistry::new();
        registry.add(PeerId::new("a"), addr()).unwrap();

        let result = registry.add(PeerId::new("a"), PeerAddress::new("10.0.0.1:1"));
        assert!(matches!(result, Err(PollerError::DuplicatePeer(id)) if id.as_str() == "a"));

        // First registration is untouched
        assert_eq!(registry.get(&PeerId::new("a")).unwrap().address, addr());
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut registry = PeerRegistry::new();
        assert!(!registry.remove(&PeerId::new("ghost")));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_readd_after_remove_creates_fresh_identity() {
        let mut registry = PeerRegistry::new();
        let first = registry.add(PeerId::new("a"), addr()).unwrap();
        assert!(registry.remove(&PeerId::new("a")));

        let second = registry.add(PeerId::new("a"), addr()).unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert!(!registry.is_live(&first));
        assert!(registry.is_live(&second));
    }

    #[test]
    fn test_removed_identity_is_not_live() {
        let mut registry = PeerRegistry::new();
        let identity = registry.add(PeerId::new("a"), addr()).unwrap();
        assert!(registry.is_live(&identity));

        registry.remove(&PeerId::new("a"));

        // The identity itself is still safe to read
        assert_eq!(identity.peer_id.as_str(), "a");
        assert!(!registry.is_live(&identity));
    }

    #[derive(Debug, Clone)]
    enum Op {
        Add(u8),
        Remove(u8),
    }

    fn op_strategy() -> impl Strategy<Value = Op> {
        prop_oneof![(0u8..6).prop_map(Op::Add), (0u8..6).prop_map(Op::Remove)]
    }

    proptest! {
        #[test]
        fn prop_registry_never_holds_duplicates(ops in proptest::collection::vec(op_strategy(), 0..64)) {
            let mut registry = PeerRegistry::new();
            let mut model: HashSet<u8> = HashSet::new();

            for op in ops {
                match op {
                    Op::Add(n) => {
                        let result = registry.add(PeerId::new(format!("peer-{}", n)), addr());
                        prop_assert_eq!(result.is_err(), model.contains(&n));
                        model.insert(n);
                    }
                    Op::Remove(n) => {
                        let removed = registry.remove(&PeerId::new(format!("peer-{}", n)));
                        prop_assert_eq!(removed, model.remove(&n));
                    }
                }
                prop_assert_eq!(registry.len(), model.len());
            }

            let ids = registry.peer_ids();
            let unique: HashSet<_> = ids.iter().collect();
            prop_assert_eq!(unique.len(), ids.len());
        }
    }
}
