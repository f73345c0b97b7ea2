//! Node arena
//!
//! Nodes live in a partition-owned table indexed by `NodeId`. The parent
//! back-reference is a plain handle plus the containing feature key: it owns nothing
//! and is maintained only by the containment manager.

use std::collections::HashMap;

use super::store::FeatureStore;
use super::validator::NodeTypes;
use super::value::NodeId;

/// Where a node is currently contained
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainmentSlot {
    pub parent: NodeId,
    pub feature: String,
}

#[derive(Debug, Clone)]
pub struct NodeRecord {
    pub id: String,
    pub classifier: String,
    pub store: FeatureStore,
    pub parent: Option<ContainmentSlot>,
}

#[derive(Debug, Default)]
pub struct NodeTable {
    records: Vec<NodeRecord>,
    by_id: HashMap<String, NodeId>,
}

impl NodeTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a node; the caller has checked that the id is free
    pub fn insert(&mut self, id: String, classifier: String) -> NodeId {
        let handle = NodeId::from_index(self.records.len());
        self.by_id.insert(id.clone(), handle);
        self.records.push(NodeRecord {
            id,
            classifier,
            store: FeatureStore::new(),
            parent: None,
        });
        handle
    }

    pub fn get(&self, node: NodeId) -> Option<&NodeRecord> {
        self.records.get(node.index())
    }

    pub fn get_mut(&mut self, node: NodeId) -> Option<&mut NodeRecord> {
        self.records.get_mut(node.index())
    }

    pub fn contains(&self, node: NodeId) -> bool {
        node.index() < self.records.len()
    }

    pub fn lookup(&self, id: &str) -> Option<NodeId> {
        self.by_id.get(id).copied()
    }

    pub fn parent_of(&self, node: NodeId) -> Option<NodeId> {
        self.get(node)?.parent.as_ref().map(|slot| slot.parent)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// All handles in creation order
    pub fn handles(&self) -> impl Iterator<Item = NodeId> {
        (0..self.records.len()).map(NodeId::from_index)
    }
}

impl NodeTypes for NodeTable {
    fn classifier_of(&self, node: NodeId) -> Option<&str> {
        self.get(node).map(|r| r.classifier.as_str())
    }

    fn is_ancestor_or_self(&self, candidate: NodeId, node: NodeId) -> bool {
        let mut current = Some(node);
        while let Some(n) = current {
            if n == candidate {
                return true;
            }
            current = self.parent_of(n);
        }
        false
    }
}
