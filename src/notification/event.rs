//! # Change Events
//!
//! One event per changed value. Added events carry only the new value, Deleted
//! events only the old one, Changed/Replaced events both.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::graph::{NodeId, Value};
use crate::language::FeatureKind;

/// What happened to a value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Change {
    Added,
    Changed,
    Deleted,
}

/// Kind of change event, by feature kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventKind {
    PropertyAdded,
    PropertyChanged,
    PropertyDeleted,
    ChildAdded,
    ChildReplaced,
    ChildDeleted,
    ReferenceAdded,
    ReferenceChanged,
    ReferenceDeleted,
}

impl EventKind {
    pub fn for_feature(kind: &FeatureKind, change: Change) -> Self {
        match (kind, change) {
            (FeatureKind::Property { .. }, Change::Added) => EventKind::PropertyAdded,
            (FeatureKind::Property { .. }, Change::Changed) => EventKind::PropertyChanged,
            (FeatureKind::Property { .. }, Change::Deleted) => EventKind::PropertyDeleted,
            (FeatureKind::Containment { .. }, Change::Added) => EventKind::ChildAdded,
            (FeatureKind::Containment { .. }, Change::Changed) => EventKind::ChildReplaced,
            (FeatureKind::Containment { .. }, Change::Deleted) => EventKind::ChildDeleted,
            (FeatureKind::Reference { .. }, Change::Added) => EventKind::ReferenceAdded,
            (FeatureKind::Reference { .. }, Change::Changed) => EventKind::ReferenceChanged,
            (FeatureKind::Reference { .. }, Change::Deleted) => EventKind::ReferenceDeleted,
        }
    }

    pub fn change(&self) -> Change {
        match self {
            EventKind::PropertyAdded | EventKind::ChildAdded | EventKind::ReferenceAdded => {
                Change::Added
            }
            EventKind::PropertyChanged | EventKind::ChildReplaced | EventKind::ReferenceChanged => {
                Change::Changed
            }
            EventKind::PropertyDeleted | EventKind::ChildDeleted | EventKind::ReferenceDeleted => {
                Change::Deleted
            }
        }
    }

    /// Child events, as opposed to property and reference events
    pub fn is_containment(&self) -> bool {
        matches!(
            self,
            EventKind::ChildAdded | EventKind::ChildReplaced | EventKind::ChildDeleted
        )
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::PropertyAdded => "PROPERTY_ADDED",
            EventKind::PropertyChanged => "PROPERTY_CHANGED",
            EventKind::PropertyDeleted => "PROPERTY_DELETED",
            EventKind::ChildAdded => "CHILD_ADDED",
            EventKind::ChildReplaced => "CHILD_REPLACED",
            EventKind::ChildDeleted => "CHILD_DELETED",
            EventKind::ReferenceAdded => "REFERENCE_ADDED",
            EventKind::ReferenceChanged => "REFERENCE_CHANGED",
            EventKind::ReferenceDeleted => "REFERENCE_DELETED",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single observed change
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChangeEvent {
    /// Monotonically increasing per partition, assigned at delivery
    pub sequence: u64,

    pub kind: EventKind,

    /// The node whose feature changed
    pub node: NodeId,

    /// Feature key
    pub feature: String,

    /// Position within a multiple feature
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index: Option<usize>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub old_value: Option<Value>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub new_value: Option<Value>,

    pub timestamp: DateTime<Utc>,
}

impl ChangeEvent {
    fn build(
        kind: &FeatureKind,
        change: Change,
        node: NodeId,
        feature: &str,
        index: Option<usize>,
        old_value: Option<Value>,
        new_value: Option<Value>,
    ) -> Self {
        Self {
            sequence: 0,
            kind: EventKind::for_feature(kind, change),
            node,
            feature: feature.to_string(),
            index,
            old_value,
            new_value,
            timestamp: Utc::now(),
        }
    }

    pub fn added(
        kind: &FeatureKind,
        node: NodeId,
        feature: &str,
        index: Option<usize>,
        value: Value,
    ) -> Self {
        Self::build(kind, Change::Added, node, feature, index, None, Some(value))
    }

    pub fn changed(
        kind: &FeatureKind,
        node: NodeId,
        feature: &str,
        old_value: Value,
        new_value: Value,
    ) -> Self {
        Self::build(
            kind,
            Change::Changed,
            node,
            feature,
            None,
            Some(old_value),
            Some(new_value),
        )
    }

    pub fn deleted(
        kind: &FeatureKind,
        node: NodeId,
        feature: &str,
        index: Option<usize>,
        value: Value,
    ) -> Self {
        Self::build(kind, Change::Deleted, node, feature, index, Some(value), None)
    }

    fn child(
        kind: EventKind,
        node: NodeId,
        feature: &str,
        index: Option<usize>,
        old_child: Option<NodeId>,
        new_child: Option<NodeId>,
    ) -> Self {
        Self {
            sequence: 0,
            kind,
            node,
            feature: feature.to_string(),
            index,
            old_value: old_child.map(Value::Node),
            new_value: new_child.map(Value::Node),
            timestamp: Utc::now(),
        }
    }

    pub fn child_added(node: NodeId, feature: &str, index: Option<usize>, child: NodeId) -> Self {
        Self::child(EventKind::ChildAdded, node, feature, index, None, Some(child))
    }

    pub fn child_replaced(node: NodeId, feature: &str, old_child: NodeId, new_child: NodeId) -> Self {
        Self::child(
            EventKind::ChildReplaced,
            node,
            feature,
            None,
            Some(old_child),
            Some(new_child),
        )
    }

    /// Deletion of a child from a containment slot
    pub fn child_deleted(node: NodeId, feature: &str, index: Option<usize>, child: NodeId) -> Self {
        Self::child(EventKind::ChildDeleted, node, feature, index, Some(child), None)
    }

    /// Whether `node` is the old or the new value
    pub fn mentions(&self, node: NodeId) -> bool {
        [&self.old_value, &self.new_value]
            .into_iter()
            .any(|v| v.as_ref().and_then(Value::as_node) == Some(node))
    }
}
