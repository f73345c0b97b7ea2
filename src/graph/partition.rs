//! # Partition
//!
//! Owns the node arena, the publisher and the ambient logger/metrics, and exposes
//! the reflective API: `get`, `try_get`, `set`, `add`, `insert`, `remove` by feature.
//!
//! Every mutating call runs validate, containment fix-up, store mutation, then
//! event delivery. A failed call returns before touching anything.

use std::cell::RefCell;
use std::sync::{Arc, OnceLock};

use regex::Regex;
use uuid::Uuid;

use super::containment;
use super::errors::{GraphError, GraphResult, InvalidReason};
use super::store::{FeatureStore, Slot};
use super::table::NodeTable;
use super::validator::{Validated, Validator};
use super::value::{Candidate, FeatureValue, NodeId, Value};
use crate::config::EngineConfig;
use crate::language::{Classifier, Feature, Language};
use crate::notification::{ChangeEvent, EventFilter, Publisher, SubscriptionId};
use crate::observability::{log_event, Event, Logger, MetricsRegistry, MetricsSnapshot};

const NODE_ID_PATTERN: &str = "^[A-Za-z0-9_-]+$";

static NODE_ID: OnceLock<Regex> = OnceLock::new();

fn is_valid_node_id(id: &str) -> bool {
    NODE_ID
        .get_or_init(|| Regex::new(NODE_ID_PATTERN).expect("node id pattern compiles"))
        .is_match(id)
}

/// Node arena plus event bus for one language
#[derive(Debug)]
pub struct Partition {
    language: Arc<Language>,
    nodes: NodeTable,
    /// Borrowed mutably only while events are delivered
    publisher: RefCell<Publisher>,
    logger: Logger,
    metrics: MetricsRegistry,
    config: EngineConfig,
}

impl Partition {
    /// Empty partition; logs `PARTITION_CREATED`
    pub fn new(language: Arc<Language>, config: EngineConfig) -> Self {
        let logger = config.logger();
        log_event(
            &logger,
            Event::PartitionCreated,
            &[("language", language.key()), ("version", language.version())],
        );
        Self {
            language,
            nodes: NodeTable::new(),
            publisher: RefCell::new(Publisher::new()),
            logger,
            metrics: MetricsRegistry::new(),
            config,
        }
    }

    /// Partition with the default configuration
    pub fn with_language(language: Arc<Language>) -> Self {
        Self::new(language, EngineConfig::default())
    }

    /// The language every node in this partition conforms to
    pub fn language(&self) -> &Language {
        &self.language
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    // ==================
    // Node lifecycle
    // ==================

    /// Creates a parentless node with every feature unset
    pub fn create_node(&mut self, id: &str, classifier: &str) -> GraphResult<NodeId> {
        if !is_valid_node_id(id) {
            return Err(GraphError::InvalidNodeId(id.to_string()));
        }
        let descriptor = self
            .language
            .classifier(classifier)
            .ok_or_else(|| GraphError::UnknownClassifier(classifier.to_string()))?;
        if !descriptor.is_instantiable() {
            return Err(GraphError::NotInstantiable(classifier.to_string()));
        }
        if self.nodes.lookup(id).is_some() {
            return Err(GraphError::DuplicateNodeId(id.to_string()));
        }

        let node = self.nodes.insert(id.to_string(), classifier.to_string());
        if self.config.metrics_enabled {
            self.metrics.increment_nodes_created();
        }
        log_event(
            &self.logger,
            Event::NodeCreated,
            &[("id", id), ("classifier", classifier)],
        );
        Ok(node)
    }

    /// Creates a node with a freshly generated id
    pub fn create_node_generated(&mut self, classifier: &str) -> GraphResult<NodeId> {
        let id = Uuid::new_v4().simple().to_string();
        self.create_node(&id, classifier)
    }

    // ==================
    // Reads
    // ==================

    /// Current value of a feature.
    ///
    /// A multiple feature always reads as a sequence, possibly empty. An absent
    /// optional single feature reads as `None`. An unset required feature is an
    /// error.
    pub fn get<F: AsRef<str>>(&self, node: NodeId, feature: F) -> GraphResult<Option<FeatureValue>> {
        let feature = self.resolve(node, feature.as_ref())?;
        let store = self.store(node)?;
        if feature.is_required() && !store.is_set(&feature.key) {
            return Err(GraphError::UnsetFeature {
                node: self.id_of(node).unwrap_or_default().to_string(),
                feature: feature.key.clone(),
            });
        }
        self.read(node, feature)
    }

    /// Like `get`, but an unset feature is `None` rather than an error
    pub fn try_get<F: AsRef<str>>(&self, node: NodeId, feature: F) -> GraphResult<Option<FeatureValue>> {
        let feature = self.resolve(node, feature.as_ref())?;
        if !self.store(node)?.is_set(&feature.key) {
            return Ok(None);
        }
        self.read(node, feature)
    }

    fn read(&self, node: NodeId, feature: &Feature) -> GraphResult<Option<FeatureValue>> {
        let store = self.store(node)?;
        Ok(match store.get(&feature.key) {
            Some(slot) => Some(slot.to_feature_value()),
            None if feature.is_multiple() => Some(FeatureValue::Many(Vec::new())),
            None => None,
        })
    }

    // ==================
    // Mutations
    // ==================

    /// Replaces the value of a feature.
    ///
    /// Single features take a scalar or null (optional only); multiple features
    /// take a non-empty collection that replaces the whole sequence.
    pub fn set<F, V>(&mut self, node: NodeId, feature: F, value: V) -> GraphResult<()>
    where
        F: AsRef<str>,
        V: Into<Candidate>,
    {
        let feature = self.resolve(node, feature.as_ref())?.clone();
        let candidate = value.into();
        let validated = Validator::new(&self.language, &self.nodes)
            .validate_assignment(node, &feature, &candidate)
            .map_err(|reason| self.reject(&feature, reason))?;

        let mut events = Vec::new();
        match validated {
            Validated::Clear => self.clear_single(node, &feature, &mut events),
            Validated::Single(value) => self.replace_single(node, &feature, value, &mut events),
            Validated::Many(values) => self.replace_sequence(node, &feature, values, &mut events),
        }
        self.commit(node, &feature, "set", events);
        Ok(())
    }

    /// Appends values to a multiple feature
    pub fn add<F, V>(&mut self, node: NodeId, feature: F, values: V) -> GraphResult<()>
    where
        F: AsRef<str>,
        V: Into<Candidate>,
    {
        let key = self.resolve(node, feature.as_ref())?.key.clone();
        let index = self.store(node)?.len_of(&key);
        self.splice(node, &key, index, values.into(), "add")
    }

    /// Inserts values into a multiple feature at `index`, which may equal the length
    pub fn insert<F, V>(&mut self, node: NodeId, feature: F, index: usize, values: V) -> GraphResult<()>
    where
        F: AsRef<str>,
        V: Into<Candidate>,
    {
        let key = self.resolve(node, feature.as_ref())?.key.clone();
        self.splice(node, &key, index, values.into(), "insert")
    }

    fn splice(
        &mut self,
        node: NodeId,
        key: &str,
        index: usize,
        candidate: Candidate,
        op: &str,
    ) -> GraphResult<()> {
        let feature = self.resolve(node, key)?.clone();
        let values = Validator::new(&self.language, &self.nodes)
            .validate_batch(node, &feature, &candidate)
            .map_err(|reason| self.reject(&feature, reason))?;

        let length = self.store(node)?.len_of(&feature.key);
        if index > length {
            self.note_rejection();
            return Err(GraphError::IndexOutOfRange {
                feature: feature.key.clone(),
                index,
                length,
            });
        }

        let mut events = Vec::new();
        let mut at = index;
        for value in values {
            match value.as_node().filter(|_| feature.kind.is_containment()) {
                Some(child) => {
                    let placed =
                        containment::attach_at(&mut self.nodes, node, &feature.key, at, child, &mut events);
                    at = placed + 1;
                }
                None => {
                    if let Some(record) = self.nodes.get_mut(node) {
                        record.store.insert_at(&feature.key, at, value.clone());
                    }
                    events.push(ChangeEvent::added(&feature.kind, node, &feature.key, Some(at), value));
                    at += 1;
                }
            }
        }
        self.commit(node, &feature, op, events);
        Ok(())
    }

    /// Removes the listed values from a multiple feature.
    ///
    /// Values not present are ignored. Returns how many were removed.
    pub fn remove<F, V>(&mut self, node: NodeId, feature: F, values: V) -> GraphResult<usize>
    where
        F: AsRef<str>,
        V: Into<Candidate>,
    {
        let feature = self.resolve(node, feature.as_ref())?.clone();
        let candidate = values.into();
        let values = Validator::new(&self.language, &self.nodes)
            .validate_removal(node, &feature, &candidate)
            .map_err(|reason| self.reject(&feature, reason))?;

        // Dry run on a copy: positions at the time of each removal
        let mut remaining = self.store(node)?.many(&feature.key).to_vec();
        let mut removed = Vec::new();
        for value in values {
            if let Some(position) = remaining.iter().position(|v| *v == value) {
                remaining.remove(position);
                removed.push((position, value));
            }
        }
        if removed.is_empty() {
            return Ok(0);
        }
        if feature.is_required() && remaining.is_empty() {
            return Err(self.reject(&feature, InvalidReason::ClearsRequired));
        }

        let mut events = Vec::new();
        for (position, value) in &removed {
            if let Some(record) = self.nodes.get_mut(node) {
                record.store.remove_at(&feature.key, *position);
            }
            if let Some(child) = value.as_node().filter(|_| feature.kind.is_containment()) {
                containment::release(&mut self.nodes, child);
            }
            events.push(ChangeEvent::deleted(
                &feature.kind,
                node,
                &feature.key,
                Some(*position),
                value.clone(),
            ));
        }
        let count = removed.len();
        self.commit(node, &feature, "remove", events);
        Ok(count)
    }

    /// Takes a node out of its containment slot, leaving it parentless.
    ///
    /// Allowed for required features. Returns false if the node had no parent.
    pub fn detach_from_parent(&mut self, node: NodeId) -> GraphResult<bool> {
        if !self.nodes.contains(node) {
            return Err(GraphError::UnknownNode(node));
        }
        let mut events = Vec::new();
        let Some(slot) = containment::detach(&mut self.nodes, node, &mut events) else {
            return Ok(false);
        };

        if self.config.metrics_enabled {
            self.metrics.increment_detachments();
        }
        log_event(
            &self.logger,
            Event::NodeDetached,
            &[
                ("node", self.id_of(node).unwrap_or_default()),
                ("parent", self.id_of(slot.parent).unwrap_or_default()),
                ("feature", slot.feature.as_str()),
            ],
        );
        self.publish(events);
        Ok(true)
    }

    fn clear_single(&mut self, node: NodeId, feature: &Feature, events: &mut Vec<ChangeEvent>) {
        let Some(record) = self.nodes.get_mut(node) else {
            return;
        };
        let Some(Slot::Single(old)) = record.store.clear(&feature.key) else {
            return;
        };
        match old.as_node().filter(|_| feature.kind.is_containment()) {
            Some(child) => {
                containment::release(&mut self.nodes, child);
                events.push(ChangeEvent::child_deleted(node, &feature.key, None, child));
            }
            None => events.push(ChangeEvent::deleted(&feature.kind, node, &feature.key, None, old)),
        }
    }

    fn replace_single(
        &mut self,
        node: NodeId,
        feature: &Feature,
        value: Value,
        events: &mut Vec<ChangeEvent>,
    ) {
        let current = self.nodes.get(node).and_then(|r| r.store.single(&feature.key));
        if current == Some(&value) {
            return;
        }

        if let Some(child) = value.as_node().filter(|_| feature.kind.is_containment()) {
            containment::attach_single(&mut self.nodes, node, &feature.key, child, events);
            return;
        }

        let Some(record) = self.nodes.get_mut(node) else {
            return;
        };
        match record.store.replace_single(&feature.key, value.clone()) {
            Some(old) => events.push(ChangeEvent::changed(&feature.kind, node, &feature.key, old, value)),
            None => events.push(ChangeEvent::added(&feature.kind, node, &feature.key, None, value)),
        }
    }

    /// Replaces a whole sequence.
    ///
    /// Values on the longest common subsequence of old and new fire nothing. The
    /// others fire Deleted at their old position, highest first, then Added at their
    /// new position, lowest first. Replaying the events on the old sequence yields
    /// the new one, so a reordered value fires a Deleted and an Added.
    fn replace_sequence(
        &mut self,
        node: NodeId,
        feature: &Feature,
        values: Vec<Value>,
        events: &mut Vec<ChangeEvent>,
    ) {
        let old = self
            .nodes
            .get(node)
            .map(|r| r.store.many(&feature.key).to_vec())
            .unwrap_or_default();
        if old == values {
            return;
        }

        let (dropped, fresh) = diff(&old, &values);
        let containment = feature.kind.is_containment();

        // A child moved within the sequence is released here and reattached below
        for &position in dropped.iter().rev() {
            let value = old[position].clone();
            if let Some(child) = value.as_node().filter(|_| containment) {
                containment::release(&mut self.nodes, child);
            }
            events.push(ChangeEvent::deleted(
                &feature.kind,
                node,
                &feature.key,
                Some(position),
                value,
            ));
        }

        if containment {
            // New children leave their previous slots before this one is written
            for &position in &fresh {
                if let Some(child) = values[position].as_node() {
                    containment::detach(&mut self.nodes, child, events);
                }
            }
        }

        if let Some(record) = self.nodes.get_mut(node) {
            record.store.replace_many(&feature.key, values.clone());
        }

        for position in fresh {
            let value = values[position].clone();
            if let Some(child) = value.as_node().filter(|_| containment) {
                containment::set_parent(&mut self.nodes, child, node, &feature.key);
            }
            events.push(ChangeEvent::added(
                &feature.kind,
                node,
                &feature.key,
                Some(position),
                value,
            ));
        }
    }

    // ==================
    // Introspection
    // ==================

    /// Features currently holding a present, non-empty value, most general first
    pub fn collect_all_set_features(&self, node: NodeId) -> GraphResult<Vec<&Feature>> {
        let classifier = self.record_classifier(node)?;
        let store = self.store(node)?;
        Ok(self
            .language
            .all_features(classifier)
            .iter()
            .filter(|f| store.is_set(&f.key))
            .collect())
    }

    /// The containment feature of `parent` that currently holds `child`
    pub fn get_containment_of(&self, parent: NodeId, child: NodeId) -> GraphResult<Option<&Feature>> {
        let classifier = self.record_classifier(parent)?;
        let slot = self
            .nodes
            .get(child)
            .ok_or(GraphError::UnknownNode(child))?
            .parent
            .as_ref();
        Ok(slot
            .filter(|s| s.parent == parent)
            .and_then(|s| self.language.feature_of(classifier, &s.feature)))
    }

    /// Classifier descriptor of a node, `None` for an unknown handle
    pub fn classifier_of(&self, node: NodeId) -> Option<&Classifier> {
        let record = self.nodes.get(node)?;
        self.language.classifier(&record.classifier)
    }

    /// Owner of the containment slot holding `node`
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.parent_of(node)
    }

    /// Children across all containment features, in feature order
    pub fn children(&self, node: NodeId) -> Vec<NodeId> {
        let Some(record) = self.nodes.get(node) else {
            return Vec::new();
        };
        self.language
            .all_features(&record.classifier)
            .iter()
            .filter(|f| f.kind.is_containment())
            .filter_map(|f| record.store.get(&f.key))
            .flat_map(|slot| slot.to_feature_value().nodes())
            .collect()
    }

    /// Ancestors, nearest first
    pub fn ancestors(&self, node: NodeId) -> Vec<NodeId> {
        let mut ancestors = Vec::new();
        let mut current = self.nodes.parent_of(node);
        while let Some(parent) = current {
            ancestors.push(parent);
            current = self.nodes.parent_of(parent);
        }
        ancestors
    }

    /// Topmost ancestor; a parentless node is its own root
    pub fn root_of(&self, node: NodeId) -> NodeId {
        self.ancestors(node).last().copied().unwrap_or(node)
    }

    /// All nodes below `node`, pre-order
    pub fn descendants(&self, node: NodeId) -> Vec<NodeId> {
        let mut result = Vec::new();
        let mut stack: Vec<NodeId> = self.children(node).into_iter().rev().collect();
        while let Some(next) = stack.pop() {
            result.push(next);
            stack.extend(self.children(next).into_iter().rev());
        }
        result
    }

    /// Parentless nodes, in creation order
    pub fn roots(&self) -> Vec<NodeId> {
        self.nodes
            .handles()
            .filter(|n| self.nodes.parent_of(*n).is_none())
            .collect()
    }

    /// Handle of the node with this string id
    pub fn node_by_id(&self, id: &str) -> Option<NodeId> {
        self.nodes.lookup(id)
    }

    /// String id of a node
    pub fn id_of(&self, node: NodeId) -> Option<&str> {
        self.nodes.get(node).map(|r| r.id.as_str())
    }

    /// Whether the handle belongs to this partition
    pub fn contains(&self, node: NodeId) -> bool {
        self.nodes.contains(node)
    }

    /// Number of nodes, attached or not
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Point-in-time copy of the counters
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    // ==================
    // Subscriptions
    // ==================

    /// Registers a handler after all existing ones
    pub fn subscribe<H>(&mut self, filter: EventFilter, handler: H) -> SubscriptionId
    where
        H: FnMut(&ChangeEvent, &Partition) + 'static,
    {
        let publisher = self.publisher.get_mut();
        let id = publisher.subscribe(filter, Box::new(handler));
        let count = publisher.subscriber_count().to_string();
        log_event(&self.logger, Event::SubscriberAdded, &[("subscribers", count.as_str())]);
        id
    }

    pub fn subscribe_all<H>(&mut self, handler: H) -> SubscriptionId
    where
        H: FnMut(&ChangeEvent, &Partition) + 'static,
    {
        self.subscribe(EventFilter::All, handler)
    }

    /// Receives only the events of the containment tree rooted at `root`
    pub fn subscribe_tree<H>(&mut self, root: NodeId, handler: H) -> SubscriptionId
    where
        H: FnMut(&ChangeEvent, &Partition) + 'static,
    {
        self.subscribe(EventFilter::Tree(root), handler)
    }

    /// Returns false if `id` was not subscribed
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let publisher = self.publisher.get_mut();
        let removed = publisher.unsubscribe(id);
        if removed {
            let count = publisher.subscriber_count().to_string();
            log_event(&self.logger, Event::SubscriberRemoved, &[("subscribers", count.as_str())]);
        }
        removed
    }

    // ==================
    // Internals
    // ==================

    fn store(&self, node: NodeId) -> GraphResult<&FeatureStore> {
        self.nodes
            .get(node)
            .map(|r| &r.store)
            .ok_or(GraphError::UnknownNode(node))
    }

    fn record_classifier(&self, node: NodeId) -> GraphResult<&str> {
        self.nodes
            .get(node)
            .map(|r| r.classifier.as_str())
            .ok_or(GraphError::UnknownNode(node))
    }

    fn resolve(&self, node: NodeId, key: &str) -> GraphResult<&Feature> {
        let classifier = self.record_classifier(node)?;
        self.language
            .feature_of(classifier, key)
            .ok_or_else(|| GraphError::UnknownFeature {
                classifier: classifier.to_string(),
                feature: key.to_string(),
            })
    }

    fn note_rejection(&self) {
        if self.config.metrics_enabled {
            self.metrics.increment_mutations_rejected();
        }
    }

    fn reject(&self, feature: &Feature, reason: InvalidReason) -> GraphError {
        self.note_rejection();
        GraphError::invalid(feature.key.clone(), reason)
    }

    /// Records and delivers the events of one completed operation
    fn commit(&mut self, node: NodeId, feature: &Feature, op: &str, events: Vec<ChangeEvent>) {
        if events.is_empty() {
            return;
        }
        if self.config.metrics_enabled {
            self.metrics.increment_mutations_applied();
        }
        if self.config.log_mutations {
            let count = events.len().to_string();
            log_event(
                &self.logger,
                Event::MutationApplied,
                &[
                    ("node", self.id_of(node).unwrap_or_default()),
                    ("feature", feature.key.as_str()),
                    ("op", op),
                    ("events", count.as_str()),
                ],
            );
        }
        self.publish(events);
    }

    fn publish(&mut self, events: Vec<ChangeEvent>) {
        if self.config.metrics_enabled {
            self.metrics.add_events_published(events.len() as u64);
        }
        // Handlers get a read-only view. If one panics, unwinding releases the
        // borrow and the subscriptions stay in place.
        let view: &Partition = self;
        view.publisher.borrow_mut().publish(events, view);
    }
}

/// Edit script between two sequences, off their longest common subsequence.
///
/// Returns the positions in `old` to delete and the positions in `new` to insert,
/// both ascending. Deleting from `old` highest first, then inserting lowest first,
/// turns `old` into `new`.
fn diff(old: &[Value], new: &[Value]) -> (Vec<usize>, Vec<usize>) {
    let (n, m) = (old.len(), new.len());
    // common[i][j]: common subsequence length of old[i..] and new[j..]
    let mut common = vec![vec![0usize; m + 1]; n + 1];
    for i in (0..n).rev() {
        for j in (0..m).rev() {
            common[i][j] = if old[i] == new[j] {
                common[i + 1][j + 1] + 1
            } else {
                common[i + 1][j].max(common[i][j + 1])
            };
        }
    }

    let (mut dropped, mut fresh) = (Vec::new(), Vec::new());
    let (mut i, mut j) = (0, 0);
    while i < n && j < m {
        if old[i] == new[j] {
            i += 1;
            j += 1;
        } else if common[i + 1][j] >= common[i][j + 1] {
            dropped.push(i);
            i += 1;
        } else {
            fresh.push(j);
            j += 1;
        }
    }
    dropped.extend(i..n);
    fresh.extend(j..m);
    (dropped, fresh)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn replay(old: &[Value], new: &[Value]) -> Vec<Value> {
        let (dropped, fresh) = diff(old, new);
        let mut result = old.to_vec();
        for &i in dropped.iter().rev() {
            result.remove(i);
        }
        for j in fresh {
            result.insert(j, new[j].clone());
        }
        result
    }

    #[test]
    fn test_diff_keeps_common_subsequence() {
        let a = Value::from("a");
        let b = Value::from("b");
        let c = Value::from("c");

        let (dropped, fresh) = diff(&[a.clone(), b.clone(), a.clone()], &[a.clone(), c.clone()]);
        assert_eq!(dropped, vec![1, 2]);
        assert_eq!(fresh, vec![1]);

        let (dropped, fresh) = diff(&[a.clone(), b.clone()], &[a.clone(), b.clone()]);
        assert!(dropped.is_empty());
        assert!(fresh.is_empty());

        // a swap moves exactly one value
        let (dropped, fresh) = diff(&[a.clone(), b.clone()], &[b, a]);
        assert_eq!(dropped.len(), 1);
        assert_eq!(fresh.len(), 1);
    }

    #[test]
    fn test_diff_replays_to_new_sequence() {
        let v = |s: &str| s.chars().map(|c| Value::from(c.to_string())).collect::<Vec<_>>();
        let cases = [("abc", "cbd"), ("abc", "dcb"), ("abca", "aacb"), ("", "ab"), ("ab", ""), ("abcd", "dcba")];
        for (old, new) in cases {
            assert_eq!(replay(&v(old), &v(new)), v(new), "{} -> {}", old, new);
        }
    }

    #[test]
    fn test_node_id_pattern() {
        assert!(is_valid_node_id("my-Id_01"));
        assert!(!is_valid_node_id(""));
        assert!(!is_valid_node_id("a b"));
        assert!(!is_valid_node_id("a.b"));
    }
}
