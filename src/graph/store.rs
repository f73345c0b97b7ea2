//! Per-node feature storage
//!
//! Plain data primitives keyed by feature key. The store does not validate; the
//! partition validates first and only then calls into it.

use std::collections::HashMap;

use super::value::{FeatureValue, Value};

/// Stored state of one feature
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Slot {
    Single(Value),
    /// May be empty: distinct from an absent slot
    Many(Vec<Value>),
}

impl Slot {
    /// Present and non-empty
    pub fn is_set(&self) -> bool {
        match self {
            Slot::Single(_) => true,
            Slot::Many(values) => !values.is_empty(),
        }
    }

    pub fn to_feature_value(&self) -> FeatureValue {
        match self {
            Slot::Single(v) => FeatureValue::Single(v.clone()),
            Slot::Many(values) => FeatureValue::Many(values.clone()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeatureStore {
    slots: HashMap<String, Slot>,
}

impl FeatureStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Slot> {
        self.slots.get(key)
    }

    pub fn is_set(&self, key: &str) -> bool {
        self.slots.get(key).map(Slot::is_set).unwrap_or(false)
    }

    pub fn single(&self, key: &str) -> Option<&Value> {
        match self.slots.get(key) {
            Some(Slot::Single(v)) => Some(v),
            _ => None,
        }
    }

    /// Values of a multiple slot; empty when absent
    pub fn many(&self, key: &str) -> &[Value] {
        match self.slots.get(key) {
            Some(Slot::Many(values)) => values,
            _ => &[],
        }
    }

    pub fn len_of(&self, key: &str) -> usize {
        self.many(key).len()
    }

    pub fn position_of(&self, key: &str, value: &Value) -> Option<usize> {
        self.many(key).iter().position(|v| v == value)
    }

    /// Replaces a single value, returning the previous one
    pub fn replace_single(&mut self, key: &str, value: Value) -> Option<Value> {
        match self.slots.insert(key.to_string(), Slot::Single(value)) {
            Some(Slot::Single(old)) => Some(old),
            _ => None,
        }
    }

    /// Replaces a whole sequence, returning the previous values
    pub fn replace_many(&mut self, key: &str, values: Vec<Value>) -> Vec<Value> {
        match self.slots.insert(key.to_string(), Slot::Many(values)) {
            Some(Slot::Many(old)) => old,
            _ => Vec::new(),
        }
    }

    /// Removes the slot entirely
    pub fn clear(&mut self, key: &str) -> Option<Slot> {
        self.slots.remove(key)
    }

    /// Inserts into a sequence; `index` must be within `0..=len`
    pub fn insert_at(&mut self, key: &str, index: usize, value: Value) {
        let slot = self
            .slots
            .entry(key.to_string())
            .or_insert_with(|| Slot::Many(Vec::new()));
        if let Slot::Many(values) = slot {
            values.insert(index, value);
        }
    }

    /// Removes from a sequence; the slot stays, possibly empty
    pub fn remove_at(&mut self, key: &str, index: usize) -> Option<Value> {
        match self.slots.get_mut(key) {
            Some(Slot::Many(values)) if index < values.len() => Some(values.remove(index)),
            _ => None,
        }
    }
}
