//! # Typed Accessors
//!
//! Thin compile-time-typed wrappers over the reflective API, meant to be embedded
//! in generated node types. Each accessor carries a fixed feature key; all runtime
//! checks still happen in the partition's validator.
//!
//! The typed layer adds two things of its own:
//! - `set(None)` on a required feature fails with `NullArgument` before the
//!   partition is touched
//! - `try_set` reports failure as `false` instead of an error

use std::marker::PhantomData;

use crate::graph::{Candidate, FeatureValue, GraphError, GraphResult, InvalidReason, NodeId, Partition, Value};

/// Rust types that map to one property datatype
pub trait PropertyValue: Sized {
    const TYPE_NAME: &'static str;

    fn into_value(self) -> Value;

    fn from_value(value: &Value) -> Option<Self>;
}

impl PropertyValue for bool {
    const TYPE_NAME: &'static str = "boolean";

    fn into_value(self) -> Value {
        Value::Boolean(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_bool()
    }
}

impl PropertyValue for i64 {
    const TYPE_NAME: &'static str = "integer";

    fn into_value(self) -> Value {
        Value::Integer(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_i64()
    }
}

impl PropertyValue for String {
    const TYPE_NAME: &'static str = "string";

    fn into_value(self) -> Value {
        Value::String(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        value.as_str().map(str::to_string)
    }
}

impl PropertyValue for serde_json::Value {
    const TYPE_NAME: &'static str = "json";

    fn into_value(self) -> Value {
        Value::Json(self)
    }

    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Json(json) => Some(json.clone()),
            _ => None,
        }
    }
}

/// Enumeration literals travel as plain values
impl PropertyValue for Value {
    const TYPE_NAME: &'static str = "value";

    fn into_value(self) -> Value {
        self
    }

    fn from_value(value: &Value) -> Option<Self> {
        Some(value.clone())
    }
}

/// A generated node type: a typed handle onto one node of a fixed classifier
pub trait TypedNode: Sized {
    const CLASSIFIER: &'static str;

    fn from_node(node: NodeId) -> Self;

    fn node(&self) -> NodeId;

    /// Creates the node with every feature unset
    fn create(partition: &mut Partition, id: &str) -> GraphResult<Self> {
        partition.create_node(id, Self::CLASSIFIER).map(Self::from_node)
    }

    /// Creates the node and calls `set` for each supplied feature
    fn create_with<I>(partition: &mut Partition, id: &str, assignments: I) -> GraphResult<Self>
    where
        I: IntoIterator<Item = (&'static str, Candidate)>,
    {
        let node = partition.create_node(id, Self::CLASSIFIER)?;
        initialize(partition, node, assignments)?;
        Ok(Self::from_node(node))
    }
}

/// Calls `set` for each supplied feature, stopping at the first failure
pub fn initialize<I>(partition: &mut Partition, node: NodeId, assignments: I) -> GraphResult<()>
where
    I: IntoIterator<Item = (&'static str, Candidate)>,
{
    for (feature, value) in assignments {
        partition.set(node, feature, value)?;
    }
    Ok(())
}

fn unset(partition: &Partition, node: NodeId, feature: &str) -> GraphError {
    GraphError::UnsetFeature {
        node: partition.id_of(node).unwrap_or_default().to_string(),
        feature: feature.to_string(),
    }
}

fn single(value: Option<FeatureValue>) -> Option<Value> {
    match value {
        Some(FeatureValue::Single(v)) => Some(v),
        _ => None,
    }
}

/// Accessor for a single-valued property
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PropertyAccessor<T> {
    key: &'static str,
    required: bool,
    _marker: PhantomData<fn() -> T>,
}

impl<T: PropertyValue> PropertyAccessor<T> {
    /// Accessor for a feature that must not be set to null
    pub const fn required(key: &'static str) -> Self {
        Self {
            key,
            required: true,
            _marker: PhantomData,
        }
    }

    pub const fn optional(key: &'static str) -> Self {
        Self {
            key,
            required: false,
            _marker: PhantomData,
        }
    }

    /// Feature key the accessor reads and writes
    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Current value, `None` when unset
    pub fn get(&self, partition: &Partition, node: NodeId) -> GraphResult<Option<T>> {
        match single(partition.try_get(node, self.key)?) {
            Some(value) => self.decode(&value).map(Some),
            None => Ok(None),
        }
    }

    /// Current value; an unset feature is an error
    pub fn value(&self, partition: &Partition, node: NodeId) -> GraphResult<T> {
        let value = single(partition.get(node, self.key)?).ok_or_else(|| unset(partition, node, self.key))?;
        self.decode(&value)
    }

    /// Sets or clears the value; `None` on a required feature is `NullArgument`
    pub fn set(&self, partition: &mut Partition, node: NodeId, value: Option<T>) -> GraphResult<()> {
        if value.is_none() && self.required {
            return Err(GraphError::NullArgument(self.key.to_string()));
        }
        partition.set(node, self.key, Candidate::from(value.map(T::into_value)))
    }

    /// Like `set`, reporting failure as `false`
    pub fn try_set(&self, partition: &mut Partition, node: NodeId, value: Option<T>) -> bool {
        self.set(partition, node, value).is_ok()
    }

    fn decode(&self, value: &Value) -> GraphResult<T> {
        T::from_value(value).ok_or_else(|| {
            GraphError::invalid(
                self.key,
                InvalidReason::TypeMismatch {
                    expected: T::TYPE_NAME.to_string(),
                    actual: value.type_name(),
                },
            )
        })
    }
}

/// Accessor for a single-valued containment or reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SingleLinkAccessor {
    key: &'static str,
    required: bool,
}

impl SingleLinkAccessor {
    pub const fn required(key: &'static str) -> Self {
        Self {
            key,
            required: true,
        }
    }

    pub const fn optional(key: &'static str) -> Self {
        Self {
            key,
            required: false,
        }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Current target, `None` when unset
    pub fn get(&self, partition: &Partition, node: NodeId) -> GraphResult<Option<NodeId>> {
        Ok(single(partition.try_get(node, self.key)?).and_then(|v| v.as_node()))
    }

    /// Current target; an unset feature is an error
    pub fn value(&self, partition: &Partition, node: NodeId) -> GraphResult<NodeId> {
        single(partition.get(node, self.key)?)
            .and_then(|v| v.as_node())
            .ok_or_else(|| unset(partition, node, self.key))
    }

    /// Sets or clears the target; `None` on a required feature is `NullArgument`
    pub fn set(&self, partition: &mut Partition, node: NodeId, target: Option<NodeId>) -> GraphResult<()> {
        if target.is_none() && self.required {
            return Err(GraphError::NullArgument(self.key.to_string()));
        }
        partition.set(node, self.key, Candidate::from(target.map(Value::Node)))
    }

    pub fn try_set(&self, partition: &mut Partition, node: NodeId, target: Option<NodeId>) -> bool {
        self.set(partition, node, target).is_ok()
    }
}

/// Accessor for a multiple-valued containment or reference
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MultiLinkAccessor {
    key: &'static str,
}

impl MultiLinkAccessor {
    pub const fn new(key: &'static str) -> Self {
        Self { key }
    }

    pub fn key(&self) -> &'static str {
        self.key
    }

    /// Current targets in order; empty when unset
    pub fn get(&self, partition: &Partition, node: NodeId) -> GraphResult<Vec<NodeId>> {
        Ok(partition
            .try_get(node, self.key)?
            .map(|v| v.nodes())
            .unwrap_or_default())
    }

    /// Replaces the whole sequence
    pub fn set(&self, partition: &mut Partition, node: NodeId, targets: Vec<NodeId>) -> GraphResult<()> {
        partition.set(node, self.key, targets)
    }

    pub fn try_set(&self, partition: &mut Partition, node: NodeId, targets: Vec<NodeId>) -> bool {
        self.set(partition, node, targets).is_ok()
    }

    /// Appends targets in order
    pub fn add<I>(&self, partition: &mut Partition, node: NodeId, targets: I) -> GraphResult<()>
    where
        I: IntoIterator<Item = NodeId>,
    {
        partition.add(node, self.key, Candidate::many(targets))
    }

    /// Inserts targets at `index`, which may equal the length
    pub fn insert<I>(
        &self,
        partition: &mut Partition,
        node: NodeId,
        index: usize,
        targets: I,
    ) -> GraphResult<()>
    where
        I: IntoIterator<Item = NodeId>,
    {
        partition.insert(node, self.key, index, Candidate::many(targets))
    }

    /// Removes the listed targets; returns how many were present
    pub fn remove<I>(&self, partition: &mut Partition, node: NodeId, targets: I) -> GraphResult<usize>
    where
        I: IntoIterator<Item = NodeId>,
    {
        partition.remove(node, self.key, Candidate::many(targets))
    }
}
