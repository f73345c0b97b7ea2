//! Values held by features
//!
//! `Value` is what a feature slot stores. `Candidate` is what a caller hands to a
//! mutation: it may be null or collection-shaped, and it is the validator's job to
//! decide whether that shape is acceptable for the target feature.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Arena handle of a node within its partition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn from_index(index: usize) -> Self {
        NodeId(index as u32)
    }

    pub(crate) fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A single stored value
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "lowercase")]
pub enum Value {
    Boolean(bool),
    Integer(i64),
    String(String),
    Json(serde_json::Value),
    Enum { enumeration: String, literal: String },
    Node(NodeId),
}

impl Value {
    pub fn enum_literal(enumeration: impl Into<String>, literal: impl Into<String>) -> Self {
        Value::Enum {
            enumeration: enumeration.into(),
            literal: literal.into(),
        }
    }

    /// Returns the runtime type name for error messages
    pub fn type_name(&self) -> String {
        match self {
            Value::Boolean(_) => "boolean".to_string(),
            Value::Integer(_) => "integer".to_string(),
            Value::String(_) => "string".to_string(),
            Value::Json(_) => "json".to_string(),
            Value::Enum { enumeration, .. } => format!("enum {}", enumeration),
            Value::Node(_) => "node".to_string(),
        }
    }

    pub fn as_node(&self) -> Option<NodeId> {
        match self {
            Value::Node(id) => Some(*id),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Boolean(b) => write!(f, "{}", b),
            Value::Integer(i) => write!(f, "{}", i),
            Value::String(s) => write!(f, "{:?}", s),
            Value::Json(j) => write!(f, "{}", j),
            Value::Enum {
                enumeration,
                literal,
            } => write!(f, "{}.{}", enumeration, literal),
            Value::Node(id) => write!(f, "{}", id),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<i32> for Value {
    fn from(v: i32) -> Self {
        Value::Integer(v as i64)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::String(v)
    }
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        Value::Json(v)
    }
}

impl From<NodeId> for Value {
    fn from(v: NodeId) -> Self {
        Value::Node(v)
    }
}

/// Input to a mutation, before validation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Candidate {
    /// Absent / null
    Null,
    /// A scalar
    One(Value),
    /// Any collection shape; elements may be null
    Many(Vec<Option<Value>>),
}

impl Candidate {
    /// Collection of non-null values
    pub fn many<I, V>(values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        Candidate::Many(values.into_iter().map(|v| Some(v.into())).collect())
    }

    /// Node handles mentioned anywhere in the candidate
    pub fn nodes(&self) -> Vec<NodeId> {
        match self {
            Candidate::Null => Vec::new(),
            Candidate::One(v) => v.as_node().into_iter().collect(),
            Candidate::Many(items) => items
                .iter()
                .flatten()
                .filter_map(Value::as_node)
                .collect(),
        }
    }
}

macro_rules! scalar_candidate {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Candidate {
                fn from(v: $t) -> Self {
                    Candidate::One(v.into())
                }
            }
        )*
    };
}

scalar_candidate!(Value, bool, i64, i32, &str, String, serde_json::Value, NodeId);

impl From<Option<Value>> for Candidate {
    fn from(v: Option<Value>) -> Self {
        match v {
            Some(v) => Candidate::One(v),
            None => Candidate::Null,
        }
    }
}

impl From<Vec<Value>> for Candidate {
    fn from(values: Vec<Value>) -> Self {
        Candidate::Many(values.into_iter().map(Some).collect())
    }
}

impl From<Vec<NodeId>> for Candidate {
    fn from(nodes: Vec<NodeId>) -> Self {
        Candidate::many(nodes)
    }
}

impl From<Vec<Option<Value>>> for Candidate {
    fn from(values: Vec<Option<Value>>) -> Self {
        Candidate::Many(values)
    }
}

/// Value returned by reads
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeatureValue {
    Single(Value),
    Many(Vec<Value>),
}

impl FeatureValue {
    pub fn as_single(&self) -> Option<&Value> {
        match self {
            FeatureValue::Single(v) => Some(v),
            FeatureValue::Many(_) => None,
        }
    }

    pub fn as_many(&self) -> Option<&[Value]> {
        match self {
            FeatureValue::Single(_) => None,
            FeatureValue::Many(values) => Some(values),
        }
    }

    /// Node handles held, in order
    pub fn nodes(&self) -> Vec<NodeId> {
        match self {
            FeatureValue::Single(v) => v.as_node().into_iter().collect(),
            FeatureValue::Many(values) => values.iter().filter_map(Value::as_node).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_conversions() {
        assert_eq!(Candidate::from("x"), Candidate::One(Value::String("x".into())));
        assert_eq!(Candidate::from(None::<Value>), Candidate::Null);
        assert_eq!(
            Candidate::from(vec![NodeId(1), NodeId(2)]),
            Candidate::Many(vec![Some(Value::Node(NodeId(1))), Some(Value::Node(NodeId(2)))])
        );
    }

    #[test]
    fn test_candidate_nodes_skips_nulls_and_scalars() {
        let candidate = Candidate::Many(vec![
            Some(Value::Node(NodeId(3))),
            None,
            Some(Value::Integer(4)),
        ]);
        assert_eq!(candidate.nodes(), vec![NodeId(3)]);
    }

    #[test]
    fn test_value_type_names() {
        assert_eq!(Value::from(true).type_name(), "boolean");
        assert_eq!(Value::from(1i64).type_name(), "integer");
        assert_eq!(Value::enum_literal("Color", "red").type_name(), "enum Color");
        assert_eq!(Value::Node(NodeId(0)).type_name(), "node");
    }

    #[test]
    fn test_value_json_shape() {
        let json = serde_json::to_value(Value::Integer(5)).unwrap();
        assert_eq!(json, serde_json::json!({"type": "integer", "value": 5}));
    }
}
