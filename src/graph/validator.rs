//! Value validator
//!
//! Rules, applied in order:
//! 1. A single feature never takes a collection, whatever its arity or contents
//! 2. A multiple feature takes a non-empty collection without null elements; one bad
//!    element rejects the whole candidate
//! 3. Every element conforms to the declared type (primitive kind, enumeration
//!    literal, or classifier-or-subtype)
//! 4. Null is accepted only for optional single features
//!
//! Containment candidates are also rejected when they list the same node twice or
//! would make a node contain itself or one of its ancestors.
//!
//! Validation is pure: it never mutates the partition and never emits events.

use std::collections::HashSet;

use super::errors::InvalidReason;
use super::value::{Candidate, NodeId, Value};
use crate::language::{DataType, Feature, FeatureKind, Language, PrimitiveType};

/// Read-only view of the nodes a validator may need to inspect
pub trait NodeTypes {
    /// Classifier key of a node, `None` if the node does not exist
    fn classifier_of(&self, node: NodeId) -> Option<&str>;

    /// Whether `candidate` is `node` itself or one of its ancestors
    fn is_ancestor_or_self(&self, candidate: NodeId, node: NodeId) -> bool;
}

/// Normalized outcome of a successful assignment check
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Validated {
    /// Clear an optional single feature
    Clear,
    Single(Value),
    Many(Vec<Value>),
}

/// What a batch is checked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum BatchUse {
    Install,
    Remove,
}

pub struct Validator<'a, T: NodeTypes + ?Sized> {
    language: &'a Language,
    nodes: &'a T,
}

impl<'a, T: NodeTypes + ?Sized> Validator<'a, T> {
    pub fn new(language: &'a Language, nodes: &'a T) -> Self {
        Self { language, nodes }
    }

    /// Checks a whole-value assignment (`set`) to `feature` on `owner`.
    pub fn validate_assignment(
        &self,
        owner: NodeId,
        feature: &Feature,
        candidate: &Candidate,
    ) -> Result<Validated, InvalidReason> {
        if !feature.is_multiple() {
            return match candidate {
                Candidate::Many(items) => Err(InvalidReason::CollectionForSingle { len: items.len() }),
                Candidate::Null if feature.is_required() => Err(InvalidReason::RequiredNull),
                Candidate::Null => Ok(Validated::Clear),
                Candidate::One(value) => {
                    self.check_element(owner, feature, value, BatchUse::Install)?;
                    Ok(Validated::Single(value.clone()))
                }
            };
        }

        match candidate {
            Candidate::Null if feature.is_required() => Err(InvalidReason::RequiredNull),
            Candidate::Null | Candidate::One(_) => Err(InvalidReason::NotACollection),
            Candidate::Many(items) => self
                .check_sequence(owner, feature, items, BatchUse::Install)
                .map(Validated::Many),
        }
    }

    /// Checks a batch for `add` / `insert`. A scalar counts as a batch of one.
    pub fn validate_batch(
        &self,
        owner: NodeId,
        feature: &Feature,
        candidate: &Candidate,
    ) -> Result<Vec<Value>, InvalidReason> {
        self.batch(owner, feature, candidate, BatchUse::Install)
    }

    /// Checks a batch for `remove`. Cycle and duplicate checks do not apply.
    pub fn validate_removal(
        &self,
        owner: NodeId,
        feature: &Feature,
        candidate: &Candidate,
    ) -> Result<Vec<Value>, InvalidReason> {
        self.batch(owner, feature, candidate, BatchUse::Remove)
    }

    fn batch(
        &self,
        owner: NodeId,
        feature: &Feature,
        candidate: &Candidate,
        usage: BatchUse,
    ) -> Result<Vec<Value>, InvalidReason> {
        if !feature.is_multiple() {
            return Err(InvalidReason::NotMultiple);
        }
        match candidate {
            Candidate::Null => Err(InvalidReason::NotACollection),
            Candidate::One(value) => {
                self.check_element(owner, feature, value, usage)?;
                Ok(vec![value.clone()])
            }
            Candidate::Many(items) => self.check_sequence(owner, feature, items, usage),
        }
    }

    fn check_sequence(
        &self,
        owner: NodeId,
        feature: &Feature,
        items: &[Option<Value>],
        usage: BatchUse,
    ) -> Result<Vec<Value>, InvalidReason> {
        if items.is_empty() {
            return Err(InvalidReason::EmptyCollection);
        }

        let mut values = Vec::with_capacity(items.len());
        let mut seen = HashSet::new();
        for (index, item) in items.iter().enumerate() {
            let value = item.as_ref().ok_or(InvalidReason::NullElement { index })?;
            self.check_element(owner, feature, value, usage)?;

            if usage == BatchUse::Install && feature.kind.is_containment() {
                if let Some(node) = value.as_node() {
                    if !seen.insert(node) {
                        return Err(InvalidReason::DuplicateChild(node));
                    }
                }
            }
            values.push(value.clone());
        }
        Ok(values)
    }

    fn check_element(
        &self,
        owner: NodeId,
        feature: &Feature,
        value: &Value,
        usage: BatchUse,
    ) -> Result<(), InvalidReason> {
        match &feature.kind {
            FeatureKind::Property { data_type } => self.check_datatype(data_type, value),
            FeatureKind::Containment { classifier } => {
                let node = self.check_node(classifier, value)?;
                if usage == BatchUse::Install && self.nodes.is_ancestor_or_self(node, owner) {
                    return Err(InvalidReason::CyclicContainment(node));
                }
                Ok(())
            }
            FeatureKind::Reference { classifier } => self.check_node(classifier, value).map(|_| ()),
        }
    }

    fn check_node(&self, declared: &str, value: &Value) -> Result<NodeId, InvalidReason> {
        let node = value.as_node().ok_or_else(|| InvalidReason::TypeMismatch {
            expected: declared.to_string(),
            actual: value.type_name(),
        })?;
        let actual = self
            .nodes
            .classifier_of(node)
            .ok_or(InvalidReason::UnknownNode(node))?;
        if !self.language.is_subtype(actual, declared) {
            return Err(InvalidReason::TypeMismatch {
                expected: declared.to_string(),
                actual: actual.to_string(),
            });
        }
        Ok(node)
    }

    fn check_datatype(&self, declared: &DataType, value: &Value) -> Result<(), InvalidReason> {
        let matches = match (declared, value) {
            (DataType::Primitive { primitive }, value) => matches!(
                (primitive, value),
                (PrimitiveType::Boolean, Value::Boolean(_))
                    | (PrimitiveType::Integer, Value::Integer(_))
                    | (PrimitiveType::String, Value::String(_))
                    | (PrimitiveType::Json, Value::Json(_))
            ),
            (
                DataType::Enumeration { enumeration },
                Value::Enum {
                    enumeration: actual,
                    literal,
                },
            ) if enumeration == actual => {
                let known = self
                    .language
                    .enumeration(enumeration)
                    .map(|e| e.has_literal(literal))
                    .unwrap_or(false);
                if !known {
                    return Err(InvalidReason::UnknownLiteral {
                        enumeration: enumeration.clone(),
                        literal: literal.clone(),
                    });
                }
                true
            }
            (DataType::Enumeration { .. }, _) => false,
        };

        if matches {
            Ok(())
        } else {
            Err(InvalidReason::TypeMismatch {
                expected: declared.to_string(),
                actual: value.type_name(),
            })
        }
    }
}
