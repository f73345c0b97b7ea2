//! Graph errors
//!
//! Every error is raised before any mutation, so a failed call leaves the partition
//! exactly as it was and emits no events.

use thiserror::Error;

use super::value::NodeId;

/// Result type for graph operations
pub type GraphResult<T> = Result<T, GraphError>;

/// Why a candidate value was rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InvalidReason {
    #[error("single-valued feature cannot take a collection ({len} element(s))")]
    CollectionForSingle { len: usize },

    #[error("multiple-valued feature requires a collection")]
    NotACollection,

    #[error("collection must not be empty")]
    EmptyCollection,

    #[error("collection element {index} is null")]
    NullElement { index: usize },

    #[error("expected {expected}, got {actual}")]
    TypeMismatch { expected: String, actual: String },

    #[error("'{literal}' is not a literal of enumeration '{enumeration}'")]
    UnknownLiteral { enumeration: String, literal: String },

    #[error("node {0} does not exist in this partition")]
    UnknownNode(NodeId),

    #[error("required feature cannot be set to null")]
    RequiredNull,

    #[error("node {0} appears more than once")]
    DuplicateChild(NodeId),

    #[error("node {0} cannot contain itself or one of its ancestors")]
    CyclicContainment(NodeId),

    #[error("operation would leave a required feature empty")]
    ClearsRequired,

    #[error("operation requires a multiple-valued feature")]
    NotMultiple,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    // ==================
    // Value Errors
    // ==================
    #[error("Invalid value for feature '{feature}': {reason}")]
    InvalidValue {
        feature: String,
        reason: InvalidReason,
    },

    #[error("Required feature '{feature}' is unset on node '{node}'")]
    UnsetFeature { node: String, feature: String },

    #[error("Index {index} out of range for feature '{feature}' (length {length})")]
    IndexOutOfRange {
        feature: String,
        index: usize,
        length: usize,
    },

    #[error("Null argument for non-nullable feature '{0}'")]
    NullArgument(String),

    // ==================
    // Lookup Errors
    // ==================
    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("Feature '{feature}' does not apply to classifier '{classifier}'")]
    UnknownFeature { classifier: String, feature: String },

    #[error("Unknown classifier: {0}")]
    UnknownClassifier(String),

    // ==================
    // Creation Errors
    // ==================
    #[error("Classifier '{0}' cannot be instantiated")]
    NotInstantiable(String),

    #[error("Node id '{0}' is already in use")]
    DuplicateNodeId(String),

    #[error("Invalid node id: '{0}'")]
    InvalidNodeId(String),
}

impl GraphError {
    pub fn invalid(feature: impl Into<String>, reason: InvalidReason) -> Self {
        GraphError::InvalidValue {
            feature: feature.into(),
            reason,
        }
    }

    /// Stable error code
    pub fn code(&self) -> &'static str {
        match self {
            GraphError::InvalidValue { .. } => "META_INVALID_VALUE",
            GraphError::UnsetFeature { .. } => "META_UNSET_FEATURE",
            GraphError::IndexOutOfRange { .. } => "META_INDEX_OUT_OF_RANGE",
            GraphError::NullArgument(_) => "META_NULL_ARGUMENT",
            GraphError::UnknownNode(_) => "META_UNKNOWN_NODE",
            GraphError::UnknownFeature { .. } => "META_UNKNOWN_FEATURE",
            GraphError::UnknownClassifier(_) => "META_UNKNOWN_CLASSIFIER",
            GraphError::NotInstantiable(_) => "META_NOT_INSTANTIABLE",
            GraphError::DuplicateNodeId(_) => "META_DUPLICATE_NODE_ID",
            GraphError::InvalidNodeId(_) => "META_INVALID_NODE_ID",
        }
    }

    /// The rejection reason, for `InvalidValue` errors
    pub fn reason(&self) -> Option<&InvalidReason> {
        match self {
            GraphError::InvalidValue { reason, .. } => Some(reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            GraphError::invalid("x", InvalidReason::EmptyCollection).code(),
            "META_INVALID_VALUE"
        );
        assert_eq!(GraphError::NullArgument("x".into()).code(), "META_NULL_ARGUMENT");
        assert_eq!(
            GraphError::IndexOutOfRange {
                feature: "x".into(),
                index: 3,
                length: 1
            }
            .code(),
            "META_INDEX_OUT_OF_RANGE"
        );
    }

    #[test]
    fn test_display_carries_reason() {
        let err = GraphError::invalid("shapes", InvalidReason::NullElement { index: 2 });
        let display = err.to_string();
        assert!(display.contains("shapes"));
        assert!(display.contains("element 2"));
        assert_eq!(err.reason(), Some(&InvalidReason::NullElement { index: 2 }));
    }
}
