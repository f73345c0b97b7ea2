//! metagraph - A meta-model-driven object graph
//!
//! Every node's shape is described by a language: classifiers with properties,
//! containments and references. The crate stores feature values, validates them
//! against the language, keeps the containment tree consistent and notifies
//! subscribers of every change.

pub mod config;
pub mod graph;
pub mod language;
pub mod notification;
pub mod observability;
pub mod typed;

pub use config::{ConfigError, EngineConfig};
pub use graph::{Candidate, FeatureValue, GraphError, GraphResult, InvalidReason, NodeId, Partition, Value};
pub use language::{Language, LanguageError, LanguageLoader};
pub use notification::{ChangeEvent, EventFilter, EventKind, SubscriptionId};
