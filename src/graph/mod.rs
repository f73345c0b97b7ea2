//! # Node Graph
//!
//! Nodes, their feature values and the containment tree, all owned by a
//! `Partition`.
//!
//! ## Architecture
//!
//! - **Value**: what a feature slot holds; `Candidate` is unvalidated input
//! - **Validator**: the only place runtime type conformance is checked
//! - **Store**: per-node slots keyed by feature
//! - **Table**: arena of node records indexed by `NodeId`
//! - **Containment**: keeps store and parent back-reference in step
//! - **Partition**: the reflective API over all of the above
//!
//! ## Invariants
//!
//! - A node is the value of at most one containment slot
//! - A node's parent is exactly the owner of that slot
//! - Containment is acyclic
//! - A failed mutation changes nothing and notifies nobody

mod containment;
mod errors;
mod partition;
mod store;
mod table;
mod validator;
mod value;

pub use errors::{GraphError, GraphResult, InvalidReason};
pub use partition::Partition;
pub use store::{FeatureStore, Slot};
pub use table::{ContainmentSlot, NodeRecord, NodeTable};
pub use validator::{NodeTypes, Validated, Validator};
pub use value::{Candidate, FeatureValue, NodeId, Value};
