//! # Change Notification
//!
//! Every partition owns one publisher. Each successful mutation produces exactly one
//! event per changed value; failed or no-op mutations produce none.
//!
//! ## Architecture
//!
//! - **Event**: typed description of one changed value
//! - **Publisher**: ordered subscriber list with kind filters
//!
//! Events of one operation are buffered and delivered after the operation has
//! completed, so subscribers never observe a node with two parents or a parent
//! whose store does not yet hold the child.

pub mod event;
pub mod publisher;

pub use event::{Change, ChangeEvent, EventKind};
pub use publisher::{EventFilter, Handler, Publisher, SubscriptionId};
