//! # Publisher
//!
//! Synchronous, ordered fan-out of change events to subscribers.
//!
//! - Subscribers run to completion before the mutating call returns
//! - Subscribers of the same kind run in subscription order
//! - Handlers see the partition read-only; they cannot mutate it while an event is
//!   being delivered
//! - A tree filter is resolved at delivery time, against the state after the
//!   operation

use std::fmt;

use serde::{Deserialize, Serialize};

use super::event::{ChangeEvent, EventKind};
use crate::graph::{NodeId, Partition};

/// Callback invoked for each matching event
pub type Handler = Box<dyn FnMut(&ChangeEvent, &Partition)>;

/// Handle returned by `subscribe`, used to unsubscribe
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SubscriptionId(u64);

/// Which events a subscriber receives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventFilter {
    All,
    Kinds(Vec<EventKind>),
    /// Events on nodes of the containment tree rooted at this node, plus the
    /// attachment or detachment of the root itself
    Tree(NodeId),
}

impl EventFilter {
    /// Filter for a single kind
    pub fn kind(kind: EventKind) -> Self {
        EventFilter::Kinds(vec![kind])
    }

    /// Whether events of `kind` can pass; tree filters accept every kind
    pub fn admits(&self, kind: EventKind) -> bool {
        match self {
            EventFilter::Kinds(kinds) => kinds.contains(&kind),
            EventFilter::All | EventFilter::Tree(_) => true,
        }
    }

    /// Whether `event` reaches a subscriber with this filter
    pub fn matches(&self, event: &ChangeEvent, view: &Partition) -> bool {
        match self {
            EventFilter::Tree(root) => {
                view.root_of(event.node) == *root
                    || (event.kind.is_containment() && event.mentions(*root))
            }
            filter => filter.admits(event.kind),
        }
    }
}

struct Subscriber {
    id: SubscriptionId,
    filter: EventFilter,
    handler: Handler,
}

/// Per-partition event bus
#[derive(Default)]
pub struct Publisher {
    subscribers: Vec<Subscriber>,
    next_id: u64,
    next_sequence: u64,
}

impl fmt::Debug for Publisher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Publisher")
            .field("subscribers", &self.subscribers.len())
            .field("next_sequence", &self.next_sequence)
            .finish()
    }
}

impl Publisher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a subscriber
    pub fn subscribe(&mut self, filter: EventFilter, handler: Handler) -> SubscriptionId {
        self.next_id += 1;
        let id = SubscriptionId(self.next_id);
        self.subscribers.push(Subscriber {
            id,
            filter,
            handler,
        });
        id
    }

    /// Removes a subscriber; returns false if it was not registered
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscribers.len();
        self.subscribers.retain(|s| s.id != id);
        self.subscribers.len() != before
    }

    /// Number of registered subscribers
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Numbers events from 1 upwards and delivers them in order
    pub fn publish(&mut self, events: Vec<ChangeEvent>, view: &Partition) {
        for mut event in events {
            self.next_sequence += 1;
            event.sequence = self.next_sequence;
            for subscriber in self.subscribers.iter_mut() {
                if subscriber.filter.matches(&event, view) {
                    (subscriber.handler)(&event, view);
                }
            }
        }
    }
}
