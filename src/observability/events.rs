//! Observable engine lifecycle events
//!
//! These are log events, not change notifications: they describe what the engine did
//! (a language was loaded, a node created) for operators, while `notification`
//! events describe model changes for subscribers.

use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Configuration
    ConfigLoaded,

    // Languages
    LanguageLoaded,
    LanguageRegistered,

    // Partition
    PartitionCreated,
    NodeCreated,

    // Mutations
    MutationApplied,
    NodeDetached,

    // Subscribers
    SubscriberAdded,
    SubscriberRemoved,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::LanguageLoaded => "LANGUAGE_LOADED",
            Event::LanguageRegistered => "LANGUAGE_REGISTERED",
            Event::PartitionCreated => "PARTITION_CREATED",
            Event::NodeCreated => "NODE_CREATED",
            Event::MutationApplied => "MUTATION_APPLIED",
            Event::NodeDetached => "NODE_DETACHED",
            Event::SubscriberAdded => "SUBSCRIBER_ADDED",
            Event::SubscriberRemoved => "SUBSCRIBER_REMOVED",
        }
    }

    /// Per-node events are only worth logging at trace level
    pub fn is_per_node(&self) -> bool {
        matches!(
            self,
            Event::NodeCreated | Event::MutationApplied | Event::NodeDetached
        )
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
