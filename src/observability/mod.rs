//! Observability subsystem
//!
//! - Structured logging (JSON lines)
//! - Deterministic counters
//! - Lifecycle event names
//!
//! Observability is read-only: it never changes the outcome of an operation, and
//! rejected mutations are reported through results, not logs.

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Log a lifecycle event with fields.
///
/// Per-node events go out at trace level, everything else at info.
pub fn log_event(logger: &Logger, event: Event, fields: &[(&str, &str)]) {
    let severity = if event.is_per_node() {
        Severity::Trace
    } else {
        Severity::Info
    };
    logger.log(severity, event.as_str(), fields);
}
