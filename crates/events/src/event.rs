use chrono::{DateTime, Utc};

/// A domain-agnostic event.
///
/// Events are immutable facts about a state change that already happened.
/// They are notifications, not the system of record: nothing is rebuilt from
/// them.
pub trait Event: Clone + core::fmt::Debug + Send + Sync + 'static {
    /// Stable event name/type identifier (e.g. "catalog.product.published").
    fn event_type(&self) -> &'static str;

    /// Identity of the aggregate the event is about.
    fn subject_id(&self) -> &str;

    /// When the event occurred (business time).
    fn occurred_at(&self) -> DateTime<Utc>;
}
