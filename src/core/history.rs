//! Lifecycle history tracking.
//!
//! A bounded log of the lifecycle callbacks a stack has driven, kept for
//! diagnostics. Recording is off unless the stack is configured with a
//! non-zero `history_limit`.

use super::state::StateStatus;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;

/// Lifecycle callback observed by the stack.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LifecycleEvent {
    Entry,
    Tick,
    Pause,
    Resume,
    Exit,
    Message,
}

impl fmt::Display for LifecycleEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Entry => "Entry",
            Self::Tick => "Tick",
            Self::Pause => "Pause",
            Self::Resume => "Resume",
            Self::Exit => "Exit",
            Self::Message => "HandleMessage",
        };
        f.write_str(name)
    }
}

/// Record of a single lifecycle callback.
///
/// `status` is the slot status the callback observed, and `depth` the
/// slot's position in the chain (0 is the root).
///
/// # Example
///
/// ```rust
/// use chrono::Utc;
/// use mindstack::core::{LifecycleEvent, LifecycleRecord, StateStatus};
///
/// let record = LifecycleRecord {
///     state: "Patrol".to_string(),
///     event: LifecycleEvent::Entry,
///     status: StateStatus::Disabled,
///     depth: 0,
///     timestamp: Utc::now(),
/// };
/// assert_eq!(record.to_string(), "Patrol Entry");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct LifecycleRecord {
    /// Name reported by the state
    pub state: String,
    /// The callback that ran
    pub event: LifecycleEvent,
    /// Slot status when the callback started
    pub status: StateStatus,
    /// Position of the slot in the chain
    pub depth: usize,
    /// When the callback ran
    pub timestamp: DateTime<Utc>,
}

impl fmt::Display for LifecycleRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.state, self.event)
    }
}

/// Bounded, ordered history of lifecycle records.
///
/// When full, the oldest record is dropped.
///
/// # Example
///
/// ```rust
/// use chrono::Utc;
/// use mindstack::core::{LifecycleEvent, LifecycleHistory, LifecycleRecord, StateStatus};
///
/// let mut history = LifecycleHistory::with_limit(2);
/// for event in [LifecycleEvent::Entry, LifecycleEvent::Tick, LifecycleEvent::Exit] {
///     history.record(LifecycleRecord {
///         state: "Idle".to_string(),
///         event,
///         status: StateStatus::Active,
///         depth: 0,
///         timestamp: Utc::now(),
///     });
/// }
///
/// assert_eq!(history.lines(), vec!["Idle Tick", "Idle Exit"]);
/// ```
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LifecycleHistory {
    limit: usize,
    records: VecDeque<LifecycleRecord>,
}

impl LifecycleHistory {
    /// Create a history that keeps at most `limit` records.
    ///
    /// A limit of zero disables recording.
    pub fn with_limit(limit: usize) -> Self {
        Self {
            limit,
            records: VecDeque::with_capacity(limit.min(1024)),
        }
    }

    /// Whether records are being kept at all.
    pub fn is_enabled(&self) -> bool {
        self.limit > 0
    }

    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Append a record, evicting the oldest one when full.
    pub fn record(&mut self, record: LifecycleRecord) {
        if !self.is_enabled() {
            return;
        }
        while self.records.len() >= self.limit {
            self.records.pop_front();
        }
        self.records.push_back(record);
    }

    /// Records in the order they happened.
    pub fn records(&self) -> impl Iterator<Item = &LifecycleRecord> {
        self.records.iter()
    }

    /// Records rendered as `"<state> <event>"` lines.
    pub fn lines(&self) -> Vec<String> {
        self.records.iter().map(ToString::to_string).collect()
    }

    /// Records produced by one state, by name.
    pub fn for_state<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a LifecycleRecord> {
        self.records.iter().filter(move |record| record.state == name)
    }

    /// Time between the first and last record.
    ///
    /// Returns `None` with fewer than two records.
    pub fn duration(&self) -> Option<chrono::Duration> {
        let first = self.records.front()?;
        let last = self.records.back()?;
        if self.records.len() < 2 {
            return None;
        }
        Some(last.timestamp.signed_duration_since(first.timestamp))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn clear(&mut self) {
        self.records.clear();
    }
}

impl Default for LifecycleHistory {
    fn default() -> Self {
        Self::with_limit(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(state: &str, event: LifecycleEvent) -> LifecycleRecord {
        LifecycleRecord {
            state: state.to_string(),
            event,
            status: StateStatus::Active,
            depth: 0,
            timestamp: Utc::now(),
        }
    }

    #[test]
    fn disabled_history_ignores_records() {
        let mut history = LifecycleHistory::default();
        history.record(record("A", LifecycleEvent::Entry));

        assert!(!history.is_enabled());
        assert!(history.is_empty());
    }

    #[test]
    fn history_keeps_order() {
        let mut history = LifecycleHistory::with_limit(8);
        history.record(record("A", LifecycleEvent::Entry));
        history.record(record("A", LifecycleEvent::Tick));
        history.record(record("B", LifecycleEvent::Entry));

        assert_eq!(history.lines(), vec!["A Entry", "A Tick", "B Entry"]);
        assert_eq!(history.for_state("A").count(), 2);
    }

    #[test]
    fn history_evicts_oldest_when_full() {
        let mut history = LifecycleHistory::with_limit(2);
        history.record(record("A", LifecycleEvent::Entry));
        history.record(record("A", LifecycleEvent::Tick));
        history.record(record("A", LifecycleEvent::Exit));

        assert_eq!(history.len(), 2);
        assert_eq!(history.lines(), vec!["A Tick", "A Exit"]);
    }

    #[test]
    fn restored_history_over_limit_shrinks_on_record() {
        let mut history = LifecycleHistory::with_limit(4);
        for event in [LifecycleEvent::Entry, LifecycleEvent::Tick, LifecycleEvent::Pause] {
            history.record(record("A", event));
        }

        let mut json = serde_json::to_value(&history).unwrap();
        json["limit"] = serde_json::json!(1);
        let mut restored: LifecycleHistory = serde_json::from_value(json).unwrap();
        assert_eq!(restored.len(), 3);

        restored.record(record("A", LifecycleEvent::Exit));
        assert_eq!(restored.lines(), vec!["A Exit"]);
    }

    #[test]
    fn duration_requires_two_records() {
        let mut history = LifecycleHistory::with_limit(4);
        assert!(history.duration().is_none());

        history.record(record("A", LifecycleEvent::Entry));
        assert!(history.duration().is_none());

        history.record(record("A", LifecycleEvent::Tick));
        let duration = history.duration().unwrap();
        assert!(duration >= chrono::Duration::zero());
    }

    #[test]
    fn message_event_uses_handler_name() {
        assert_eq!(record("A", LifecycleEvent::Message).to_string(), "A HandleMessage");
    }

    #[test]
    fn history_roundtrip_serialization() {
        let mut history = LifecycleHistory::with_limit(4);
        history.record(record("A", LifecycleEvent::Entry));
        history.record(record("A", LifecycleEvent::Pause));

        let json = serde_json::to_string(&history).unwrap();
        let restored: LifecycleHistory = serde_json::from_str(&json).unwrap();

        assert_eq!(restored.lines(), history.lines());
        assert_eq!(restored.limit(), 4);
    }
}
