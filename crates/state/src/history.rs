//! Transition history: immutable audit entries and the recorder that appends them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thrive_core::UserId;

/// One successfully applied transition.
///
/// Entries are never mutated once recorded; fields are read through accessors.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    value: String,
    changed_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    changed_by: Option<UserId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    reason: Option<String>,
}

impl HistoryEntry {
    /// Create an entry for `value` stamped with the current time.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            changed_at: Utc::now(),
            changed_by: None,
            reason: None,
        }
    }

    #[must_use]
    pub fn with_actor(mut self, actor: UserId) -> Self {
        self.changed_by = Some(actor);
        self
    }

    #[must_use]
    pub fn with_reason(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    /// The state entered.
    #[must_use]
    pub fn value(&self) -> &str {
        &self.value
    }

    #[must_use]
    pub const fn changed_at(&self) -> DateTime<Utc> {
        self.changed_at
    }

    #[must_use]
    pub const fn changed_by(&self) -> Option<UserId> {
        self.changed_by
    }

    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}

/// Return a copy of `history` with an entry for `value` appended.
///
/// Performs no validation: the transition must already have been approved.
#[must_use]
pub fn record(
    history: &[HistoryEntry],
    value: &str,
    actor: Option<UserId>,
    reason: Option<String>,
) -> Vec<HistoryEntry> {
    let entry = HistoryEntry {
        changed_by: actor,
        reason,
        ..HistoryEntry::new(value)
    };

    let mut next = Vec::with_capacity(history.len().saturating_add(1));
    next.extend_from_slice(history);
    next.push(entry);
    next
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn test_record_appends_without_touching_input() {
        let first = record(&[], "in_progress", None, None);
        let second = record(&first, "achieved", None, Some("shipped".to_string()));

        assert_eq!(first.len(), 1);
        assert_eq!(second.len(), 2);
        assert_eq!(second.first(), first.first());
        let last = second.last().unwrap();
        assert_eq!(last.value(), "achieved");
        assert_eq!(last.reason(), Some("shipped"));
        assert!(last.changed_by().is_none());
    }

    #[test]
    fn test_record_stamps_actor_and_time() {
        let before = Utc::now();
        let actor = UserId::new();
        let history = record(&[], "active", Some(actor), None);
        let entry = history.first().unwrap();

        assert_eq!(entry.changed_by(), Some(actor));
        assert!(entry.changed_at() >= before);
        assert!(entry.changed_at() <= Utc::now());
    }

    #[test]
    fn test_entry_serializes_camel_case() {
        let entry = HistoryEntry::new("blocked").with_reason("waiting on review");
        let json = serde_json::to_value(&entry).unwrap();

        assert_eq!(json["value"], "blocked");
        assert_eq!(json["reason"], "waiting on review");
        assert!(json.get("changedAt").is_some());
        assert!(json.get("changedBy").is_none());

        let back: HistoryEntry = serde_json::from_value(json).unwrap();
        assert_eq!(back, entry);
    }
}
