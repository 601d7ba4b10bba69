//! Entity-facing state tracking.
//!
//! An entity embeds a [`StateRecord`] and implements [`StateTrackable`] to
//! expose it. Every change to the current state goes through
//! [`StateTrackable::set_state`], which validates against the catalog and
//! appends history atomically: on error the record is left untouched.

use serde::{Deserialize, Serialize};
use thrive_core::UserId;

use crate::catalog::{Catalog, StateDefinition};
use crate::error::Result;
use crate::history::{self, HistoryEntry};
use crate::validator;

/// Label shown when the current state is missing from the catalog.
pub const UNKNOWN_LABEL: &str = "Unknown";

/// Neutral gray shown when the current state has no color.
pub const FALLBACK_COLOR: &str = "#9E9E9E";

/// Current state plus its append-only history, as persisted on the entity.
///
/// Entities flatten it into their document, giving top-level `currentState`
/// and `stateHistory` keys.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StateRecord {
    current_state: String,
    #[serde(default)]
    state_history: Vec<HistoryEntry>,
}

impl StateRecord {
    /// A fresh record at the catalog's initial state with empty history.
    #[must_use]
    pub fn new(catalog: &Catalog) -> Self {
        Self {
            current_state: catalog.initial_state().name().to_string(),
            state_history: Vec::new(),
        }
    }

    #[must_use]
    pub fn current(&self) -> &str {
        &self.current_state
    }

    #[must_use]
    pub fn history(&self) -> &[HistoryEntry] {
        &self.state_history
    }

    /// Check that a loaded record agrees with `catalog`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownState`] if the current state is not in the catalog.
    pub fn verify(&self, catalog: &Catalog) -> Result<()> {
        catalog.get(&self.current_state).map(|_| ())
    }
}

/// Who requested a transition and why.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateChange {
    actor: Option<UserId>,
    reason: Option<String>,
}

impl StateChange {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn by(mut self, actor: UserId) -> Self {
        self.actor = Some(actor);
        self
    }

    #[must_use]
    pub fn because(mut self, reason: impl Into<String>) -> Self {
        self.reason = Some(reason.into());
        self
    }

    #[must_use]
    pub const fn actor(&self) -> Option<UserId> {
        self.actor
    }

    #[must_use]
    pub fn reason(&self) -> Option<&str> {
        self.reason.as_deref()
    }
}

/// Outcome of a successful `set_state` call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum Transition {
    /// Target equalled the current state; nothing was recorded.
    Unchanged { state: String },
    /// The state moved and one history entry was appended.
    Applied { from: String, to: String },
}

impl Transition {
    #[must_use]
    pub const fn is_applied(&self) -> bool {
        matches!(self, Self::Applied { .. })
    }

    /// The state the entity is in after the call.
    #[must_use]
    pub fn state(&self) -> &str {
        match self {
            Self::Unchanged { state } => state,
            Self::Applied { to, .. } => to,
        }
    }
}

/// Behaviour shared by every entity with a catalog-driven state.
pub trait StateTrackable {
    fn state_record(&self) -> &StateRecord;

    /// Mutable access for [`StateTrackable::set_state`] only.
    fn state_record_mut(&mut self) -> &mut StateRecord;

    fn current_state(&self) -> &str {
        self.state_record().current()
    }

    fn is_state(&self, name: &str) -> bool {
        self.current_state() == name
    }

    fn state_history(&self) -> &[HistoryEntry] {
        self.state_record().history()
    }

    /// Move to `target`, validating against `catalog` and recording history.
    ///
    /// Moving to the current state is a no-op that records nothing.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::IllegalTransition`] if the catalog has no such
    /// edge, or [`crate::Error::UnknownState`] if the current state is not in
    /// the catalog. The record is unchanged on error.
    fn set_state(&mut self, catalog: &Catalog, target: &str, change: StateChange) -> Result<Transition> {
        let record = self.state_record_mut();

        if record.current_state == target {
            tracing::trace!(domain = catalog.domain(), state = target, "Same-state transition ignored");
            return Ok(Transition::Unchanged {
                state: target.to_string(),
            });
        }

        validator::assert_transition(catalog, &record.current_state, target)?;

        let history = history::record(&record.state_history, target, change.actor, change.reason);
        let from = std::mem::replace(&mut record.current_state, target.to_string());
        record.state_history = history;

        tracing::debug!(
            domain = catalog.domain(),
            from = %from,
            to = target,
            "State transition applied"
        );

        Ok(Transition::Applied {
            from,
            to: target.to_string(),
        })
    }

    /// Catalog metadata for the current state.
    ///
    /// # Errors
    ///
    /// Returns [`crate::Error::UnknownState`] if the current state is not in the catalog.
    fn state_meta<'c>(&self, catalog: &'c Catalog) -> Result<&'c StateDefinition> {
        catalog.get(self.current_state())
    }

    /// Display label, or [`UNKNOWN_LABEL`] if the catalog has drifted.
    fn state_label<'c>(&self, catalog: &'c Catalog) -> &'c str {
        self.state_meta(catalog)
            .map_or(UNKNOWN_LABEL, StateDefinition::label)
    }

    /// Display color, or [`FALLBACK_COLOR`] if unknown or unset.
    fn state_color<'c>(&self, catalog: &'c Catalog) -> &'c str {
        self.state_meta(catalog)
            .ok()
            .and_then(StateDefinition::color)
            .unwrap_or(FALLBACK_COLOR)
    }
}

impl StateTrackable for StateRecord {
    fn state_record(&self) -> &StateRecord {
        self
    }

    fn state_record_mut(&mut self) -> &mut StateRecord {
        self
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::error::Error;

    fn catalog() -> Catalog {
        Catalog::builder("milestone")
            .state(
                StateDefinition::new("planned", "Planned")
                    .with_color("#90A4AE")
                    .with_transitions(["in_progress", "abandoned"]),
            )
            .state(
                StateDefinition::new("in_progress", "In Progress")
                    .with_transitions(["achieved", "abandoned"]),
            )
            .state(StateDefinition::new("achieved", "Achieved"))
            .state(StateDefinition::new("abandoned", "Abandoned").with_transitions(["planned"]))
            .build()
            .unwrap()
    }

    #[test]
    fn test_new_record_starts_at_initial_state() {
        let record = StateRecord::new(&catalog());
        assert!(record.is_state("planned"));
        assert!(record.state_history().is_empty());
    }

    #[test]
    fn test_applied_transition_records_history() {
        let catalog = catalog();
        let actor = UserId::new();
        let mut record = StateRecord::new(&catalog);

        let outcome = record
            .set_state(
                &catalog,
                "in_progress",
                StateChange::new().by(actor).because("kickoff"),
            )
            .unwrap();

        assert_eq!(
            outcome,
            Transition::Applied {
                from: "planned".to_string(),
                to: "in_progress".to_string()
            }
        );
        assert_eq!(record.current_state(), "in_progress");
        let entry = record.state_history().last().unwrap();
        assert_eq!(entry.value(), "in_progress");
        assert_eq!(entry.changed_by(), Some(actor));
        assert_eq!(entry.reason(), Some("kickoff"));
    }

    #[test]
    fn test_same_state_is_silent_noop() {
        let catalog = catalog();
        let mut record = StateRecord::new(&catalog);

        let outcome = record.set_state(&catalog, "planned", StateChange::new()).unwrap();

        assert!(!outcome.is_applied());
        assert_eq!(outcome.state(), "planned");
        assert!(record.state_history().is_empty());
    }

    #[test]
    fn test_illegal_transition_leaves_record_untouched() {
        let catalog = catalog();
        let mut record = StateRecord::new(&catalog);
        let before = record.clone();

        let err = record
            .set_state(&catalog, "achieved", StateChange::new())
            .unwrap_err();

        assert!(matches!(err, Error::IllegalTransition { .. }));
        assert_eq!(record, before);
    }

    #[test]
    fn test_unknown_target_is_illegal() {
        let catalog = catalog();
        let mut record = StateRecord::new(&catalog);
        let err = record
            .set_state(&catalog, "someday", StateChange::new())
            .unwrap_err();
        assert!(err.is_client_error());
    }

    #[test]
    fn test_meta_label_and_color() {
        let catalog = catalog();
        let mut record = StateRecord::new(&catalog);
        assert_eq!(record.state_label(&catalog), "Planned");
        assert_eq!(record.state_color(&catalog), "#90A4AE");

        record.set_state(&catalog, "in_progress", StateChange::new()).unwrap();
        assert_eq!(record.state_meta(&catalog).unwrap().name(), "in_progress");
        assert_eq!(record.state_color(&catalog), FALLBACK_COLOR);
    }

    #[test]
    fn test_fallbacks_on_catalog_drift() {
        let drifted: StateRecord =
            serde_json::from_str(r#"{"currentState":"retired","stateHistory":[]}"#).unwrap();
        let catalog = catalog();

        assert_eq!(drifted.state_label(&catalog), UNKNOWN_LABEL);
        assert_eq!(drifted.state_color(&catalog), FALLBACK_COLOR);
        assert!(matches!(
            drifted.verify(&catalog),
            Err(Error::UnknownState { .. })
        ));
    }

    #[test]
    fn test_record_serializes_camel_case_keys() {
        let catalog = catalog();
        let mut record = StateRecord::new(&catalog);
        record.set_state(&catalog, "in_progress", StateChange::new()).unwrap();

        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["currentState"], "in_progress");
        assert_eq!(json["stateHistory"][0]["value"], "in_progress");
        assert!(json.get("current").is_none());
    }

    #[test]
    fn test_transition_serializes_tagged() {
        let applied = Transition::Applied {
            from: "planned".to_string(),
            to: "in_progress".to_string(),
        };
        let json = serde_json::to_value(&applied).unwrap();
        assert_eq!(json["outcome"], "applied");
        assert_eq!(json["to"], "in_progress");
    }
}
