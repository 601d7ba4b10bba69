//! Milestones and their status workflow.
//!
//! ```text
//! planned ──► in_progress ──► achieved
//!    ▲  │        │  ▲ ▲
//!    │  ▼        ▼  │ │
//! abandoned ◄── blocked / at_risk / nearly_complete
//! ```
//!
//! `achieved` is terminal. `abandoned` can be reopened back to `planned`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use thrive_core::{MilestoneId, UserId};
use thrive_state::{Catalog, CatalogError, StateDefinition, StateRecord, StateTrackable};

use crate::adapter::{DomainEntity, StateAdapter};

/// Adapter for milestone status transitions.
pub type MilestoneStatus = StateAdapter<Milestone>;

/// Milestone status names.
pub mod status {
    pub const PLANNED: &str = "planned";
    pub const IN_PROGRESS: &str = "in_progress";
    pub const BLOCKED: &str = "blocked";
    pub const AT_RISK: &str = "at_risk";
    pub const NEARLY_COMPLETE: &str = "nearly_complete";
    pub const ACHIEVED: &str = "achieved";
    pub const ABANDONED: &str = "abandoned";
}

const ACTIVE: &[&str] = &[status::IN_PROGRESS, status::AT_RISK, status::NEARLY_COMPLETE];
const NEEDS_ATTENTION: &[&str] = &[status::BLOCKED, status::AT_RISK];
const CLOSED: &[&str] = &[status::ACHIEVED, status::ABANDONED];

/// Built-in milestone status catalog.
///
/// # Errors
///
/// Returns [`CatalogError`] only if the definition below is inconsistent.
pub fn catalog() -> Result<Catalog, CatalogError> {
    use status::*;

    Catalog::builder("milestone")
        .state(
            StateDefinition::new(PLANNED, "Planned")
                .with_description("Defined but not yet started")
                .with_color("#90A4AE")
                .with_icon("calendar")
                .with_transitions([IN_PROGRESS, ABANDONED]),
        )
        .state(
            StateDefinition::new(IN_PROGRESS, "In Progress")
                .with_description("Actively being worked on")
                .with_color("#42A5F5")
                .with_icon("play")
                .with_transitions([BLOCKED, AT_RISK, NEARLY_COMPLETE, ACHIEVED, ABANDONED]),
        )
        .state(
            StateDefinition::new(BLOCKED, "Blocked")
                .with_description("Cannot progress until something changes")
                .with_color("#EF5350")
                .with_icon("block")
                .with_transitions([IN_PROGRESS, AT_RISK, ABANDONED]),
        )
        .state(
            StateDefinition::new(AT_RISK, "At Risk")
                .with_description("Progressing, but the target date is in danger")
                .with_color("#FFA726")
                .with_icon("warning")
                .with_transitions([IN_PROGRESS, BLOCKED, NEARLY_COMPLETE, ABANDONED]),
        )
        .state(
            StateDefinition::new(NEARLY_COMPLETE, "Nearly Complete")
                .with_description("Final stretch")
                .with_color("#9CCC65")
                .with_icon("flag")
                .with_transitions([ACHIEVED, IN_PROGRESS, AT_RISK]),
        )
        .state(
            StateDefinition::new(ACHIEVED, "Achieved")
                .with_description("Milestone reached")
                .with_color("#66BB6A")
                .with_icon("trophy"),
        )
        .state(
            StateDefinition::new(ABANDONED, "Abandoned")
                .with_description("Set aside; can be re-planned")
                .with_color("#BDBDBD")
                .with_icon("archive")
                .with_transitions([PLANNED]),
        )
        .initial(PLANNED)
        .build()
}

/// A milestone on a user's growth path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Milestone {
    pub id: MilestoneId,
    pub owner: UserId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub target_date: Option<NaiveDate>,
    #[serde(flatten)]
    status: StateRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    achieved_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Milestone {
    /// Create a milestone in the adapter catalog's initial status.
    pub fn new(owner: UserId, title: impl Into<String>, adapter: &MilestoneStatus) -> Self {
        let now = Utc::now();
        Self {
            id: MilestoneId::new(),
            owner,
            title: title.into(),
            description: None,
            target_date: None,
            status: StateRecord::new(adapter.catalog()),
            achieved_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_target_date(mut self, date: NaiveDate) -> Self {
        self.target_date = Some(date);
        self
    }

    #[must_use]
    pub fn status(&self) -> &str {
        self.status.current()
    }

    #[must_use]
    pub const fn achieved_at(&self) -> Option<DateTime<Utc>> {
        self.achieved_at
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// In progress, at risk or nearly complete.
    #[must_use]
    pub fn is_active(&self) -> bool {
        ACTIVE.contains(&self.status())
    }

    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.is_state(status::ACHIEVED)
    }

    #[must_use]
    pub fn is_blocked(&self) -> bool {
        self.is_state(status::BLOCKED)
    }

    /// Blocked or at risk.
    #[must_use]
    pub fn needs_attention(&self) -> bool {
        NEEDS_ATTENTION.contains(&self.status())
    }

    /// Achieved or abandoned.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        CLOSED.contains(&self.status())
    }
}

impl StateTrackable for Milestone {
    fn state_record(&self) -> &StateRecord {
        &self.status
    }

    fn state_record_mut(&mut self) -> &mut StateRecord {
        &mut self.status
    }
}

impl DomainEntity for Milestone {
    type Id = MilestoneId;

    const KIND: &'static str = "milestone";
    const FIELD: &'static str = "status";
    const SUCCESS_STATE: &'static str = status::ACHIEVED;

    fn builtin_catalog() -> Result<Catalog, CatalogError> {
        catalog()
    }

    fn id(&self) -> MilestoneId {
        self.id
    }

    fn owner(&self) -> UserId {
        self.owner
    }

    fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.achieved_at
    }

    fn set_completed_at(&mut self, at: Option<DateTime<Utc>>) {
        self.achieved_at = at;
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use thrive_state::{Error as StateError, StateChange};

    use crate::error::Error;

    fn adapter() -> MilestoneStatus {
        MilestoneStatus::builtin().unwrap()
    }

    #[test]
    fn test_builtin_catalog_shape() {
        let catalog = catalog().unwrap();
        assert_eq!(catalog.initial_state().name(), status::PLANNED);
        assert_eq!(catalog.len(), 7);
        assert_eq!(catalog.is_terminal(status::ACHIEVED), Ok(true));
        assert_eq!(catalog.is_terminal(status::ABANDONED), Ok(false));
        assert!(catalog.unreachable_states().is_empty());
    }

    #[test]
    fn test_new_milestone_is_planned() {
        let milestone = Milestone::new(UserId::new(), "Run a marathon", &adapter());
        assert_eq!(milestone.status(), status::PLANNED);
        assert!(milestone.state_history().is_empty());
        assert!(!milestone.is_active());
        assert!(milestone.achieved_at().is_none());
    }

    #[test]
    fn test_achieving_stamps_completion_date() {
        let adapter = adapter();
        let mut milestone = Milestone::new(UserId::new(), "Run a marathon", &adapter);

        adapter
            .apply(&mut milestone, status::IN_PROGRESS, StateChange::new())
            .unwrap();
        assert!(milestone.is_active());
        assert!(milestone.achieved_at().is_none());

        adapter
            .apply(&mut milestone, status::ACHIEVED, StateChange::new().because("finished!"))
            .unwrap();
        assert!(milestone.is_completed());
        assert!(milestone.is_closed());
        assert!(milestone.achieved_at().is_some());
        assert_eq!(milestone.state_history().len(), 2);
        assert!(milestone.updated_at() >= milestone.created_at());
    }

    #[test]
    fn test_achieved_cannot_reopen() {
        let adapter = adapter();
        let mut milestone = Milestone::new(UserId::new(), "Ship v1", &adapter);
        adapter.apply(&mut milestone, status::IN_PROGRESS, StateChange::new()).unwrap();
        adapter.apply(&mut milestone, status::ACHIEVED, StateChange::new()).unwrap();

        let err = adapter
            .apply(&mut milestone, status::IN_PROGRESS, StateChange::new())
            .unwrap_err();
        assert!(matches!(
            err,
            Error::State(StateError::IllegalTransition { .. })
        ));
        assert_eq!(milestone.state_history().len(), 2);
    }

    #[test]
    fn test_attention_predicates() {
        let adapter = adapter();
        let mut milestone = Milestone::new(UserId::new(), "Learn Rust", &adapter);
        adapter.apply(&mut milestone, status::IN_PROGRESS, StateChange::new()).unwrap();
        adapter.apply(&mut milestone, status::BLOCKED, StateChange::new()).unwrap();

        assert!(milestone.is_blocked());
        assert!(milestone.needs_attention());
        assert!(!milestone.is_active());
        assert_eq!(adapter.label(&milestone), "Blocked");
        assert_eq!(adapter.color(&milestone), "#EF5350");
    }

    #[test]
    fn test_serialized_document_is_flat() {
        let adapter = adapter();
        let mut milestone = Milestone::new(UserId::new(), "Read 20 books", &adapter);
        adapter.apply(&mut milestone, status::IN_PROGRESS, StateChange::new()).unwrap();

        let json = serde_json::to_value(&milestone).unwrap();
        assert_eq!(json["currentState"], "in_progress");
        assert_eq!(json["stateHistory"][0]["value"], "in_progress");
        assert!(json.get("status").is_none());
        assert!(json.get("achievedAt").is_none());

        let back: Milestone = serde_json::from_value(json).unwrap();
        assert_eq!(back, milestone);
    }
}
