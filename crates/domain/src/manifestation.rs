//! Manifestations: intentions tracked from first vision to realisation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thrive_core::{ManifestationId, UserId};
use thrive_state::{Catalog, CatalogError, StateDefinition, StateRecord, StateTrackable};

use crate::adapter::{DomainEntity, StateAdapter};

/// Adapter for manifestation state transitions.
pub type ManifestationState = StateAdapter<Manifestation>;

/// Manifestation state names.
pub mod state {
    pub const INTENTION: &str = "intention";
    pub const VISUALIZING: &str = "visualizing";
    pub const ACTIVE: &str = "active";
    pub const MANIFESTING: &str = "manifesting";
    pub const PAUSED: &str = "paused";
    pub const MANIFESTED: &str = "manifested";
    pub const RELEASED: &str = "released";
}

const IN_MOTION: &[&str] = &[state::VISUALIZING, state::ACTIVE, state::MANIFESTING];
const SETTLED: &[&str] = &[state::MANIFESTED, state::RELEASED];

/// Built-in manifestation state catalog.
///
/// # Errors
///
/// Returns [`CatalogError`] only if the definition below is inconsistent.
pub fn catalog() -> Result<Catalog, CatalogError> {
    use state::*;

    Catalog::builder("manifestation")
        .state(
            StateDefinition::new(INTENTION, "Intention Set")
                .with_description("The intention has been written down")
                .with_color("#B39DDB")
                .with_icon("seed")
                .with_transitions([VISUALIZING, ACTIVE, RELEASED]),
        )
        .state(
            StateDefinition::new(VISUALIZING, "Visualizing")
                .with_description("Building a clear picture of the outcome")
                .with_color("#7E57C2")
                .with_icon("eye")
                .with_transitions([ACTIVE, PAUSED, RELEASED]),
        )
        .state(
            StateDefinition::new(ACTIVE, "Taking Action")
                .with_description("Concrete steps are underway")
                .with_color("#42A5F5")
                .with_icon("bolt")
                .with_transitions([MANIFESTING, PAUSED, RELEASED]),
        )
        .state(
            StateDefinition::new(MANIFESTING, "Manifesting")
                .with_description("Signs of the outcome are appearing")
                .with_color("#26A69A")
                .with_icon("sparkles")
                .with_transitions([MANIFESTED, ACTIVE, PAUSED, RELEASED]),
        )
        .state(
            StateDefinition::new(PAUSED, "Paused")
                .with_color("#FFCA28")
                .with_icon("pause")
                .with_transitions([ACTIVE, VISUALIZING, RELEASED]),
        )
        .state(
            StateDefinition::new(MANIFESTED, "Manifested")
                .with_description("The intention became reality")
                .with_color("#66BB6A")
                .with_icon("star"),
        )
        .state(
            StateDefinition::new(RELEASED, "Released")
                .with_description("Let go; can be set again later")
                .with_color("#BDBDBD")
                .with_icon("feather")
                .with_transitions([INTENTION]),
        )
        .initial(INTENTION)
        .build()
}

/// An intention a user is working to bring about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Manifestation {
    pub id: ManifestationId,
    pub owner: UserId,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vision: Option<String>,
    #[serde(flatten)]
    state: StateRecord,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    manifested_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl Manifestation {
    /// Create a manifestation in the adapter catalog's initial state.
    pub fn new(owner: UserId, title: impl Into<String>, adapter: &ManifestationState) -> Self {
        let now = Utc::now();
        Self {
            id: ManifestationId::new(),
            owner,
            title: title.into(),
            vision: None,
            state: StateRecord::new(adapter.catalog()),
            manifested_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[must_use]
    pub fn with_vision(mut self, vision: impl Into<String>) -> Self {
        self.vision = Some(vision.into());
        self
    }

    #[must_use]
    pub fn state(&self) -> &str {
        self.state.current()
    }

    #[must_use]
    pub const fn manifested_at(&self) -> Option<DateTime<Utc>> {
        self.manifested_at
    }

    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// Visualizing, taking action or manifesting.
    #[must_use]
    pub fn is_active(&self) -> bool {
        IN_MOTION.contains(&self.state())
    }

    #[must_use]
    pub fn is_manifested(&self) -> bool {
        self.is_state(state::MANIFESTED)
    }

    #[must_use]
    pub fn is_paused(&self) -> bool {
        self.is_state(state::PAUSED)
    }

    #[must_use]
    pub fn is_released(&self) -> bool {
        self.is_state(state::RELEASED)
    }

    /// Neither manifested nor released.
    #[must_use]
    pub fn is_open(&self) -> bool {
        !SETTLED.contains(&self.state())
    }
}

impl StateTrackable for Manifestation {
    fn state_record(&self) -> &StateRecord {
        &self.state
    }

    fn state_record_mut(&mut self) -> &mut StateRecord {
        &mut self.state
    }
}

impl DomainEntity for Manifestation {
    type Id = ManifestationId;

    const KIND: &'static str = "manifestation";
    const FIELD: &'static str = "state";
    const SUCCESS_STATE: &'static str = state::MANIFESTED;

    fn builtin_catalog() -> Result<Catalog, CatalogError> {
        catalog()
    }

    fn id(&self) -> ManifestationId {
        self.id
    }

    fn owner(&self) -> UserId {
        self.owner
    }

    fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.manifested_at
    }

    fn set_completed_at(&mut self, at: Option<DateTime<Utc>>) {
        self.manifested_at = at;
    }

    fn touch(&mut self, at: DateTime<Utc>) {
        self.updated_at = at;
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use thrive_state::StateChange;

    fn adapter() -> ManifestationState {
        ManifestationState::builtin().unwrap()
    }

    #[test]
    fn test_builtin_catalog_shape() {
        let catalog = catalog().unwrap();
        assert_eq!(catalog.initial_state().name(), state::INTENTION);
        assert_eq!(catalog.is_terminal(state::MANIFESTED), Ok(true));
        assert!(catalog.get(state::RELEASED).unwrap().allows(state::INTENTION));
        assert!(catalog.unreachable_states().is_empty());
    }

    #[test]
    fn test_full_path_to_manifested() {
        let adapter = adapter();
        let actor = UserId::new();
        let mut manifestation =
            Manifestation::new(actor, "Live by the sea", &adapter).with_vision("Morning swims");

        for target in [state::VISUALIZING, state::ACTIVE, state::MANIFESTING] {
            adapter
                .apply(&mut manifestation, target, StateChange::new().by(actor))
                .unwrap();
            assert!(manifestation.is_active());
        }
        assert!(manifestation.manifested_at().is_none());

        adapter
            .apply(&mut manifestation, state::MANIFESTED, StateChange::new().by(actor))
            .unwrap();
        assert!(manifestation.is_manifested());
        assert!(!manifestation.is_open());
        assert!(manifestation.manifested_at().is_some());
        assert_eq!(manifestation.state_history().len(), 4);
        assert!(manifestation
            .state_history()
            .iter()
            .all(|entry| entry.changed_by() == Some(actor)));
    }

    #[test]
    fn test_release_and_reset() {
        let adapter = adapter();
        let mut manifestation = Manifestation::new(UserId::new(), "New job", &adapter);

        adapter
            .apply(&mut manifestation, state::RELEASED, StateChange::new().because("priorities changed"))
            .unwrap();
        assert!(manifestation.is_released());
        assert!(!manifestation.is_open());

        adapter
            .apply(&mut manifestation, state::INTENTION, StateChange::new())
            .unwrap();
        assert!(manifestation.is_open());
        assert_eq!(manifestation.state_history().len(), 2);
    }

    #[test]
    fn test_cannot_skip_to_manifested() {
        let adapter = adapter();
        let mut manifestation = Manifestation::new(UserId::new(), "Shortcut", &adapter);
        let before = manifestation.clone();

        let result = adapter.apply(&mut manifestation, state::MANIFESTED, StateChange::new());

        assert!(result.is_err());
        assert_eq!(manifestation, before);
        assert!(!adapter.can_move(&manifestation, state::MANIFESTED).unwrap());
        assert!(adapter.can_move(&manifestation, state::ACTIVE).unwrap());
    }

    #[test]
    fn test_serialized_document_is_flat() {
        let manifestation = Manifestation::new(UserId::new(), "Write a book", &adapter());
        let json = serde_json::to_value(&manifestation).unwrap();
        assert_eq!(json["currentState"], "intention");
        assert!(json["stateHistory"].as_array().unwrap().is_empty());
        assert!(json.get("state").is_none());

        let back: Manifestation = serde_json::from_value(json).unwrap();
        assert_eq!(back, manifestation);
    }
}
