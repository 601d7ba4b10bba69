//! Request-level operations: load, authorise, transition, persist.

use serde::Serialize;
use thrive_core::{ManifestationId, MilestoneId, ResultExt, UserId};
use thrive_state::{StateChange, Transition};

use crate::adapter::{DomainEntity, StateAdapter};
use crate::error::{Error, Result};
use crate::manifestation::{Manifestation, ManifestationState};
use crate::milestone::{Milestone, MilestoneStatus};
use crate::store::{EntityStore, Stored};

/// Outcome of a state update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StateUpdate<E> {
    pub entity: E,
    pub revision: u64,
    pub transition: Transition,
}

impl<E> StateUpdate<E> {
    fn from_stored(stored: Stored<E>, transition: Transition) -> Self {
        Self {
            entity: stored.entity,
            revision: stored.revision,
            transition,
        }
    }
}

/// Persist a freshly created entity.
///
/// # Errors
///
/// Returns [`Error::AlreadyExists`] if the id is taken, or a state error if
/// the entity's state is not in the adapter's catalog.
pub async fn create<E, S>(store: &S, adapter: &StateAdapter<E>, entity: E) -> Result<Stored<E>>
where
    E: DomainEntity,
    S: EntityStore<E> + ?Sized,
{
    adapter.verify(&entity)?;
    store.insert(entity).await
}

/// Move an owned entity to `target` and persist it.
///
/// Same-state requests succeed without writing. On any error nothing is
/// persisted.
///
/// # Errors
///
/// - [`Error::NotFound`] if `id` is not stored
/// - [`Error::Forbidden`] if `actor` does not own the entity
/// - [`Error::State`] for unknown or illegal transitions
/// - [`Error::Conflict`] if the entity changed since it was loaded
pub async fn update_state<E, S>(
    store: &S,
    adapter: &StateAdapter<E>,
    actor: UserId,
    id: E::Id,
    target: &str,
    reason: Option<String>,
) -> Result<StateUpdate<E>>
where
    E: DomainEntity,
    S: EntityStore<E> + ?Sized,
{
    let Stored {
        mut entity,
        revision,
    } = store.get(id).await?;

    if entity.owner() != actor {
        tracing::warn!(kind = E::KIND, id = %id, actor = %actor, "Rejected state change from non-owner");
        return Err(Error::forbidden(E::KIND, id, actor));
    }

    adapter.verify(&entity)?;

    let mut change = StateChange::new().by(actor);
    if let Some(reason) = reason {
        change = change.because(reason);
    }
    let transition = adapter
        .apply(&mut entity, target, change)
        .warn_on_err(E::KIND)?;

    if !transition.is_applied() {
        return Ok(StateUpdate {
            entity,
            revision,
            transition,
        });
    }

    let stored = store.update(entity, revision).await?;
    Ok(StateUpdate::from_stored(stored, transition))
}

/// Owned entities currently in `state`.
///
/// # Errors
///
/// Returns [`thrive_state::Error::UnknownState`] if `state` is not in the catalog.
pub async fn list_in_state<E, S>(
    store: &S,
    adapter: &StateAdapter<E>,
    owner: UserId,
    state: &str,
) -> Result<Vec<E>>
where
    E: DomainEntity,
    S: EntityStore<E> + ?Sized,
{
    adapter.catalog().get(state)?;
    let found = store.find_by_state(owner, state).await?;
    Ok(found.into_iter().map(|stored| stored.entity).collect())
}

/// Change a milestone's status on behalf of `actor`.
///
/// # Errors
///
/// See [`update_state`].
pub async fn update_milestone_status<S>(
    store: &S,
    adapter: &MilestoneStatus,
    actor: UserId,
    id: MilestoneId,
    status: &str,
    reason: Option<String>,
) -> Result<StateUpdate<Milestone>>
where
    S: EntityStore<Milestone> + ?Sized,
{
    update_state(store, adapter, actor, id, status, reason).await
}

/// Change a manifestation's state on behalf of `actor`.
///
/// # Errors
///
/// See [`update_state`].
pub async fn update_manifestation_state<S>(
    store: &S,
    adapter: &ManifestationState,
    actor: UserId,
    id: ManifestationId,
    state: &str,
    reason: Option<String>,
) -> Result<StateUpdate<Manifestation>>
where
    S: EntityStore<Manifestation> + ?Sized,
{
    update_state(store, adapter, actor, id, state, reason).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::milestone::status;
    use crate::store::InMemoryStore;
    use thrive_state::StateTrackable;

    #[tokio::test]
    async fn should_skip_write_for_same_state() -> Result<()> {
        let adapter = MilestoneStatus::builtin()?;
        let store = InMemoryStore::new();
        let owner = UserId::new();
        let stored = create(&store, &adapter, Milestone::new(owner, "Idle", &adapter)).await?;

        let update =
            update_milestone_status(&store, &adapter, owner, stored.entity.id, status::PLANNED, None)
                .await?;

        assert!(!update.transition.is_applied());
        assert_eq!(update.revision, 1);
        assert_eq!(store.get(stored.entity.id).await?.revision, 1);
        Ok(())
    }

    #[tokio::test]
    async fn should_record_actor_and_reason() -> Result<()> {
        let adapter = MilestoneStatus::builtin()?;
        let store = InMemoryStore::new();
        let owner = UserId::new();
        let stored = create(&store, &adapter, Milestone::new(owner, "Kickoff", &adapter)).await?;

        let update = update_milestone_status(
            &store,
            &adapter,
            owner,
            stored.entity.id,
            status::IN_PROGRESS,
            Some("started training".to_string()),
        )
        .await?;

        let entry = update.entity.state_history().last().cloned();
        assert_eq!(entry.as_ref().and_then(|e| e.changed_by()), Some(owner));
        assert_eq!(
            entry.as_ref().and_then(|e| e.reason()),
            Some("started training")
        );
        assert_eq!(update.revision, 2);
        Ok(())
    }

    #[tokio::test]
    async fn should_reject_unknown_filter_state() -> Result<()> {
        let adapter = MilestoneStatus::builtin()?;
        let store: InMemoryStore<Milestone> = InMemoryStore::new();

        let result = list_in_state(&store, &adapter, UserId::new(), "finished").await;
        assert!(matches!(
            result,
            Err(Error::State(thrive_state::Error::UnknownState { .. }))
        ));
        Ok(())
    }
}
