//! Entity storage seam.
//!
//! Stores hand out [`Stored`] snapshots carrying a revision number. Updates
//! are compare-and-swap on that revision so two concurrent transitions on the
//! same entity cannot both win.

use std::collections::HashMap;

use async_trait::async_trait;
use tap::TapFallible;
use thrive_core::UserId;
use tokio::sync::RwLock;

use crate::adapter::DomainEntity;
use crate::error::{Error, Result};

/// An entity together with the revision it was read at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stored<E> {
    pub entity: E,
    pub revision: u64,
}

/// Persistence for one entity type.
#[async_trait]
pub trait EntityStore<E: DomainEntity>: Send + Sync {
    /// Insert a new entity at revision 1.
    async fn insert(&self, entity: E) -> Result<Stored<E>>;

    /// Fetch an entity by id.
    async fn get(&self, id: E::Id) -> Result<Stored<E>>;

    /// Replace an entity if it is still at `expected_revision`.
    async fn update(&self, entity: E, expected_revision: u64) -> Result<Stored<E>>;

    /// All entities owned by `owner`, in insertion order.
    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Stored<E>>>;

    /// Entities owned by `owner` whose current state is `state`.
    async fn find_by_state(&self, owner: UserId, state: &str) -> Result<Vec<Stored<E>>> {
        let all = self.list_by_owner(owner).await?;
        Ok(all
            .into_iter()
            .filter(|stored| stored.entity.is_state(state))
            .collect())
    }
}

/// In-memory store backed by a hash map and an insertion-order index.
pub struct InMemoryStore<E: DomainEntity> {
    entities: RwLock<HashMap<E::Id, Stored<E>>>,
    order: RwLock<Vec<E::Id>>,
}

impl<E: DomainEntity> InMemoryStore<E> {
    #[must_use]
    pub fn new() -> Self {
        Self {
            entities: RwLock::new(HashMap::new()),
            order: RwLock::new(Vec::new()),
        }
    }

    /// Number of stored entities.
    pub async fn len(&self) -> usize {
        self.entities.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entities.read().await.is_empty()
    }
}

impl<E: DomainEntity> Default for InMemoryStore<E> {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl<E: DomainEntity> EntityStore<E> for InMemoryStore<E> {
    async fn insert(&self, entity: E) -> Result<Stored<E>> {
        let id = entity.id();
        let mut entities = self.entities.write().await;
        if entities.contains_key(&id) {
            return Err(Error::AlreadyExists {
                kind: E::KIND,
                id: id.to_string(),
            });
        }

        let stored = Stored {
            entity,
            revision: 1,
        };
        entities.insert(id, stored.clone());
        self.order.write().await.push(id);
        Ok(stored)
    }

    async fn get(&self, id: E::Id) -> Result<Stored<E>> {
        self.entities
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found(E::KIND, id))
    }

    async fn update(&self, entity: E, expected_revision: u64) -> Result<Stored<E>> {
        let id = entity.id();
        let mut entities = self.entities.write().await;
        let current = entities
            .get_mut(&id)
            .ok_or_else(|| Error::not_found(E::KIND, id))?;

        if current.revision != expected_revision {
            return Err(Error::conflict(
                E::KIND,
                id,
                expected_revision,
                current.revision,
            ));
        }

        current.entity = entity;
        current.revision += 1;
        Ok(current.clone())
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Stored<E>>> {
        let entities = self.entities.read().await;
        let order = self.order.read().await;
        Ok(order
            .iter()
            .filter_map(|id| entities.get(id))
            .filter(|stored| stored.entity.owner() == owner)
            .cloned()
            .collect())
    }
}

/// Store wrapper that logs every call.
pub struct TracingStore<S> {
    inner: S,
}

impl<S> TracingStore<S> {
    pub const fn new(inner: S) -> Self {
        Self { inner }
    }

    pub const fn inner(&self) -> &S {
        &self.inner
    }
}

#[async_trait]
impl<E, S> EntityStore<E> for TracingStore<S>
where
    E: DomainEntity,
    S: EntityStore<E>,
{
    async fn insert(&self, entity: E) -> Result<Stored<E>> {
        tracing::debug!(kind = E::KIND, id = %entity.id(), "Inserting entity");
        self.inner.insert(entity).await.tap_ok(|stored| {
            tracing::trace!(kind = E::KIND, revision = stored.revision, "Entity inserted");
        })
    }

    async fn get(&self, id: E::Id) -> Result<Stored<E>> {
        tracing::trace!(kind = E::KIND, id = %id, "Loading entity");
        self.inner.get(id).await
    }

    async fn update(&self, entity: E, expected_revision: u64) -> Result<Stored<E>> {
        tracing::debug!(
            kind = E::KIND,
            id = %entity.id(),
            expected_revision,
            "Updating entity"
        );
        self.inner
            .update(entity, expected_revision)
            .await
            .tap_ok(|stored| {
                tracing::trace!(kind = E::KIND, revision = stored.revision, "Entity updated");
            })
            .tap_err(|err| tracing::debug!(kind = E::KIND, error = %err, "Update rejected"))
    }

    async fn list_by_owner(&self, owner: UserId) -> Result<Vec<Stored<E>>> {
        tracing::debug!(kind = E::KIND, owner = %owner, "Listing entities");
        self.inner.list_by_owner(owner).await
    }

    async fn find_by_state(&self, owner: UserId, state: &str) -> Result<Vec<Stored<E>>> {
        tracing::debug!(kind = E::KIND, owner = %owner, state, "Finding entities by state");
        self.inner.find_by_state(owner, state).await
    }
}
