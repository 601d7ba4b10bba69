//! Generic domain adapter over the state engine.
//!
//! An adapter owns the injected catalog for one entity type and performs the
//! adapter-level side effects (completion timestamp, `updated_at`) right
//! after a successful transition. The engine itself never touches them.

use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::path::Path;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use thrive_core::UserId;
use thrive_state::{
    Catalog, CatalogError, CatalogSpec, StateChange, StateDefinition, StateTrackable, Transition,
};

use crate::error::Result;

/// An entity whose workflow is tracked by a catalog.
pub trait DomainEntity: StateTrackable + Clone + Send + Sync + 'static {
    type Id: Copy + Eq + Hash + fmt::Display + fmt::Debug + Send + Sync + 'static;

    /// Entity kind used in errors and logs, also the catalog domain.
    const KIND: &'static str;

    /// Domain name for the tracked state (`status`, `state`), used in logs.
    const FIELD: &'static str;

    /// Reaching this state stamps the completion timestamp.
    const SUCCESS_STATE: &'static str;

    /// The catalog used when no override is configured.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the built-in definition is malformed.
    fn builtin_catalog() -> std::result::Result<Catalog, CatalogError>;

    fn id(&self) -> Self::Id;

    fn owner(&self) -> UserId;

    fn completed_at(&self) -> Option<DateTime<Utc>>;

    /// Set or clear the completion timestamp. Called by the adapter only.
    fn set_completed_at(&mut self, at: Option<DateTime<Utc>>);

    fn touch(&mut self, at: DateTime<Utc>);
}

/// Catalog holder and transition entry point for one entity type.
pub struct StateAdapter<E> {
    catalog: Arc<Catalog>,
    _entity: PhantomData<fn() -> E>,
}

impl<E> Clone for StateAdapter<E> {
    fn clone(&self) -> Self {
        Self {
            catalog: Arc::clone(&self.catalog),
            _entity: PhantomData,
        }
    }
}

impl<E> fmt::Debug for StateAdapter<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateAdapter")
            .field("domain", &self.catalog.domain())
            .field("states", &self.catalog.len())
            .finish()
    }
}

impl<E: DomainEntity> StateAdapter<E> {
    /// Adapter over the built-in catalog.
    ///
    /// # Errors
    ///
    /// Returns an error if the built-in catalog is malformed.
    pub fn builtin() -> Result<Self> {
        Self::with_catalog(Arc::new(E::builtin_catalog()?))
    }

    /// Adapter over an injected catalog.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::DomainMismatch`] if the catalog belongs to
    /// another domain, or [`CatalogError::MissingRequiredState`] if it lacks
    /// the entity's success state.
    pub fn with_catalog(catalog: Arc<Catalog>) -> Result<Self> {
        if catalog.domain() != E::KIND {
            return Err(CatalogError::DomainMismatch {
                domain: catalog.domain().to_string(),
                expected: E::KIND.to_string(),
            }
            .into());
        }

        if !catalog.contains(E::SUCCESS_STATE) {
            return Err(CatalogError::MissingRequiredState {
                domain: catalog.domain().to_string(),
                state: E::SUCCESS_STATE.to_string(),
            }
            .into());
        }

        tracing::debug!(
            kind = E::KIND,
            field = E::FIELD,
            domain = catalog.domain(),
            states = catalog.len(),
            "State adapter ready"
        );

        Ok(Self {
            catalog,
            _entity: PhantomData,
        })
    }

    /// Adapter over a deserialized catalog definition.
    ///
    /// # Errors
    ///
    /// Returns an error if the definition is malformed or lacks the success state.
    pub fn from_spec(spec: CatalogSpec) -> Result<Self> {
        Self::with_catalog(Arc::new(Catalog::from_spec(spec)?))
    }

    /// Adapter over a catalog file (TOML, YAML or JSON).
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, or the catalog is invalid.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let spec: CatalogSpec = thrive_core::read_document(path)?;
        Self::from_spec(spec)
    }

    /// Built-in catalog unless `path` names an override.
    ///
    /// # Errors
    ///
    /// Same conditions as [`StateAdapter::builtin`] and [`StateAdapter::from_file`].
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::builtin(),
        }
    }

    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    /// Shared handle to the catalog.
    #[must_use]
    pub fn shared_catalog(&self) -> Arc<Catalog> {
        Arc::clone(&self.catalog)
    }

    /// Move `entity` to `target` and apply the completion side effect.
    ///
    /// # Errors
    ///
    /// Propagates [`thrive_state::Error`] from the engine; `entity` is
    /// unchanged on error.
    pub fn apply(&self, entity: &mut E, target: &str, change: StateChange) -> Result<Transition> {
        let transition = entity.set_state(&self.catalog, target, change)?;

        if let Transition::Applied { from, to } = &transition {
            let now = Utc::now();
            if to == E::SUCCESS_STATE {
                entity.set_completed_at(Some(now));
            } else if from == E::SUCCESS_STATE {
                entity.set_completed_at(None);
            }
            entity.touch(now);

            tracing::info!(
                kind = E::KIND,
                id = %entity.id(),
                field = E::FIELD,
                from = %from,
                to = %to,
                "State changed"
            );
        }

        Ok(transition)
    }

    /// Check that a loaded entity's state exists in this catalog.
    ///
    /// # Errors
    ///
    /// Returns [`thrive_state::Error::UnknownState`] on catalog drift.
    pub fn verify(&self, entity: &E) -> Result<()> {
        entity.state_record().verify(&self.catalog)?;
        Ok(())
    }

    /// Catalog metadata for the entity's current state.
    ///
    /// # Errors
    ///
    /// Returns [`thrive_state::Error::UnknownState`] on catalog drift.
    pub fn meta<'c>(&'c self, entity: &E) -> Result<&'c StateDefinition> {
        Ok(entity.state_meta(&self.catalog)?)
    }

    #[must_use]
    pub fn label<'c>(&'c self, entity: &E) -> &'c str {
        entity.state_label(&self.catalog)
    }

    #[must_use]
    pub fn color<'c>(&'c self, entity: &E) -> &'c str {
        entity.state_color(&self.catalog)
    }

    /// True if the entity can move to `target` from where it is now.
    ///
    /// # Errors
    ///
    /// Returns [`thrive_state::Error::UnknownState`] on catalog drift.
    pub fn can_move(&self, entity: &E, target: &str) -> Result<bool> {
        Ok(thrive_state::can_transition(
            &self.catalog,
            entity.current_state(),
            target,
        )?)
    }
}
