//! Domain adapters over the thrive state engine.
//!
//! - [`milestone`]: milestone status workflow (`status` field)
//! - [`manifestation`]: manifestation state workflow (`state` field)
//! - [`adapter`]: shared catalog injection and completion side effects
//! - [`store`]: async entity storage with revision checks
//! - [`actions`]: owner-checked status updates

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(clippy::panic)]

pub mod actions;
pub mod adapter;
pub mod error;
pub mod manifestation;
pub mod milestone;
pub mod store;

pub use actions::{
    create, list_in_state, update_manifestation_state, update_milestone_status, update_state,
    StateUpdate,
};
pub use adapter::{DomainEntity, StateAdapter};
pub use error::{Error, ErrorCode, Result};
pub use manifestation::{Manifestation, ManifestationState};
pub use milestone::{Milestone, MilestoneStatus};
pub use store::{EntityStore, InMemoryStore, Stored, TracingStore};
