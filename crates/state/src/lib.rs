//! Catalog-driven state tracking.
//!
//! Any entity that needs a labelled workflow with validated transitions and
//! an audit trail embeds a [`StateRecord`] and implements [`StateTrackable`].
//! Key pieces:
//!
//! - **Catalog**: the static state graph for one domain, validated at construction
//! - **Validator**: decides whether `from → to` is legal
//! - **History**: immutable entries appended on every applied transition
//! - **Queries**: filter and bucket collections by state
//!
//! # Example
//!
//! ```
//! use thrive_state::{Catalog, StateChange, StateDefinition, StateRecord, StateTrackable};
//!
//! let catalog = Catalog::builder("habit")
//!     .state(StateDefinition::new("forming", "Forming").with_transitions(["established"]))
//!     .state(StateDefinition::new("established", "Established"))
//!     .build()?;
//!
//! let mut record = StateRecord::new(&catalog);
//! record.set_state(&catalog, "established", StateChange::new().because("30 day streak"))?;
//!
//! assert!(record.is_state("established"));
//! assert_eq!(record.state_history().len(), 1);
//! # Ok::<(), thrive_state::Error>(())
//! ```

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(clippy::panic)]

pub mod catalog;
pub mod error;
pub mod history;
pub mod query;
pub mod trackable;
pub mod validator;

pub use catalog::{Catalog, CatalogBuilder, CatalogSpec, StateDefinition};
pub use error::{CatalogError, Error, ErrorCode, Result};
pub use history::HistoryEntry;
pub use query::{find_by_state, group_by_state, StateGroups};
pub use trackable::{StateChange, StateRecord, StateTrackable, Transition, FALLBACK_COLOR, UNKNOWN_LABEL};
pub use validator::{assert_transition, can_transition};
