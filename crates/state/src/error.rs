//! Error types for the state engine.
//!
//! Errors carry the catalog's domain and the states involved so callers can
//! report them without extra context.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for state engine operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A catalog definition that cannot be built.
///
/// Fatal at load time; a catalog that fails here is never used.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CatalogError {
    #[error("{domain} catalog has no states")]
    Empty { domain: String },

    #[error("{domain} catalog contains a state with an empty name")]
    EmptyStateName { domain: String },

    #[error("{domain} catalog defines state '{state}' more than once")]
    DuplicateState { domain: String, state: String },

    #[error("{domain} state '{from}' lists transition to unknown state '{to}'")]
    DanglingTransition {
        domain: String,
        from: String,
        to: String,
    },

    #[error("{domain} catalog designates unknown initial state '{state}'")]
    UnknownInitialState { domain: String, state: String },

    #[error("{domain} catalog is missing required state '{state}'")]
    MissingRequiredState { domain: String, state: String },

    #[error("{domain} catalog cannot be used for {expected}")]
    DomainMismatch { domain: String, expected: String },
}

/// State engine error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("invalid catalog: {0}")]
    Catalog(#[from] CatalogError),

    #[error("unknown {domain} state '{state}'")]
    UnknownState { domain: String, state: String },

    #[error(
        "cannot move {domain} from '{from}' to '{to}' (allowed from '{from}': {})",
        describe_allowed(.allowed)
    )]
    IllegalTransition {
        domain: String,
        from: String,
        to: String,
        allowed: Vec<String>,
    },
}

/// Coarse classification for callers that map errors onto responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// Malformed catalog or configuration.
    Configuration,
    /// Stored data disagrees with its catalog.
    Integrity,
    /// The caller asked for something the rules forbid.
    Validation,
}

fn describe_allowed(allowed: &[String]) -> String {
    if allowed.is_empty() {
        "none".to_string()
    } else {
        allowed.join(", ")
    }
}

impl Error {
    /// Create an unknown state error.
    pub fn unknown_state(domain: impl Into<String>, state: impl Into<String>) -> Self {
        Self::UnknownState {
            domain: domain.into(),
            state: state.into(),
        }
    }

    /// Create an illegal transition error.
    pub fn illegal_transition(
        domain: impl Into<String>,
        from: impl Into<String>,
        to: impl Into<String>,
        allowed: Vec<String>,
    ) -> Self {
        Self::IllegalTransition {
            domain: domain.into(),
            from: from.into(),
            to: to.into(),
            allowed,
        }
    }

    /// Classify the error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::Catalog(_) => ErrorCode::Configuration,
            Self::UnknownState { .. } => ErrorCode::Integrity,
            Self::IllegalTransition { .. } => ErrorCode::Validation,
        }
    }

    /// True when the error stems from the caller's request rather than the system.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        matches!(self.code(), ErrorCode::Validation)
    }
}
