//! Error types for domain adapters, stores and actions.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use thrive_core::UserId;
use thrive_state::CatalogError;

/// Result type alias for domain operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Domain error.
#[derive(Debug, Error)]
pub enum Error {
    /// Engine failure: malformed catalog, unknown state or illegal transition.
    #[error(transparent)]
    State(#[from] thrive_state::Error),

    /// Catalog override file could not be read or parsed.
    #[error("failed to load catalog: {0}")]
    CatalogFile(#[from] thrive_core::Error),

    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("user '{actor}' may not modify {kind} '{id}'")]
    Forbidden {
        kind: &'static str,
        id: String,
        actor: UserId,
    },

    #[error("{kind} '{id}' was modified concurrently (expected revision {expected}, found {actual})")]
    Conflict {
        kind: &'static str,
        id: String,
        expected: u64,
        actual: u64,
    },

    #[error("{kind} '{id}' already exists")]
    AlreadyExists { kind: &'static str, id: String },
}

/// Coarse classification for mapping errors onto API responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    Configuration,
    Integrity,
    Validation,
    NotFound,
    Forbidden,
    Conflict,
}

impl From<CatalogError> for Error {
    fn from(err: CatalogError) -> Self {
        Self::State(err.into())
    }
}

impl Error {
    /// Create a not found error.
    pub fn not_found(kind: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }

    /// Create a forbidden error.
    pub fn forbidden(kind: &'static str, id: impl ToString, actor: UserId) -> Self {
        Self::Forbidden {
            kind,
            id: id.to_string(),
            actor,
        }
    }

    /// Create a conflict error.
    pub fn conflict(kind: &'static str, id: impl ToString, expected: u64, actual: u64) -> Self {
        Self::Conflict {
            kind,
            id: id.to_string(),
            expected,
            actual,
        }
    }

    /// Classify the error.
    #[must_use]
    pub const fn code(&self) -> ErrorCode {
        match self {
            Self::State(err) => match err.code() {
                thrive_state::ErrorCode::Configuration => ErrorCode::Configuration,
                thrive_state::ErrorCode::Integrity => ErrorCode::Integrity,
                thrive_state::ErrorCode::Validation => ErrorCode::Validation,
            },
            Self::CatalogFile(_) => ErrorCode::Configuration,
            Self::NotFound { .. } => ErrorCode::NotFound,
            Self::Forbidden { .. } => ErrorCode::Forbidden,
            Self::Conflict { .. } | Self::AlreadyExists { .. } => ErrorCode::Conflict,
        }
    }

    /// True when the caller can fix the request; false for system faults.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(
            self.code(),
            ErrorCode::Configuration | ErrorCode::Integrity
        )
    }
}
