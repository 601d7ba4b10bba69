//! # thrive-core
//!
//! Shared errors, configuration loading and strongly-typed identifiers.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![forbid(clippy::panic)]

pub mod config;
pub mod error;
pub mod id;
pub mod result;

pub use config::{read_document, CatalogPaths, Config};
pub use error::{Error, Result};
pub use id::{ManifestationId, MilestoneId, UserId};
pub use result::ResultExt;
