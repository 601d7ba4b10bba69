#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

//! # thrive
//!
//! Catalog-driven state tracking with history for milestones and
//! manifestations.
//!
//! This library re-exports the workspace crates and hosts the CLI.

pub use thrive_core;
pub use thrive_domain;
pub use thrive_state;

pub mod cli;
pub mod commands;
