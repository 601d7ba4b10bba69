//! CLI command handlers.
//!
//! Handlers return the rendered output so they can be tested without a
//! terminal. Nothing here touches a store: simulations run on a throwaway
//! entity.

use std::fmt::Write as _;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};
use thrive_core::{Config, UserId};
use thrive_domain::{
    DomainEntity, Manifestation, ManifestationState, Milestone, MilestoneStatus, StateAdapter,
};
use thrive_state::{Catalog, CatalogSpec, StateChange, Transition};
use tracing::info;

use crate::cli::{CatalogCommands, Commands, Domain};

/// Execute a CLI command and return what should be printed.
///
/// # Errors
///
/// Returns an error if a catalog cannot be loaded or validated, or a
/// simulated transition is illegal.
pub fn execute(command: &Commands, config: &Config) -> Result<String> {
    match command {
        Commands::Catalog {
            command: CatalogCommands::Show { domain, json },
        } => cmd_catalog_show(*domain, *json, config),

        Commands::Catalog {
            command: CatalogCommands::Check { file, for_domain },
        } => cmd_catalog_check(file, *for_domain),

        Commands::Simulate {
            domain,
            states,
            reason,
        } => cmd_simulate(*domain, states, reason.as_deref(), config),
    }
}

fn milestone_adapter(config: &Config) -> Result<MilestoneStatus> {
    MilestoneStatus::load(config.catalogs.milestone.as_deref())
        .context("Failed to load milestone catalog")
}

fn manifestation_adapter(config: &Config) -> Result<ManifestationState> {
    ManifestationState::load(config.catalogs.manifestation.as_deref())
        .context("Failed to load manifestation catalog")
}

fn catalog_for(domain: Domain, config: &Config) -> Result<Arc<Catalog>> {
    Ok(match domain {
        Domain::Milestone => milestone_adapter(config)?.shared_catalog(),
        Domain::Manifestation => manifestation_adapter(config)?.shared_catalog(),
    })
}

fn cmd_catalog_show(domain: Domain, json: bool, config: &Config) -> Result<String> {
    let catalog = catalog_for(domain, config)?;
    if json {
        return serde_json::to_string_pretty(&catalog.to_spec())
            .context("Failed to serialize catalog");
    }
    render_catalog(&catalog)
}

fn cmd_catalog_check(file: &Path, for_domain: Option<Domain>) -> Result<String> {
    let spec: CatalogSpec = thrive_core::read_document(file)
        .with_context(|| format!("Failed to read catalog file {}", file.display()))?;
    let catalog = Arc::new(
        Catalog::from_spec(spec)
            .with_context(|| format!("Invalid catalog in {}", file.display()))?,
    );

    match for_domain {
        Some(Domain::Milestone) => {
            MilestoneStatus::with_catalog(Arc::clone(&catalog))?;
        }
        Some(Domain::Manifestation) => {
            ManifestationState::with_catalog(Arc::clone(&catalog))?;
        }
        None => {}
    }

    info!(file = %file.display(), domain = catalog.domain(), "Catalog is valid");

    let mut out = String::new();
    writeln!(
        out,
        "ok: '{}' with {} states, initial '{}'",
        catalog.domain(),
        catalog.len(),
        catalog.initial_state().name()
    )?;

    let terminal: Vec<&str> = catalog
        .states()
        .iter()
        .filter(|state| state.is_terminal())
        .map(|state| state.name())
        .collect();
    writeln!(out, "terminal: {}", join_or_none(&terminal))?;

    let unreachable = catalog.unreachable_states();
    if !unreachable.is_empty() {
        writeln!(out, "unreachable: {}", unreachable.join(", "))?;
    }
    Ok(out)
}

fn cmd_simulate(
    domain: Domain,
    states: &[String],
    reason: Option<&str>,
    config: &Config,
) -> Result<String> {
    let owner = UserId::new();
    match domain {
        Domain::Milestone => {
            let adapter = milestone_adapter(config)?;
            let mut milestone = Milestone::new(owner, "simulation", &adapter);
            simulate(&adapter, &mut milestone, states, reason)
        }
        Domain::Manifestation => {
            let adapter = manifestation_adapter(config)?;
            let mut manifestation = Manifestation::new(owner, "simulation", &adapter);
            simulate(&adapter, &mut manifestation, states, reason)
        }
    }
}

/// Apply `states` in order, stopping at the first rejected transition.
fn simulate<E: DomainEntity>(
    adapter: &StateAdapter<E>,
    entity: &mut E,
    states: &[String],
    reason: Option<&str>,
) -> Result<String> {
    let mut out = String::new();
    writeln!(
        out,
        "start: {} ({})",
        entity.current_state(),
        adapter.label(entity)
    )?;

    for target in states {
        let mut change = StateChange::new().by(entity.owner());
        if let Some(reason) = reason {
            change = change.because(reason);
        }

        let transition = adapter
            .apply(entity, target, change)
            .with_context(|| format!("Simulation stopped at '{target}'"))?;

        match transition {
            Transition::Applied { from, to } => writeln!(out, "{from} -> {to}")?,
            Transition::Unchanged { state } => writeln!(out, "{state} (unchanged)")?,
        }
    }

    writeln!(out, "history:")?;
    for (position, entry) in entity.state_history().iter().enumerate() {
        write!(
            out,
            "  {}. {} at {}",
            position + 1,
            entry.value(),
            entry.changed_at().to_rfc3339()
        )?;
        if let Some(reason) = entry.reason() {
            write!(out, " ({reason})")?;
        }
        writeln!(out)?;
    }

    if let Some(at) = entity.completed_at() {
        writeln!(out, "completed at {}", at.to_rfc3339())?;
    }
    Ok(out)
}

fn render_catalog(catalog: &Catalog) -> Result<String> {
    let mut out = String::new();
    writeln!(
        out,
        "{} (initial: {})",
        catalog.domain(),
        catalog.initial_state().name()
    )?;

    for state in catalog.states() {
        let targets: Vec<&str> = state
            .allowed_transitions()
            .iter()
            .map(String::as_str)
            .collect();
        let next = if targets.is_empty() {
            "(terminal)".to_string()
        } else {
            targets.join(", ")
        };
        writeln!(
            out,
            "  {:<16} {:<18} {:<8} -> {}",
            state.name(),
            state.label(),
            state.color().unwrap_or("-"),
            next
        )?;
    }
    Ok(out)
}

fn join_or_none(items: &[&str]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}
