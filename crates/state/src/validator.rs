//! Transition legality checks. Pure functions of the catalog and the two states.

use crate::catalog::Catalog;
use crate::error::{Error, Result};

/// Decide whether `from → to` is permitted.
///
/// A self-loop (`from == to`) is always permitted; callers short-circuit it
/// before recording history. A target missing from the catalog is simply
/// not permitted.
///
/// # Errors
///
/// Returns [`Error::UnknownState`] if `from` is not in the catalog.
pub fn can_transition(catalog: &Catalog, from: &str, to: &str) -> Result<bool> {
    let current = catalog.get(from)?;
    Ok(from == to || current.allows(to))
}

/// Require that `from → to` is permitted.
///
/// # Errors
///
/// Returns [`Error::IllegalTransition`] carrying both states and the allowed
/// targets, or [`Error::UnknownState`] if `from` is not in the catalog.
pub fn assert_transition(catalog: &Catalog, from: &str, to: &str) -> Result<()> {
    if can_transition(catalog, from, to)? {
        return Ok(());
    }

    let allowed = catalog.get(from)?.allowed_transitions().to_vec();
    Err(Error::illegal_transition(catalog.domain(), from, to, allowed))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;
    use crate::catalog::StateDefinition;

    fn catalog() -> Catalog {
        Catalog::builder("milestone")
            .state(StateDefinition::new("planned", "Planned").with_transitions(["in_progress"]))
            .state(StateDefinition::new("in_progress", "In Progress").with_transitions(["achieved"]))
            .state(StateDefinition::new("achieved", "Achieved"))
            .build()
            .unwrap()
    }

    #[test]
    fn test_listed_edge_is_allowed() {
        assert_eq!(can_transition(&catalog(), "planned", "in_progress"), Ok(true));
    }

    #[test]
    fn test_unlisted_edge_is_rejected() {
        assert_eq!(can_transition(&catalog(), "planned", "achieved"), Ok(false));
    }

    #[test]
    fn test_self_loop_is_allowed_even_from_terminal() {
        assert_eq!(can_transition(&catalog(), "achieved", "achieved"), Ok(true));
    }

    #[test]
    fn test_unknown_target_is_not_allowed() {
        assert_eq!(can_transition(&catalog(), "planned", "someday"), Ok(false));
    }

    #[test]
    fn test_unknown_source_is_integrity_error() {
        assert_eq!(
            can_transition(&catalog(), "someday", "planned"),
            Err(Error::unknown_state("milestone", "someday"))
        );
    }

    #[test]
    fn test_assert_transition_error_carries_states() {
        let err = assert_transition(&catalog(), "achieved", "in_progress").unwrap_err();
        assert_eq!(
            err,
            Error::illegal_transition("milestone", "achieved", "in_progress", Vec::new())
        );
    }

    #[test]
    fn test_assert_transition_ok() {
        assert!(assert_transition(&catalog(), "in_progress", "achieved").is_ok());
    }
}
