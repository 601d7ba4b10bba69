//! Collection-level state queries.

use crate::catalog::Catalog;
use crate::error::Result;
use crate::trackable::StateTrackable;

/// Entities bucketed by state, one bucket per catalog state in catalog order.
#[derive(Debug)]
pub struct StateGroups<'c, 'a, E> {
    groups: Vec<(&'c str, Vec<&'a E>)>,
    unknown: Vec<&'a E>,
}

impl<'c, 'a, E> StateGroups<'c, 'a, E> {
    /// Entities in `state`; empty for states not in the catalog.
    #[must_use]
    pub fn get(&self, state: &str) -> &[&'a E] {
        self.groups
            .iter()
            .find(|(name, _)| *name == state)
            .map(|(_, items)| items.as_slice())
            .unwrap_or(&[])
    }

    /// Every catalog state with its entities, including empty buckets.
    pub fn iter(&self) -> impl Iterator<Item = (&'c str, &[&'a E])> {
        self.groups.iter().map(|(name, items)| (*name, items.as_slice()))
    }

    /// Entities whose current state is not in the catalog.
    #[must_use]
    pub fn unknown(&self) -> &[&'a E] {
        &self.unknown
    }
}

/// Entities in `items` currently in `state`, preserving input order.
///
/// # Errors
///
/// Returns [`crate::Error::UnknownState`] if `state` is not in the catalog.
pub fn find_by_state<'a, E, I>(catalog: &Catalog, items: I, state: &str) -> Result<Vec<&'a E>>
where
    E: StateTrackable + 'a,
    I: IntoIterator<Item = &'a E>,
{
    catalog.get(state)?;
    Ok(items.into_iter().filter(|item| item.is_state(state)).collect())
}

/// Bucket `items` by current state.
pub fn group_by_state<'c, 'a, E, I>(catalog: &'c Catalog, items: I) -> StateGroups<'c, 'a, E>
where
    E: StateTrackable + 'a,
    I: IntoIterator<Item = &'a E>,
{
    let mut groups: Vec<(&'c str, Vec<&'a E>)> =
        catalog.state_names().map(|name| (name, Vec::new())).collect();
    let mut unknown = Vec::new();

    for item in items {
        match groups
            .iter_mut()
            .find(|(name, _)| *name == item.current_state())
        {
            Some((_, bucket)) => bucket.push(item),
            None => unknown.push(item),
        }
    }

    StateGroups { groups, unknown }
}
