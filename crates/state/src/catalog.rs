//! State catalogs: the static state graph for one domain.
//!
//! A catalog is built once, validated at construction, and never mutated
//! afterwards. Share it behind an `Arc` between every entity of its domain.

use std::collections::{HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;
use serde::{Deserialize, Serialize};

use crate::error::{CatalogError, Error, Result};

/// Metadata and outgoing edges for one named state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateDefinition {
    name: String,
    label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    icon: Option<String>,
    #[serde(default, alias = "transitions")]
    allowed_transitions: Vec<String>,
}

impl StateDefinition {
    /// Create a terminal state definition with a display label.
    pub fn new(name: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            label: label.into(),
            description: None,
            color: None,
            icon: None,
            allowed_transitions: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = Some(color.into());
        self
    }

    #[must_use]
    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    /// Set the states reachable directly from this one, in display order.
    #[must_use]
    pub fn with_transitions<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_transitions = targets.into_iter().map(Into::into).collect();
        self
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn label(&self) -> &str {
        &self.label
    }

    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    #[must_use]
    pub fn color(&self) -> Option<&str> {
        self.color.as_deref()
    }

    #[must_use]
    pub fn icon(&self) -> Option<&str> {
        self.icon.as_deref()
    }

    #[must_use]
    pub fn allowed_transitions(&self) -> &[String] {
        &self.allowed_transitions
    }

    /// True if `target` is a direct successor of this state.
    #[must_use]
    pub fn allows(&self, target: &str) -> bool {
        self.allowed_transitions.iter().any(|t| t == target)
    }

    /// Structural terminality: no outgoing edges.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.allowed_transitions.is_empty()
    }
}

/// Serializable catalog input, as read from TOML, YAML or JSON.
///
/// ```toml
/// domain = "habit"
/// initial = "forming"
///
/// [[states]]
/// name = "forming"
/// label = "Forming"
/// transitions = ["established", "dropped"]
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogSpec {
    pub domain: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub initial: Option<String>,
    pub states: Vec<StateDefinition>,
}

/// Immutable, validated state graph for one domain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Catalog {
    domain: String,
    states: Vec<StateDefinition>,
    index: HashMap<String, usize>,
    initial: usize,
}

impl Catalog {
    /// Start building a catalog for `domain`.
    pub fn builder(domain: impl Into<String>) -> CatalogBuilder {
        CatalogBuilder {
            domain: domain.into(),
            states: Vec::new(),
            initial: None,
        }
    }

    /// Build a catalog from definitions in catalog order.
    ///
    /// The initial state is `initial` when given, otherwise the first definition.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError`] if the catalog is empty, a name is empty or
    /// repeated, a transition names an unknown state, or `initial` is unknown.
    pub fn from_definitions(
        domain: impl Into<String>,
        states: Vec<StateDefinition>,
        initial: Option<&str>,
    ) -> std::result::Result<Self, CatalogError> {
        let domain = domain.into();

        if states.is_empty() {
            return Err(CatalogError::Empty { domain });
        }

        let mut index = HashMap::with_capacity(states.len());
        for (position, state) in states.iter().enumerate() {
            if state.name.trim().is_empty() {
                return Err(CatalogError::EmptyStateName { domain });
            }
            if index.insert(state.name.clone(), position).is_some() {
                return Err(CatalogError::DuplicateState {
                    domain,
                    state: state.name.clone(),
                });
            }
        }

        for state in &states {
            if let Some(dangling) = state
                .allowed_transitions
                .iter()
                .find(|target| !index.contains_key(target.as_str()))
            {
                return Err(CatalogError::DanglingTransition {
                    domain,
                    from: state.name.clone(),
                    to: dangling.clone(),
                });
            }
        }

        let initial = match initial {
            Some(name) => match index.get(name) {
                Some(&position) => position,
                None => {
                    return Err(CatalogError::UnknownInitialState {
                        domain,
                        state: name.to_string(),
                    })
                }
            },
            None => 0,
        };

        let catalog = Self {
            domain,
            states,
            index,
            initial,
        };

        for orphan in catalog.unreachable_states() {
            tracing::warn!(
                domain = %catalog.domain,
                state = orphan,
                "State is unreachable from the initial state"
            );
        }

        Ok(catalog)
    }

    /// Build a catalog from deserialized input.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Catalog::from_definitions`].
    pub fn from_spec(spec: CatalogSpec) -> std::result::Result<Self, CatalogError> {
        Self::from_definitions(spec.domain, spec.states, spec.initial.as_deref())
    }

    /// Export the catalog back into its serializable form.
    #[must_use]
    pub fn to_spec(&self) -> CatalogSpec {
        CatalogSpec {
            domain: self.domain.clone(),
            initial: Some(self.initial_state().name.clone()),
            states: self.states.clone(),
        }
    }

    #[must_use]
    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Look up a state definition.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownState`] if `name` is not in the catalog.
    pub fn get(&self, name: &str) -> Result<&StateDefinition> {
        self.index
            .get(name)
            .and_then(|&position| self.states.get(position))
            .ok_or_else(|| Error::unknown_state(&self.domain, name))
    }

    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// The state assigned to newly created entities.
    #[must_use]
    #[allow(
        clippy::indexing_slicing,
        reason = "`from_definitions` rejects empty catalogs and unknown initial names; states are never removed"
    )]
    pub fn initial_state(&self) -> &StateDefinition {
        &self.states[self.initial]
    }

    /// True iff the state has no outgoing transitions.
    ///
    /// # Errors
    ///
    /// Returns [`Error::UnknownState`] if `name` is not in the catalog.
    pub fn is_terminal(&self, name: &str) -> Result<bool> {
        self.get(name).map(StateDefinition::is_terminal)
    }

    /// All states in catalog order.
    #[must_use]
    pub fn states(&self) -> &[StateDefinition] {
        &self.states
    }

    /// All state names in catalog order.
    pub fn state_names(&self) -> impl Iterator<Item = &str> {
        self.states.iter().map(StateDefinition::name)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.states.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    /// Names of states no sequence of transitions can reach from the initial state.
    #[must_use]
    pub fn unreachable_states(&self) -> Vec<&str> {
        let mut graph: DiGraph<&str, ()> = DiGraph::with_capacity(self.states.len(), 0);
        let nodes: Vec<NodeIndex> = self
            .states
            .iter()
            .map(|state| graph.add_node(state.name()))
            .collect();

        for (from, state) in nodes.iter().zip(&self.states) {
            for target in &state.allowed_transitions {
                if let Some(to) = self
                    .index
                    .get(target.as_str())
                    .and_then(|&position| nodes.get(position))
                {
                    graph.add_edge(*from, *to, ());
                }
            }
        }

        let mut reachable = HashSet::with_capacity(nodes.len());
        if let Some(&start) = nodes.get(self.initial) {
            let mut bfs = Bfs::new(&graph, start);
            while let Some(node) = bfs.next(&graph) {
                reachable.insert(node);
            }
        }

        nodes
            .iter()
            .zip(&self.states)
            .filter(|(node, _)| !reachable.contains(*node))
            .map(|(_, state)| state.name())
            .collect()
    }
}

/// Incremental catalog construction.
#[derive(Debug, Clone)]
pub struct CatalogBuilder {
    domain: String,
    states: Vec<StateDefinition>,
    initial: Option<String>,
}

impl CatalogBuilder {
    /// Append a state; catalog order is insertion order.
    #[must_use]
    pub fn state(mut self, state: StateDefinition) -> Self {
        self.states.push(state);
        self
    }

    /// Designate the initial state explicitly.
    #[must_use]
    pub fn initial(mut self, name: impl Into<String>) -> Self {
        self.initial = Some(name.into());
        self
    }

    /// Validate and build.
    ///
    /// # Errors
    ///
    /// Same conditions as [`Catalog::from_definitions`].
    pub fn build(self) -> std::result::Result<Catalog, CatalogError> {
        Catalog::from_definitions(self.domain, self.states, self.initial.as_deref())
    }
}
