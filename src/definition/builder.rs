//! Builder for assembling definitions in code.

use super::document::{StateDef, TransitionDef, TreeDefinition};
use crate::core::{EntryTag, StateId};

/// Builder for constructing tree definitions with a fluent API.
///
/// The builder performs no validation; pass the result to
/// [`DefinitionLoader::load`](super::DefinitionLoader::load).
///
/// # Example
///
/// ```rust
/// use hsm_runtime::config::HsmConfig;
/// use hsm_runtime::core::Guard;
/// use hsm_runtime::definition::{DefinitionBuilder, DefinitionLoader, StateDef, TransitionDef};
///
/// let definition = DefinitionBuilder::<String>::new()
///     .state(StateDef::root(0, "Idle"))
///     .state(StateDef::new(1, "Running").parent(0).tag("run".to_string()))
///     .transition(TransitionDef::new(0, 1).when(Guard::flag("go")))
///     .build();
///
/// let tree = DefinitionLoader::new(&HsmConfig::default())
///     .load(definition)
///     .unwrap();
/// assert_eq!(tree.len(), 2);
/// ```
pub struct DefinitionBuilder<T: EntryTag> {
    initial: Option<StateId>,
    states: Vec<StateDef<T>>,
    transitions: Vec<TransitionDef>,
}

impl<T: EntryTag> DefinitionBuilder<T> {
    pub fn new() -> Self {
        Self {
            initial: None,
            states: Vec::new(),
            transitions: Vec::new(),
        }
    }

    /// Set the starting state (optional, defaults to the root).
    pub fn initial(mut self, id: u32) -> Self {
        self.initial = Some(StateId(id));
        self
    }

    /// Declare a state. Declaration order is preserved.
    pub fn state(mut self, state: StateDef<T>) -> Self {
        self.states.push(state);
        self
    }

    /// Declare multiple states at once.
    pub fn states(mut self, states: impl IntoIterator<Item = StateDef<T>>) -> Self {
        self.states.extend(states);
        self
    }

    /// Declare a transition. Declaration order is the tie-break between
    /// transitions of equal priority.
    pub fn transition(mut self, transition: TransitionDef) -> Self {
        self.transitions.push(transition);
        self
    }

    /// Declare multiple transitions at once.
    pub fn transitions(mut self, transitions: impl IntoIterator<Item = TransitionDef>) -> Self {
        self.transitions.extend(transitions);
        self
    }

    pub fn build(self) -> TreeDefinition<T> {
        TreeDefinition {
            initial: self.initial,
            states: self.states,
            transitions: self.transitions,
        }
    }
}

impl<T: EntryTag> Default for DefinitionBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}
