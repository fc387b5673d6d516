//! Validated, immutable tree of states and guarded transitions.
//!
//! Trees are only produced by the
//! [`DefinitionLoader`](crate::definition::DefinitionLoader), which checks
//! id uniqueness, parent references, acyclicity, and transition endpoints
//! before construction. Every query here can therefore rely on those
//! invariants.

use super::guard::Guard;
use super::state::{Capability, EntryTag, State, StateId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A guarded edge between two states.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Transition {
    pub from: StateId,
    pub to: StateId,
    pub guard: Guard,
    /// Lower values win when several transitions are enabled.
    pub priority: i32,
    /// Declaration index in the source definition, used as tie-break.
    pub order: usize,
}

impl Transition {
    /// Selection key, lowest wins: priority, then `depth` (how many levels
    /// above the active state the transition was declared), then
    /// declaration order.
    pub fn rank(&self, depth: usize) -> (i32, usize, usize) {
        (self.priority, depth, self.order)
    }
}

/// Tree of states with exactly one root.
#[derive(Clone, Debug)]
pub struct StateTree<T: EntryTag> {
    pub(crate) states: Vec<State<T>>,
    pub(crate) transitions: Vec<Transition>,
    pub(crate) index: HashMap<StateId, usize>,
    pub(crate) root: StateId,
    pub(crate) initial: StateId,
}

impl<T: EntryTag> StateTree<T> {
    /// All states in declaration order.
    pub fn states(&self) -> &[State<T>] {
        &self.states
    }

    /// All transitions in declaration order.
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    pub fn len(&self) -> usize {
        self.states.len()
    }

    /// Always false for a loaded tree; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.states.is_empty()
    }

    pub fn contains(&self, id: StateId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn get(&self, id: StateId) -> Option<&State<T>> {
        self.index.get(&id).map(|&i| &self.states[i])
    }

    pub fn root(&self) -> StateId {
        self.root
    }

    /// State a new session starts in.
    pub fn initial(&self) -> StateId {
        self.initial
    }

    pub fn parent(&self, id: StateId) -> Option<&State<T>> {
        self.get(id)?.parent.and_then(|p| self.get(p))
    }

    pub fn children(&self, id: StateId) -> impl Iterator<Item = &State<T>> + '_ {
        self.get(id)
            .into_iter()
            .flat_map(|s| s.children.iter())
            .filter_map(move |c| self.get(*c))
    }

    /// Other children of the same parent, in declaration order.
    pub fn siblings(&self, id: StateId) -> impl Iterator<Item = &State<T>> + '_ {
        let parent = self.get(id).and_then(|s| s.parent);
        parent
            .into_iter()
            .flat_map(move |p| self.children(p))
            .filter(move |s| s.id != id)
    }

    /// Ancestors from the parent up to the root.
    pub fn ancestors(&self, id: StateId) -> impl Iterator<Item = &State<T>> + '_ {
        std::iter::successors(self.parent(id), move |s| {
            s.parent.and_then(|p| self.get(p))
        })
    }

    /// Number of edges between the state and the root.
    pub fn depth(&self, id: StateId) -> Option<usize> {
        self.get(id).map(|_| self.ancestors(id).count())
    }

    /// Outgoing transitions of a state, in declaration order.
    pub fn outgoing(&self, id: StateId) -> impl Iterator<Item = &Transition> + '_ {
        self.get(id)
            .into_iter()
            .flat_map(|s| s.outgoing.iter())
            .map(move |&i| &self.transitions[i])
    }

    pub fn find<P>(&self, predicate: P) -> Option<&State<T>>
    where
        P: Fn(&State<T>) -> bool,
    {
        self.states.iter().find(|s| predicate(s))
    }

    pub fn find_sibling<P>(&self, id: StateId, predicate: P) -> Option<&State<T>>
    where
        P: Fn(&State<T>) -> bool,
    {
        self.siblings(id).find(|s| predicate(s))
    }

    /// First state with the given name in declaration order.
    pub fn find_by_name(&self, name: &str) -> Option<&State<T>> {
        self.find(|s| s.name == name)
    }

    /// First state whose entry tag matches.
    pub fn find_by_tag<P>(&self, predicate: P) -> Option<&State<T>>
    where
        P: Fn(&T) -> bool,
    {
        self.find(|s| s.tag.as_ref().is_some_and(&predicate))
    }

    pub fn states_with(&self, capability: Capability) -> impl Iterator<Item = &State<T>> + '_ {
        self.states
            .iter()
            .filter(move |s| s.has_capability(capability))
    }
}
