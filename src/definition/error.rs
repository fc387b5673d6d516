//! Definition load errors.

use crate::core::StateId;
use thiserror::Error;

/// A single structural problem found in a definition.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum Violation {
    #[error("Definition declares no states")]
    EmptyDefinition,

    #[error("State {id} is declared more than once")]
    DuplicateStateId { id: StateId },

    #[error("No root state: every state declares a parent")]
    MissingRoot,

    #[error("Multiple root states: {ids:?}")]
    MultipleRoots { ids: Vec<StateId> },

    #[error("State {state} references unknown parent {parent}")]
    UnknownParent { state: StateId, parent: StateId },

    #[error("State {state} is part of a parent cycle")]
    Cycle { state: StateId },

    #[error("State {state} is nested {depth} levels deep (max {max})")]
    TooDeep {
        state: StateId,
        depth: usize,
        max: usize,
    },

    #[error("Transition {index} starts at unknown state {from}")]
    UnknownTransitionSource { index: usize, from: StateId },

    #[error("Transition {index} targets unknown state {to}")]
    UnknownTransitionTarget { index: usize, to: StateId },

    #[error("Initial state {id} is not declared")]
    UnknownInitialState { id: StateId },
}

/// Errors that can occur when loading a definition
#[derive(Debug, Error)]
pub enum DefinitionError {
    /// Input could not be decoded into a definition
    #[error("Definition is malformed: {0}")]
    Malformed(String),

    /// Input decoded but does not describe a valid tree
    #[error("Definition is invalid: {}", describe(.0))]
    Invalid(Vec<Violation>),

    /// A definition could not be encoded
    #[error("Definition serialization failed: {0}")]
    SerializationFailed(String),

    /// Two catalog entries share a name
    #[error("Tree '{0}' is declared more than once in the catalog")]
    DuplicateTree(String),

    /// A catalog entry failed to load
    #[error("Tree '{name}' failed to load: {source}")]
    InvalidTree {
        name: String,
        source: Box<DefinitionError>,
    },

    /// No catalog entry has the requested name
    #[error("No tree named '{0}' in the catalog")]
    UnknownTree(String),
}

impl DefinitionError {
    /// Every structural violation found, empty for decode failures.
    pub fn violations(&self) -> &[Violation] {
        match self {
            Self::Invalid(violations) => violations,
            Self::InvalidTree { source, .. } => source.violations(),
            _ => &[],
        }
    }
}

fn describe(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
