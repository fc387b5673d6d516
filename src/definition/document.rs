//! Serializable definition of a state tree.
//!
//! A definition is the unvalidated input to the loader. It maps one-to-one
//! onto JSON text or bincode bytes:
//!
//! ```json
//! {
//!   "initial": 1,
//!   "states": [
//!     { "id": 0, "name": "Root" },
//!     { "id": 1, "name": "Standby", "parent": 0, "tag": "Standby" },
//!     { "id": 2, "name": "Fire", "parent": 0, "capabilities": ["issues_requests"] }
//!   ],
//!   "transitions": [
//!     { "from": 1, "to": 2, "priority": 0, "guard": { "flag": "EnableFire" } }
//!   ]
//! }
//! ```

use super::error::DefinitionError;
use crate::core::{Capability, EntryTag, Guard, StateId, StateTree};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Declaration of one state.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct StateDef<T: EntryTag> {
    pub id: StateId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub parent: Option<StateId>,
    #[serde(default)]
    pub tag: Option<T>,
    #[serde(default)]
    pub capabilities: BTreeSet<Capability>,
}

impl<T: EntryTag> StateDef<T> {
    pub fn new(id: u32, name: impl Into<String>) -> Self {
        Self {
            id: StateId(id),
            name: name.into(),
            parent: None,
            tag: None,
            capabilities: BTreeSet::new(),
        }
    }

    /// A state without parent. Same as `new`, reads better at call sites.
    pub fn root(id: u32, name: impl Into<String>) -> Self {
        Self::new(id, name)
    }

    pub fn parent(mut self, parent: u32) -> Self {
        self.parent = Some(StateId(parent));
        self
    }

    pub fn tag(mut self, tag: T) -> Self {
        self.tag = Some(tag);
        self
    }

    pub fn capability(mut self, capability: Capability) -> Self {
        self.capabilities.insert(capability);
        self
    }
}

/// Declaration of one guarded transition.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct TransitionDef {
    pub from: StateId,
    pub to: StateId,
    #[serde(default)]
    pub guard: Guard,
    #[serde(default)]
    pub priority: i32,
}

impl TransitionDef {
    /// An always-enabled transition with priority 0.
    pub fn new(from: u32, to: u32) -> Self {
        Self {
            from: StateId(from),
            to: StateId(to),
            guard: Guard::Always,
            priority: 0,
        }
    }

    pub fn when(mut self, guard: Guard) -> Self {
        self.guard = guard;
        self
    }

    pub fn priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }
}

/// Complete, unvalidated description of a state tree.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct TreeDefinition<T: EntryTag> {
    /// Starting state of new sessions; the root when absent.
    #[serde(default)]
    pub initial: Option<StateId>,
    pub states: Vec<StateDef<T>>,
    #[serde(default)]
    pub transitions: Vec<TransitionDef>,
}

impl<T: EntryTag> TreeDefinition<T> {
    pub fn to_json(&self) -> Result<String, DefinitionError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| DefinitionError::SerializationFailed(e.to_string()))
    }

    /// Compact binary encoding accepted by
    /// [`DefinitionLoader::parse_bytes`](super::DefinitionLoader::parse_bytes).
    pub fn to_bytes(&self) -> Result<Vec<u8>, DefinitionError> {
        bincode::serialize(self).map_err(|e| DefinitionError::SerializationFailed(e.to_string()))
    }
}

impl<T: EntryTag> StateTree<T> {
    /// Convert a loaded tree back into a definition, preserving
    /// declaration order of states and transitions.
    pub fn to_definition(&self) -> TreeDefinition<T> {
        TreeDefinition {
            initial: (self.initial != self.root).then_some(self.initial),
            states: self
                .states
                .iter()
                .map(|s| StateDef {
                    id: s.id,
                    name: s.name.clone(),
                    parent: s.parent,
                    tag: s.tag.clone(),
                    capabilities: s.capabilities.clone(),
                })
                .collect(),
            transitions: self
                .transitions
                .iter()
                .map(|t| TransitionDef {
                    from: t.from,
                    to: t.to,
                    guard: t.guard.clone(),
                    priority: t.priority,
                })
                .collect(),
        }
    }
}
