//! States of a hierarchical state tree.
//!
//! A state carries its structural links (parent, children), an optional
//! entry-tag payload that is opaque to the runtime, and the explicit set of
//! capabilities it registered in its definition.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{self, Debug};

/// Trait for entry-tag payloads attached to states.
///
/// The runtime never inspects a tag; it only hands it to the
/// [`ActionSink`](crate::runtime::ActionSink) when the state is entered.
/// Any cloneable, serializable type qualifies.
///
/// # Required Traits
///
/// - `Clone`: trees are cloned into definitions for re-serialization
/// - `Debug`: tags show up in diagnostics
/// - `Serialize` + `Deserialize`: tags travel inside the definition
///
/// # Example
///
/// ```rust
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
/// enum Phase {
///     Standby,
///     Charging,
///     Release,
/// }
///
/// fn accepts_tag<T: hsm_runtime::core::EntryTag>() {}
/// accepts_tag::<Phase>();
/// ```
pub trait EntryTag: Clone + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync {}

impl<T> EntryTag for T where T: Clone + Debug + Serialize + for<'de> Deserialize<'de> + Send + Sync {}

/// Identifier of a state, unique within a tree.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StateId(pub u32);

impl fmt::Display for StateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl From<u32> for StateId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// Closed set of capabilities a state can register.
///
/// Hosts look states up by capability instead of inspecting node types
/// after construction.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Capability {
    /// The state needs the host's environment bound before it can act.
    ConsumesEnvironment,

    /// Entering the state issues a request that expects a response.
    IssuesRequests,
}

/// A single node of a [`StateTree`](super::StateTree).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(bound = "")]
pub struct State<T: EntryTag> {
    pub(crate) id: StateId,
    pub(crate) name: String,
    pub(crate) parent: Option<StateId>,
    pub(crate) children: Vec<StateId>,
    pub(crate) outgoing: Vec<usize>,
    pub(crate) tag: Option<T>,
    pub(crate) capabilities: BTreeSet<Capability>,
}

impl<T: EntryTag> State<T> {
    pub fn id(&self) -> StateId {
        self.id
    }

    /// Name for display/logging. Not required to be unique.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Parent state, `None` only for the root.
    pub fn parent(&self) -> Option<StateId> {
        self.parent
    }

    /// Children in declaration order.
    pub fn children(&self) -> &[StateId] {
        &self.children
    }

    pub fn is_root(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn tag(&self) -> Option<&T> {
        self.tag.as_ref()
    }

    pub fn capabilities(&self) -> &BTreeSet<Capability> {
        &self.capabilities
    }

    pub fn has_capability(&self, capability: Capability) -> bool {
        self.capabilities.contains(&capability)
    }
}
