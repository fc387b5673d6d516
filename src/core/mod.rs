//! Core model of the state machine.
//!
//! This module contains the side-effect free pieces the runtime is built on:
//! - The parameter store holding named conditions
//! - Guard expressions evaluated against that store
//! - States, transitions, and the validated state tree
//! - Bounded transition history

mod guard;
mod history;
mod params;
mod state;
mod tree;

pub use guard::{CompareOp, Guard};
pub use history::{TransitionCause, TransitionHistory, TransitionRecord};
pub use params::{ParameterStore, Value};
pub use state::{Capability, EntryTag, State, StateId};
pub use tree::{StateTree, Transition};
