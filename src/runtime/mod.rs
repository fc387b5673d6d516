//! State machine runtime.
//!
//! A [`Session`] binds an immutable [`StateTree`](crate::core::StateTree) to
//! a parameter store and an [`ActionSink`]. Each call to
//! [`Session::execute`] is one evaluation tick:
//!
//! 1. Collect the outgoing transitions of the active state
//! 2. Keep the ones whose guard holds against the parameter store
//! 3. In manual mode, stop here; only forced transitions move the session
//! 4. Otherwise take the lowest priority (earliest declared on ties)
//! 5. Enter its target and dispatch the entry action
//!
//! # Modes
//!
//! Automatic mode suits simple reactive behavior. Manual mode uses the tree
//! as a catalog of named phases: the host looks states up by tag and drives
//! every change through [`Session::force_transition`].

mod error;
mod session;
mod sink;

pub use error::RuntimeError;
pub use session::{Session, StepOutcome};
pub use sink::{ActionSink, FnSink, NoopSink};
