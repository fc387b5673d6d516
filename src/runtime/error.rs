//! Runtime lookup errors.

use crate::core::StateId;
use thiserror::Error;

/// Errors that can occur while driving a session
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum RuntimeError {
    #[error("State {0} not found in the state tree")]
    NotFound(StateId),
}
