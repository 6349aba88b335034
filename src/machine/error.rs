//! Errors surfaced by the shared machine handle.

use thiserror::Error;

/// Errors that can occur when firing through a [`SharedStateMachine`].
///
/// [`SharedStateMachine`]: crate::machine::SharedStateMachine
#[derive(Debug, Clone, Copy, Error, PartialEq, Eq)]
pub enum FireError {
    #[error("Machine fired from inside one of its own hooks")]
    Reentrant,

    #[error("Machine poisoned by a panicking hook; current state may reflect a partial transition")]
    Poisoned,
}
