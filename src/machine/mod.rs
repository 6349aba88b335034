//! The trigger-driven state machine and its shared handle.
//!
//! # Key Concepts
//!
//! - **Fire**: one trigger runs the filter pass, then the current state's
//!   handler, then exactly the hooks the resolved path calls for
//! - **Outcome**: which of the four paths a trigger took
//! - **Shared handle**: lock-guarded access for multi-threaded callers

mod error;
#[allow(clippy::module_inception)]
mod machine;
mod outcome;
mod shared;

pub use error::FireError;
pub use machine::{StateMachine, StateTransformer};
pub use outcome::Outcome;
pub use shared::SharedStateMachine;
