//! Trigger FSM: a finite state machine driven by external triggers
//!
//! States are behavior bundles rather than values. Each trigger fed to the
//! machine first passes through an ordered list of filters, any of which may
//! force the machine into another state; otherwise the current state decides
//! where to go. Entry, exit and force-exit hooks run in a fixed order, and a
//! transformer can decorate every state the moment it becomes current.
//!
//! # Core Concepts
//!
//! - **State**: hooks for trigger handling, entry, exit and forced exit,
//!   via the `State` trait or closures on `CallbackState`
//! - **Filter**: pre-transition interceptors that may redirect the machine
//! - **StateMachine**: holds the current state and resolves each trigger
//! - **Identity**: states are compared by instance (`StateRef::is_same`);
//!   resolving to the current instance is a reentry
//!
//! # Example
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use trigger_fsm::core::{force_state, CallbackState, StateRef};
//! use trigger_fsm::machine::{Outcome, StateMachine};
//!
//! #[derive(Debug, PartialEq)]
//! enum Door {
//!     Open,
//!     Close,
//!     Alarm,
//! }
//!
//! let log = Arc::new(Mutex::new(Vec::new()));
//!
//! let lockdown = CallbackState::named("Lockdown").into_ref();
//! let opened = CallbackState::named("Opened")
//!     .on_entry({
//!         let log = log.clone();
//!         move |_: &Door| log.lock().unwrap().push("opened")
//!     })
//!     .into_ref();
//! let closed = CallbackState::named("Closed")
//!     .on_trigger({
//!         let opened = opened.clone();
//!         move |t: &Door| (*t == Door::Open).then(|| opened.clone())
//!     })
//!     .on_exit({
//!         let log = log.clone();
//!         move |_| log.lock().unwrap().push("closed exit")
//!     })
//!     .into_ref();
//!
//! let mut machine = StateMachine::with_initial(closed)
//!     .add_filter_fn({
//!         let lockdown = lockdown.clone();
//!         move |t: &Door, _: &StateRef<Door>| {
//!             (*t == Door::Alarm).then(|| force_state(lockdown.clone()))
//!         }
//!     })
//!     .build();
//!
//! assert_eq!(machine.step(&Door::Close), Outcome::Ignored);
//! assert_eq!(machine.step(&Door::Open), Outcome::Transitioned);
//! assert_eq!(machine.step(&Door::Alarm), Outcome::Forced);
//! assert!(machine.current_state().is_same(&lockdown));
//! assert_eq!(*log.lock().unwrap(), vec!["closed exit", "opened"]);
//! ```

pub mod builder;
pub mod core;
pub mod machine;

// Re-export commonly used types
pub use crate::builder::StateMachineBuilder;
pub use crate::core::{force_state, CallbackState, Filter, FilterRef, FnFilter, ForceResult, State, StateRef};
pub use crate::machine::{FireError, Outcome, SharedStateMachine, StateMachine};
