//! Core automaton building blocks.
//!
//! This module contains the leaf abstractions the machine is composed of:
//! - States via the `State` trait, or closures via `CallbackState`
//! - Filters via the `Filter` trait, or closures via `FnFilter`
//! - Identity handles (`StateRef`, `FilterRef`) compared by allocation,
//!   never by value

mod filter;
mod state;

pub use filter::{force_state, DecideFn, Filter, FilterRef, FnFilter, ForceResult};
pub use state::{CallbackState, State, StateRef};
