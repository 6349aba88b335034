//! Trigger-driven state machine.

use crate::builder::StateMachineBuilder;
use crate::core::{FilterRef, StateRef};
use crate::machine::outcome::Outcome;
use std::fmt;
use std::sync::Arc;

/// Function applied to every state the moment it is adopted as current.
pub type StateTransformer<T> = Arc<dyn Fn(StateRef<T>) -> StateRef<T> + Send + Sync>;

/// State machine advanced by external triggers.
///
/// Built with [`StateMachine::with_initial`]. After construction only the
/// current-state slot changes, and only inside [`fire`](Self::fire).
///
/// `fire` takes `&mut self`, so a hook cannot fire the machine it is running
/// in. Hooks that panic unwind through `fire` untouched; whatever state was
/// installed before the panic stays installed. See
/// [`SharedStateMachine`](crate::machine::SharedStateMachine) for a handle
/// that makes that condition observable.
pub struct StateMachine<T> {
    name: String,
    state: StateRef<T>,
    filters: Vec<FilterRef<T>>,
    transformer: StateTransformer<T>,
}

impl<T: 'static> StateMachine<T> {
    /// Start building a machine from its initial state.
    pub fn with_initial(initial: StateRef<T>) -> StateMachineBuilder<T> {
        StateMachineBuilder::new(initial)
    }

    pub(crate) fn from_parts(
        name: String,
        initial: StateRef<T>,
        filters: Vec<FilterRef<T>>,
        transformer: StateTransformer<T>,
    ) -> Self {
        let state = transformer(initial);
        tracing::debug!(machine = %name, state = %state, filters = filters.len(), "machine built");
        Self {
            name,
            state,
            filters,
            transformer,
        }
    }
}

impl<T> StateMachine<T> {
    /// Feed one trigger to the machine.
    ///
    /// Returns the machine so calls can be chained.
    pub fn fire(&mut self, trigger: &T) -> &mut Self {
        self.step(trigger);
        self
    }

    /// Feed one trigger to the machine and report the path it took.
    ///
    /// Filters run first against the current state. The first filter that
    /// forces a state force-exits the current one and installs the
    /// transformed target; the current state's handler is then skipped.
    /// Otherwise the current state's handler decides. A resolved state that
    /// is the current instance is reentered without exit or transform.
    ///
    /// A filter that forces the current instance still force-exits it and
    /// runs it through the transformer before it is entered again.
    pub fn step(&mut self, trigger: &T) -> Outcome {
        let _span = tracing::debug_span!("fire", machine = %self.name).entered();

        let forced = self.run_filters(trigger);
        let was_forced = forced.is_some();

        let next = match forced {
            Some(state) => Some(state),
            None => self.state.handle_trigger(trigger),
        };

        let Some(next) = next else {
            tracing::debug!(state = %self.state, "trigger ignored");
            return Outcome::Ignored;
        };

        if next.is_same(&self.state) {
            next.handle_entry(trigger);
            if was_forced {
                Outcome::Forced
            } else {
                Outcome::Reentered
            }
        } else {
            self.state.handle_exit(trigger);
            let next = (self.transformer)(next);
            self.state = next.clone();
            next.handle_entry(trigger);
            Outcome::Transitioned
        }
    }

    /// Run the filter pass; on a forced redirect, install and return the
    /// transformed target.
    fn run_filters(&mut self, trigger: &T) -> Option<StateRef<T>> {
        let overridden = self.state.transform_filters(&self.filters);
        let active: &[FilterRef<T>] = match &overridden {
            Some(filters) => filters,
            None => &self.filters,
        };

        for filter in active {
            let Some(result) = filter.handle_filter(trigger, &self.state) else {
                continue;
            };

            if let Some(forced) = result.into_forced_state() {
                tracing::debug!(filter = %filter, target = %forced, "forcing state");
                self.state.handle_force_exit(trigger);
                self.state = (self.transformer)(forced);
                return Some(self.state.clone());
            }
        }

        None
    }

    /// State the machine is in now, as installed after transformation.
    pub fn current_state(&self) -> &StateRef<T> {
        &self.state
    }

    /// Filters in the order they are evaluated.
    pub fn filters(&self) -> &[FilterRef<T>] {
        &self.filters
    }

    /// Transformer applied to every adopted state.
    pub fn transformer(&self) -> &StateTransformer<T> {
        &self.transformer
    }

    /// Label used in log spans.
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl<T> fmt::Debug for StateMachine<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StateMachine")
            .field("name", &self.name)
            .field("state", &self.state)
            .field("filters", &self.filters)
            .finish_non_exhaustive()
    }
}
