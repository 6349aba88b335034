//! Builder API for assembling state machines.
//!
//! [`StateMachineBuilder`] collects the initial state, filters and state
//! transformer, and hands them to a machine in one `build` call.

pub mod machine;

pub use machine::StateMachineBuilder;

use crate::core::{force_state, ForceResult, StateRef};

/// Create a decision function that forces `target` whenever `predicate`
/// holds for the trigger and current state.
///
/// # Example
///
/// ```
/// use trigger_fsm::builder::redirect_when;
/// use trigger_fsm::core::CallbackState;
/// use trigger_fsm::machine::{Outcome, StateMachine};
///
/// let halted = CallbackState::<i32>::named("Halted").into_ref();
/// let running = CallbackState::<i32>::named("Running").into_ref();
///
/// let mut machine = StateMachine::with_initial(running)
///     .add_filter_fn(redirect_when(|t: &i32, _| *t < 0, halted.clone()))
///     .build();
///
/// assert_eq!(machine.step(&-1), Outcome::Forced);
/// assert!(machine.current_state().is_same(&halted));
/// ```
pub fn redirect_when<T, P>(
    predicate: P,
    target: StateRef<T>,
) -> impl Fn(&T, &StateRef<T>) -> Option<ForceResult<T>> + Send + Sync + 'static
where
    T: 'static,
    P: Fn(&T, &StateRef<T>) -> bool + Send + Sync + 'static,
{
    move |trigger: &T, current: &StateRef<T>| {
        predicate(trigger, current).then(|| force_state(target.clone()))
    }
}
