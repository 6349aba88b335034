//! States of a trigger-driven automaton.
//!
//! A state is a bundle of behavior: what to do with a trigger, and what
//! to run when the machine enters, leaves, or is forced out of it. States
//! are built either by implementing [`State`] directly or by configuring a
//! [`CallbackState`] with closures.

use super::filter::FilterRef;
use std::fmt;
use std::sync::Arc;

/// Behavior of one automaton vertex.
///
/// Every hook has a no-op default, so an implementation only overrides
/// what it needs. Hooks are invoked by the machine through [`StateRef`],
/// never directly.
///
/// # Example
///
/// ```rust
/// use trigger_fsm::core::{State, StateRef};
///
/// struct Locked;
///
/// impl State<&'static str> for Locked {
///     fn name(&self) -> &str {
///         "Locked"
///     }
///
///     fn trigger(&self, _trigger: &&'static str) -> Option<StateRef<&'static str>> {
///         // stays put on every trigger
///         None
///     }
/// }
///
/// let locked = StateRef::new(Locked);
/// assert_eq!(locked.name(), "Locked");
/// ```
pub trait State<T>: Send + Sync {
    /// Name used in diagnostics.
    ///
    /// Defaults to the unqualified type name of the implementor.
    fn name(&self) -> &str {
        short_type_name(std::any::type_name::<Self>())
    }

    /// Decide the next state for `trigger`.
    ///
    /// `None` means "no transition": the machine ignores the trigger and
    /// runs no hooks. Returning the current state itself means reentry.
    fn trigger(&self, _trigger: &T) -> Option<StateRef<T>> {
        None
    }

    /// Runs when the machine enters (or reenters) this state.
    fn enter(&self, _trigger: &T) {}

    /// Runs when a regular transition leaves this state.
    fn exit(&self, _trigger: &T) {}

    /// Runs when a filter forces the machine out of this state.
    fn force_exit(&self, _trigger: &T) {}

    /// Override which filters apply while this state is current.
    ///
    /// `None` keeps the machine's filter list. `Some(vec![])` disables all
    /// filters for this state.
    fn transform_filters(&self, _filters: &[FilterRef<T>]) -> Option<Vec<FilterRef<T>>> {
        None
    }
}

fn short_type_name(full: &str) -> &str {
    let base = full.split('<').next().unwrap_or(full);
    base.rsplit("::").next().unwrap_or(base)
}

/// Shared handle to a state.
///
/// Two handles denote the same state only if they point at the same
/// allocation; see [`StateRef::is_same`]. There is intentionally no
/// `PartialEq`, so value equality can never stand in for identity.
pub struct StateRef<T> {
    inner: Arc<dyn State<T>>,
}

impl<T: 'static> StateRef<T> {
    /// Wrap a state implementation into a new identity.
    pub fn new<S: State<T> + 'static>(state: S) -> Self {
        Self {
            inner: Arc::new(state),
        }
    }

    /// Wrap an already shared state without creating a new identity.
    pub fn from_arc(inner: Arc<dyn State<T>>) -> Self {
        Self { inner }
    }
}

impl<T> StateRef<T> {
    /// Identity comparison.
    pub fn is_same(&self, other: &StateRef<T>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Name reported by the wrapped state.
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Access the underlying state.
    pub fn as_state(&self) -> &dyn State<T> {
        self.inner.as_ref()
    }

    fn address(&self) -> usize {
        Arc::as_ptr(&self.inner) as *const () as usize
    }

    pub(crate) fn handle_trigger(&self, trigger: &T) -> Option<StateRef<T>> {
        tracing::debug!(state = %self, "== handling trigger");
        self.inner.trigger(trigger)
    }

    pub(crate) fn handle_entry(&self, trigger: &T) {
        tracing::debug!(state = %self, "-> entering");
        self.inner.enter(trigger);
    }

    pub(crate) fn handle_exit(&self, trigger: &T) {
        tracing::debug!(state = %self, "<- exiting");
        self.inner.exit(trigger);
    }

    pub(crate) fn handle_force_exit(&self, trigger: &T) {
        tracing::debug!(state = %self, "<< force exiting");
        self.inner.force_exit(trigger);
    }

    pub(crate) fn transform_filters(&self, filters: &[FilterRef<T>]) -> Option<Vec<FilterRef<T>>> {
        self.inner.transform_filters(filters)
    }
}

impl<T> Clone for StateRef<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Display for StateRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = self.name();
        if name.is_empty() {
            write!(f, "{:X}", self.address())
        } else {
            write!(f, "{} {:X}", name, self.address())
        }
    }
}

impl<T> fmt::Debug for StateRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StateRef").field(&format_args!("{}", self)).finish()
    }
}

type TriggerFn<T> = Box<dyn Fn(&T) -> Option<StateRef<T>> + Send + Sync>;
type HookFn<T> = Box<dyn Fn(&T) + Send + Sync>;
type FilterOverrideFn<T> =
    Box<dyn Fn(&[FilterRef<T>]) -> Option<Vec<FilterRef<T>>> + Send + Sync>;

/// A state assembled from closures.
///
/// Unset callbacks behave like the [`State`] defaults.
///
/// # Example
///
/// ```rust
/// use trigger_fsm::core::{CallbackState, StateRef};
///
/// let idle: StateRef<u32> = CallbackState::<u32>::named("Idle")
///     .on_entry(|n| println!("idle after {n}"))
///     .into_ref();
///
/// let busy = CallbackState::named("Busy")
///     .on_trigger({
///         let idle = idle.clone();
///         move |n: &u32| (*n == 0).then(|| idle.clone())
///     })
///     .into_ref();
///
/// assert_eq!(busy.name(), "Busy");
/// ```
pub struct CallbackState<T> {
    name: String,
    on_trigger: Option<TriggerFn<T>>,
    on_entry: Option<HookFn<T>>,
    on_exit: Option<HookFn<T>>,
    on_force_exit: Option<HookFn<T>>,
    on_transform_filters: Option<FilterOverrideFn<T>>,
}

impl<T: 'static> CallbackState<T> {
    /// Create an inert state named `CallbackState`.
    pub fn new() -> Self {
        Self::named("CallbackState")
    }

    /// Create an inert state with the given name.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            on_trigger: None,
            on_entry: None,
            on_exit: None,
            on_force_exit: None,
            on_transform_filters: None,
        }
    }

    /// Set the handler that decides the next state.
    pub fn on_trigger<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) -> Option<StateRef<T>> + Send + Sync + 'static,
    {
        self.on_trigger = Some(Box::new(f));
        self
    }

    /// Set the hook run when the state is entered or reentered.
    pub fn on_entry<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.on_entry = Some(Box::new(f));
        self
    }

    /// Set the hook run on a normal transition away.
    pub fn on_exit<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.on_exit = Some(Box::new(f));
        self
    }

    /// Set the hook run when a filter forces the machine away.
    pub fn on_force_exit<F>(mut self, f: F) -> Self
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.on_force_exit = Some(Box::new(f));
        self
    }

    /// Set the per-state override of the machine's filter list.
    pub fn on_transform_filters<F>(mut self, f: F) -> Self
    where
        F: Fn(&[FilterRef<T>]) -> Option<Vec<FilterRef<T>>> + Send + Sync + 'static,
    {
        self.on_transform_filters = Some(Box::new(f));
        self
    }

    /// Finish configuration and give the state its identity.
    pub fn into_ref(self) -> StateRef<T> {
        StateRef::new(self)
    }
}

impl<T: 'static> Default for CallbackState<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> State<T> for CallbackState<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn trigger(&self, trigger: &T) -> Option<StateRef<T>> {
        self.on_trigger.as_ref().and_then(|f| f(trigger))
    }

    fn enter(&self, trigger: &T) {
        if let Some(f) = &self.on_entry {
            f(trigger);
        }
    }

    fn exit(&self, trigger: &T) {
        if let Some(f) = &self.on_exit {
            f(trigger);
        }
    }

    fn force_exit(&self, trigger: &T) {
        if let Some(f) = &self.on_force_exit {
            f(trigger);
        }
    }

    fn transform_filters(&self, filters: &[FilterRef<T>]) -> Option<Vec<FilterRef<T>>> {
        self.on_transform_filters.as_ref().and_then(|f| f(filters))
    }
}
