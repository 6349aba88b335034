//! Pre-transition filters.
//!
//! Filters run before the current state's own trigger handler and may
//! redirect the machine to an arbitrary state. The first filter that forces
//! a state wins; later filters and the state's handler are skipped.

use super::state::StateRef;
use std::fmt;
use std::sync::Arc;

/// Decision produced by a filter that chose to act.
///
/// A filter returning `None` opted out. A filter returning
/// `Some(ForceResult::no_force())` looked at the trigger and decided not to
/// redirect. Both leave control flow untouched, but they stay distinct values.
pub struct ForceResult<T> {
    forced_state: Option<StateRef<T>>,
}

impl<T> ForceResult<T> {
    /// Redirect the machine to `state`.
    pub fn force_state(state: StateRef<T>) -> Self {
        Self {
            forced_state: Some(state),
        }
    }

    /// Decided, but without forcing a transition.
    pub fn no_force() -> Self {
        Self { forced_state: None }
    }

    /// The state to force, if any.
    pub fn forced_state(&self) -> Option<&StateRef<T>> {
        self.forced_state.as_ref()
    }

    /// Consume the result, yielding the state to force.
    pub fn into_forced_state(self) -> Option<StateRef<T>> {
        self.forced_state
    }
}

impl<T> Default for ForceResult<T> {
    fn default() -> Self {
        Self::no_force()
    }
}

impl<T> Clone for ForceResult<T> {
    fn clone(&self) -> Self {
        Self {
            forced_state: self.forced_state.clone(),
        }
    }
}

impl<T> fmt::Debug for ForceResult<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ForceResult")
            .field("forced_state", &self.forced_state)
            .finish()
    }
}

/// Shorthand for [`ForceResult::force_state`].
///
/// # Example
///
/// ```rust
/// use trigger_fsm::core::{force_state, CallbackState};
///
/// let fallback = CallbackState::<u8>::named("Fallback").into_ref();
/// let result = force_state(fallback.clone());
///
/// assert!(result.forced_state().unwrap().is_same(&fallback));
/// ```
pub fn force_state<T>(state: StateRef<T>) -> ForceResult<T> {
    ForceResult::force_state(state)
}

/// Pre-transition interceptor.
pub trait Filter<T>: Send + Sync {
    fn name(&self) -> &str {
        "Filter"
    }

    /// Inspect `trigger` against the `current` state.
    fn filter(&self, trigger: &T, current: &StateRef<T>) -> Option<ForceResult<T>>;
}

/// Signature of a bare filter decision function.
pub type DecideFn<T> = dyn Fn(&T, &StateRef<T>) -> Option<ForceResult<T>> + Send + Sync;

/// A filter backed by a decision closure.
pub struct FnFilter<T> {
    name: String,
    decide: Box<DecideFn<T>>,
}

impl<T> FnFilter<T> {
    /// Wrap `decide` under the default filter name.
    pub fn new<F>(decide: F) -> Self
    where
        F: Fn(&T, &StateRef<T>) -> Option<ForceResult<T>> + Send + Sync + 'static,
    {
        Self::named("FnFilter", decide)
    }

    /// Wrap `decide` under a name used in logs.
    pub fn named<F>(name: impl Into<String>, decide: F) -> Self
    where
        F: Fn(&T, &StateRef<T>) -> Option<ForceResult<T>> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            decide: Box::new(decide),
        }
    }
}

impl<T> Filter<T> for FnFilter<T> {
    fn name(&self) -> &str {
        &self.name
    }

    fn filter(&self, trigger: &T, current: &StateRef<T>) -> Option<ForceResult<T>> {
        (self.decide)(trigger, current)
    }
}

/// Shared handle to a filter.
pub struct FilterRef<T> {
    inner: Arc<dyn Filter<T>>,
}

impl<T: 'static> FilterRef<T> {
    /// Wrap a filter implementation into a new identity.
    pub fn new<F: Filter<T> + 'static>(filter: F) -> Self {
        Self {
            inner: Arc::new(filter),
        }
    }

    /// Wrap a bare decision function.
    pub fn from_fn<F>(decide: F) -> Self
    where
        F: Fn(&T, &StateRef<T>) -> Option<ForceResult<T>> + Send + Sync + 'static,
    {
        Self::new(FnFilter::new(decide))
    }
}

impl<T> FilterRef<T> {
    /// Identity comparison.
    pub fn is_same(&self, other: &FilterRef<T>) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    /// Name reported by the wrapped filter.
    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub(crate) fn handle_filter(&self, trigger: &T, current: &StateRef<T>) -> Option<ForceResult<T>> {
        tracing::trace!(filter = %self, state = %current, "filtering");
        self.inner.filter(trigger, current)
    }
}

impl<T> Clone for FilterRef<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> fmt::Display for FilterRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let address = Arc::as_ptr(&self.inner) as *const () as usize;
        write!(f, "{} {:X}", self.name(), address)
    }
}

impl<T> fmt::Debug for FilterRef<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("FilterRef").field(&format_args!("{}", self)).finish()
    }
}
