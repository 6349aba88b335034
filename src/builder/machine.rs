//! Builder for constructing state machines.

use crate::core::{Filter, FilterRef, ForceResult, StateRef};
use crate::machine::{StateMachine, StateTransformer};
use std::sync::Arc;

/// Staged configuration for a [`StateMachine`].
///
/// Created by [`StateMachine::with_initial`]. Filters keep insertion order;
/// the transformer defaults to identity.
pub struct StateMachineBuilder<T> {
    name: String,
    initial: StateRef<T>,
    filters: Vec<FilterRef<T>>,
    transformer: StateTransformer<T>,
}

impl<T: 'static> StateMachineBuilder<T> {
    /// Create a new builder around the initial state.
    pub fn new(initial: StateRef<T>) -> Self {
        Self {
            name: "fsm".to_string(),
            initial,
            filters: Vec::new(),
            transformer: Arc::new(|state: StateRef<T>| state),
        }
    }

    /// Label used in log spans.
    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Replace the filter list.
    pub fn set_filters(mut self, filters: Vec<FilterRef<T>>) -> Self {
        self.filters = filters;
        self
    }

    /// Append one filter.
    pub fn add_filter<F: Filter<T> + 'static>(mut self, filter: F) -> Self {
        self.filters.push(FilterRef::new(filter));
        self
    }

    /// Append filters after the ones already configured.
    pub fn add_filters<I>(mut self, filters: I) -> Self
    where
        I: IntoIterator<Item = FilterRef<T>>,
    {
        self.filters.extend(filters);
        self
    }

    /// Append a bare decision function, wrapped into a filter.
    pub fn add_filter_fn<F>(mut self, decide: F) -> Self
    where
        F: Fn(&T, &StateRef<T>) -> Option<ForceResult<T>> + Send + Sync + 'static,
    {
        self.filters.push(FilterRef::from_fn(decide));
        self
    }

    /// Append several decision functions of one type, each wrapped into
    /// its own filter.
    pub fn add_filter_fns<I, F>(mut self, decides: I) -> Self
    where
        I: IntoIterator<Item = F>,
        F: Fn(&T, &StateRef<T>) -> Option<ForceResult<T>> + Send + Sync + 'static,
    {
        self.filters.extend(decides.into_iter().map(FilterRef::from_fn));
        self
    }

    /// Set the function applied to every adopted state.
    pub fn set_state_transformer<F>(mut self, transformer: F) -> Self
    where
        F: Fn(StateRef<T>) -> StateRef<T> + Send + Sync + 'static,
    {
        self.transformer = Arc::new(transformer);
        self
    }

    /// Build the machine. The transformer is applied to the initial state
    /// here, exactly once.
    pub fn build(self) -> StateMachine<T> {
        StateMachine::from_parts(self.name, self.initial, self.filters, self.transformer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{force_state, CallbackState, FnFilter};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn pass(_: &u8, _: &StateRef<u8>) -> Option<ForceResult<u8>> {
        None
    }

    fn decline(_: &u8, _: &StateRef<u8>) -> Option<ForceResult<u8>> {
        Some(ForceResult::no_force())
    }

    #[test]
    fn builder_composes_filters_in_order() {
        let initial = CallbackState::<u8>::named("Initial").into_ref();
        let first = FilterRef::from_fn(pass);
        let second = FilterRef::new(FnFilter::named("second", pass));
        let third = FilterRef::new(FnFilter::named("third", pass));

        let machine = StateMachine::with_initial(initial)
            .set_filters(vec![first.clone()])
            .add_filters([second.clone(), third.clone()])
            .add_filter_fns([pass as fn(&u8, &StateRef<u8>) -> Option<ForceResult<u8>>, decline])
            .build();

        let filters = machine.filters();
        assert_eq!(filters.len(), 5);
        assert!(filters[0].is_same(&first));
        assert!(filters[1].is_same(&second));
        assert!(filters[2].is_same(&third));
    }

    #[test]
    fn set_filters_replaces_earlier_filters() {
        let initial = CallbackState::<u8>::named("Initial").into_ref();
        let kept = FilterRef::from_fn(pass);

        let machine = StateMachine::with_initial(initial)
            .add_filter_fn(pass)
            .add_filter(FnFilter::new(decline))
            .set_filters(vec![kept.clone()])
            .build();

        assert_eq!(machine.filters().len(), 1);
        assert!(machine.filters()[0].is_same(&kept));
    }

    #[test]
    fn build_applies_transformer_exactly_once() {
        let calls = Arc::new(AtomicUsize::new(0));
        let initial = CallbackState::<u8>::named("Initial").into_ref();
        let replacement = CallbackState::<u8>::named("Replacement").into_ref();

        let machine = StateMachine::with_initial(initial)
            .set_state_transformer({
                let calls = calls.clone();
                let replacement = replacement.clone();
                move |_| {
                    calls.fetch_add(1, Ordering::SeqCst);
                    replacement.clone()
                }
            })
            .build();

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(machine.current_state().is_same(&replacement));
    }

    #[test]
    fn builder_keeps_the_configured_transformer() {
        let initial = CallbackState::<u8>::named("Initial").into_ref();
        let machine = StateMachine::with_initial(initial.clone())
            .name("gate")
            .build();

        let transformed = (machine.transformer())(initial.clone());
        assert!(transformed.is_same(&initial));
        assert_eq!(machine.name(), "gate");
    }

    #[test]
    fn first_forcing_filter_is_the_one_built_first() {
        let initial = CallbackState::<u8>::named("Initial").into_ref();
        let a = CallbackState::<u8>::named("A").into_ref();
        let b = CallbackState::<u8>::named("B").into_ref();

        let mut machine = StateMachine::with_initial(initial)
            .add_filter_fn({
                let a = a.clone();
                move |_: &u8, _: &StateRef<u8>| Some(force_state(a.clone()))
            })
            .add_filter_fn({
                let b = b.clone();
                move |_: &u8, _: &StateRef<u8>| Some(force_state(b.clone()))
            })
            .build();

        machine.fire(&0);
        assert!(machine.current_state().is_same(&a));
    }
}
