//! Thread-safe handle around a [`StateMachine`].
//!
//! `StateMachine::fire` needs exclusive access, so sharing a machine across
//! threads needs a lock around the whole call. `SharedStateMachine` is that
//! lock, plus two checks a bare `Mutex` would not give:
//!
//! - a hook that fires its own machine gets [`FireError::Reentrant`] instead
//!   of deadlocking;
//! - after a hook panics, later calls get [`FireError::Poisoned`] until the
//!   caller acknowledges the partial transition with
//!   [`clear_poison`](SharedStateMachine::clear_poison).
//!
//! The lock is `std::sync::Mutex` rather than `parking_lot`, because
//! [`FireError::Poisoned`] is built on its poisoning.

use crate::core::StateRef;
use crate::machine::error::FireError;
use crate::machine::machine::StateMachine;
use crate::machine::outcome::Outcome;
use std::cell::RefCell;
use std::sync::{Arc, Mutex, MutexGuard};

thread_local! {
    static FIRING: RefCell<Vec<usize>> = const { RefCell::new(Vec::new()) };
}

/// Marks a machine as firing on the current thread until dropped.
struct FiringGuard {
    key: usize,
}

impl FiringGuard {
    fn enter(key: usize) -> Result<Self, FireError> {
        FIRING.with(|firing| {
            let mut firing = firing.borrow_mut();
            if firing.contains(&key) {
                return Err(FireError::Reentrant);
            }
            firing.push(key);
            Ok(Self { key })
        })
    }

    fn is_firing(key: usize) -> bool {
        FIRING.with(|firing| firing.borrow().contains(&key))
    }
}

impl Drop for FiringGuard {
    fn drop(&mut self) {
        let _ = FIRING.try_with(|firing| firing.borrow_mut().retain(|k| *k != self.key));
    }
}

/// Cloneable, lock-guarded state machine handle.
///
/// # Example
///
/// ```rust
/// use trigger_fsm::core::CallbackState;
/// use trigger_fsm::machine::{Outcome, SharedStateMachine, StateMachine};
///
/// let idle = CallbackState::<u32>::named("Idle").into_ref();
/// let shared = SharedStateMachine::new(StateMachine::with_initial(idle).build());
///
/// let worker = shared.clone();
/// let outcome = std::thread::spawn(move || worker.fire(&1)).join().unwrap();
///
/// assert_eq!(outcome, Ok(Outcome::Ignored));
/// ```
pub struct SharedStateMachine<T> {
    inner: Arc<Mutex<StateMachine<T>>>,
}

impl<T> SharedStateMachine<T> {
    /// Wrap a built machine.
    pub fn new(machine: StateMachine<T>) -> Self {
        Self {
            inner: Arc::new(Mutex::new(machine)),
        }
    }

    fn key(&self) -> usize {
        Arc::as_ptr(&self.inner) as usize
    }

    fn lock(&self) -> Result<MutexGuard<'_, StateMachine<T>>, FireError> {
        self.inner.lock().map_err(|_| {
            tracing::warn!("refusing to use poisoned state machine");
            FireError::Poisoned
        })
    }

    /// Fire `trigger`, waiting for any other thread's call to finish first.
    pub fn fire(&self, trigger: &T) -> Result<Outcome, FireError> {
        let _firing = FiringGuard::enter(self.key())?;
        let mut machine = self.lock()?;
        Ok(machine.step(trigger))
    }

    /// Snapshot of the current state. Fails when called from a hook of
    /// this machine.
    pub fn current_state(&self) -> Result<StateRef<T>, FireError> {
        if FiringGuard::is_firing(self.key()) {
            return Err(FireError::Reentrant);
        }
        Ok(self.lock()?.current_state().clone())
    }

    /// Whether a hook panicked during an earlier call.
    pub fn is_poisoned(&self) -> bool {
        self.inner.is_poisoned()
    }

    /// Accept whatever state a panicking hook left behind and resume.
    pub fn clear_poison(&self) {
        self.inner.clear_poison();
    }
}

impl<T> Clone for SharedStateMachine<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T> From<StateMachine<T>> for SharedStateMachine<T> {
    fn from(machine: StateMachine<T>) -> Self {
        Self::new(machine)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::CallbackState;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::OnceLock;
    use std::thread;

    #[derive(Debug, Clone, Copy, PartialEq)]
    enum Trigger {
        Tick,
        Move,
    }

    #[test]
    fn serializes_fires_across_threads() {
        let entries = Arc::new(AtomicUsize::new(0));
        let slot: Arc<OnceLock<StateRef<Trigger>>> = Arc::default();
        let ticking = CallbackState::named("Ticking")
            .on_trigger({
                let slot = slot.clone();
                move |_: &Trigger| slot.get().cloned()
            })
            .on_entry({
                let entries = entries.clone();
                move |_| {
                    entries.fetch_add(1, Ordering::SeqCst);
                }
            })
            .into_ref();
        let _ = slot.set(ticking.clone());

        let shared = SharedStateMachine::new(StateMachine::with_initial(ticking).build());

        let handles: Vec<_> = (0..4)
            .map(|_| {
                let shared = shared.clone();
                thread::spawn(move || {
                    for _ in 0..50 {
                        assert_eq!(shared.fire(&Trigger::Tick), Ok(Outcome::Reentered));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(entries.load(Ordering::SeqCst), 200);
    }

    #[test]
    fn nested_fire_from_hook_is_rejected() {
        let slot: Arc<OnceLock<SharedStateMachine<Trigger>>> = Arc::default();
        let nested: Arc<Mutex<Vec<Result<Outcome, FireError>>>> = Arc::default();

        let next = CallbackState::named("Next")
            .on_entry({
                let slot = slot.clone();
                let nested = nested.clone();
                move |_: &Trigger| {
                    if let Some(shared) = slot.get() {
                        nested.lock().unwrap().push(shared.fire(&Trigger::Tick));
                        nested
                            .lock()
                            .unwrap()
                            .push(shared.current_state().map(|_| Outcome::Ignored));
                    }
                }
            })
            .into_ref();
        let initial = CallbackState::named("Initial")
            .on_trigger({
                let next = next.clone();
                move |_: &Trigger| Some(next.clone())
            })
            .into_ref();

        let shared = SharedStateMachine::new(StateMachine::with_initial(initial).build());
        let _ = slot.set(shared.clone());

        assert_eq!(shared.fire(&Trigger::Move), Ok(Outcome::Transitioned));
        assert_eq!(
            *nested.lock().unwrap(),
            vec![Err(FireError::Reentrant), Err(FireError::Reentrant)]
        );

        // the guard is released once the outer call returns
        assert!(shared.current_state().unwrap().is_same(&next));
    }

    #[test]
    fn panicking_hook_poisons_until_cleared() {
        let next = CallbackState::<Trigger>::named("Next")
            .on_entry(|_| panic!("entry failed"))
            .into_ref();
        let initial = CallbackState::named("Initial")
            .on_trigger({
                let next = next.clone();
                move |t: &Trigger| (*t == Trigger::Move).then(|| next.clone())
            })
            .into_ref();

        let shared: SharedStateMachine<Trigger> = StateMachine::with_initial(initial).build().into();

        let result = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
            let _ = shared.fire(&Trigger::Move);
        }));
        assert!(result.is_err());

        assert!(shared.is_poisoned());
        assert_eq!(shared.fire(&Trigger::Tick), Err(FireError::Poisoned));
        assert_eq!(shared.current_state().unwrap_err(), FireError::Poisoned);

        shared.clear_poison();
        assert!(!shared.is_poisoned());
        assert!(shared.current_state().unwrap().is_same(&next));
        assert_eq!(shared.fire(&Trigger::Tick), Ok(Outcome::Ignored));
    }

    #[test]
    fn separate_machines_do_not_block_each_other() {
        let inner_outcome: Arc<Mutex<Option<Result<Outcome, FireError>>>> = Arc::default();
        let other = SharedStateMachine::new(
            StateMachine::with_initial(CallbackState::<Trigger>::named("Other").into_ref()).build(),
        );

        let entering = CallbackState::named("Entering")
            .on_entry({
                let other = other.clone();
                let inner_outcome = inner_outcome.clone();
                move |t: &Trigger| {
                    *inner_outcome.lock().unwrap() = Some(other.fire(t));
                }
            })
            .into_ref();
        let initial = CallbackState::named("Initial")
            .on_trigger({
                let entering = entering.clone();
                move |_: &Trigger| Some(entering.clone())
            })
            .into_ref();

        let shared = SharedStateMachine::new(StateMachine::with_initial(initial).build());

        assert_eq!(shared.fire(&Trigger::Move), Ok(Outcome::Transitioned));
        assert_eq!(*inner_outcome.lock().unwrap(), Some(Ok(Outcome::Ignored)));
    }
}
