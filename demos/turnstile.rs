//! Coin-Operated Turnstile
//!
//! This demo drives a classic two-state turnstile and layers the machine's
//! extension points on top of it.
//!
//! Key concepts:
//! - States configured with closures
//! - A maintenance filter that forces the machine out of service
//! - A per-state filter override so the service state ignores the filter
//! - A transformer that decorates every adopted state with a visit counter
//!
//! Run with: RUST_LOG=debug cargo run --example turnstile

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, OnceLock};
use tracing_subscriber::EnvFilter;
use trigger_fsm::builder::redirect_when;
use trigger_fsm::core::{CallbackState, FilterRef, State, StateRef};
use trigger_fsm::machine::StateMachine;

#[derive(Debug, Clone, Copy, PartialEq)]
enum Input {
    Coin,
    Push,
    Repaired,
}

/// Counts entries into the wrapped state.
struct Visited {
    inner: StateRef<Input>,
    visits: AtomicUsize,
}

impl State<Input> for Visited {
    fn name(&self) -> &str {
        self.inner.name()
    }

    fn trigger(&self, trigger: &Input) -> Option<StateRef<Input>> {
        self.inner.as_state().trigger(trigger)
    }

    fn enter(&self, trigger: &Input) {
        let visits = self.visits.fetch_add(1, Ordering::SeqCst) + 1;
        println!("  entered {} (visit {visits} of this adoption)", self.name());
        self.inner.as_state().enter(trigger);
    }

    fn exit(&self, trigger: &Input) {
        self.inner.as_state().exit(trigger);
    }

    fn force_exit(&self, trigger: &Input) {
        self.inner.as_state().force_exit(trigger);
    }

    fn transform_filters(&self, filters: &[FilterRef<Input>]) -> Option<Vec<FilterRef<Input>>> {
        self.inner.as_state().transform_filters(filters)
    }
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    println!("=== Turnstile State Machine ===\n");

    let broken = Arc::new(AtomicBool::new(false));
    let locked_slot: Arc<OnceLock<StateRef<Input>>> = Arc::default();

    let unlocked = CallbackState::named("Unlocked")
        .on_trigger({
            let locked_slot = locked_slot.clone();
            move |input: &Input| match input {
                Input::Push => locked_slot.get().cloned(),
                _ => None,
            }
        })
        .on_exit(|_| println!("  arm rotates"))
        .into_ref();

    let locked = CallbackState::named("Locked")
        .on_trigger({
            let unlocked = unlocked.clone();
            move |input: &Input| match input {
                Input::Coin => Some(unlocked.clone()),
                _ => None,
            }
        })
        .on_force_exit(|_| println!("  locked turnstile taken out of service"))
        .into_ref();
    let _ = locked_slot.set(locked.clone());

    let out_of_service = CallbackState::named("OutOfService")
        .on_trigger({
            let locked = locked.clone();
            let broken = broken.clone();
            move |input: &Input| match input {
                Input::Repaired => {
                    broken.store(false, Ordering::SeqCst);
                    Some(locked.clone())
                }
                _ => None,
            }
        })
        // the maintenance filter must not keep redirecting while repairs run
        .on_transform_filters(|_| Some(Vec::new()))
        .into_ref();

    let mut machine = StateMachine::with_initial(locked)
        .name("turnstile")
        .add_filter_fn(redirect_when(
            {
                let broken = broken.clone();
                move |_: &Input, _: &StateRef<Input>| broken.load(Ordering::SeqCst)
            },
            out_of_service,
        ))
        .set_state_transformer(|state| {
            StateRef::new(Visited {
                inner: state,
                visits: AtomicUsize::new(0),
            })
        })
        .build();

    let script = [
        Input::Push,
        Input::Coin,
        Input::Push,
        Input::Coin,
        Input::Coin,
    ];
    for input in script {
        let outcome = machine.step(&input);
        println!("{input:?} -> {outcome:?}, now {}", machine.current_state().name());
    }

    println!("\nSensor reports a jam");
    broken.store(true, Ordering::SeqCst);
    for input in [Input::Push, Input::Coin, Input::Repaired, Input::Coin] {
        let outcome = machine.step(&input);
        println!("{input:?} -> {outcome:?}, now {}", machine.current_state().name());
    }

    println!("\n=== Demo Complete ===");
}
