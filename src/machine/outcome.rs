//! What a single `fire` did.

use serde::{Deserialize, Serialize};

/// Path taken by one trigger through the machine.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    /// Nothing decided; no hook ran.
    Ignored,

    /// The resolved state was the current one; only its entry hook ran.
    Reentered,

    /// A filter redirected the machine; the old state was force-exited.
    Forced,

    /// The state's own handler moved the machine to another state.
    Transitioned,
}

impl Outcome {
    /// Whether a new state was adopted as current.
    pub fn changed_state(&self) -> bool {
        matches!(self, Self::Forced | Self::Transitioned)
    }
}
