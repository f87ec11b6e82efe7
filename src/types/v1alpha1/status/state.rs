use k8s_openapi::schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use strum::Display;

/// Lifecycle phase of a maintenance window, owned by the reconciler.
///
/// `Pending` is the only valid initial value. Enabling moves through
/// `ScalingDown` to `Enabled`; disabling moves through `ScalingUp` to
/// `Disabled`.
#[derive(Default, Deserialize, Serialize, Clone, Debug, JsonSchema, Display, PartialEq, Eq)]
pub enum State {
    #[strum(to_string = "Pending")]
    #[default]
    Pending,

    #[strum(to_string = "ScalingUp")]
    ScalingUp,

    #[strum(to_string = "ScalingDown")]
    ScalingDown,

    #[strum(to_string = "Enabled")]
    Enabled,

    #[strum(to_string = "Disabled")]
    Disabled,
}

impl State {
    /// Whether a follow-up pass is needed to confirm convergence.
    pub fn is_transitional(&self) -> bool {
        matches!(self, State::ScalingUp | State::ScalingDown)
    }
}
