//! Why an emergency workflow started.

use serde::{Deserialize, Serialize};

/// The event that started one workflow invocation.
///
/// Carried from the trigger through capture completion so the message
/// wording can reflect how the alert was raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TriggerEvent {
    /// The user pressed the emergency action.
    Manual,
    /// The platform reported the screen turning off.
    ScreenOff,
    /// The secondary test action; never captures a photo.
    Test,
}

impl TriggerEvent {
    /// Whether this trigger runs the capture step.
    #[must_use]
    pub fn captures_photo(self) -> bool {
        !matches!(self, Self::Test)
    }
}

impl std::fmt::Display for TriggerEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Manual => write!(f, "manual"),
            Self::ScreenOff => write!(f, "screen_off"),
            Self::Test => write!(f, "test"),
        }
    }
}
