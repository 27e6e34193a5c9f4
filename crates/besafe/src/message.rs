//! Composition of the text sent to emergency contacts.

use std::path::Path;

use crate::trigger::TriggerEvent;

/// Reference used when the captured photo cannot be found.
pub const PHOTO_UNAVAILABLE: &str = "file://unavailable";

/// Location text; the prototype never resolves a position.
pub const LOCATION_UNAVAILABLE: &str = "location_unavailable";

/// Message sent when the camera could not be started.
pub const PHOTO_FAILED_TEXT: &str = "Emergency! (photo failed)";

/// Message sent by the test action.
pub const TEST_TEXT: &str = "Be Safe test message from app";

/// Where the captured photo can be found, as quoted in the message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PhotoReference {
    /// The photo exists at this path.
    File(String),
    /// Capture finished without a usable file.
    Unavailable,
}

impl PhotoReference {
    /// Resolve a capture outcome into a reference.
    ///
    /// Only a path naming an existing file is referenced; anything else
    /// degrades to [`PhotoReference::Unavailable`]. A path that is not valid
    /// UTF-8 cannot be quoted exactly in a text message and degrades too.
    #[must_use]
    pub fn resolve(path: Option<&Path>) -> Self {
        match path.filter(|p| p.is_file()).and_then(Path::to_str) {
            Some(p) => Self::File(p.to_string()),
            None => Self::Unavailable,
        }
    }

    /// The URI quoted in the message.
    #[must_use]
    pub fn uri(&self) -> String {
        match self {
            Self::File(path) => format!("file://{path}"),
            Self::Unavailable => PHOTO_UNAVAILABLE.to_string(),
        }
    }
}

/// A composed, non-empty message body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationMessage {
    body: String,
}

impl NotificationMessage {
    /// Message for a completed capture.
    #[must_use]
    pub fn emergency(photo: &PhotoReference, trigger: TriggerEvent) -> Self {
        let headline = match trigger {
            TriggerEvent::ScreenOff => "EMERGENCY! (screen off)",
            TriggerEvent::Manual | TriggerEvent::Test => "EMERGENCY!",
        };
        Self {
            body: format!(
                "{headline} Photo: {}\nLocation: {LOCATION_UNAVAILABLE}",
                photo.uri()
            ),
        }
    }

    /// Degraded message for a capture that could not be started.
    #[must_use]
    pub fn photo_failed() -> Self {
        Self {
            body: PHOTO_FAILED_TEXT.to_string(),
        }
    }

    /// Fixed test message.
    #[must_use]
    pub fn test() -> Self {
        Self {
            body: TEST_TEXT.to_string(),
        }
    }

    /// The text to send.
    #[must_use]
    pub fn body(&self) -> &str {
        &self.body
    }
}

impl std::fmt::Display for NotificationMessage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.body)
    }
}
