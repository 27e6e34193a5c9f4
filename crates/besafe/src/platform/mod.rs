//! Platform capability layer.
//!
//! The workflow depends on three capabilities it does not implement: photo
//! capture, text-message sending and the screen-off broadcast. Each is a
//! trait here, with a host simulation and an external-command backend.
//! None of them is guaranteed to succeed; callers degrade instead of failing.

pub mod command;
pub mod permissions;
pub mod screen;
pub mod simulated;

use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::mpsc;
use tracing::warn;

use crate::config::{BackendKind, CaptureConfig, SmsConfig};
use crate::controller::ControllerEvent;
use crate::trigger::TriggerEvent;

pub use command::{CommandCamera, CommandSender};
pub use permissions::{Permission, PermissionSet, PermissionStatus};
pub use screen::{ManualScreenOff, ScreenOffSource, ScreenOffTrigger};
#[cfg(unix)]
pub use screen::SignalScreenOff;
pub use simulated::{SentMessage, SimulatedCamera, SimulatedSender};

/// Errors reported by a capability call.
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// The capability does not exist on this platform or is not set up.
    #[error("capability unavailable: {0}")]
    Unavailable(String),

    /// The platform refused the call for lack of a permission.
    #[error("permission denied: {0}")]
    PermissionDenied(String),

    /// The call started but did not complete successfully.
    #[error("capability failed: {0}")]
    Failed(String),

    /// An I/O error while talking to the platform.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One-shot callback for a capture hand-off.
///
/// Consumed by [`CaptureCompletion::complete`], so a capture can report at
/// most once. Completion is queued on the controller, never run inline.
#[derive(Debug)]
pub struct CaptureCompletion {
    tx: mpsc::UnboundedSender<ControllerEvent>,
    trigger: TriggerEvent,
}

impl CaptureCompletion {
    pub(crate) fn new(tx: mpsc::UnboundedSender<ControllerEvent>, trigger: TriggerEvent) -> Self {
        Self { tx, trigger }
    }

    /// The trigger this capture belongs to.
    #[must_use]
    pub fn trigger(&self) -> TriggerEvent {
        self.trigger
    }

    /// Report the final photo path, or `None` if no photo was taken.
    pub fn complete(self, path: Option<PathBuf>) {
        let event = ControllerEvent::CaptureComplete {
            path,
            trigger: self.trigger,
        };
        if self.tx.send(event).is_err() {
            warn!("Capture completed after the controller shut down");
        }
    }
}

/// Camera capability.
pub trait PhotoCapture: Send + Sync + std::fmt::Debug {
    /// Name of this backend (for logging).
    fn name(&self) -> &'static str;

    /// Hand off a capture into `destination`.
    ///
    /// Returns as soon as the capture is under way. The backend calls
    /// `completion` later with the final path, or may never call it at all.
    ///
    /// # Errors
    ///
    /// Returns an error if the capture could not be started.
    fn take_picture(
        &self,
        destination: &Path,
        completion: CaptureCompletion,
    ) -> Result<(), CapabilityError>;
}

/// Text-message capability.
pub trait TextMessageSender: Send + Sync + std::fmt::Debug {
    /// Name of this backend (for logging).
    fn name(&self) -> &'static str;

    /// Send `body` to one recipient.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform rejected or failed the send.
    fn send_text(&self, recipient: &str, body: &str) -> Result<(), CapabilityError>;

    /// Whether `send_text` waits on something slow, like an external
    /// program. Dispatches through such a sender leave the event loop.
    fn blocks(&self) -> bool {
        false
    }
}

/// Build the configured camera backend.
#[must_use]
pub fn camera_from_config(config: &CaptureConfig) -> Box<dyn PhotoCapture> {
    match config.backend {
        BackendKind::Simulated => Box::new(SimulatedCamera::new()),
        BackendKind::Command => Box::new(CommandCamera::new(config.command.clone())),
    }
}

/// Build the configured text-message backend.
#[must_use]
pub fn sender_from_config(config: &SmsConfig) -> Arc<dyn TextMessageSender> {
    match config.backend {
        BackendKind::Simulated => Arc::new(SimulatedSender::new()),
        BackendKind::Command => Arc::new(CommandSender::new(config.command.clone())),
    }
}

/// Get the platform name.
#[must_use]
pub fn platform_name() -> &'static str {
    if cfg!(target_os = "android") {
        "Android"
    } else if cfg!(target_os = "linux") {
        "Linux"
    } else if cfg!(target_os = "macos") {
        "macOS"
    } else {
        "other"
    }
}
