//! Host simulation of the camera and text-message capabilities.
//!
//! Used wherever the real device facilities are absent. The camera writes a
//! synthetic file; the sender only records what would have been sent.

use std::path::Path;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::{debug, info, warn};

use super::{CapabilityError, CaptureCompletion, PhotoCapture, TextMessageSender};

/// Bytes written in place of a real photo.
const SIMULATED_PHOTO: &[u8] = b"SIMULATED";

/// Camera that writes a placeholder file immediately.
#[derive(Debug, Default)]
pub struct SimulatedCamera;

impl SimulatedCamera {
    /// Create a simulated camera.
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

impl PhotoCapture for SimulatedCamera {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn take_picture(
        &self,
        destination: &Path,
        completion: CaptureCompletion,
    ) -> Result<(), CapabilityError> {
        // A failed write behaves like a camera that returned nothing.
        match std::fs::write(destination, SIMULATED_PHOTO) {
            Ok(()) => {
                debug!(path = %destination.display(), "Wrote simulated photo");
                completion.complete(Some(destination.to_path_buf()));
            }
            Err(e) => {
                warn!(path = %destination.display(), error = %e, "Simulated photo write failed");
                completion.complete(None);
            }
        }
        Ok(())
    }
}

/// A message the simulated sender would have delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SentMessage {
    /// Recipient number.
    pub recipient: String,
    /// Message body.
    pub body: String,
    /// When the send was recorded.
    pub sent_at: DateTime<Utc>,
}

/// Sender that records messages instead of delivering them.
///
/// Clones share the same record, so a test can keep one clone and hand the
/// other to the dispatcher.
#[derive(Debug, Clone, Default)]
pub struct SimulatedSender {
    sent: Arc<Mutex<Vec<SentMessage>>>,
}

impl SimulatedSender {
    /// Create a sender with an empty record.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything recorded so far, in send order.
    #[must_use]
    pub fn sent(&self) -> Vec<SentMessage> {
        self.sent
            .lock()
            .map(|sent| sent.clone())
            .unwrap_or_default()
    }
}

impl TextMessageSender for SimulatedSender {
    fn name(&self) -> &'static str {
        "simulated"
    }

    fn send_text(&self, recipient: &str, body: &str) -> Result<(), CapabilityError> {
        info!(recipient, body, "SIMULATED SMS");
        let mut sent = self
            .sent
            .lock()
            .map_err(|_| CapabilityError::Failed("simulated outbox poisoned".to_string()))?;
        sent.push(SentMessage {
            recipient: recipient.to_string(),
            body: body.to_string(),
            sent_at: Utc::now(),
        });
        Ok(())
    }
}
