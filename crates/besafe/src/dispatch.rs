//! Delivery of one message to every emergency contact.

use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::message::NotificationMessage;
use crate::platform::TextMessageSender;

/// Ordered, fixed list of recipient numbers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipientList {
    numbers: Arc<[String]>,
}

impl RecipientList {
    /// Create a list from configured numbers.
    #[must_use]
    pub fn new(numbers: impl IntoIterator<Item = String>) -> Self {
        Self {
            numbers: numbers.into_iter().collect(),
        }
    }

    /// Iterate recipients in configured order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.numbers.iter().map(String::as_str)
    }

    /// Number of recipients.
    #[must_use]
    pub fn len(&self) -> usize {
        self.numbers.len()
    }

    /// Whether the list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.numbers.is_empty()
    }
}

/// A recipient whose send failed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SendFailure {
    /// The recipient.
    pub recipient: String,
    /// Why the send failed.
    pub reason: String,
}

/// Outcome of one [`NotificationDispatcher::send_all`] call.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DispatchReport {
    /// Recipients a send was attempted for, in order.
    pub attempted: Vec<String>,
    /// Recipients whose send failed.
    pub failures: Vec<SendFailure>,
}

impl DispatchReport {
    /// Whether every attempted send succeeded.
    #[must_use]
    pub fn all_sent(&self) -> bool {
        self.failures.is_empty()
    }

    /// Number of successful sends.
    #[must_use]
    pub fn sent_count(&self) -> usize {
        self.attempted.len() - self.failures.len()
    }
}

/// Sends a message to every configured recipient.
///
/// Not transactional: each recipient is attempted once, in order, and a
/// failure neither stops the loop nor rolls back earlier sends. There is no
/// retry.
#[derive(Debug, Clone)]
pub struct NotificationDispatcher {
    recipients: RecipientList,
    sender: Arc<dyn TextMessageSender>,
}

impl NotificationDispatcher {
    /// Create a dispatcher over `recipients` using `sender`.
    #[must_use]
    pub fn new(recipients: RecipientList, sender: Arc<dyn TextMessageSender>) -> Self {
        Self { recipients, sender }
    }

    /// The configured recipients.
    #[must_use]
    pub fn recipients(&self) -> &RecipientList {
        &self.recipients
    }

    /// Whether sends go through a blocking backend.
    #[must_use]
    pub fn blocks(&self) -> bool {
        self.sender.blocks()
    }

    /// Send `message` to every recipient.
    pub fn send_all(&self, message: &NotificationMessage) -> DispatchReport {
        let mut report = DispatchReport::default();

        for recipient in self.recipients.iter() {
            report.attempted.push(recipient.to_string());
            if let Err(e) = self.sender.send_text(recipient, message.body()) {
                warn!(recipient, backend = self.sender.name(), error = %e, "SMS send failed");
                report.failures.push(SendFailure {
                    recipient: recipient.to_string(),
                    reason: e.to_string(),
                });
            }
        }

        if report.all_sent() {
            info!(recipients = report.attempted.len(), "Dispatched message to all recipients");
        } else {
            warn!(
                sent = report.sent_count(),
                failed = report.failures.len(),
                "Dispatch finished with failures"
            );
        }
        report
    }
}
