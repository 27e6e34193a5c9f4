//! The emergency workflow: trigger, capture, notify.
//!
//! The controller owns one event queue. Everything that can start or advance
//! the workflow (the primary action, the test action, a screen-off signal, a
//! capture completion) arrives as a [`ControllerEvent`] on that queue and is
//! handled on the controller's thread, so no locking is needed.
//!
//! ```text
//! Idle -> Triggering -> AwaitingCapture -> Notifying -> Idle
//!              \______________________________/
//!                capture could not be started
//! ```
//!
//! There is no cancellation and no timeout. A capture that never completes
//! leaves the controller in `AwaitingCapture`, and a shutdown requested
//! meanwhile waits for it: once a capture is handed off, its alert is sent.
//!
//! Dispatches through a sender that blocks (an external program per
//! recipient) run on tokio's blocking pool and report back through the
//! queue, so the event loop keeps serving the status label and listeners.

use std::path::PathBuf;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info, warn};

use crate::dispatch::{DispatchReport, NotificationDispatcher};
use crate::media::MediaStore;
use crate::message::{NotificationMessage, PhotoReference};
use crate::platform::{CaptureCompletion, PhotoCapture};
use crate::trigger::TriggerEvent;

/// Work queued on the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ControllerEvent {
    /// Start the workflow.
    Trigger(TriggerEvent),
    /// A capture handed off by [`EmergencyController::trigger`] finished.
    CaptureComplete {
        /// Final photo path, if the camera produced one.
        path: Option<PathBuf>,
        /// The trigger the capture belongs to.
        trigger: TriggerEvent,
    },
    /// A dispatch moved off the event loop finished.
    DispatchComplete {
        /// What the dispatcher reported.
        report: DispatchReport,
        /// Status to show if every send went through.
        success: Status,
    },
    /// Send the test message.
    TestNotify,
    /// Stop accepting triggers; [`EmergencyController::run`] returns once
    /// the work already in flight is done.
    Shutdown,
}

/// Where the workflow currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WorkflowState {
    /// Nothing in progress.
    #[default]
    Idle,
    /// A trigger is being handled.
    Triggering,
    /// The camera has the capture; waiting for its callback.
    AwaitingCapture,
    /// Sending to recipients.
    Notifying,
}

/// Text shown on the status label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Status {
    /// Nothing has happened yet.
    #[default]
    Idle,
    /// A trigger is being handled.
    Triggering,
    /// The camera was launched.
    CameraLaunched,
    /// Messages are going out.
    Sending,
    /// Emergency message sent after capture.
    Notified,
    /// Capture could not start; the degraded message was sent.
    PhotoFailedNotified,
    /// Test message sent.
    TestSent,
    /// At least one recipient could not be reached.
    SendFailed,
}

impl Status {
    /// The label text.
    #[must_use]
    pub fn text(self) -> &'static str {
        match self {
            Self::Idle => "Idle",
            Self::Triggering => "Triggering emergency...",
            Self::CameraLaunched => "Camera launched, please take photo",
            Self::Sending => "Sending SMS...",
            Self::Notified => "Emergency SMS sent (if permissions allowed)",
            Self::PhotoFailedNotified => "Photo failed; SMS sent",
            Self::TestSent => "Test SMS sent",
            Self::SendFailed => "SMS failed, check permissions",
        }
    }

    /// Whether this status reports a failed step.
    #[must_use]
    pub fn is_failure(self) -> bool {
        matches!(self, Self::PhotoFailedNotified | Self::SendFailed)
    }

    /// The full label, as displayed.
    #[must_use]
    pub fn label(self) -> String {
        format!("Be Safe — {}", self.text())
    }
}

impl std::fmt::Display for Status {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.text())
    }
}

/// Cloneable handle for queueing work on a controller.
///
/// Listeners and front ends hold one of these instead of looking the
/// controller up at run time.
#[derive(Debug, Clone)]
pub struct ControllerHandle {
    tx: mpsc::UnboundedSender<ControllerEvent>,
}

impl ControllerHandle {
    /// Queue a trigger. Returns `false` if the controller is gone.
    pub fn trigger(&self, source: TriggerEvent) -> bool {
        self.send(ControllerEvent::Trigger(source))
    }

    /// Queue the test message. Returns `false` if the controller is gone.
    pub fn test_notify(&self) -> bool {
        self.send(ControllerEvent::TestNotify)
    }

    /// Ask the controller's run loop to stop after the alert in progress.
    pub fn shutdown(&self) -> bool {
        self.send(ControllerEvent::Shutdown)
    }

    fn send(&self, event: ControllerEvent) -> bool {
        let delivered = self.tx.send(event).is_ok();
        if !delivered {
            warn!("Controller is no longer running");
        }
        delivered
    }
}

/// Orchestrates capture and notification.
#[derive(Debug)]
pub struct EmergencyController {
    media: MediaStore,
    dispatcher: NotificationDispatcher,
    camera: Box<dyn PhotoCapture>,
    state: WorkflowState,
    status_tx: watch::Sender<Status>,
    tx: mpsc::UnboundedSender<ControllerEvent>,
    rx: mpsc::UnboundedReceiver<ControllerEvent>,
    dispatches: u64,
    last_dispatch: Option<DispatchReport>,
    captures_pending: usize,
    dispatches_pending: usize,
    closing: bool,
}

impl EmergencyController {
    /// Create an idle controller.
    #[must_use]
    pub fn new(
        media: MediaStore,
        dispatcher: NotificationDispatcher,
        camera: Box<dyn PhotoCapture>,
    ) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        let (status_tx, _) = watch::channel(Status::Idle);
        Self {
            media,
            dispatcher,
            camera,
            state: WorkflowState::Idle,
            status_tx,
            tx,
            rx,
            dispatches: 0,
            last_dispatch: None,
            captures_pending: 0,
            dispatches_pending: 0,
            closing: false,
        }
    }

    /// A handle for queueing work on this controller.
    #[must_use]
    pub fn handle(&self) -> ControllerHandle {
        ControllerHandle {
            tx: self.tx.clone(),
        }
    }

    /// Watch status changes.
    #[must_use]
    pub fn subscribe_status(&self) -> watch::Receiver<Status> {
        self.status_tx.subscribe()
    }

    /// Current status.
    #[must_use]
    pub fn status(&self) -> Status {
        *self.status_tx.borrow()
    }

    /// Current workflow state.
    #[must_use]
    pub fn state(&self) -> WorkflowState {
        self.state
    }

    /// Number of completed dispatches since creation.
    #[must_use]
    pub fn dispatches(&self) -> u64 {
        self.dispatches
    }

    /// Report of the most recent dispatch.
    #[must_use]
    pub fn last_dispatch(&self) -> Option<&DispatchReport> {
        self.last_dispatch.as_ref()
    }

    /// Number of configured recipients.
    #[must_use]
    pub fn recipient_count(&self) -> usize {
        self.dispatcher.recipients().len()
    }

    /// The media store paths are allocated from.
    #[must_use]
    pub fn media(&self) -> &MediaStore {
        &self.media
    }

    /// Start the workflow.
    ///
    /// Hands the capture off and returns; the rest happens when the capture
    /// completion is processed. If the capture cannot be started, the
    /// degraded message is sent immediately.
    pub fn trigger(&mut self, source: TriggerEvent) {
        if !source.captures_photo() {
            self.test_notify();
            return;
        }
        if self.state != WorkflowState::Idle {
            debug!(state = ?self.state, "Trigger while a previous attempt is in progress");
        }

        info!(%source, "Emergency triggered");
        self.state = WorkflowState::Triggering;
        self.set_status(Status::Triggering);

        let destination = self.media.new_capture_path();
        let completion = CaptureCompletion::new(self.tx.clone(), source);

        match self.camera.take_picture(&destination, completion) {
            Ok(()) => {
                debug!(
                    camera = self.camera.name(),
                    path = %destination.display(),
                    "Capture handed off"
                );
                self.captures_pending += 1;
                self.state = WorkflowState::AwaitingCapture;
                self.set_status(Status::CameraLaunched);
            }
            Err(e) => {
                warn!(camera = self.camera.name(), error = %e, "Camera error, sending without photo");
                self.dispatch(NotificationMessage::photo_failed(), Status::PhotoFailedNotified);
            }
        }
    }

    /// Compose and send the emergency message for a finished capture.
    pub fn on_capture_complete(&mut self, path: Option<PathBuf>, source: TriggerEvent) {
        self.captures_pending = self.captures_pending.saturating_sub(1);

        let photo = PhotoReference::resolve(path.as_deref());
        if photo == PhotoReference::Unavailable {
            warn!(?path, "Captured photo is unavailable");
        }
        self.dispatch(NotificationMessage::emergency(&photo, source), Status::Notified);
    }

    /// Send the fixed test message, skipping capture entirely.
    pub fn test_notify(&mut self) {
        info!("Sending test message");
        self.dispatch(NotificationMessage::test(), Status::TestSent);
    }

    /// Handle one queued event.
    ///
    /// Returns `false` once a shutdown was requested and nothing is in
    /// flight. Triggers queued after the shutdown are dropped; captures and
    /// dispatches already started still complete.
    pub fn handle_event(&mut self, event: ControllerEvent) -> bool {
        match event {
            ControllerEvent::Trigger(source) if self.closing => {
                warn!(%source, "Shutting down, trigger ignored");
            }
            ControllerEvent::TestNotify if self.closing => {
                warn!("Shutting down, test message ignored");
            }
            ControllerEvent::Trigger(source) => self.trigger(source),
            ControllerEvent::CaptureComplete { path, trigger } => {
                self.on_capture_complete(path, trigger);
            }
            ControllerEvent::DispatchComplete { report, success } => {
                self.dispatches_pending = self.dispatches_pending.saturating_sub(1);
                self.record_dispatch(report, success);
            }
            ControllerEvent::TestNotify => self.test_notify(),
            ControllerEvent::Shutdown => {
                if self.state != WorkflowState::Idle {
                    info!(state = ?self.state, "Shutdown requested, finishing the alert in progress");
                }
                self.closing = true;
            }
        }
        !(self.closing && self.state == WorkflowState::Idle)
    }

    /// Handle everything already queued, including completions queued while
    /// handling. Returns the number of events handled.
    pub fn process_pending(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.rx.try_recv() {
            handled += 1;
            if !self.handle_event(event) {
                break;
            }
        }
        handled
    }

    /// Wait for the next event and handle it. Returns `false` once shut
    /// down.
    pub async fn process_next(&mut self) -> bool {
        match self.rx.recv().await {
            Some(event) => self.handle_event(event),
            None => false,
        }
    }

    /// Handle events until a shutdown is requested and the work in flight
    /// has finished.
    ///
    /// The controller keeps a sender of its own for capture completions, so
    /// the queue never closes by itself: only [`ControllerHandle::shutdown`]
    /// ends the loop.
    pub async fn run(mut self) {
        info!("Emergency controller running");
        while self.process_next().await {}
        info!("Emergency controller stopped");
    }

    fn dispatch(&mut self, message: NotificationMessage, success: Status) {
        self.state = WorkflowState::Notifying;
        self.set_status(Status::Sending);

        if self.dispatcher.blocks() {
            if let Ok(runtime) = tokio::runtime::Handle::try_current() {
                debug!("Dispatching on the blocking pool");
                self.dispatches_pending += 1;
                let dispatcher = self.dispatcher.clone();
                let tx = self.tx.clone();
                runtime.spawn_blocking(move || {
                    let report = dispatcher.send_all(&message);
                    // Receiver is gone only if the controller was dropped
                    let _ = tx.send(ControllerEvent::DispatchComplete { report, success });
                });
                return;
            }
        }

        let report = self.dispatcher.send_all(&message);
        self.record_dispatch(report, success);
    }

    fn record_dispatch(&mut self, report: DispatchReport, success: Status) {
        self.dispatches += 1;
        let status = if report.all_sent() {
            success
        } else {
            Status::SendFailed
        };
        self.last_dispatch = Some(report);
        self.finish(status);
    }

    fn finish(&mut self, status: Status) {
        self.set_status(status);
        self.state = if self.dispatches_pending > 0 {
            WorkflowState::Notifying
        } else if self.captures_pending > 0 {
            WorkflowState::AwaitingCapture
        } else {
            WorkflowState::Idle
        };
    }

    fn set_status(&self, status: Status) {
        debug!(status = status.text(), "Status changed");
        self.status_tx.send_replace(status);
    }
}
