//! End-to-end workflow scenarios against the public API.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use besafe::platform::{
    CapabilityError, CaptureCompletion, ManualScreenOff, PhotoCapture, SimulatedCamera,
    SimulatedSender, TextMessageSender,
};
use besafe::{App, Config, Status, TriggerEvent, WorkflowState};

const NUMBERS: [&str; 4] = [
    "+917387224241",
    "+917666929196",
    "+919021776161",
    "+917028830712",
];

fn config_in(dir: &Path) -> Config {
    let mut config = Config::default();
    config.media.directory = Some(dir.to_path_buf());
    config
}

fn only_file(dir: &Path) -> PathBuf {
    let mut entries: Vec<_> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().path())
        .collect();
    assert_eq!(entries.len(), 1, "expected exactly one capture");
    entries.remove(0)
}

#[derive(Debug)]
struct ThrowingCamera;

impl PhotoCapture for ThrowingCamera {
    fn name(&self) -> &'static str {
        "throwing"
    }

    fn take_picture(
        &self,
        _destination: &Path,
        _completion: CaptureCompletion,
    ) -> Result<(), CapabilityError> {
        Err(CapabilityError::PermissionDenied("CAMERA".to_string()))
    }
}

/// Records every call and fails the second one.
#[derive(Debug, Default)]
struct SecondCallFails {
    calls: Mutex<Vec<String>>,
}

impl TextMessageSender for SecondCallFails {
    fn name(&self) -> &'static str {
        "second-call-fails"
    }

    fn send_text(&self, recipient: &str, _body: &str) -> Result<(), CapabilityError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push(recipient.to_string());
        if calls.len() == 2 {
            Err(CapabilityError::Failed("radio off".to_string()))
        } else {
            Ok(())
        }
    }
}

#[test]
fn manual_trigger_sends_photo_path_to_all_contacts() {
    let dir = tempfile::tempdir().unwrap();
    let sender = SimulatedSender::new();
    let mut app = App::new(
        &config_in(dir.path()),
        Box::new(SimulatedCamera::new()),
        Arc::new(sender.clone()),
    );
    let controller = app.controller_mut();

    controller.trigger(TriggerEvent::Manual);
    controller.process_pending();

    let photo = only_file(dir.path());
    assert!(!std::fs::read(&photo).unwrap().is_empty());
    assert_eq!(controller.state(), WorkflowState::Idle);
    assert_eq!(controller.status(), Status::Notified);

    let sent = sender.sent();
    let recipients: Vec<_> = sent.iter().map(|m| m.recipient.as_str()).collect();
    assert_eq!(recipients, NUMBERS);
    for message in &sent {
        assert!(message.body.contains("EMERGENCY!"));
        assert!(message.body.contains(&photo.display().to_string()));
        assert!(message.body.ends_with("Location: location_unavailable"));
    }
}

#[test]
fn camera_failure_sends_degraded_message() {
    let dir = tempfile::tempdir().unwrap();
    let sender = SimulatedSender::new();
    let mut app = App::new(
        &config_in(dir.path()),
        Box::new(ThrowingCamera),
        Arc::new(sender.clone()),
    );
    let controller = app.controller_mut();

    controller.trigger(TriggerEvent::Manual);

    assert_eq!(controller.status(), Status::PhotoFailedNotified);
    assert!(controller.status().is_failure());
    assert_eq!(controller.dispatches(), 1);
    let sent = sender.sent();
    assert_eq!(sent.len(), 4);
    assert!(sent.iter().all(|m| m.body == "Emergency! (photo failed)"));
}

#[test]
fn test_notify_never_allocates_a_capture() {
    let dir = tempfile::tempdir().unwrap();
    let sender = SimulatedSender::new();
    let mut app = App::new(
        &config_in(dir.path()),
        Box::new(SimulatedCamera::new()),
        Arc::new(sender.clone()),
    );
    let controller = app.controller_mut();

    controller.test_notify();
    controller.process_pending();

    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 0);
    assert_eq!(controller.status(), Status::TestSent);
    assert!(sender
        .sent()
        .iter()
        .all(|m| m.body == "Be Safe test message from app"));
}

#[test]
fn partial_send_failure_attempts_everyone_and_reports_generic_failure() {
    let dir = tempfile::tempdir().unwrap();
    let sender = Arc::new(SecondCallFails::default());
    let mut app = App::new(
        &config_in(dir.path()),
        Box::new(SimulatedCamera::new()),
        sender.clone(),
    );
    let controller = app.controller_mut();

    controller.trigger(TriggerEvent::Manual);
    controller.process_pending();

    assert_eq!(*sender.calls.lock().unwrap(), NUMBERS);
    assert_eq!(controller.status(), Status::SendFailed);
    assert_eq!(controller.dispatches(), 1);
    let report = controller.last_dispatch().unwrap();
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].recipient, NUMBERS[1]);
}

#[tokio::test]
async fn screen_off_signal_runs_the_same_workflow() {
    let dir = tempfile::tempdir().unwrap();
    let sender = SimulatedSender::new();
    let mut app = App::new(
        &config_in(dir.path()),
        Box::new(SimulatedCamera::new()),
        Arc::new(sender.clone()),
    );

    let (screen, source) = ManualScreenOff::channel();
    let listener = app.start_listener_with(Ok(Box::new(source))).unwrap();
    screen.fire();
    drop(screen);
    assert_eq!(listener.join().await, Some(1));

    let mut controller = app.into_controller();
    controller.process_pending();

    only_file(dir.path());
    assert_eq!(controller.status(), Status::Notified);
    let sent = sender.sent();
    assert_eq!(sent.len(), 4);
    assert!(sent[0].body.starts_with("EMERGENCY! (screen off)"));
}

#[tokio::test]
async fn quitting_right_after_the_emergency_action_still_notifies() {
    let dir = tempfile::tempdir().unwrap();
    let sender = SimulatedSender::new();
    let app = App::new(
        &config_in(dir.path()),
        Box::new(SimulatedCamera::new()),
        Arc::new(sender.clone()),
    );
    let controller = app.into_controller();
    let handle = controller.handle();
    let mut status = controller.subscribe_status();

    handle.trigger(TriggerEvent::Manual);
    handle.shutdown();
    controller.run().await;

    only_file(dir.path());
    assert_eq!(*status.borrow_and_update(), Status::Notified);
    let recipients: Vec<_> = sender.sent().into_iter().map(|m| m.recipient).collect();
    assert_eq!(recipients, NUMBERS);
}
