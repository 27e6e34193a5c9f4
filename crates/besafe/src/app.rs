//! Startup wiring: configuration in, running controller out.
//!
//! Startup problems (media directory, permissions, listener registration)
//! do not abort the app. They are collected in a [`StartupReport`] and
//! logged so the user can see why a later alert might degrade.

use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;
use tracing::{info, warn};

use crate::config::Config;
use crate::controller::EmergencyController;
use crate::dispatch::{NotificationDispatcher, RecipientList};
use crate::error::Error;
use crate::listener::{spawn_screen_off_listener, ListenerHandle};
use crate::media::MediaStore;
use crate::platform::{
    self, CapabilityError, PermissionSet, PhotoCapture, ScreenOffSource, TextMessageSender,
};

/// Diagnostics gathered while starting up.
#[derive(Debug, Default)]
pub struct StartupReport {
    /// Problems that did not stop startup.
    pub issues: Vec<Error>,
}

impl StartupReport {
    /// Whether startup was clean.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    fn record(&mut self, issue: Error) {
        warn!(error = %issue, "Startup issue");
        self.issues.push(issue);
    }
}

/// Summary of the wired app, for `status` output.
#[derive(Debug, Clone, Serialize)]
pub struct AppSummary {
    /// Platform name.
    pub platform: &'static str,
    /// Camera backend name.
    pub camera: &'static str,
    /// SMS backend name.
    pub sms: &'static str,
    /// Media directory.
    pub media_dir: PathBuf,
    /// Number of recipients.
    pub recipients: usize,
    /// Startup permission statuses.
    pub permissions: PermissionSet,
    /// Startup issues, rendered.
    pub issues: Vec<String>,
}

impl AppSummary {
    /// Render as pretty-printed JSON.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Json`] if serialization fails.
    pub fn to_json(&self) -> crate::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}

/// A wired controller plus its startup diagnostics.
#[derive(Debug)]
pub struct App {
    controller: EmergencyController,
    permissions: PermissionSet,
    report: StartupReport,
    listener_enabled: bool,
    camera_name: &'static str,
    sms_name: &'static str,
}

impl App {
    /// Wire the app with the backends named in `config`.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config,
            platform::camera_from_config(&config.capture),
            platform::sender_from_config(&config.sms),
        )
    }

    /// Wire the app with explicit backends.
    #[must_use]
    pub fn new(
        config: &Config,
        camera: Box<dyn PhotoCapture>,
        sender: Arc<dyn TextMessageSender>,
    ) -> Self {
        let mut report = StartupReport::default();

        let permissions = PermissionSet::request_host();
        for missing in permissions.missing_required() {
            report.record(missing);
        }

        let media = MediaStore::new(config.media_dir());
        if let Err(e) = media.ensure_dir() {
            report.record(e);
        }

        let camera_name = camera.name();
        let sms_name = sender.name();
        let recipients = RecipientList::new(config.contacts.recipients.iter().cloned());
        info!(
            platform = platform::platform_name(),
            camera = camera_name,
            sms = sms_name,
            recipients = recipients.len(),
            media_dir = %media.base_dir().display(),
            "Be Safe starting"
        );

        let dispatcher = NotificationDispatcher::new(recipients, sender);
        Self {
            controller: EmergencyController::new(media, dispatcher, camera),
            permissions,
            report,
            listener_enabled: config.listener.enabled,
            camera_name,
            sms_name,
        }
    }

    /// Register the platform's screen-off listener if enabled.
    ///
    /// Registration failure is recorded, not returned. Must be called from
    /// within a tokio runtime.
    pub fn start_screen_off_listener(&mut self) -> Option<ListenerHandle> {
        if !self.listener_enabled {
            info!("Screen-off listener disabled by configuration");
            return None;
        }
        self.start_listener_with(platform_screen_off_source())
    }

    /// Register `source` as the screen-off listener.
    pub fn start_listener_with(
        &mut self,
        source: Result<Box<dyn ScreenOffSource>, CapabilityError>,
    ) -> Option<ListenerHandle> {
        match source {
            Ok(source) => Some(spawn_screen_off_listener(
                source,
                self.controller.handle(),
            )),
            Err(e) => {
                self.report.record(Error::capability("screen-off", e));
                None
            }
        }
    }

    /// The controller.
    #[must_use]
    pub fn controller(&self) -> &EmergencyController {
        &self.controller
    }

    /// The controller, mutably.
    pub fn controller_mut(&mut self) -> &mut EmergencyController {
        &mut self.controller
    }

    /// Startup diagnostics.
    #[must_use]
    pub fn report(&self) -> &StartupReport {
        &self.report
    }

    /// Summary for display.
    #[must_use]
    pub fn summary(&self) -> AppSummary {
        AppSummary {
            platform: platform::platform_name(),
            camera: self.camera_name,
            sms: self.sms_name,
            media_dir: self.controller.media().base_dir().to_path_buf(),
            recipients: self.controller.recipient_count(),
            permissions: self.permissions.clone(),
            issues: self.report.issues.iter().map(ToString::to_string).collect(),
        }
    }

    /// Give up the wiring and keep the controller.
    #[must_use]
    pub fn into_controller(self) -> EmergencyController {
        self.controller
    }
}

#[cfg(unix)]
fn platform_screen_off_source() -> Result<Box<dyn ScreenOffSource>, CapabilityError> {
    Ok(Box::new(platform::SignalScreenOff::new()?))
}

#[cfg(not(unix))]
fn platform_screen_off_source() -> Result<Box<dyn ScreenOffSource>, CapabilityError> {
    Err(CapabilityError::Unavailable(
        "no screen-off broadcast on this platform".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::controller::Status;
    use crate::platform::{ManualScreenOff, SimulatedCamera, SimulatedSender};
    use crate::trigger::TriggerEvent;

    fn config_in(dir: &std::path::Path) -> Config {
        let mut config = Config::default();
        config.media.directory = Some(dir.join("BeSafeMedia"));
        config
    }

    #[test]
    fn test_from_config_creates_media_dir() {
        let dir = tempfile::tempdir().unwrap();
        let app = App::from_config(&config_in(dir.path()));

        assert!(dir.path().join("BeSafeMedia").is_dir());
        assert!(app.report().is_clean());

        let summary = app.summary();
        assert_eq!(summary.camera, "simulated");
        assert_eq!(summary.sms, "simulated");
        assert_eq!(summary.recipients, 4);
        assert!(summary.issues.is_empty());

        let json: serde_json::Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();
        assert_eq!(json["recipients"], 4);
        assert_eq!(json["camera"], "simulated");
    }

    #[test]
    fn test_unusable_media_dir_is_reported_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"x").unwrap();
        let mut config = Config::default();
        config.media.directory = Some(blocker.join("media"));

        let sender = SimulatedSender::new();
        let mut app = App::new(
            &config,
            Box::new(SimulatedCamera::new()),
            Arc::new(sender.clone()),
        );
        assert_eq!(app.report().issues.len(), 1);
        assert!(matches!(
            app.report().issues[0],
            Error::DirectoryCreate { .. }
        ));

        // The alert still goes out, without a photo
        app.controller_mut().trigger(TriggerEvent::Manual);
        app.controller_mut().process_pending();
        assert_eq!(app.controller().status(), Status::Notified);
        assert!(sender.sent()[0].body.contains("file://unavailable"));
    }

    #[tokio::test]
    async fn test_listener_registration_failure_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = App::from_config(&config_in(dir.path()));

        let listener = app.start_listener_with(Err(CapabilityError::Unavailable(
            "receiver refused".to_string(),
        )));
        assert!(listener.is_none());
        assert_eq!(app.report().issues.len(), 1);
        assert!(app.report().issues[0].to_string().contains("receiver refused"));
    }

    #[tokio::test]
    async fn test_disabled_listener_is_not_started() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = config_in(dir.path());
        config.listener.enabled = false;
        let mut app = App::from_config(&config);

        assert!(app.start_screen_off_listener().is_none());
        assert!(app.report().is_clean());
    }

    #[tokio::test]
    async fn test_manual_listener_reaches_controller() {
        let dir = tempfile::tempdir().unwrap();
        let sender = SimulatedSender::new();
        let mut app = App::new(
            &config_in(dir.path()),
            Box::new(SimulatedCamera::new()),
            Arc::new(sender.clone()),
        );

        let (trigger, source) = ManualScreenOff::channel();
        let listener = app.start_listener_with(Ok(Box::new(source))).unwrap();
        trigger.fire();
        drop(trigger);
        listener.join().await;

        let mut controller = app.into_controller();
        controller.process_pending();
        assert_eq!(sender.sent().len(), 4);
    }
}
