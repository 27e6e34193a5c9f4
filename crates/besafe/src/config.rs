//! Configuration management for besafe.
//!
//! Defaults reproduce the prototype's fixed constants (the four emergency
//! contacts and the media directory). Figment layers an optional TOML file
//! and `BESAFE_` environment variables on top.

use std::path::PathBuf;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "besafe";

/// Media directory used on Android devices.
const ANDROID_MEDIA_DIR: &str = "/sdcard/BeSafeMedia";

/// Media directory name below the local data directory elsewhere.
const MEDIA_DIR_NAME: &str = "BeSafeMedia";

/// Placeholder substituted with the capture destination.
pub const PATH_PLACEHOLDER: &str = "{path}";

/// Placeholder substituted with the recipient number.
pub const RECIPIENT_PLACEHOLDER: &str = "{recipient}";

/// Placeholder substituted with the message body.
pub const BODY_PLACEHOLDER: &str = "{body}";

/// Accepted shape of a recipient phone number.
const RECIPIENT_PATTERN: &str = r"^\+?[0-9]{6,15}$";

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `BESAFE_`)
/// 2. TOML config file at `~/.config/besafe/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Emergency contacts.
    pub contacts: ContactsConfig,
    /// Where captured photos are written.
    pub media: MediaConfig,
    /// Photo capture backend.
    pub capture: CaptureConfig,
    /// Text message backend.
    pub sms: SmsConfig,
    /// Screen-off listener.
    pub listener: ListenerConfig,
}

/// Emergency contact configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContactsConfig {
    /// Phone numbers notified on every trigger, in order.
    pub recipients: Vec<String>,
}

/// Media storage configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MediaConfig {
    /// Directory for captured photos.
    /// Defaults to `/sdcard/BeSafeMedia` on Android and
    /// `~/.local/share/besafe/BeSafeMedia` elsewhere.
    pub directory: Option<PathBuf>,
}

/// Which implementation backs a platform capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackendKind {
    /// Host simulation: nothing leaves the machine.
    #[default]
    Simulated,
    /// Delegate to an external program.
    Command,
}

impl std::fmt::Display for BackendKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Simulated => write!(f, "simulated"),
            Self::Command => write!(f, "command"),
        }
    }
}

/// Photo capture configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptureConfig {
    /// Capture backend.
    pub backend: BackendKind,
    /// Program and arguments for the `command` backend.
    /// `{path}` is replaced with the destination file.
    pub command: Vec<String>,
}

/// Text message configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SmsConfig {
    /// Sending backend.
    pub backend: BackendKind,
    /// Program and arguments for the `command` backend.
    /// `{recipient}` and `{body}` are replaced per message.
    pub command: Vec<String>,
}

/// Screen-off listener configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Register the best-effort screen-off listener at startup.
    pub enabled: bool,
}

impl Default for ContactsConfig {
    fn default() -> Self {
        Self {
            recipients: default_recipients(),
        }
    }
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self { enabled: true }
    }
}

/// The prototype's emergency contacts.
fn default_recipients() -> Vec<String> {
    vec![
        "+917387224241".to_string(),
        "+917666929196".to_string(),
        "+919021776161".to_string(),
        "+917028830712".to_string(),
    ]
}

impl Config {
    /// Load configuration with an optional custom config path.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading, parsing or validation fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let figment = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(&config_file))
            .merge(Env::prefixed("BESAFE_").split("_"));

        let config: Config = figment.extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default media directory for this platform.
    #[must_use]
    pub fn default_media_dir() -> PathBuf {
        if cfg!(target_os = "android") {
            PathBuf::from(ANDROID_MEDIA_DIR)
        } else {
            dirs::data_local_dir()
                .unwrap_or_else(|| PathBuf::from(".local/share"))
                .join(DATA_DIR_NAME)
                .join(MEDIA_DIR_NAME)
        }
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.contacts.recipients.is_empty() {
            return Err(Error::ConfigValidation {
                message: "contacts.recipients must list at least one number".to_string(),
            });
        }

        let pattern = Regex::new(RECIPIENT_PATTERN).map_err(|e| Error::ConfigValidation {
            message: e.to_string(),
        })?;
        for recipient in &self.contacts.recipients {
            if !pattern.is_match(recipient) {
                return Err(Error::ConfigValidation {
                    message: format!("invalid recipient number: {recipient}"),
                });
            }
        }

        if self.capture.backend == BackendKind::Command {
            validate_command("capture.command", &self.capture.command, &[PATH_PLACEHOLDER])?;
        }
        if self.sms.backend == BackendKind::Command {
            validate_command(
                "sms.command",
                &self.sms.command,
                &[RECIPIENT_PLACEHOLDER, BODY_PLACEHOLDER],
            )?;
        }

        Ok(())
    }

    /// Get the media directory, resolving defaults if not set.
    #[must_use]
    pub fn media_dir(&self) -> PathBuf {
        self.media
            .directory
            .clone()
            .unwrap_or_else(Self::default_media_dir)
    }
}

fn validate_command(key: &str, command: &[String], placeholders: &[&str]) -> Result<()> {
    if command.first().map_or(true, |program| program.trim().is_empty()) {
        return Err(Error::ConfigValidation {
            message: format!("{key} must name a program when the command backend is selected"),
        });
    }
    for placeholder in placeholders {
        if !command.iter().any(|arg| arg.contains(placeholder)) {
            return Err(Error::ConfigValidation {
                message: format!("{key} must use the {placeholder} placeholder"),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();

        assert_eq!(config.contacts.recipients.len(), 4);
        assert_eq!(config.capture.backend, BackendKind::Simulated);
        assert_eq!(config.sms.backend, BackendKind::Simulated);
        assert!(config.listener.enabled);
        assert!(config.media.directory.is_none());
    }

    #[test]
    fn test_default_recipients_order() {
        let recipients = default_recipients();
        assert_eq!(recipients[0], "+917387224241");
        assert_eq!(recipients[3], "+917028830712");
    }

    #[test]
    fn test_validate_valid_config() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_validate_empty_recipients() {
        let mut config = Config::default();
        config.contacts.recipients.clear();

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("at least one"));
    }

    #[test]
    fn test_validate_malformed_recipient() {
        let mut config = Config::default();
        config.contacts.recipients.push("call mom".to_string());

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("call mom"));
    }

    #[test]
    fn test_validate_command_backend_requires_program() {
        let mut config = Config::default();
        config.capture.backend = BackendKind::Command;

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("capture.command"));
    }

    #[test]
    fn test_validate_command_backend_requires_placeholders() {
        let mut config = Config::default();
        config.sms.backend = BackendKind::Command;
        config.sms.command = vec!["send-sms".to_string(), "{recipient}".to_string()];

        let err = config.validate().unwrap_err().to_string();
        assert!(err.contains("{body}"));

        config.sms.command.push("--text={body}".to_string());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_media_dir_default() {
        let config = Config::default();
        assert!(config
            .media_dir()
            .to_string_lossy()
            .contains("BeSafeMedia"));
    }

    #[test]
    fn test_media_dir_custom() {
        let mut config = Config::default();
        config.media.directory = Some(PathBuf::from("/custom/media"));
        assert_eq!(config.media_dir(), PathBuf::from("/custom/media"));
    }

    #[test]
    fn test_default_config_path() {
        let path = Config::default_config_path();
        assert!(path.to_string_lossy().contains("besafe"));
        assert!(path.to_string_lossy().contains("config.toml"));
    }

    #[test]
    fn test_load_nonexistent_config() {
        let config = Config::load_from(Some(PathBuf::from("/nonexistent/config.toml"))).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_load_from_toml_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
[contacts]
recipients = ["+15551234567"]

[media]
directory = "/tmp/besafe-media"

[capture]
backend = "command"
command = ["fswebcam", "--no-banner", "{path}"]

[listener]
enabled = false
"#,
        )
        .unwrap();

        let config = Config::load_from(Some(path)).unwrap();
        assert_eq!(config.contacts.recipients, vec!["+15551234567".to_string()]);
        assert_eq!(config.media_dir(), PathBuf::from("/tmp/besafe-media"));
        assert_eq!(config.capture.backend, BackendKind::Command);
        assert_eq!(config.sms.backend, BackendKind::Simulated);
        assert!(!config.listener.enabled);
    }

    #[test]
    fn test_backend_kind_display() {
        assert_eq!(BackendKind::Simulated.to_string(), "simulated");
        assert_eq!(BackendKind::Command.to_string(), "command");
    }

    #[test]
    fn test_config_serialize() {
        let json = serde_json::to_string(&Config::default()).unwrap();
        assert!(json.contains("recipients"));
        assert!(json.contains("\"simulated\""));
    }
}
