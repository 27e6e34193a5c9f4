//! Capabilities delegated to external programs.
//!
//! Useful on Linux phones and single-board devices, where a photo can be
//! taken with `fswebcam` and a text sent through `mmcli` or a modem script.
//! Argument lists are templates; placeholders are substituted per call and
//! never passed through a shell.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use tracing::{debug, warn};

use super::{CapabilityError, CaptureCompletion, PhotoCapture, TextMessageSender};
use crate::config::{BODY_PLACEHOLDER, PATH_PLACEHOLDER, RECIPIENT_PLACEHOLDER};

/// Substitute `(placeholder, value)` pairs into every argument.
fn render(template: &[String], values: &[(&str, &str)]) -> Result<Vec<String>, CapabilityError> {
    if template.is_empty() {
        return Err(CapabilityError::Unavailable(
            "no command configured".to_string(),
        ));
    }
    Ok(template
        .iter()
        .map(|arg| {
            values
                .iter()
                .fold(arg.clone(), |acc, (key, value)| acc.replace(key, value))
        })
        .collect())
}

/// Camera backed by an external capture program.
///
/// The program runs in the background; the capture completes with the
/// destination path when it exits successfully, and with none otherwise.
#[derive(Debug, Clone)]
pub struct CommandCamera {
    command: Vec<String>,
}

impl CommandCamera {
    /// Create a camera running `command` (`{path}` is substituted).
    #[must_use]
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

impl PhotoCapture for CommandCamera {
    fn name(&self) -> &'static str {
        "command"
    }

    fn take_picture(
        &self,
        destination: &Path,
        completion: CaptureCompletion,
    ) -> Result<(), CapabilityError> {
        let runtime = tokio::runtime::Handle::try_current()
            .map_err(|e| CapabilityError::Unavailable(e.to_string()))?;

        let dest = destination.display().to_string();
        let argv = render(&self.command, &[(PATH_PLACEHOLDER, &dest)])?;
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| CapabilityError::Unavailable("no command configured".to_string()))?;

        debug!(program, ?args, "Launching capture command");
        let mut child = tokio::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .spawn()?;

        let destination: PathBuf = destination.to_path_buf();
        runtime.spawn(async move {
            let path = match child.wait().await {
                Ok(status) if status.success() => Some(destination),
                Ok(status) => {
                    warn!(%status, "Capture command failed");
                    None
                }
                Err(e) => {
                    warn!(error = %e, "Capture command could not be awaited");
                    None
                }
            };
            completion.complete(path);
        });
        Ok(())
    }
}

/// Text-message sender backed by an external program.
///
/// Runs once per recipient and waits for it to exit, so it reports itself
/// as blocking and the controller runs it off the event loop.
#[derive(Debug, Clone)]
pub struct CommandSender {
    command: Vec<String>,
}

impl CommandSender {
    /// Create a sender running `command` (`{recipient}` and `{body}` are
    /// substituted).
    #[must_use]
    pub fn new(command: Vec<String>) -> Self {
        Self { command }
    }
}

impl TextMessageSender for CommandSender {
    fn name(&self) -> &'static str {
        "command"
    }

    fn blocks(&self) -> bool {
        true
    }

    fn send_text(&self, recipient: &str, body: &str) -> Result<(), CapabilityError> {
        let argv = render(
            &self.command,
            &[(RECIPIENT_PLACEHOLDER, recipient), (BODY_PLACEHOLDER, body)],
        )?;
        let (program, args) = argv
            .split_first()
            .ok_or_else(|| CapabilityError::Unavailable("no command configured".to_string()))?;

        debug!(program, recipient, "Running send command");
        let output = std::process::Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()?;

        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(CapabilityError::Failed(format!(
                "{program} exited with {}: {}",
                output.status,
                stderr.trim()
            )))
        }
    }
}
