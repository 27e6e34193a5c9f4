//! Screen-off broadcast sources.
//!
//! Delivery depends entirely on platform policy. A source may go quiet
//! forever; nothing here can promise that a screen-off ever arrives.

use async_trait::async_trait;
use tokio::sync::mpsc;
use tracing::debug;

#[cfg(unix)]
use super::CapabilityError;

/// A stream of screen-off signals.
#[async_trait]
pub trait ScreenOffSource: Send + std::fmt::Debug {
    /// Name of this source (for logging).
    fn name(&self) -> &'static str;

    /// Wait for the next screen-off signal.
    ///
    /// Returns `None` once the source can no longer deliver signals.
    async fn next_screen_off(&mut self) -> Option<()>;
}

/// Treats `SIGUSR1` as the screen-off broadcast.
///
/// A power-button or logind hook can forward screen blanking with
/// `kill -USR1 <pid>`.
#[cfg(unix)]
#[derive(Debug)]
pub struct SignalScreenOff {
    signal: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl SignalScreenOff {
    /// Register the signal handler.
    ///
    /// # Errors
    ///
    /// Returns an error if the handler cannot be installed (for example when
    /// called outside a tokio runtime).
    pub fn new() -> Result<Self, CapabilityError> {
        tokio::runtime::Handle::try_current()
            .map_err(|e| CapabilityError::Unavailable(e.to_string()))?;
        let signal =
            tokio::signal::unix::signal(tokio::signal::unix::SignalKind::user_defined1())?;
        Ok(Self { signal })
    }
}

#[cfg(unix)]
#[async_trait]
impl ScreenOffSource for SignalScreenOff {
    fn name(&self) -> &'static str {
        "sigusr1"
    }

    async fn next_screen_off(&mut self) -> Option<()> {
        let received = self.signal.recv().await;
        if received.is_some() {
            debug!("SIGUSR1 received, treating as screen off");
        }
        received
    }
}

/// In-process screen-off source fired through a [`ScreenOffTrigger`].
#[derive(Debug)]
pub struct ManualScreenOff {
    rx: mpsc::UnboundedReceiver<()>,
}

/// Fires screen-off signals into a [`ManualScreenOff`].
#[derive(Debug, Clone)]
pub struct ScreenOffTrigger {
    tx: mpsc::UnboundedSender<()>,
}

impl ManualScreenOff {
    /// Create a connected trigger and source.
    #[must_use]
    pub fn channel() -> (ScreenOffTrigger, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (ScreenOffTrigger { tx }, Self { rx })
    }
}

impl ScreenOffTrigger {
    /// Deliver one screen-off signal. Returns `false` if the source is gone.
    pub fn fire(&self) -> bool {
        self.tx.send(()).is_ok()
    }
}

#[async_trait]
impl ScreenOffSource for ManualScreenOff {
    fn name(&self) -> &'static str {
        "manual"
    }

    async fn next_screen_off(&mut self) -> Option<()> {
        self.rx.recv().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_manual_source_delivers_and_closes() {
        let (trigger, mut source) = ManualScreenOff::channel();
        assert!(trigger.fire());
        assert_eq!(source.next_screen_off().await, Some(()));

        drop(trigger);
        assert_eq!(source.next_screen_off().await, None);
    }

    #[test]
    fn test_fire_after_source_dropped() {
        let (trigger, source) = ManualScreenOff::channel();
        drop(source);
        assert!(!trigger.fire());
    }

    #[cfg(unix)]
    #[test]
    fn test_signal_source_requires_runtime() {
        assert!(matches!(
            SignalScreenOff::new(),
            Err(CapabilityError::Unavailable(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_signal_source_registers() {
        let source = SignalScreenOff::new().unwrap();
        assert_eq!(source.name(), "sigusr1");
    }
}
