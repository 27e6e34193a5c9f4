//! Passive screen-off listener.
//!
//! Forwards every screen-off signal from a [`ScreenOffSource`] to the
//! controller as a screen-off trigger. Fire-and-forget: the listener never
//! learns whether the workflow succeeded, and the source may never fire.

use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::controller::ControllerHandle;
use crate::platform::ScreenOffSource;
use crate::trigger::TriggerEvent;

/// Handle to a running listener task.
#[derive(Debug)]
pub struct ListenerHandle {
    name: &'static str,
    task: JoinHandle<u64>,
}

impl ListenerHandle {
    /// Name of the source being listened to.
    #[must_use]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether the listener task has ended.
    #[must_use]
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Stop listening.
    pub fn stop(&self) {
        self.task.abort();
    }

    /// Wait for the listener to end on its own and return how many triggers
    /// it forwarded. Returns `None` if it was stopped.
    pub async fn join(self) -> Option<u64> {
        self.task.await.ok()
    }
}

/// Spawn a task forwarding screen-off signals to `controller`.
///
/// The task ends when the source closes or the controller goes away.
/// Must be called from within a tokio runtime.
pub fn spawn_screen_off_listener(
    mut source: Box<dyn ScreenOffSource>,
    controller: ControllerHandle,
) -> ListenerHandle {
    let name = source.name();
    info!(source = name, "Screen-off listener registered (best-effort)");

    let task = tokio::spawn(async move {
        let mut forwarded = 0;
        while source.next_screen_off().await.is_some() {
            debug!(source = name, "Screen off");
            if !controller.trigger(TriggerEvent::ScreenOff) {
                warn!(source = name, "Controller gone, stopping screen-off listener");
                break;
            }
            forwarded += 1;
        }
        debug!(source = name, forwarded, "Screen-off listener finished");
        forwarded
    });

    ListenerHandle { name, task }
}
