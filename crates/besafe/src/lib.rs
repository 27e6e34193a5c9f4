//! `besafe` - emergency photo and SMS alert
//!
//! A single action captures a photo and texts it, with a templated
//! message, to a fixed list of emergency contacts. The camera, the
//! text-message service and the screen-off broadcast are platform
//! capabilities behind traits, with a host simulation for machines that have
//! none of them.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod app;
pub mod cli;
pub mod config;
pub mod controller;
pub mod dispatch;
pub mod error;
pub mod listener;
pub mod logging;
pub mod media;
pub mod message;
pub mod platform;
pub mod trigger;

pub use app::{App, StartupReport};
pub use config::Config;
pub use controller::{ControllerHandle, EmergencyController, Status, WorkflowState};
pub use dispatch::{DispatchReport, NotificationDispatcher, RecipientList};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use media::MediaStore;
pub use message::NotificationMessage;
pub use trigger::TriggerEvent;
