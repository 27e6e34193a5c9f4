//! CLI command definitions.

use std::path::PathBuf;

use clap::{Args, Subcommand};

/// Trigger command arguments.
#[derive(Debug, Args)]
pub struct TriggerCommand {
    /// Report the alert as raised by the screen turning off
    #[arg(long)]
    pub screen_off: bool,
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

impl TriggerCommand {
    /// The trigger this command raises.
    #[must_use]
    pub fn source(&self) -> crate::trigger::TriggerEvent {
        if self.screen_off {
            crate::trigger::TriggerEvent::ScreenOff
        } else {
            crate::trigger::TriggerEvent::Manual
        }
    }
}
