//! Command-line interface for besafe.
//!
//! `run` is the app's single screen: a status line plus the emergency and
//! test actions read from stdin. The other commands run one action and exit.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{ConfigCommand, StatusCommand, TriggerCommand};

/// besafe - Send a photo and an SOS text to your emergency contacts
///
/// One action captures a photo and texts every configured contact. A
/// screen-off signal (SIGUSR1 on Unix hosts) raises the same alert on a
/// best-effort basis.
#[derive(Debug, Parser)]
#[command(name = "besafe")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Show the emergency screen and wait for actions
    Run,

    /// Raise one emergency alert and exit
    Trigger(TriggerCommand),

    /// Send the test message to every contact
    Test,

    /// Show platform, backends and permission status
    Status(StatusCommand),

    /// View or validate configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

/// An action typed on the `run` screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScreenAction {
    /// The primary emergency action.
    Emergency,
    /// The secondary test action.
    Test,
    /// Leave the screen.
    Quit,
}

impl ScreenAction {
    /// Parse one input line: empty or `e` is the emergency action, `t` the
    /// test, `q` quits. Anything else is ignored.
    #[must_use]
    pub fn parse(line: &str) -> Option<Self> {
        match line.trim().to_ascii_lowercase().as_str() {
            "" | "e" | "emergency" => Some(Self::Emergency),
            "t" | "test" => Some(Self::Test),
            "q" | "quit" | "exit" => Some(Self::Quit),
            _ => None,
        }
    }
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> crate::logging::Verbosity {
        crate::logging::Verbosity::from_flags(self.quiet, self.verbose)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_name() {
        assert_eq!(Cli::command().get_name(), "besafe");
    }

    #[test]
    fn test_cli_verify() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_verbosity_flags() {
        let cli = Cli::try_parse_from(["besafe", "-q", "test"]).unwrap();
        assert_eq!(cli.verbosity(), crate::logging::Verbosity::Quiet);

        let cli = Cli::try_parse_from(["besafe", "test"]).unwrap();
        assert_eq!(cli.verbosity(), crate::logging::Verbosity::Normal);

        let cli = Cli::try_parse_from(["besafe", "-v", "test"]).unwrap();
        assert_eq!(cli.verbosity(), crate::logging::Verbosity::Verbose);

        let cli = Cli::try_parse_from(["besafe", "-vv", "test"]).unwrap();
        assert_eq!(cli.verbosity(), crate::logging::Verbosity::Trace);
    }

    #[test]
    fn test_parse_trigger() {
        let cli = Cli::try_parse_from(["besafe", "trigger", "--screen-off"]).unwrap();
        match cli.command {
            Command::Trigger(cmd) => assert!(cmd.screen_off),
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_parse_run_with_config() {
        let cli = Cli::try_parse_from(["besafe", "-c", "/custom/config.toml", "run"]).unwrap();
        assert!(matches!(cli.command, Command::Run));
        assert_eq!(cli.config, Some(PathBuf::from("/custom/config.toml")));
    }

    #[test]
    fn test_parse_config_validate() {
        let cli = Cli::try_parse_from(["besafe", "config", "validate", "-f", "x.toml"]).unwrap();
        assert!(matches!(
            cli.command,
            Command::Config(ConfigCommand::Validate { file: Some(_) })
        ));
    }

    #[test]
    fn test_screen_action_parse() {
        assert_eq!(ScreenAction::parse(""), Some(ScreenAction::Emergency));
        assert_eq!(ScreenAction::parse(" E \n"), Some(ScreenAction::Emergency));
        assert_eq!(ScreenAction::parse("t"), Some(ScreenAction::Test));
        assert_eq!(ScreenAction::parse("quit"), Some(ScreenAction::Quit));
        assert_eq!(ScreenAction::parse("xyz"), None);
    }
}
