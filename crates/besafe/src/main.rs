//! `besafe` - CLI for the emergency alert workflow
//!
//! Everything runs on a single-threaded tokio runtime: the controller, the
//! screen-off listener and the stdin front end share one thread.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use besafe::cli::{Cli, Command, ConfigCommand, ScreenAction};
use besafe::platform::platform_name;
use besafe::{init_logging, App, Config, EmergencyController, Status, WorkflowState};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = Config::load_from(cli.config.clone())?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("failed to start the event loop")?;

    let result = match cli.command {
        Command::Run => runtime.block_on(handle_run(&config)),
        Command::Trigger(cmd) => {
            let source = cmd.source();
            runtime.block_on(handle_once(&config, |c| c.trigger(source)))
        }
        Command::Test => runtime.block_on(handle_once(&config, EmergencyController::test_notify)),
        Command::Status(cmd) => handle_status(&config, cmd.json),
        Command::Config(cmd) => handle_config(&config, cmd),
    };

    // A pending stdin read would otherwise hold the runtime open
    runtime.shutdown_background();
    result
}

/// Interactive screen: status line, emergency and test actions, listener.
async fn handle_run(config: &Config) -> anyhow::Result<()> {
    let mut app = App::from_config(config);
    let listener = app.start_screen_off_listener();
    let controller = app.into_controller();
    let handle = controller.handle();
    let mut status = controller.subscribe_status();

    println!("{}", controller.status().label());
    println!("[Enter] EMERGENCY: send photo & SMS   [t] Test SMS (no photo)   [q] Quit");
    if listener.is_some() {
        println!("Screen-off trigger armed: kill -USR1 {}", std::process::id());
    }

    let (closing_tx, closing_rx) = tokio::sync::oneshot::channel::<()>();

    let screen = async move {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        loop {
            tokio::select! {
                changed = status.changed() => {
                    if changed.is_err() {
                        break;
                    }
                    println!("{}", status.borrow_and_update().label());
                }
                line = lines.next_line() => {
                    let action = match line {
                        Ok(Some(line)) => ScreenAction::parse(&line),
                        Ok(None) => Some(ScreenAction::Quit),
                        Err(e) => {
                            tracing::warn!(error = %e, "Failed to read input");
                            Some(ScreenAction::Quit)
                        }
                    };
                    match action {
                        Some(ScreenAction::Emergency) => {
                            handle.trigger(besafe::TriggerEvent::Manual);
                        }
                        Some(ScreenAction::Test) => {
                            handle.test_notify();
                        }
                        Some(ScreenAction::Quit) => {
                            handle.shutdown();
                            break;
                        }
                        None => println!("Unknown action; press Enter, t or q"),
                    }
                }
                _ = tokio::signal::ctrl_c() => {
                    handle.shutdown();
                    break;
                }
            }
        }

        // An alert already under way still finishes; keep showing it
        let _ = closing_tx.send(());
        while status.changed().await.is_ok() {
            println!("{}", status.borrow_and_update().label());
        }
    };

    // A second Ctrl-C abandons a capture that never completes
    let force_quit = async move {
        if closing_rx.await.is_err() || tokio::signal::ctrl_c().await.is_err() {
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        _ = async { tokio::join!(controller.run(), screen) } => {}
        () = force_quit => {
            tracing::warn!("Exiting with an alert still in progress");
        }
    }

    if let Some(listener) = listener {
        listener.stop();
    }
    Ok(())
}

/// Run one action and wait until the workflow is back to idle.
async fn handle_once(
    config: &Config,
    action: impl FnOnce(&mut EmergencyController),
) -> anyhow::Result<()> {
    let mut app = App::from_config(config);
    let controller = app.controller_mut();

    action(&mut *controller);
    while controller.state() != WorkflowState::Idle {
        if !controller.process_next().await {
            break;
        }
    }

    let status = controller.status();
    println!("{}", status.label());
    if let Some(report) = controller.last_dispatch() {
        for failure in &report.failures {
            println!("  {}: {}", failure.recipient, failure.reason);
        }
    }

    if status == Status::SendFailed {
        anyhow::bail!("not every contact could be reached");
    }
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let summary = App::from_config(config).summary();
    if json {
        println!("{}", summary.to_json()?);
    } else {
        println!("besafe status");
        println!("-------------");
        println!("Platform:      {}", platform_name());
        println!("Camera:        {}", summary.camera);
        println!("SMS:           {}", summary.sms);
        println!("Media dir:     {}", summary.media_dir.display());
        println!("Recipients:    {}", summary.recipients);
        println!();
        println!("[Permissions]");
        for status in summary.permissions.statuses() {
            println!(
                "  {:<45} {}",
                status.permission.android_name(),
                if status.is_granted { "granted" } else { "NOT granted" }
            );
        }
        if !summary.issues.is_empty() {
            println!();
            println!("[Startup issues]");
            for issue in &summary.issues {
                println!("  {issue}");
            }
        }
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Contacts]");
                for recipient in &config.contacts.recipients {
                    println!("  {recipient}");
                }
                println!();
                println!("[Media]");
                println!("  Directory:          {}", config.media_dir().display());
                println!();
                println!("[Capture]");
                println!("  Backend:            {}", config.capture.backend);
                if !config.capture.command.is_empty() {
                    println!("  Command:            {}", config.capture.command.join(" "));
                }
                println!();
                println!("[SMS]");
                println!("  Backend:            {}", config.sms.backend);
                if !config.sms.command.is_empty() {
                    println!("  Command:            {}", config.sms.command.join(" "));
                }
                println!();
                println!("[Listener]");
                println!("  Screen-off:         {}", config.listener.enabled);
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            Config::load_from(Some(path)).context("configuration is invalid")?;
            println!("Configuration is valid.");
        }
    }
    Ok(())
}
