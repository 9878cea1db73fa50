//! Relay control commands: on, off, toggle.

use std::sync::Arc;

use relayctl_core::protocol::commands::RelayAction;

use crate::cli::{Cli, ControlArgs, ToggleArgs};
use crate::error::CliError;
use crate::output::get_formatter;
use crate::panel::{bulk_spinner, open_panel, resolve_target, TerminalSink};

/// Run the on command
pub async fn run_on(args: &ControlArgs, cli: &Cli) -> Result<(), CliError> {
    run_control(&args.target, RelayAction::On, cli).await
}

/// Run the off command
pub async fn run_off(args: &ControlArgs, cli: &Cli) -> Result<(), CliError> {
    run_control(&args.target, RelayAction::Off, cli).await
}

async fn run_control(target: &str, action: RelayAction, cli: &Cli) -> Result<(), CliError> {
    let panel = open_panel(cli).await?;
    let formatter = get_formatter(cli.json);

    if target.eq_ignore_ascii_case("all") {
        let spinner = (!cli.json)
            .then(|| bulk_spinner(format!("Sending {} to all devices...", action)));
        let outcomes = panel.dispatcher.control_all(action).await;
        if let Some(spinner) = spinner {
            spinner.finish_and_clear();
        }

        if outcomes.is_empty() {
            println!("{}", formatter.format_message("No devices registered"));
            return Ok(());
        }

        println!("{}", formatter.format_outcomes(&outcomes));

        let failed = outcomes.iter().filter(|o| !o.success).count();
        if cli.strict && failed > 0 {
            return Err(CliError::PartialFailure {
                succeeded: outcomes.len() - failed,
                failed,
            });
        }
        return Ok(());
    }

    if !cli.json {
        panel.log.attach_sink(Arc::new(TerminalSink::stderr(false)));
    }

    let id = resolve_target(&panel.dispatcher, target).await?;
    let outcome = panel.dispatcher.control_one(id, action).await?;
    println!("{}", formatter.format_outcome(&outcome));

    if !outcome.success {
        return Err(CliError::ExchangeFailed(outcome.name));
    }
    Ok(())
}

/// Run the toggle command
pub async fn run_toggle(args: &ToggleArgs, cli: &Cli) -> Result<(), CliError> {
    let panel = open_panel(cli).await?;
    if !cli.json {
        panel.log.attach_sink(Arc::new(TerminalSink::stderr(false)));
    }
    let formatter = get_formatter(cli.json);

    let id = resolve_target(&panel.dispatcher, &args.target).await?;
    match panel.dispatcher.toggle(id).await? {
        Some(outcome) => {
            println!("{}", formatter.format_outcome(&outcome));
            if !outcome.success {
                return Err(CliError::ExchangeFailed(outcome.name));
            }
        }
        None => {
            // offline devices are skipped rather than blindly switched
            println!(
                "{}",
                formatter.format_message(&format!("{} is offline; nothing sent", args.target))
            );
        }
    }
    Ok(())
}
