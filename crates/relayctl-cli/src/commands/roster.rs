//! Roster commands: add, remove, list.

use std::sync::Arc;

use crate::cli::{AddArgs, Cli, RemoveArgs};
use crate::error::CliError;
use crate::output::get_formatter;
use crate::panel::{open_panel, resolve_target, TerminalSink};

/// Run the add command
pub async fn run_add(args: &AddArgs, cli: &Cli) -> Result<(), CliError> {
    let panel = open_panel(cli).await?;
    if !cli.json {
        panel.log.attach_sink(Arc::new(TerminalSink::stderr(false)));
    }
    let formatter = get_formatter(cli.json);

    // registers and probes in one go; validation errors surface here
    let device = panel
        .dispatcher
        .add_device(&args.name, &args.address)
        .await?;
    println!("{}", formatter.format_device(&device));
    Ok(())
}

/// Run the remove command
pub async fn run_remove(args: &RemoveArgs, cli: &Cli) -> Result<(), CliError> {
    let panel = open_panel(cli).await?;
    let formatter = get_formatter(cli.json);

    let id = resolve_target(&panel.dispatcher, &args.target).await?;
    let device = panel.dispatcher.remove_device(id).await?;
    println!(
        "{}",
        formatter.format_message(&format!("Removed {} ({})", device.name, device.address))
    );
    Ok(())
}

/// Run the list command
pub async fn run_list(cli: &Cli) -> Result<(), CliError> {
    let panel = open_panel(cli).await?;
    let formatter = get_formatter(cli.json);

    let devices = panel.dispatcher.devices().await;
    println!("{}", formatter.format_devices(&devices));
    Ok(())
}
