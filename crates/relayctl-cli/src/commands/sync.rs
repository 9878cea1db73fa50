//! Sync mode command.

use crate::cli::{Cli, SyncArgs, SyncMode};
use crate::error::CliError;
use crate::output::get_formatter;
use crate::panel::open_panel;

/// Run the sync command
pub async fn run_sync(args: &SyncArgs, cli: &Cli) -> Result<(), CliError> {
    let panel = open_panel(cli).await?;
    let formatter = get_formatter(cli.json);

    match args.mode {
        SyncMode::Show => {
            let state = if panel.dispatcher.sync_mode() {
                "on"
            } else {
                "off"
            };
            println!(
                "{}",
                formatter.format_message(&format!("Synchronization is {}", state))
            );
        }
        SyncMode::On => {
            panel.dispatcher.set_sync_mode(true).await;
            println!("{}", formatter.format_message("Synchronization enabled"));
        }
        SyncMode::Off => {
            panel.dispatcher.set_sync_mode(false).await;
            println!("{}", formatter.format_message("Synchronization disabled"));
        }
    }
    Ok(())
}
