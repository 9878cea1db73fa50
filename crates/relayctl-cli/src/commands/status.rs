//! Status and connection test commands.

use crate::cli::{Cli, StatusArgs};
use crate::error::CliError;
use crate::output::get_formatter;
use crate::panel::{bulk_spinner, open_panel, resolve_target};

/// Run the status command
pub async fn run_status(args: &StatusArgs, cli: &Cli) -> Result<(), CliError> {
    let panel = open_panel(cli).await?;
    let formatter = get_formatter(cli.json);

    match &args.target {
        Some(target) => {
            let id = resolve_target(&panel.dispatcher, target).await?;
            panel.dispatcher.refresh_one(id).await?;

            let device = panel
                .dispatcher
                .devices()
                .await
                .into_iter()
                .find(|d| d.id == id)
                .ok_or_else(|| CliError::UnknownDevice(target.clone()))?;
            println!("{}", formatter.format_device(&device));

            if cli.strict && !device.reachable {
                return Err(CliError::ExchangeFailed(device.name));
            }
        }
        None => {
            let spinner =
                (!cli.json).then(|| bulk_spinner("Refreshing all device status...".to_string()));
            let outcomes = panel.dispatcher.refresh_all().await;
            if let Some(spinner) = spinner {
                spinner.finish_and_clear();
            }

            let devices = panel.dispatcher.devices().await;
            println!("{}", formatter.format_devices(&devices));

            let failed = outcomes.iter().filter(|o| !o.success).count();
            if cli.strict && failed > 0 {
                return Err(CliError::PartialFailure {
                    succeeded: outcomes.len() - failed,
                    failed,
                });
            }
        }
    }
    Ok(())
}

/// Run the connection test command
pub async fn run_test(cli: &Cli) -> Result<(), CliError> {
    let panel = open_panel(cli).await?;
    let formatter = get_formatter(cli.json);

    let spinner = (!cli.json).then(|| bulk_spinner("Testing connections...".to_string()));
    let summary = panel.dispatcher.test_connections().await;
    if let Some(spinner) = spinner {
        spinner.finish_and_clear();
    }

    println!("{}", formatter.format_summary(&summary));

    if cli.strict && summary.online < summary.total {
        return Err(CliError::PartialFailure {
            succeeded: summary.online,
            failed: summary.total - summary.online,
        });
    }
    Ok(())
}
