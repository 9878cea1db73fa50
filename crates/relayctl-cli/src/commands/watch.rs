//! Watch mode: run the panel with the periodic refresh loop until Ctrl+C.

use std::sync::Arc;
use std::time::Duration;

use relayctl_core::scheduler::RefreshScheduler;

use crate::cli::{Cli, WatchArgs};
use crate::error::CliError;
use crate::panel::{open_panel, TerminalSink};

/// Run the watch command
pub async fn run_watch(args: &WatchArgs, cli: &Cli) -> Result<(), CliError> {
    if args.interval == 0 {
        return Err(CliError::InvalidArgument(
            "Refresh interval must be at least 1 second".to_string(),
        ));
    }

    let panel = open_panel(cli).await?;
    panel
        .log
        .attach_sink(Arc::new(TerminalSink::stdout(cli.json)));

    panel.log.append("Control panel started");
    panel.dispatcher.refresh_all().await;

    let mut scheduler = RefreshScheduler::new();
    scheduler.start(
        panel.dispatcher.clone(),
        Duration::from_secs(args.interval),
    );

    tokio::signal::ctrl_c().await?;

    scheduler.stop();
    panel.log.append("Control panel stopped");
    Ok(())
}
