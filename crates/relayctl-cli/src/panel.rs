//! Panel session wiring shared by every subcommand.
//!
//! One-shot commands and watch mode assemble the same stack: roster loaded
//! from disk, HTTP client, dispatcher with the file store attached, and
//! optionally a terminal sink so activity lines show up as they happen.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use chrono::Local;
use colored::*;
use indicatif::{ProgressBar, ProgressStyle};

use relayctl_core::activity::{ActivityLog, LogEntry};
use relayctl_core::device::client::{HttpDeviceClient, RequestProfiles};
use relayctl_core::dispatcher::Dispatcher;
use relayctl_core::error::CoreError;
use relayctl_core::hooks::{LogSink, RosterStore};
use relayctl_core::registry::Registry;
use relayctl_core::storage::{default_roster_path, FileRosterStore};

use crate::cli::Cli;
use crate::error::CliError;

/// A live panel session: the dispatcher plus its activity log.
pub struct Panel {
    pub dispatcher: Arc<Dispatcher>,
    pub log: Arc<ActivityLog>,
}

/// Builds the panel from CLI flags: loads the persisted roster, wires the
/// HTTP client and file store, and applies the command timeout override.
pub async fn open_panel(cli: &Cli) -> Result<Panel, CliError> {
    let store = Arc::new(FileRosterStore::new(roster_path(cli)?)?);

    let (registry, sync_enabled) = match store.load().await? {
        Some(snapshot) => {
            let sync_enabled = snapshot.sync_enabled;
            (Registry::from_devices(snapshot.devices), sync_enabled)
        }
        None => (Registry::new(), true),
    };

    let client = HttpDeviceClient::new().map_err(CoreError::from)?;
    let log = Arc::new(ActivityLog::new());

    let profiles = RequestProfiles {
        command: Duration::from_millis(cli.timeout),
        ..RequestProfiles::default()
    };

    let dispatcher = Arc::new(
        Dispatcher::new(registry, Arc::new(client), log.clone())
            .with_store(store)
            .with_profiles(profiles)
            .with_sync_mode(sync_enabled),
    );

    Ok(Panel { dispatcher, log })
}

fn roster_path(cli: &Cli) -> Result<PathBuf, CliError> {
    if let Some(path) = &cli.roster {
        return Ok(path.clone());
    }
    default_roster_path().ok_or_else(|| {
        CliError::Other("No data directory available for the roster; pass --roster".to_string())
    })
}

/// Maps an operator-supplied target (id, address, or name) to a device id.
pub async fn resolve_target(dispatcher: &Dispatcher, target: &str) -> Result<u64, CliError> {
    dispatcher
        .resolve(target)
        .await
        .ok_or_else(|| CliError::UnknownDevice(target.to_string()))
}

/// Spinner shown while a bulk operation is in flight (table mode only).
pub fn bulk_spinner(message: String) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap(),
    );
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

/// Prints activity entries as they are appended.
pub struct TerminalSink {
    ndjson: bool,
    to_stdout: bool,
}

impl TerminalSink {
    /// Sink for one-shot commands: activity goes to stderr so stdout stays
    /// parseable.
    pub fn stderr(ndjson: bool) -> Self {
        Self {
            ndjson,
            to_stdout: false,
        }
    }

    /// Sink for watch mode, where the activity stream is the output.
    pub fn stdout(ndjson: bool) -> Self {
        Self {
            ndjson,
            to_stdout: true,
        }
    }

    fn write_line(&self, line: String) {
        if self.to_stdout {
            println!("{}", line);
        } else {
            eprintln!("{}", line);
        }
    }
}

impl LogSink for TerminalSink {
    fn append(&self, entry: &LogEntry) {
        if self.ndjson {
            if let Ok(line) = serde_json::to_string(entry) {
                self.write_line(line);
            }
        } else {
            let stamp = entry.timestamp.with_timezone(&Local).format("%H:%M:%S");
            self.write_line(format!("[{}] {}", stamp, entry.message).dimmed().to_string());
        }
    }
}
