//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// relayctl - Control panel for ESP relay devices
#[derive(Parser, Debug)]
#[command(name = "relayctl")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Relay command timeout in milliseconds
    #[arg(long, global = true, default_value = "8000", env = "RELAYCTL_TIMEOUT")]
    pub timeout: u64,

    /// Exit non-zero on any partial failure (for bulk operations)
    #[arg(long, global = true)]
    pub strict: bool,

    /// Roster file to load and save (default: per-user data directory)
    #[arg(long, global = true, env = "RELAYCTL_ROSTER")]
    pub roster: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Register a device and probe it
    Add(AddArgs),

    /// Remove a device from the roster
    Remove(RemoveArgs),

    /// Show the roster
    List,

    /// Switch a relay on
    On(ControlArgs),

    /// Switch a relay off
    Off(ControlArgs),

    /// Invert a relay
    Toggle(ToggleArgs),

    /// Refresh and show device status
    Status(StatusArgs),

    /// Probe every device and report how many answered
    Test,

    /// Command synchronization across devices
    Sync(SyncArgs),

    /// Run the panel with periodic background refresh
    Watch(WatchArgs),
}

// ==================== Roster ====================

#[derive(Args, Debug)]
pub struct AddArgs {
    /// Display name for the device
    pub name: String,

    /// IPv4 address, e.g. 192.168.4.2
    pub address: String,
}

#[derive(Args, Debug)]
pub struct RemoveArgs {
    /// Device id, address, or name
    pub target: String,
}

// ==================== Control ====================

#[derive(Args, Debug)]
pub struct ControlArgs {
    /// Device id, address, or name, or "all" for every device
    pub target: String,
}

#[derive(Args, Debug)]
pub struct ToggleArgs {
    /// Device id, address, or name
    pub target: String,
}

// ==================== Status ====================

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Device id, address, or name (default: all devices)
    pub target: Option<String>,
}

// ==================== Sync ====================

#[derive(Args, Debug)]
pub struct SyncArgs {
    /// Turn synchronization on or off, or show the current setting
    #[arg(value_enum)]
    pub mode: SyncMode,
}

#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum SyncMode {
    On,
    Off,
    Show,
}

// ==================== Watch ====================

#[derive(Args, Debug)]
pub struct WatchArgs {
    /// Seconds between automatic refresh sweeps
    #[arg(short, long, default_value = "30")]
    pub interval: u64,
}
