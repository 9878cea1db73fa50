//! relayctl - Command-line control panel for ESP relay devices.
//!
//! Registers relay devices by IP address, switches them on and off (with
//! optional cross-device synchronization), and keeps their status fresh,
//! all from the terminal.

mod cli;
mod commands;
mod error;
mod output;
mod panel;

use clap::Parser;

use cli::{Cli, Commands};
use error::{exit_codes, CliError};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let result = run(&cli).await;

    match result {
        Ok(()) => std::process::exit(exit_codes::SUCCESS),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(e.exit_code());
        }
    }
}

async fn run(cli: &Cli) -> Result<(), CliError> {
    match &cli.command {
        Commands::Add(args) => commands::run_add(args, cli).await,
        Commands::Remove(args) => commands::run_remove(args, cli).await,
        Commands::List => commands::run_list(cli).await,
        Commands::On(args) => commands::run_on(args, cli).await,
        Commands::Off(args) => commands::run_off(args, cli).await,
        Commands::Toggle(args) => commands::run_toggle(args, cli).await,
        Commands::Status(args) => commands::run_status(args, cli).await,
        Commands::Test => commands::run_test(cli).await,
        Commands::Sync(args) => commands::run_sync(args, cli).await,
        Commands::Watch(args) => commands::run_watch(args, cli).await,
    }
}
