//! Table-formatted output for CLI.

use colored::*;
use comfy_table::{Cell, Color, ContentArrangement, Table};

use relayctl_core::dispatcher::{ConnectionSummary, DispatchOutcome};
use relayctl_core::registry::{Device, RelayState};

use super::OutputFormatter;

pub struct TableOutput;

impl TableOutput {
    pub fn new() -> Self {
        Self
    }

    fn relay_cell(state: RelayState) -> Cell {
        match state {
            RelayState::On => Cell::new("on").fg(Color::Green),
            RelayState::Off => Cell::new("off").fg(Color::Red),
            RelayState::Unknown => Cell::new("unknown").fg(Color::DarkGrey),
        }
    }

    fn online_cell(reachable: bool) -> Cell {
        if reachable {
            Cell::new("yes").fg(Color::Green)
        } else {
            Cell::new("no").fg(Color::Red)
        }
    }
}

impl Default for TableOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for TableOutput {
    fn format_devices(&self, devices: &[Device]) -> String {
        if devices.is_empty() {
            return "No devices registered.".to_string();
        }

        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["ID", "Name", "Address", "Online", "Relay", "Peer", "Uptime"]);

        for device in devices {
            let peer = match device.peer_connected {
                Some(true) => "yes",
                Some(false) => "no",
                None => "-",
            };
            let uptime = device
                .uptime_seconds
                .map(format_uptime)
                .unwrap_or_else(|| "-".to_string());

            table.add_row(vec![
                Cell::new(device.id.to_string()),
                Cell::new(&device.name),
                Cell::new(&device.address),
                Self::online_cell(device.reachable),
                Self::relay_cell(device.relay_state),
                Cell::new(peer),
                Cell::new(uptime),
            ]);
        }

        format!("{}\n\n{} device(s)", table, devices.len())
    }

    fn format_device(&self, device: &Device) -> String {
        let mut lines = Vec::new();

        lines.push(format!("Device: {} (#{})", device.name, device.id));
        lines.push(format!("  Address:   {}", device.address));

        let online = if device.reachable {
            "Yes".green()
        } else {
            "No".red()
        };
        lines.push(format!("  Online:    {}", online));

        let relay = match device.relay_state {
            RelayState::On => "on".green(),
            RelayState::Off => "off".red(),
            RelayState::Unknown => "unknown".dimmed(),
        };
        lines.push(format!("  Relay:     {}", relay));

        if let Some(peer) = device.peer_connected {
            let status = if peer {
                "Connected".green()
            } else {
                "Disconnected".yellow()
            };
            lines.push(format!("  Peer:      {}", status));
        }

        if let Some(uptime) = device.uptime_seconds {
            lines.push(format!("  Uptime:    {}", format_uptime(uptime)));
        }

        if let Some(signal) = device.signal_strength {
            lines.push(format!("  Signal:    {} dBm", signal));
        }

        if let Some(heap) = device.free_heap_bytes {
            lines.push(format!("  Free heap: {} bytes", heap));
        }

        lines.push(format!(
            "  Updated:   {}",
            device.last_update.format("%Y-%m-%d %H:%M:%S UTC")
        ));

        lines.join("\n")
    }

    fn format_outcome(&self, outcome: &DispatchOutcome) -> String {
        let status = if outcome.success {
            "[OK]".green()
        } else {
            "[FAIL]".red()
        };

        format!("{} {}: {}", status, outcome.name, outcome.detail)
    }

    fn format_outcomes(&self, outcomes: &[DispatchOutcome]) -> String {
        let mut table = Table::new();
        table.set_content_arrangement(ContentArrangement::Dynamic);
        table.set_header(vec!["Device", "Address", "Status", "Detail"]);

        let mut success_count = 0;
        let mut fail_count = 0;

        for outcome in outcomes {
            let status_cell = if outcome.success {
                success_count += 1;
                Cell::new("OK").fg(Color::Green)
            } else {
                fail_count += 1;
                Cell::new("FAIL").fg(Color::Red)
            };

            table.add_row(vec![
                Cell::new(&outcome.name),
                Cell::new(&outcome.address),
                status_cell,
                Cell::new(&outcome.detail),
            ]);
        }

        let summary = format!(
            "\nSummary: {} succeeded, {} failed",
            success_count.to_string().green(),
            fail_count.to_string().red()
        );

        format!("{}{}", table, summary)
    }

    fn format_summary(&self, summary: &ConnectionSummary) -> String {
        format!("{}/{} devices online", summary.online, summary.total)
    }

    fn format_message(&self, message: &str) -> String {
        message.to_string()
    }
}

/// Human-readable uptime, largest two units only.
fn format_uptime(secs: u64) -> String {
    let hours = secs / 3600;
    let minutes = (secs % 3600) / 60;
    let seconds = secs % 60;
    if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m {}s", minutes, seconds)
    } else {
        format!("{}s", seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_uptime() {
        assert_eq!(format_uptime(45), "45s");
        assert_eq!(format_uptime(750), "12m 30s");
        assert_eq!(format_uptime(3720), "1h 2m");
    }

    #[test]
    fn test_format_devices_empty() {
        let output = TableOutput::new().format_devices(&[]);
        assert_eq!(output, "No devices registered.");
    }

    #[test]
    fn test_format_outcomes_counts_failures() {
        let outcomes = vec![
            DispatchOutcome {
                id: 1,
                name: "A".to_string(),
                address: "10.0.0.1".to_string(),
                success: true,
                detail: "ON acknowledged".to_string(),
            },
            DispatchOutcome {
                id: 2,
                name: "B".to_string(),
                address: "10.0.0.2".to_string(),
                success: false,
                detail: "Request timed out after 8000 ms".to_string(),
            },
        ];
        let output = TableOutput::new().format_outcomes(&outcomes);
        assert!(output.contains("succeeded"));
        assert!(output.contains("failed"));
        assert!(output.contains("10.0.0.2"));
    }
}
