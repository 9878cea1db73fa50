//! Output formatting for CLI results.

pub mod json;
pub mod table;

pub use json::JsonOutput;
pub use table::TableOutput;

use relayctl_core::dispatcher::{ConnectionSummary, DispatchOutcome};
use relayctl_core::registry::Device;

/// Output formatter trait
pub trait OutputFormatter {
    /// Format the roster as a list
    fn format_devices(&self, devices: &[Device]) -> String;

    /// Format a single device in detail
    fn format_device(&self, device: &Device) -> String;

    /// Format the result of one command exchange
    fn format_outcome(&self, outcome: &DispatchOutcome) -> String;

    /// Format bulk operation results
    fn format_outcomes(&self, outcomes: &[DispatchOutcome]) -> String;

    /// Format connection test totals
    fn format_summary(&self, summary: &ConnectionSummary) -> String;

    /// Format a generic message
    fn format_message(&self, message: &str) -> String;
}

/// Get the appropriate formatter based on JSON flag
pub fn get_formatter(json: bool) -> Box<dyn OutputFormatter> {
    if json {
        Box::new(JsonOutput::new())
    } else {
        Box::new(TableOutput::new())
    }
}
