//! JSON-formatted output for CLI.

use serde::Serialize;
use serde_json::json;

use relayctl_core::dispatcher::{ConnectionSummary, DispatchOutcome};
use relayctl_core::registry::Device;

use super::OutputFormatter;

pub struct JsonOutput;

impl JsonOutput {
    pub fn new() -> Self {
        Self
    }

    fn to_json<T: Serialize>(value: &T) -> String {
        serde_json::to_string_pretty(value).unwrap_or_else(|_| "{}".to_string())
    }
}

impl Default for JsonOutput {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputFormatter for JsonOutput {
    fn format_devices(&self, devices: &[Device]) -> String {
        let output = json!({
            "devices": devices,
            "count": devices.len()
        });
        Self::to_json(&output)
    }

    fn format_device(&self, device: &Device) -> String {
        Self::to_json(device)
    }

    fn format_outcome(&self, outcome: &DispatchOutcome) -> String {
        Self::to_json(outcome)
    }

    fn format_outcomes(&self, outcomes: &[DispatchOutcome]) -> String {
        let success_count = outcomes.iter().filter(|o| o.success).count();
        let fail_count = outcomes.len() - success_count;

        Self::to_json(&json!({
            "results": outcomes,
            "summary": {
                "total": outcomes.len(),
                "succeeded": success_count,
                "failed": fail_count
            }
        }))
    }

    fn format_summary(&self, summary: &ConnectionSummary) -> String {
        Self::to_json(summary)
    }

    fn format_message(&self, message: &str) -> String {
        Self::to_json(&json!({ "message": message }))
    }
}
