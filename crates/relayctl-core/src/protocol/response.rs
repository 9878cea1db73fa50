//! Response normalization for device protocol.
//!
//! Relay firmware answers either with a small JSON object or with free-form
//! text, depending on build and endpoint. Both shapes are folded into a
//! single [`StatusReport`] so the dispatcher never looks at raw bodies.

use serde_json::Value;

use crate::registry::RelayState;

/// Canonical view of one device response.
///
/// Every field is optional: absent response fields stay unset here instead
/// of being defaulted, so stale zeros never show up in the panel.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatusReport {
    pub relay_state: Option<RelayState>,
    pub peer_connected: Option<bool>,
    pub uptime_seconds: Option<u64>,
    pub signal_strength: Option<i32>,
    pub free_heap_bytes: Option<u64>,
    /// Human-readable text for the activity log: the JSON `message`/`status`
    /// field, or the whole body for plain-text responses
    pub message: Option<String>,
}

/// Normalizes a device response body into a [`StatusReport`].
///
/// A JSON content type selects the structured decode; a body that fails to
/// parse anyway degrades to the text path rather than erroring. Everything
/// else is treated as plain text, where relay state is inferred from the
/// presence of the substring `ON` (case-sensitive, matching the firmware's
/// own status strings).
pub fn decode_status(content_type: Option<&str>, body: &str) -> StatusReport {
    if is_json_content_type(content_type) {
        if let Some(report) = decode_json(body) {
            return report;
        }
    }
    decode_text(body)
}

fn is_json_content_type(content_type: Option<&str>) -> bool {
    content_type
        .map(|ct| ct.to_ascii_lowercase().contains("application/json"))
        .unwrap_or(false)
}

/// Device responses may carry prefix text before the JSON, so parsing
/// starts at the first `{`.
fn decode_json(body: &str) -> Option<StatusReport> {
    let start = body.find('{')?;
    let value: Value = serde_json::from_str(&body[start..]).ok()?;

    Some(StatusReport {
        relay_state: value
            .get("relay_state")
            .and_then(Value::as_str)
            .map(RelayState::parse),
        peer_connected: value.get("peer_connected").and_then(Value::as_bool),
        uptime_seconds: value
            .get("uptime_seconds")
            .and_then(Value::as_u64)
            .or_else(|| value.get("uptime").and_then(Value::as_u64)),
        signal_strength: value
            .get("signal_strength")
            .and_then(Value::as_i64)
            .and_then(|v| i32::try_from(v).ok()),
        free_heap_bytes: value.get("free_heap").and_then(Value::as_u64),
        message: value
            .get("message")
            .and_then(Value::as_str)
            .or_else(|| value.get("status").and_then(Value::as_str))
            .map(str::to_string),
    })
}

fn decode_text(body: &str) -> StatusReport {
    let text = body.trim();
    let state = if text.contains("ON") {
        RelayState::On
    } else {
        RelayState::Off
    };
    StatusReport {
        relay_state: Some(state),
        message: (!text.is_empty()).then(|| text.to_string()),
        ..StatusReport::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const JSON: Option<&str> = Some("application/json");
    const TEXT: Option<&str> = Some("text/plain");

    #[test]
    fn test_decode_full_status_json() {
        let body = r#"{
            "relay_state": "on",
            "peer_connected": true,
            "uptime_seconds": 3725,
            "signal_strength": -61,
            "free_heap": 182344
        }"#;
        let report = decode_status(JSON, body);
        assert_eq!(report.relay_state, Some(RelayState::On));
        assert_eq!(report.peer_connected, Some(true));
        assert_eq!(report.uptime_seconds, Some(3725));
        assert_eq!(report.signal_strength, Some(-61));
        assert_eq!(report.free_heap_bytes, Some(182344));
        assert_eq!(report.message, None);
    }

    #[test]
    fn test_decode_command_json_with_uptime_alias() {
        let body = r#"{"relay_state": "OFF", "uptime": 120, "message": "Relay switched off"}"#;
        let report = decode_status(JSON, body);
        assert_eq!(report.relay_state, Some(RelayState::Off));
        assert_eq!(report.uptime_seconds, Some(120));
        assert_eq!(report.message, Some("Relay switched off".to_string()));
    }

    #[test]
    fn test_decode_json_with_prefix_text() {
        let body = "OK\n{\"relay_state\": \"on\", \"status\": \"done\"}";
        let report = decode_status(JSON, body);
        assert_eq!(report.relay_state, Some(RelayState::On));
        assert_eq!(report.message, Some("done".to_string()));
    }

    #[test]
    fn test_decode_json_absent_fields_stay_unset() {
        let report = decode_status(JSON, r#"{"message": "rebooting"}"#);
        assert_eq!(report.relay_state, None);
        assert_eq!(report.peer_connected, None);
        assert_eq!(report.uptime_seconds, None);
        assert_eq!(report.signal_strength, None);
        assert_eq!(report.free_heap_bytes, None);
    }

    #[test]
    fn test_decode_json_unrecognized_state_maps_to_unknown() {
        let report = decode_status(JSON, r#"{"relay_state": "boot"}"#);
        assert_eq!(report.relay_state, Some(RelayState::Unknown));
    }

    #[test]
    fn test_decode_out_of_range_signal_strength_stays_unset() {
        let body = r#"{"relay_state": "on", "signal_strength": 4294967296}"#;
        let report = decode_status(JSON, body);
        assert_eq!(report.relay_state, Some(RelayState::On));
        assert_eq!(report.signal_strength, None);
    }

    #[test]
    fn test_decode_text_on_heuristic_is_case_sensitive() {
        let report = decode_status(TEXT, "Relay is ON");
        assert_eq!(report.relay_state, Some(RelayState::On));
        assert_eq!(report.message, Some("Relay is ON".to_string()));

        // lowercase "on" does not match the firmware's status marker
        let report = decode_status(TEXT, "relay on");
        assert_eq!(report.relay_state, Some(RelayState::Off));
    }

    #[test]
    fn test_decode_empty_text_body_infers_off() {
        let report = decode_status(TEXT, "  \n");
        assert_eq!(report.relay_state, Some(RelayState::Off));
        assert_eq!(report.message, None);
    }

    #[test]
    fn test_decode_unparseable_json_falls_back_to_text() {
        let report = decode_status(JSON, "ERROR: flash busy");
        assert_eq!(report.relay_state, Some(RelayState::Off));
        assert_eq!(report.message, Some("ERROR: flash busy".to_string()));
    }

    #[test]
    fn test_decode_json_body_without_json_header_is_text() {
        let report = decode_status(TEXT, r#"{"relay_state": "on"}"#);
        assert_eq!(report.relay_state, Some(RelayState::Off));
        assert_eq!(report.message, Some(r#"{"relay_state": "on"}"#.to_string()));
    }
}
