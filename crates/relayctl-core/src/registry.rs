//! Device registry: the in-memory roster of known relay devices.
//!
//! The registry owns device identity and last-known state. It performs no
//! network I/O; all state transitions are applied by the dispatcher through
//! [`Registry::update`].

use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::RegistryError;

/// Dotted-quad shape check; octet range is verified separately.
const ADDRESS_PATTERN: &str = r"^(\d{1,3}\.){3}\d{1,3}$";

/// Relay output state as last reported by the device.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelayState {
    On,
    Off,
    Unknown,
}

impl RelayState {
    /// Parses a device-reported state string. Anything that is not a
    /// case-insensitive "on" or "off" maps to [`RelayState::Unknown`].
    pub fn parse(s: &str) -> RelayState {
        if s.eq_ignore_ascii_case("on") {
            RelayState::On
        } else if s.eq_ignore_ascii_case("off") {
            RelayState::Off
        } else {
            RelayState::Unknown
        }
    }
}

impl std::fmt::Display for RelayState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RelayState::On => write!(f, "on"),
            RelayState::Off => write!(f, "off"),
            RelayState::Unknown => write!(f, "unknown"),
        }
    }
}

/// A registered relay device and its last-known state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Device {
    /// Stable identifier, never reused within a registry's lifetime
    pub id: u64,
    /// Operator-assigned label
    pub name: String,
    /// IPv4 address in dotted-quad form, unique across the roster
    pub address: String,
    /// Whether the last exchange with the device succeeded
    pub reachable: bool,
    /// Relay output state from the last successful exchange
    pub relay_state: RelayState,
    /// ESP-NOW peer link status, if the device reports it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub peer_connected: Option<bool>,
    /// Device uptime in seconds, if reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uptime_seconds: Option<u64>,
    /// WiFi signal strength in dBm, if reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub signal_strength: Option<i32>,
    /// Free heap in bytes, if reported
    #[serde(skip_serializing_if = "Option::is_none")]
    pub free_heap_bytes: Option<u64>,
    /// Timestamp of the last exchange attempt, successful or not
    pub last_update: DateTime<Utc>,
    /// In-flight marker for views; not persisted
    #[serde(skip)]
    pub pending: bool,
}

/// Persisted roster: the device list plus the panel-wide sync flag.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RosterSnapshot {
    pub devices: Vec<Device>,
    pub sync_enabled: bool,
}

/// Insertion-ordered device roster with validated membership.
#[derive(Debug)]
pub struct Registry {
    devices: Vec<Device>,
    next_id: u64,
    address_regex: Regex,
}

impl Registry {
    pub fn new() -> Self {
        Self {
            devices: Vec::new(),
            next_id: 1,
            address_regex: Regex::new(ADDRESS_PATTERN).unwrap(),
        }
    }

    /// Rebuilds a registry from persisted devices. The id counter resumes
    /// past the highest persisted id so removed ids are never handed out
    /// again.
    pub fn from_devices(devices: Vec<Device>) -> Self {
        let next_id = devices.iter().map(|d| d.id).max().map_or(1, |max| max + 1);
        Self {
            devices,
            next_id,
            address_regex: Regex::new(ADDRESS_PATTERN).unwrap(),
        }
    }

    /// Registers a new device. Name and address are trimmed before
    /// validation; the new device starts unreachable with an unknown relay
    /// state.
    pub fn add(&mut self, name: &str, address: &str) -> Result<Device, RegistryError> {
        let name = name.trim();
        let address = address.trim();

        if name.is_empty() {
            return Err(RegistryError::InvalidName("name is empty".to_string()));
        }
        self.validate_address(address)?;
        if self.devices.iter().any(|d| d.address == address) {
            return Err(RegistryError::DuplicateAddress(address.to_string()));
        }

        let device = Device {
            id: self.next_id,
            name: name.to_string(),
            address: address.to_string(),
            reachable: false,
            relay_state: RelayState::Unknown,
            peer_connected: None,
            uptime_seconds: None,
            signal_strength: None,
            free_heap_bytes: None,
            last_update: Utc::now(),
            pending: false,
        };
        self.next_id += 1;
        self.devices.push(device.clone());
        Ok(device)
    }

    /// Removes a device by id. Returns `false` when the id is not present;
    /// removing twice is a no-op.
    pub fn remove(&mut self, id: u64) -> bool {
        let before = self.devices.len();
        self.devices.retain(|d| d.id != id);
        self.devices.len() != before
    }

    pub fn find(&self, id: u64) -> Option<&Device> {
        self.devices.iter().find(|d| d.id == id)
    }

    /// Devices in insertion order.
    pub fn list(&self) -> &[Device] {
        &self.devices
    }

    /// Applies a mutation to one device. Returns `false` when the id is not
    /// present.
    pub fn update<F>(&mut self, id: u64, apply: F) -> bool
    where
        F: FnOnce(&mut Device),
    {
        match self.devices.iter_mut().find(|d| d.id == id) {
            Some(device) => {
                apply(device);
                true
            }
            None => false,
        }
    }

    /// Looks a device up by numeric id, exact address, or case-insensitive
    /// name, in that order.
    pub fn resolve(&self, target: &str) -> Option<u64> {
        let target = target.trim();
        if let Ok(id) = target.parse::<u64>() {
            if self.devices.iter().any(|d| d.id == id) {
                return Some(id);
            }
        }
        if let Some(device) = self.devices.iter().find(|d| d.address == target) {
            return Some(device.id);
        }
        self.devices
            .iter()
            .find(|d| d.name.eq_ignore_ascii_case(target))
            .map(|d| d.id)
    }

    pub fn len(&self) -> usize {
        self.devices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.devices.is_empty()
    }

    pub fn snapshot(&self, sync_enabled: bool) -> RosterSnapshot {
        RosterSnapshot {
            devices: self.devices.clone(),
            sync_enabled,
        }
    }

    fn validate_address(&self, address: &str) -> Result<(), RegistryError> {
        if !self.address_regex.is_match(address) {
            return Err(RegistryError::InvalidAddress(address.to_string()));
        }
        for octet in address.split('.') {
            let value: u32 = octet
                .parse()
                .map_err(|_| RegistryError::InvalidAddress(address.to_string()))?;
            if value > 255 {
                return Err(RegistryError::InvalidAddress(address.to_string()));
            }
        }
        Ok(())
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_assigns_sequential_ids() {
        let mut registry = Registry::new();
        let a = registry.add("Main", "192.168.4.2").unwrap();
        let b = registry.add("Secondary", "192.168.4.3").unwrap();
        assert_eq!(a.id, 1);
        assert_eq!(b.id, 2);
        assert_eq!(a.relay_state, RelayState::Unknown);
        assert!(!a.reachable);
    }

    #[test]
    fn test_add_trims_name_and_address() {
        let mut registry = Registry::new();
        let device = registry.add("  Kitchen  ", " 10.0.0.5 ").unwrap();
        assert_eq!(device.name, "Kitchen");
        assert_eq!(device.address, "10.0.0.5");
    }

    #[test]
    fn test_add_rejects_empty_name() {
        let mut registry = Registry::new();
        let err = registry.add("   ", "192.168.4.2").unwrap_err();
        assert!(matches!(err, RegistryError::InvalidName(_)));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_add_accepts_valid_addresses() {
        let mut registry = Registry::new();
        for (i, address) in ["0.0.0.0", "255.255.255.255", "192.168.004.002", "1.2.3.4"]
            .iter()
            .enumerate()
        {
            registry
                .add(&format!("dev{}", i), address)
                .unwrap_or_else(|e| panic!("rejected {}: {}", address, e));
        }
    }

    #[test]
    fn test_add_rejects_malformed_addresses() {
        let mut registry = Registry::new();
        for address in [
            "",
            "192.168.4",
            "192.168.4.2.9",
            "192.168.4.256",
            "a.b.c.d",
            "192.168.-4.2",
            "192.168.4.2:80",
        ] {
            let err = registry.add("dev", address).unwrap_err();
            assert!(
                matches!(err, RegistryError::InvalidAddress(_)),
                "expected rejection for {:?}",
                address
            );
        }
        assert!(registry.is_empty());
    }

    #[test]
    fn test_add_rejects_duplicate_address_and_leaves_roster_unchanged() {
        let mut registry = Registry::new();
        registry.add("Main", "192.168.4.2").unwrap();
        let err = registry.add("Copy", "192.168.4.2").unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateAddress("192.168.4.2".to_string())
        );
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.list()[0].name, "Main");
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut registry = Registry::new();
        let device = registry.add("Main", "192.168.4.2").unwrap();
        assert!(registry.remove(device.id));
        assert!(!registry.remove(device.id));
        assert!(registry.is_empty());
    }

    #[test]
    fn test_removed_ids_are_never_reused() {
        let mut registry = Registry::new();
        registry.add("A", "10.0.0.1").unwrap();
        let b = registry.add("B", "10.0.0.2").unwrap();
        registry.remove(b.id);
        let c = registry.add("C", "10.0.0.3").unwrap();
        assert_eq!(c.id, 3);
    }

    #[test]
    fn test_list_preserves_insertion_order_after_removal() {
        let mut registry = Registry::new();
        let a = registry.add("A", "10.0.0.1").unwrap();
        registry.add("B", "10.0.0.2").unwrap();
        registry.add("C", "10.0.0.3").unwrap();
        registry.remove(a.id);
        let names: Vec<&str> = registry.list().iter().map(|d| d.name.as_str()).collect();
        assert_eq!(names, vec!["B", "C"]);
    }

    #[test]
    fn test_update_applies_mutation() {
        let mut registry = Registry::new();
        let device = registry.add("Main", "192.168.4.2").unwrap();
        assert!(registry.update(device.id, |d| {
            d.relay_state = RelayState::On;
            d.reachable = true;
        }));
        let updated = registry.find(device.id).unwrap();
        assert_eq!(updated.relay_state, RelayState::On);
        assert!(updated.reachable);
        assert!(!registry.update(999, |d| d.reachable = false));
    }

    #[test]
    fn test_resolve_by_id_address_and_name() {
        let mut registry = Registry::new();
        let a = registry.add("Kitchen", "192.168.4.2").unwrap();
        let b = registry.add("Garage", "192.168.4.3").unwrap();
        assert_eq!(registry.resolve(&a.id.to_string()), Some(a.id));
        assert_eq!(registry.resolve("192.168.4.3"), Some(b.id));
        assert_eq!(registry.resolve("garage"), Some(b.id));
        assert_eq!(registry.resolve("Cellar"), None);
    }

    #[test]
    fn test_snapshot_restore_continues_id_sequence() {
        let mut registry = Registry::new();
        registry.add("A", "10.0.0.1").unwrap();
        registry.add("B", "10.0.0.2").unwrap();
        let snapshot = registry.snapshot(true);
        assert!(snapshot.sync_enabled);

        let mut restored = Registry::from_devices(snapshot.devices);
        assert_eq!(restored.len(), 2);
        let c = restored.add("C", "10.0.0.3").unwrap();
        assert_eq!(c.id, 3);
    }

    #[test]
    fn test_device_serialization_uses_camel_case() {
        let mut registry = Registry::new();
        let device = registry.add("Main", "192.168.4.2").unwrap();
        let json = serde_json::to_string(&device).unwrap();
        assert!(json.contains("\"relayState\":\"unknown\""));
        assert!(json.contains("\"lastUpdate\""));
        // absent telemetry and the in-flight marker stay off the wire
        assert!(!json.contains("peerConnected"));
        assert!(!json.contains("pending"));
    }

    #[test]
    fn test_relay_state_parse() {
        assert_eq!(RelayState::parse("on"), RelayState::On);
        assert_eq!(RelayState::parse("ON"), RelayState::On);
        assert_eq!(RelayState::parse("Off"), RelayState::Off);
        assert_eq!(RelayState::parse("toggled"), RelayState::Unknown);
    }
}
