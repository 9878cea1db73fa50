//! Endpoint names for the relay device HTTP protocol.
//!
//! Devices expose five GET endpoints: `/ON` and `/OFF` switch the relay,
//! `/ON_SYNC` and `/OFF_SYNC` apply a state propagated from another device
//! without re-triggering propagation, and `/info` reports status.

use crate::registry::RelayState;

/// Status endpoint, shared by refreshes and post-add probes
pub const STATUS_ENDPOINT: &str = "info";

/// A relay switching action.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelayAction {
    On,
    Off,
}

impl RelayAction {
    /// Command endpoint path for this action
    pub fn endpoint(&self) -> &'static str {
        match self {
            RelayAction::On => "ON",
            RelayAction::Off => "OFF",
        }
    }

    /// Sync endpoint path, used when propagating this action to other
    /// devices
    pub fn sync_endpoint(&self) -> &'static str {
        match self {
            RelayAction::On => "ON_SYNC",
            RelayAction::Off => "OFF_SYNC",
        }
    }

    /// The relay state this action drives the device into
    pub fn state(&self) -> RelayState {
        match self {
            RelayAction::On => RelayState::On,
            RelayAction::Off => RelayState::Off,
        }
    }
}

impl std::fmt::Display for RelayAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.endpoint())
    }
}
