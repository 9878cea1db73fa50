//! Command dispatcher: the orchestration core of the panel.
//!
//! Every operator- or timer-initiated action flows through here. The
//! dispatcher runs exchanges through the [`DeviceExchange`] client, applies
//! the outcome to the registry, writes activity log lines, and notifies the
//! view/persistence collaborators.
//!
//! Device state moves only on exchange outcomes: a success applies the
//! reported relay state (or, for command responses that omit it, the action
//! just sent); any timeout, HTTP error, or transport failure marks the
//! device unreachable and resets its relay state to unknown in the same
//! update.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::Serialize;
use tokio::sync::RwLock;

use crate::activity::ActivityLog;
use crate::device::client::{DeviceExchange, RequestProfiles};
use crate::error::{ExchangeError, RegistryError, Result};
use crate::hooks::{NoopView, PanelView, RosterStore};
use crate::protocol::commands::{RelayAction, STATUS_ENDPOINT};
use crate::protocol::response::StatusReport;
use crate::registry::{Device, Registry, RelayState};

/// Result of one dispatched exchange, for display layers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchOutcome {
    pub id: u64,
    pub name: String,
    pub address: String,
    pub success: bool,
    /// Device message on success, error description on failure
    pub detail: String,
}

/// Reachability totals after a connection test.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ConnectionSummary {
    pub online: usize,
    pub total: usize,
}

/// Orchestrates commands, refreshes, and sync fan-out against the roster.
pub struct Dispatcher {
    registry: Arc<RwLock<Registry>>,
    client: Arc<dyn DeviceExchange>,
    log: Arc<ActivityLog>,
    view: Arc<dyn PanelView>,
    store: Option<Arc<dyn RosterStore>>,
    profiles: RequestProfiles,
    sync_enabled: AtomicBool,
}

impl Dispatcher {
    pub fn new(registry: Registry, client: Arc<dyn DeviceExchange>, log: Arc<ActivityLog>) -> Self {
        Self {
            registry: Arc::new(RwLock::new(registry)),
            client,
            log,
            view: Arc::new(NoopView),
            store: None,
            profiles: RequestProfiles::default(),
            sync_enabled: AtomicBool::new(true),
        }
    }

    pub fn with_view(mut self, view: Arc<dyn PanelView>) -> Self {
        self.view = view;
        self
    }

    pub fn with_store(mut self, store: Arc<dyn RosterStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn with_profiles(mut self, profiles: RequestProfiles) -> Self {
        self.profiles = profiles;
        self
    }

    /// Sets the initial sync flag without logging, for startup from a
    /// persisted snapshot.
    pub fn with_sync_mode(self, enabled: bool) -> Self {
        self.sync_enabled.store(enabled, Ordering::Relaxed);
        self
    }

    // ==================== Roster operations ====================

    /// Registers a device and probes it immediately, so a freshly added
    /// device shows real state instead of unknown.
    pub async fn add_device(&self, name: &str, address: &str) -> Result<Device> {
        let device = {
            let mut registry = self.registry.write().await;
            registry.add(name, address)?
        };
        self.log
            .append(format!("Device added: {} ({})", device.name, device.address));
        self.notify_changed().await;

        self.refresh_one(device.id).await?;
        let registry = self.registry.read().await;
        Ok(registry.find(device.id).cloned().unwrap_or(device))
    }

    /// Removes a device by id. Unknown ids are an error so the caller can
    /// distinguish a typo from a removal.
    pub async fn remove_device(&self, id: u64) -> Result<Device> {
        let removed = {
            let mut registry = self.registry.write().await;
            let device = registry
                .find(id)
                .cloned()
                .ok_or(RegistryError::NotFound(id))?;
            registry.remove(id);
            device
        };
        self.log.append(format!("Device removed: {}", removed.name));
        self.notify_changed().await;
        Ok(removed)
    }

    // ==================== Control operations ====================

    /// Sends one relay command to one device.
    ///
    /// On success the device may trigger sync fan-out to its peers (sync
    /// mode on and more than one device registered). The pending marker set
    /// at the start is cleared unconditionally once the exchange and any
    /// fan-out finish, success or failure alike. Only an unknown id is an
    /// error; exchange failures come back as an unsuccessful outcome.
    pub async fn control_one(&self, id: u64, action: RelayAction) -> Result<DispatchOutcome> {
        let (name, address) = self.begin_exchange(id).await?;
        self.notify_changed().await;

        let result = self
            .client
            .exchange(&address, action.endpoint(), self.profiles.command)
            .await;

        let outcome = match result {
            Ok(report) => {
                let state = report.relay_state.unwrap_or_else(|| action.state());
                {
                    let mut registry = self.registry.write().await;
                    registry.update(id, |d| {
                        d.relay_state = state;
                        if report.peer_connected.is_some() {
                            d.peer_connected = report.peer_connected;
                        }
                        if report.uptime_seconds.is_some() {
                            d.uptime_seconds = report.uptime_seconds;
                        }
                        d.reachable = true;
                        d.last_update = Utc::now();
                    });
                }
                let detail = report
                    .message
                    .clone()
                    .unwrap_or_else(|| format!("{} acknowledged", action));
                self.log.append(format!("{}: {}", name, detail));
                if report.peer_connected == Some(true) {
                    self.log.append(format!("{} connected to peer", name));
                }
                DispatchOutcome {
                    id,
                    name,
                    address,
                    success: true,
                    detail,
                }
            }
            Err(err) => {
                self.mark_unreachable(id).await;
                match &err {
                    ExchangeError::Timeout(_) => self
                        .log
                        .append(format!("Timed out controlling {}", name)),
                    other => self
                        .log
                        .append(format!("Failed to control {}: {}", name, other)),
                }
                DispatchOutcome {
                    id,
                    name,
                    address,
                    success: false,
                    detail: err.to_string(),
                }
            }
        };

        if outcome.success && self.sync_mode() && self.device_count().await > 1 {
            self.sync_others(id, action).await;
        }

        self.finish_exchange(id).await;
        self.notify_changed().await;
        Ok(outcome)
    }

    /// Inverts the relay: ON when currently off or unknown, OFF when on.
    /// Unreachable devices are left alone; `None` signals the skip.
    pub async fn toggle(&self, id: u64) -> Result<Option<DispatchOutcome>> {
        let next = {
            let registry = self.registry.read().await;
            let device = registry.find(id).ok_or(RegistryError::NotFound(id))?;
            if !device.reachable {
                None
            } else if device.relay_state == RelayState::On {
                Some(RelayAction::Off)
            } else {
                Some(RelayAction::On)
            }
        };
        match next {
            Some(action) => Ok(Some(self.control_one(id, action).await?)),
            None => Ok(None),
        }
    }

    /// Propagates an acknowledged action to every other reachable device,
    /// sequentially in roster order, with the short sync deadline.
    ///
    /// Best-effort by contract: a 2xx sets the target's relay state to the
    /// propagated action; a failure only logs. Targets never abort each
    /// other and the originating device is never touched.
    pub async fn sync_others(&self, exclude: u64, action: RelayAction) -> Vec<DispatchOutcome> {
        let targets: Vec<(u64, String, String)> = {
            let registry = self.registry.read().await;
            registry
                .list()
                .iter()
                .filter(|d| d.id != exclude && d.reachable)
                .map(|d| (d.id, d.name.clone(), d.address.clone()))
                .collect()
        };

        if targets.is_empty() {
            self.log.append("No other devices online to sync");
            return Vec::new();
        }

        self.log
            .append(format!("Syncing {} to {} device(s)...", action, targets.len()));

        let mut outcomes = Vec::with_capacity(targets.len());
        for (id, name, address) in targets {
            match self
                .client
                .probe(&address, action.sync_endpoint(), self.profiles.sync)
                .await
            {
                Ok(()) => {
                    {
                        let mut registry = self.registry.write().await;
                        registry.update(id, |d| {
                            d.relay_state = action.state();
                            d.last_update = Utc::now();
                        });
                    }
                    self.log.append(format!("Synced {}: {}", name, action));
                    outcomes.push(DispatchOutcome {
                        id,
                        name,
                        address,
                        success: true,
                        detail: format!("synced {}", action),
                    });
                }
                Err(err) => {
                    match &err {
                        ExchangeError::Timeout(_) => {
                            self.log.append(format!("Sync timed out for {}", name))
                        }
                        other => self
                            .log
                            .append(format!("Sync failed for {}: {}", name, other)),
                    }
                    outcomes.push(DispatchOutcome {
                        id,
                        name,
                        address,
                        success: false,
                        detail: err.to_string(),
                    });
                }
            }
        }

        self.notify_changed().await;
        outcomes
    }

    /// Sends the action to every registered device concurrently and waits
    /// for all of them. An empty roster logs a notice and does nothing.
    pub async fn control_all(&self, action: RelayAction) -> Vec<DispatchOutcome> {
        use futures::future::join_all;

        let ids: Vec<u64> = {
            let registry = self.registry.read().await;
            registry.list().iter().map(|d| d.id).collect()
        };
        if ids.is_empty() {
            self.log.append("No devices registered");
            return Vec::new();
        }

        self.log
            .append(format!("Sending {} to all devices...", action));
        let results = join_all(ids.into_iter().map(|id| self.control_one(id, action))).await;
        self.log
            .append(format!("{} command sent to all devices", action));

        // a device removed mid-flight just drops out of the outcome list
        results.into_iter().filter_map(|r| r.ok()).collect()
    }

    // ==================== Status operations ====================

    /// Fetches the status endpoint and overwrites the device's full
    /// telemetry set; fields the device did not report are cleared rather
    /// than left stale.
    pub async fn refresh_one(&self, id: u64) -> Result<DispatchOutcome> {
        let (name, address) = self.begin_exchange(id).await?;
        self.notify_changed().await;

        let result = self
            .client
            .exchange(&address, STATUS_ENDPOINT, self.profiles.status)
            .await;

        let outcome = match result {
            Ok(report) => {
                let state = report.relay_state.unwrap_or(RelayState::Unknown);
                {
                    let mut registry = self.registry.write().await;
                    registry.update(id, |d| {
                        d.reachable = true;
                        d.relay_state = state;
                        d.peer_connected = report.peer_connected;
                        d.uptime_seconds = report.uptime_seconds;
                        d.signal_strength = report.signal_strength;
                        d.free_heap_bytes = report.free_heap_bytes;
                        d.last_update = Utc::now();
                    });
                }
                let detail = describe_report(&report, state);
                self.log.append(format!("{}: {}", name, detail));
                DispatchOutcome {
                    id,
                    name,
                    address,
                    success: true,
                    detail,
                }
            }
            Err(err) => {
                self.mark_unreachable(id).await;
                match &err {
                    ExchangeError::Timeout(_) => {
                        self.log.append(format!("Timed out checking {}", name))
                    }
                    other => self.log.append(format!("{} offline: {}", name, other)),
                }
                DispatchOutcome {
                    id,
                    name,
                    address,
                    success: false,
                    detail: err.to_string(),
                }
            }
        };

        self.finish_exchange(id).await;
        self.notify_changed().await;
        Ok(outcome)
    }

    /// Refreshes every registered device concurrently.
    pub async fn refresh_all(&self) -> Vec<DispatchOutcome> {
        use futures::future::join_all;

        let ids: Vec<u64> = {
            let registry = self.registry.read().await;
            registry.list().iter().map(|d| d.id).collect()
        };
        if ids.is_empty() {
            self.log.append("No devices registered");
            return Vec::new();
        }

        self.log.append("Refreshing all device status...");
        let results = join_all(ids.into_iter().map(|id| self.refresh_one(id))).await;
        self.log.append("All device status updated");

        results.into_iter().filter_map(|r| r.ok()).collect()
    }

    /// Refreshes everything and reports how many devices answered.
    pub async fn test_connections(&self) -> ConnectionSummary {
        self.refresh_all().await;
        let (online, total) = {
            let registry = self.registry.read().await;
            (
                registry.list().iter().filter(|d| d.reachable).count(),
                registry.len(),
            )
        };
        self.log.append(format!(
            "Connection test complete: {}/{} devices online",
            online, total
        ));
        ConnectionSummary { online, total }
    }

    // ==================== Sync mode ====================

    pub fn sync_mode(&self) -> bool {
        self.sync_enabled.load(Ordering::Relaxed)
    }

    pub async fn set_sync_mode(&self, enabled: bool) {
        self.sync_enabled.store(enabled, Ordering::Relaxed);
        self.log.append(if enabled {
            "Synchronization enabled"
        } else {
            "Synchronization disabled"
        });
        self.notify_changed().await;
    }

    // ==================== Accessors ====================

    /// Snapshot of the roster in insertion order.
    pub async fn devices(&self) -> Vec<Device> {
        self.registry.read().await.list().to_vec()
    }

    pub async fn device_count(&self) -> usize {
        self.registry.read().await.len()
    }

    /// Resolves an operator-supplied target (id, address, or name) to a
    /// device id.
    pub async fn resolve(&self, target: &str) -> Option<u64> {
        self.registry.read().await.resolve(target)
    }

    // ==================== Internals ====================

    /// Captures the device identity and raises its pending marker.
    async fn begin_exchange(&self, id: u64) -> Result<(String, String)> {
        let mut registry = self.registry.write().await;
        let identity = {
            let device = registry.find(id).ok_or(RegistryError::NotFound(id))?;
            (device.name.clone(), device.address.clone())
        };
        registry.update(id, |d| d.pending = true);
        Ok(identity)
    }

    async fn finish_exchange(&self, id: u64) {
        let mut registry = self.registry.write().await;
        registry.update(id, |d| d.pending = false);
    }

    async fn mark_unreachable(&self, id: u64) {
        let mut registry = self.registry.write().await;
        registry.update(id, |d| {
            d.reachable = false;
            d.relay_state = RelayState::Unknown;
            d.last_update = Utc::now();
        });
    }

    /// Pushes the current roster to the view and persists the snapshot.
    /// A save failure becomes a log line, never an operation failure.
    async fn notify_changed(&self) {
        let devices = { self.registry.read().await.list().to_vec() };
        self.view.roster_changed(&devices);
        if let Some(store) = &self.store {
            let snapshot = crate::registry::RosterSnapshot {
                devices,
                sync_enabled: self.sync_mode(),
            };
            if let Err(e) = store.save(&snapshot).await {
                self.log.append(format!("Failed to save roster: {}", e));
            }
        }
    }
}

/// One-line status summary for the log: the device's own message text when
/// it sent any, decoded telemetry otherwise.
fn describe_report(report: &StatusReport, state: RelayState) -> String {
    if let Some(message) = &report.message {
        return message.clone();
    }
    let mut parts = vec![format!("relay {}", state)];
    if let Some(peer) = report.peer_connected {
        parts.push(if peer {
            "peer connected".to_string()
        } else {
            "peer disconnected".to_string()
        });
    }
    if let Some(uptime) = report.uptime_seconds {
        parts.push(format!("up {}min", uptime / 60));
    }
    parts.join(", ")
}
