//! Collaborator seams for the panel core.
//!
//! The core renders nothing and persists nothing on its own: views, durable
//! stores, and log consumers plug in behind these traits.

use crate::activity::LogEntry;
use crate::error::StorageError;
use crate::registry::{Device, RosterSnapshot};

/// Receives the full ordered roster after every mutation, pending markers
/// included. Re-rendering an unchanged list must be safe; the dispatcher
/// does not diff.
pub trait PanelView: Send + Sync {
    fn roster_changed(&self, devices: &[Device]);
}

/// View that renders nowhere.
pub struct NoopView;

impl PanelView for NoopView {
    fn roster_changed(&self, _devices: &[Device]) {}
}

/// Receives every activity log entry as it is appended, in call order.
pub trait LogSink: Send + Sync {
    fn append(&self, entry: &LogEntry);
}

/// Durable roster storage.
///
/// `save` runs after every mutation; a failure is logged and never aborts
/// the operation that triggered it. `load` runs once at startup; `None`
/// means no snapshot exists yet and the panel starts with an empty roster.
#[async_trait::async_trait]
pub trait RosterStore: Send + Sync {
    async fn save(&self, snapshot: &RosterSnapshot) -> Result<(), StorageError>;
    async fn load(&self) -> Result<Option<RosterSnapshot>, StorageError>;
}
