//! Append-only activity log.
//!
//! Every dispatcher operation records one or more human-readable lines
//! here. Attached sinks receive entries as they are appended; the CLI
//! streams them to the terminal.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::hooks::LogSink;

/// One timestamped activity line.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub timestamp: DateTime<Utc>,
    pub message: String,
}

/// In-memory activity history with sink fan-out.
pub struct ActivityLog {
    entries: Mutex<Vec<LogEntry>>,
    sinks: Mutex<Vec<Arc<dyn LogSink>>>,
}

impl ActivityLog {
    pub fn new() -> Self {
        Self {
            entries: Mutex::new(Vec::new()),
            sinks: Mutex::new(Vec::new()),
        }
    }

    /// Registers a sink; it receives entries appended from now on.
    pub fn attach_sink(&self, sink: Arc<dyn LogSink>) {
        self.sinks.lock().unwrap().push(sink);
    }

    /// Appends one line, stamped with the current time, and forwards it to
    /// every attached sink.
    pub fn append(&self, message: impl Into<String>) {
        let entry = LogEntry {
            timestamp: Utc::now(),
            message: message.into(),
        };
        self.entries.lock().unwrap().push(entry.clone());
        for sink in self.sinks.lock().unwrap().iter() {
            sink.append(&entry);
        }
    }

    /// Snapshot of all entries in append order.
    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.lock().unwrap().clone()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.lock().unwrap().is_empty()
    }

    /// Empties the history, then records that it did.
    pub fn clear(&self) {
        self.entries.lock().unwrap().clear();
        self.append("Activity log cleared");
    }
}

impl Default for ActivityLog {
    fn default() -> Self {
        Self::new()
    }
}
