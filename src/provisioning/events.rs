//! JSONL run log kept beside the manifest on the card.
//!
//! One line per event so a crashed run still shows how far it got.

use crate::error::{ProvisionError, ProvisionResult};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::PathBuf;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventType {
    RunStarted,
    TreeMaterialized,
    SlotProvisioned,
    RunCompleted,
    RunFailed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProvisionEvent {
    pub event_id: Uuid,
    pub run_id: Uuid,
    pub event_type: EventType,
    pub timestamp: DateTime<Utc>,
    pub details: serde_json::Value,
}

impl ProvisionEvent {
    pub fn new(run_id: Uuid, event_type: EventType, details: serde_json::Value) -> Self {
        Self {
            event_id: Uuid::new_v4(),
            run_id,
            event_type,
            timestamp: Utc::now(),
            details,
        }
    }
}

/// Appends events to a JSONL file, or drops them when disabled.
#[derive(Debug, Clone)]
pub struct EventLog {
    path: Option<PathBuf>,
}

impl EventLog {
    pub fn at(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Some(path.into()),
        }
    }

    pub fn disabled() -> Self {
        Self { path: None }
    }

    pub fn record(
        &self,
        run_id: Uuid,
        event_type: EventType,
        details: serde_json::Value,
    ) -> ProvisionResult<()> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let event = ProvisionEvent::new(run_id, event_type, details);
        let mut line = serde_json::to_string(&event)
            .map_err(|err| ProvisionError::io("Encode event", path, err.into()))?;
        line.push('\n');
        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|err| ProvisionError::io("Open event log", path, err))?;
        file.write_all(line.as_bytes())
            .and_then(|_| file.flush())
            .map_err(|err| ProvisionError::io("Append event", path, err))?;
        Ok(())
    }

    pub fn list(&self) -> ProvisionResult<Vec<ProvisionEvent>> {
        let Some(path) = &self.path else {
            return Ok(Vec::new());
        };
        if !path.exists() {
            return Ok(Vec::new());
        }
        let data =
            fs::read_to_string(path).map_err(|err| ProvisionError::io("Read event log", path, err))?;
        let mut events = Vec::new();
        for line in data.lines().filter(|l| !l.trim().is_empty()) {
            let event: ProvisionEvent = serde_json::from_str(line)
                .map_err(|err| ProvisionError::io("Parse event log", path, err.into()))?;
            events.push(event);
        }
        Ok(events)
    }
}
