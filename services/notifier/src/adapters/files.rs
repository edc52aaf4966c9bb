//! services/notifier/src/adapters/files.rs
//!
//! JSON-file backed implementations of the backend lookups and the daily
//! reminder store. Each call reads the file fresh, so edits are picked up
//! without a restart.

use async_trait::async_trait;
use roster_notify_core::domain::{DailyReminder, PublicEvent, RoleContext};
use roster_notify_core::ports::{
    DailyReminderStore, EventsListing, PortError, PortResult, ProfileLookup,
};
use serde::de::DeserializeOwned;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// Reads and parses a JSON file. A missing file yields `Ok(None)`.
async fn read_json<T: DeserializeOwned>(path: &Path) -> PortResult<Option<T>> {
    let raw = match tokio::fs::read_to_string(path).await {
        Ok(raw) => raw,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => {
            return Err(PortError::Unexpected(format!(
                "reading {}: {}",
                path.display(),
                e
            )))
        }
    };
    serde_json::from_str(&raw)
        .map(Some)
        .map_err(|e| PortError::Unexpected(format!("parsing {}: {}", path.display(), e)))
}

//=========================================================================================
// Events
//=========================================================================================

/// Lists events from a JSON array of `{ id, title, date: "YYYY-MM-DD" }`.
#[derive(Clone)]
pub struct JsonEventsListing {
    path: PathBuf,
}

impl JsonEventsListing {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl EventsListing for JsonEventsListing {
    async fn list_events(&self) -> PortResult<Vec<PublicEvent>> {
        read_json(&self.path)
            .await?
            .ok_or_else(|| PortError::NotFound(self.path.display().to_string()))
    }
}

//=========================================================================================
// Profiles
//=========================================================================================

/// Looks profiles up in a JSON object keyed by user id.
#[derive(Clone)]
pub struct JsonProfileLookup {
    path: PathBuf,
}

impl JsonProfileLookup {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl ProfileLookup for JsonProfileLookup {
    async fn role_context(&self, user_id: &str) -> PortResult<RoleContext> {
        let profiles: HashMap<String, RoleContext> = read_json(&self.path)
            .await?
            .ok_or_else(|| PortError::NotFound(self.path.display().to_string()))?;
        profiles
            .get(user_id)
            .copied()
            .ok_or_else(|| PortError::NotFound(format!("profile for user {}", user_id)))
    }
}

//=========================================================================================
// Daily Reminders
//=========================================================================================

#[derive(Clone)]
pub struct JsonDailyReminderStore {
    path: PathBuf,
}

impl JsonDailyReminderStore {
    pub fn new(path: PathBuf) -> Self {
        Self { path }
    }
}

#[async_trait]
impl DailyReminderStore for JsonDailyReminderStore {
    async fn load(&self) -> PortResult<Vec<DailyReminder>> {
        Ok(read_json(&self.path).await?.unwrap_or_default())
    }

    async fn save(&self, reminders: &[DailyReminder]) -> PortResult<()> {
        let json = serde_json::to_string_pretty(reminders)
            .map_err(|e| PortError::Unexpected(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| PortError::Unexpected(e.to_string()))?;
        }
        tokio::fs::write(&self.path, json)
            .await
            .map_err(|e| PortError::Unexpected(format!("writing {}: {}", self.path.display(), e)))
    }
}
