//! crates/roster_notify_core/src/ports.rs
//!
//! Defines the contracts (traits) for everything the scheduler talks to but does
//! not own: the platform's local alert queue, the backend lookups, the
//! announcement change feed and the wall clock.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use futures::Stream;
use std::pin::Pin;

use crate::domain::{
    Announcement, DailyReminder, PermissionStatus, PublicEvent, Reminder, RoleContext,
};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("Item not found: {0}")]
    NotFound(String),
    #[error("Not supported on this platform: {0}")]
    Unsupported(String),
    #[error("Notification permission not granted: {0}")]
    PermissionDenied(String),
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Clock
//=========================================================================================

pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// The real wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

//=========================================================================================
// Platform Notification Queue
//=========================================================================================

#[async_trait]
pub trait NotificationPlatform: Send + Sync {
    /// Whether this platform can hold scheduled local alerts at all (a browser cannot).
    fn supports_scheduling(&self) -> bool;

    async fn permission_status(&self) -> PortResult<PermissionStatus>;

    /// Prompts the user for permission to show notifications.
    async fn request_permission(&self) -> PortResult<PermissionStatus>;

    async fn setup_channel(&self) -> PortResult<()>;

    /// Registers a one-shot alert. An alert already pending under the same
    /// identifier is replaced.
    async fn schedule_alert(&self, reminder: &Reminder) -> PortResult<String>;

    async fn cancel_alert(&self, identifier: &str) -> PortResult<()>;

    /// Shows an alert right away.
    async fn present_alert(&self, title: &str, body: &str) -> PortResult<()>;
}

//=========================================================================================
// Backend Lookups
//=========================================================================================

#[async_trait]
pub trait ProfileLookup: Send + Sync {
    async fn role_context(&self, user_id: &str) -> PortResult<RoleContext>;
}

#[async_trait]
pub trait EventsListing: Send + Sync {
    async fn list_events(&self) -> PortResult<Vec<PublicEvent>>;
}

#[async_trait]
pub trait DailyReminderStore: Send + Sync {
    async fn load(&self) -> PortResult<Vec<DailyReminder>>;
    async fn save(&self, reminders: &[DailyReminder]) -> PortResult<()>;
}

//=========================================================================================
// Realtime Feed & Cache
//=========================================================================================

pub type AnnouncementStream = Pin<Box<dyn Stream<Item = Announcement> + Send>>;

#[async_trait]
pub trait AnnouncementFeed: Send + Sync {
    /// Subscribes to inserts on the announcements collection.
    async fn subscribe(&self) -> PortResult<AnnouncementStream>;
}

/// Marks cached query results as stale.
pub trait CacheInvalidator: Send + Sync {
    fn invalidate(&self, key: &str);
}
