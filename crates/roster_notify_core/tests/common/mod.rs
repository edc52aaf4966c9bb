//! In-memory stand-ins for the ports, shared by the integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use futures::stream;
use rand::SeedableRng;
use rand_pcg::Pcg64;
use roster_notify_core::{
    Announcement, AnnouncementFeed, AnnouncementStream, CacheInvalidator, Clock, DailyReminder,
    DailyReminderStore, EncouragementPicker, EventsListing, LocalAlerts, NotificationPlatform,
    PermissionStatus, PortError, PortResult, ProfileLookup, PublicEvent, Reminder, RoleContext,
    RoutineActions,
};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

pub struct FixedClock(pub Mutex<DateTime<Utc>>);

impl FixedClock {
    pub fn at(now: DateTime<Utc>) -> Arc<Self> {
        Arc::new(Self(Mutex::new(now)))
    }

    pub fn set(&self, now: DateTime<Utc>) {
        *self.0.lock().unwrap() = now;
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        *self.0.lock().unwrap()
    }
}

/// Records every call made to the platform.
pub struct RecordingPlatform {
    pub supports: bool,
    pub answer: PermissionStatus,
    pub fail_schedule: bool,
    pub fail_channel: bool,
    pub scheduled: Mutex<Vec<Reminder>>,
    pub canceled: Mutex<Vec<String>>,
    pub presented: Mutex<Vec<(String, String)>>,
    pub permission_requests: Mutex<usize>,
}

impl RecordingPlatform {
    pub fn new() -> Self {
        Self {
            supports: true,
            answer: PermissionStatus::Granted,
            fail_schedule: false,
            fail_channel: false,
            scheduled: Mutex::new(Vec::new()),
            canceled: Mutex::new(Vec::new()),
            presented: Mutex::new(Vec::new()),
            permission_requests: Mutex::new(0),
        }
    }

    pub fn web() -> Self {
        Self { supports: false, ..Self::new() }
    }

    pub fn denying() -> Self {
        Self { answer: PermissionStatus::Denied, ..Self::new() }
    }

    pub fn scheduled_ids(&self) -> Vec<String> {
        self.scheduled.lock().unwrap().iter().map(|r| r.identifier.clone()).collect()
    }

    pub fn canceled_ids(&self) -> Vec<String> {
        self.canceled.lock().unwrap().clone()
    }

    pub fn presented_titles(&self) -> Vec<String> {
        self.presented.lock().unwrap().iter().map(|(t, _)| t.clone()).collect()
    }
}

#[async_trait]
impl NotificationPlatform for RecordingPlatform {
    fn supports_scheduling(&self) -> bool {
        self.supports
    }

    async fn permission_status(&self) -> PortResult<PermissionStatus> {
        Ok(PermissionStatus::Undetermined)
    }

    async fn request_permission(&self) -> PortResult<PermissionStatus> {
        *self.permission_requests.lock().unwrap() += 1;
        Ok(self.answer)
    }

    async fn setup_channel(&self) -> PortResult<()> {
        if self.fail_channel {
            return Err(PortError::Unexpected("channel refused".to_string()));
        }
        Ok(())
    }

    async fn schedule_alert(&self, reminder: &Reminder) -> PortResult<String> {
        if self.fail_schedule {
            return Err(PortError::Unexpected("queue full".to_string()));
        }
        let mut scheduled = self.scheduled.lock().unwrap();
        scheduled.retain(|r| r.identifier != reminder.identifier);
        scheduled.push(reminder.clone());
        Ok(reminder.identifier.clone())
    }

    async fn cancel_alert(&self, identifier: &str) -> PortResult<()> {
        self.canceled.lock().unwrap().push(identifier.to_string());
        self.scheduled.lock().unwrap().retain(|r| r.identifier != identifier);
        Ok(())
    }

    async fn present_alert(&self, title: &str, body: &str) -> PortResult<()> {
        self.presented
            .lock()
            .unwrap()
            .push((title.to_string(), body.to_string()));
        Ok(())
    }
}

pub struct StaticProfiles(pub HashMap<String, RoleContext>);

#[async_trait]
impl ProfileLookup for StaticProfiles {
    async fn role_context(&self, user_id: &str) -> PortResult<RoleContext> {
        self.0
            .get(user_id)
            .copied()
            .ok_or_else(|| PortError::NotFound(format!("profile {}", user_id)))
    }
}

pub struct StaticEvents(pub Option<Vec<PublicEvent>>);

#[async_trait]
impl EventsListing for StaticEvents {
    async fn list_events(&self) -> PortResult<Vec<PublicEvent>> {
        self.0
            .clone()
            .ok_or_else(|| PortError::Unexpected("backend unreachable".to_string()))
    }
}

pub struct VecFeed(pub Option<Vec<Announcement>>);

#[async_trait]
impl AnnouncementFeed for VecFeed {
    async fn subscribe(&self) -> PortResult<AnnouncementStream> {
        match &self.0 {
            Some(items) => Ok(Box::pin(stream::iter(items.clone()))),
            None => Err(PortError::Unexpected("realtime offline".to_string())),
        }
    }
}

#[derive(Default)]
pub struct CountingCache(pub Mutex<Vec<String>>);

impl CacheInvalidator for CountingCache {
    fn invalidate(&self, key: &str) {
        self.0.lock().unwrap().push(key.to_string());
    }
}

#[derive(Default)]
pub struct MemoryStore(pub Mutex<Vec<DailyReminder>>);

#[async_trait]
impl DailyReminderStore for MemoryStore {
    async fn load(&self) -> PortResult<Vec<DailyReminder>> {
        Ok(self.0.lock().unwrap().clone())
    }

    async fn save(&self, reminders: &[DailyReminder]) -> PortResult<()> {
        *self.0.lock().unwrap() = reminders.to_vec();
        Ok(())
    }
}

pub fn alerts(platform: &Arc<RecordingPlatform>, clock: &Arc<FixedClock>) -> LocalAlerts {
    LocalAlerts::new(platform.clone(), clock.clone())
}

pub fn seeded_picker(seed: u64) -> Arc<EncouragementPicker> {
    Arc::new(EncouragementPicker::new(Box::new(Pcg64::seed_from_u64(seed)), Tz::UTC))
}

pub fn actions(
    alerts: LocalAlerts,
    events: Option<Vec<PublicEvent>>,
    profiles: HashMap<String, RoleContext>,
    user_id: Option<&str>,
) -> Arc<RoutineActions> {
    Arc::new(RoutineActions::new(
        alerts,
        Arc::new(StaticEvents(events)),
        Arc::new(StaticProfiles(profiles)),
        seeded_picker(42),
        user_id.map(str::to_string),
        Tz::UTC,
    ))
}
