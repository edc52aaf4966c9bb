//! services/notifier/src/adapters/console.rs
//!
//! A notification platform that "delivers" alerts by logging them under the
//! `delivery` target. It keeps a real pending queue: alerts are held in
//! spawned timers, replaced by identifier and cancelable. Nothing is queued
//! or shown unless the permission prompt was answered with a grant.

use async_trait::async_trait;
use roster_notify_core::clock::delay_until;
use roster_notify_core::domain::{PermissionStatus, Reminder};
use roster_notify_core::ports::{Clock, NotificationPlatform, PortError, PortResult};
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::PlatformKind;

/// A pending alert: its registration number and the timer task delivering it.
type Pending = HashMap<String, (u64, JoinHandle<()>)>;

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

pub struct ConsolePlatform {
    kind: PlatformKind,
    answer: PermissionStatus,
    prompted: AtomicBool,
    clock: Arc<dyn Clock>,
    pending: Arc<Mutex<Pending>>,
    registrations: AtomicU64,
    delivered: Arc<AtomicU64>,
}

impl ConsolePlatform {
    /// Creates a new `ConsolePlatform` that answers permission prompts with `answer`.
    pub fn new(kind: PlatformKind, answer: PermissionStatus, clock: Arc<dyn Clock>) -> Self {
        Self {
            kind,
            answer,
            prompted: AtomicBool::new(false),
            clock,
            pending: Arc::new(Mutex::new(HashMap::new())),
            registrations: AtomicU64::new(0),
            delivered: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Web never prompts and reports granted, like the context does.
    fn permission_granted(&self) -> bool {
        self.kind == PlatformKind::Web
            || (self.prompted.load(Ordering::SeqCst) && self.answer == PermissionStatus::Granted)
    }

    fn require_permission(&self) -> PortResult<()> {
        if self.permission_granted() {
            Ok(())
        } else {
            Err(PortError::PermissionDenied(format!("answer was {:?}", self.answer)))
        }
    }

    /// How many alerts were shown so far, immediate and scheduled ones alike.
    pub fn delivered_count(&self) -> u64 {
        self.delivered.load(Ordering::SeqCst)
    }

    /// Identifiers of alerts that are scheduled and have not fired yet, sorted.
    pub fn pending_identifiers(&self) -> Vec<String> {
        let mut ids: Vec<String> = lock(&self.pending).keys().cloned().collect();
        ids.sort();
        ids
    }
}

fn lock(pending: &Mutex<Pending>) -> MutexGuard<'_, Pending> {
    pending.lock().unwrap_or_else(PoisonError::into_inner)
}

//=========================================================================================
// `NotificationPlatform` Trait Implementation
//=========================================================================================

#[async_trait]
impl NotificationPlatform for ConsolePlatform {
    fn supports_scheduling(&self) -> bool {
        self.kind == PlatformKind::Desktop
    }

    async fn permission_status(&self) -> PortResult<PermissionStatus> {
        if self.prompted.load(Ordering::SeqCst) {
            Ok(self.answer)
        } else {
            Ok(PermissionStatus::Undetermined)
        }
    }

    async fn request_permission(&self) -> PortResult<PermissionStatus> {
        self.prompted.store(true, Ordering::SeqCst);
        info!("Notification permission prompt answered: {:?}", self.answer);
        Ok(self.answer)
    }

    async fn setup_channel(&self) -> PortResult<()> {
        if self.supports_scheduling() {
            info!("Delivery channel 'default' ready");
        }
        Ok(())
    }

    async fn schedule_alert(&self, reminder: &Reminder) -> PortResult<String> {
        if !self.supports_scheduling() {
            return Err(PortError::Unsupported("scheduled alerts".to_string()));
        }
        self.require_permission()?;

        let delay = delay_until(reminder.trigger_at, self.clock.now());
        let registration = self.registrations.fetch_add(1, Ordering::SeqCst);
        let id = reminder.identifier.clone();
        let title = reminder.title.clone();
        let body = reminder.body.clone();
        let queue = self.pending.clone();
        let delivered = self.delivered.clone();

        // The queue stays locked until the new entry is in, so the timer can
        // never remove its own entry before it was inserted.
        let mut pending = lock(&self.pending);
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            info!(target: "delivery", "[{}] {}: {}", id, title, body);
            delivered.fetch_add(1, Ordering::SeqCst);
            let mut pending = lock(&queue);
            if matches!(pending.get(&id), Some((r, _)) if *r == registration) {
                pending.remove(&id);
            }
        });
        if let Some((_, previous)) =
            pending.insert(reminder.identifier.clone(), (registration, handle))
        {
            previous.abort();
            debug!("Replaced pending alert '{}'", reminder.identifier);
        }
        Ok(reminder.identifier.clone())
    }

    async fn cancel_alert(&self, identifier: &str) -> PortResult<()> {
        match lock(&self.pending).remove(identifier) {
            Some((_, handle)) => {
                handle.abort();
                debug!("Canceled pending alert '{}'", identifier);
            }
            None => debug!("No pending alert '{}' to cancel", identifier),
        }
        Ok(())
    }

    async fn present_alert(&self, title: &str, body: &str) -> PortResult<()> {
        self.require_permission()?;
        info!(target: "delivery", "{}: {}", title, body);
        self.delivered.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Duration, TimeZone, Utc};

    struct Frozen(DateTime<Utc>);

    impl Clock for Frozen {
        fn now(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 5, 8, 0, 0).unwrap()
    }

    fn platform(kind: PlatformKind) -> ConsolePlatform {
        ConsolePlatform::new(kind, PermissionStatus::Granted, Arc::new(Frozen(now())))
    }

    async fn granted(kind: PlatformKind) -> ConsolePlatform {
        let console = platform(kind);
        console.request_permission().await.unwrap();
        console
    }

    fn reminder(id: &str, minutes: i64) -> Reminder {
        Reminder {
            trigger_at: now() + Duration::minutes(minutes),
            title: "Title".to_string(),
            body: "Body".to_string(),
            identifier: id.to_string(),
        }
    }

    #[tokio::test(start_paused = true)]
    async fn same_identifier_replaces_the_pending_alert() {
        let console = granted(PlatformKind::Desktop).await;
        console.schedule_alert(&reminder("a", 30)).await.unwrap();
        console.schedule_alert(&reminder("a", 60)).await.unwrap();
        console.schedule_alert(&reminder("b", 60)).await.unwrap();
        assert_eq!(console.pending_identifiers(), vec!["a", "b"]);
    }

    #[tokio::test(start_paused = true)]
    async fn delivered_alerts_leave_the_queue() {
        let console = granted(PlatformKind::Desktop).await;
        console.schedule_alert(&reminder("a", 1)).await.unwrap();
        console.schedule_alert(&reminder("b", 120)).await.unwrap();

        tokio::time::sleep(std::time::Duration::from_secs(5 * 60)).await;
        assert_eq!(console.pending_identifiers(), vec!["b"]);
        assert_eq!(console.delivered_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancel_removes_and_tolerates_unknown_ids() {
        let console = granted(PlatformKind::Desktop).await;
        console.schedule_alert(&reminder("a", 30)).await.unwrap();
        console.cancel_alert("a").await.unwrap();
        console.cancel_alert("never-scheduled").await.unwrap();
        assert!(console.pending_identifiers().is_empty());
    }

    #[tokio::test]
    async fn web_cannot_schedule() {
        let console = platform(PlatformKind::Web);
        assert!(!console.supports_scheduling());
        assert!(matches!(
            console.schedule_alert(&reminder("a", 30)).await,
            Err(PortError::Unsupported(_))
        ));
        console.present_alert("Title", "Body").await.unwrap();
        assert_eq!(console.delivered_count(), 1);
    }

    #[tokio::test]
    async fn permission_is_undetermined_until_prompted() {
        let console =
            ConsolePlatform::new(PlatformKind::Desktop, PermissionStatus::Denied, Arc::new(Frozen(now())));
        assert_eq!(console.permission_status().await.unwrap(), PermissionStatus::Undetermined);
        assert_eq!(console.request_permission().await.unwrap(), PermissionStatus::Denied);
        assert_eq!(console.permission_status().await.unwrap(), PermissionStatus::Denied);
    }

    #[tokio::test]
    async fn denied_platform_queues_and_shows_nothing() {
        let console =
            ConsolePlatform::new(PlatformKind::Desktop, PermissionStatus::Denied, Arc::new(Frozen(now())));
        console.request_permission().await.unwrap();

        assert!(matches!(
            console.schedule_alert(&reminder("a", 30)).await,
            Err(PortError::PermissionDenied(_))
        ));
        assert!(matches!(
            console.present_alert("Title", "Body").await,
            Err(PortError::PermissionDenied(_))
        ));
        assert!(console.pending_identifiers().is_empty());
        assert_eq!(console.delivered_count(), 0);
    }

    #[tokio::test]
    async fn nothing_is_queued_before_the_prompt() {
        let console = platform(PlatformKind::Desktop);
        assert!(console.schedule_alert(&reminder("a", 30)).await.is_err());
        assert!(console.pending_identifiers().is_empty());
    }
}
