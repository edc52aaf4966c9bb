//! crates/roster_notify_core/src/lifecycle.rs
//!
//! The notification context: the single entry point the rest of the app uses
//! to schedule and cancel alerts, plus the once-per-process initialization
//! gate (permissions, delivery channel, routine arming and the first
//! today's-events check).
//!
//! Readiness is published on a `watch` channel so guards can wait on it
//! instead of reading shared mutable state.

use chrono::{DateTime, Utc};
use std::sync::{Mutex, PoisonError};
use tokio::sync::{watch, OnceCell};
use tracing::{info, warn};

use crate::domain::{AssignmentEvent, NotificationReadiness, PermissionStatus, RoleContext};
use crate::gateway::LocalAlerts;
use crate::planner::ReminderPlanner;
use crate::routine::{ArmedTimer, RoutineScheduler};

pub struct NotificationContext {
    alerts: LocalAlerts,
    planner: ReminderPlanner,
    routines: RoutineScheduler,
    readiness: watch::Sender<NotificationReadiness>,
    armed: Mutex<Vec<ArmedTimer>>,
    init: OnceCell<()>,
}

impl NotificationContext {
    pub fn new(alerts: LocalAlerts, routines: RoutineScheduler) -> Self {
        let (readiness, _) = watch::channel(NotificationReadiness::default());
        Self {
            planner: ReminderPlanner::new(alerts.clone()),
            alerts,
            routines,
            readiness,
            armed: Mutex::new(Vec::new()),
            init: OnceCell::new(),
        }
    }

    //=====================================================================================
    // Readiness
    //=====================================================================================

    pub fn readiness(&self) -> watch::Receiver<NotificationReadiness> {
        self.readiness.subscribe()
    }

    pub fn current(&self) -> NotificationReadiness {
        *self.readiness.borrow()
    }

    pub async fn wait_until_initialized(&self) {
        let mut rx = self.readiness.subscribe();
        // The sender lives in `self`, so the channel cannot close here.
        let _ = rx.wait_for(|r| r.initialized).await;
    }

    /// Runs the initialization sequence the first time it is called; every
    /// other call just waits for that run and returns the resulting state.
    ///
    /// `initialized` is set once permission resolution and, when granted, the
    /// channel setup, routine arming and first today's-events check are done,
    /// whether or not each step succeeded.
    pub async fn initialize(&self) -> NotificationReadiness {
        self.init.get_or_init(|| self.run_initialization()).await;
        self.current()
    }

    async fn run_initialization(&self) {
        let granted = self.acquire_permission().await;
        self.record_permission(granted);

        if granted {
            if let Err(e) = self.alerts.platform().setup_channel().await {
                warn!("Notification channel setup failed: {:?}", e);
            }
            self.arm_routines();
            self.routines.actions().check_today_events().await;
        } else {
            warn!("Notification permission denied; alerts will not be shown");
        }

        self.readiness.send_modify(|r| r.initialized = true);
        info!("Notification context initialized (permissions granted: {})", granted);
    }

    //=====================================================================================
    // Permissions & Routines
    //=====================================================================================

    /// Asks for notification permission, prompting only when it is not
    /// already granted. A grant arms today's routines if that has not happened yet.
    pub async fn request_permissions(&self) -> bool {
        let granted = self.acquire_permission().await;
        self.record_permission(granted);
        if granted {
            self.arm_routines();
        }
        granted
    }

    fn record_permission(&self, granted: bool) {
        self.alerts.set_permitted(granted);
        self.readiness.send_modify(|r| r.permissions_granted = granted);
    }

    async fn acquire_permission(&self) -> bool {
        let platform = self.alerts.platform();
        // Platforms without scheduled alerts report granted and degrade at the gateway.
        if !platform.supports_scheduling() {
            return true;
        }

        let status = match platform.permission_status().await {
            Ok(PermissionStatus::Granted) => Ok(PermissionStatus::Granted),
            Ok(_) => platform.request_permission().await,
            Err(e) => Err(e),
        };
        match status {
            Ok(status) => status == PermissionStatus::Granted,
            Err(e) => {
                warn!("Permission request failed, treating as denied: {:?}", e);
                false
            }
        }
    }

    fn arm_routines(&self) {
        let timers = self.routines.arm();
        if !timers.is_empty() {
            self.armed
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .extend(timers);
        }
    }

    /// Routines armed in this process as `(routine id, due at)`, including ones that already fired.
    pub fn armed_routines(&self) -> Vec<(String, DateTime<Utc>)> {
        self.armed
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|t| (t.routine_id.clone(), t.due_at))
            .collect()
    }

    /// Hands the armed countdowns over to the caller, e.g. to await them on shutdown.
    pub fn take_armed_routines(&self) -> Vec<ArmedTimer> {
        std::mem::take(&mut *self.armed.lock().unwrap_or_else(PoisonError::into_inner))
    }

    //=====================================================================================
    // Scheduling Operations
    //=====================================================================================

    pub fn alerts(&self) -> &LocalAlerts {
        &self.alerts
    }

    pub async fn schedule(
        &self,
        at: DateTime<Utc>,
        title: &str,
        body: &str,
        identifier: &str,
    ) -> Option<String> {
        self.alerts.schedule_at(at, title, body, identifier).await
    }

    pub async fn cancel(&self, identifier: &str) {
        self.alerts.cancel(identifier).await
    }

    /// Call after the assignment insert has been confirmed by the backend.
    pub async fn schedule_assignment_reminders(
        &self,
        slot_start: DateTime<Utc>,
        slot_title: &str,
        role: RoleContext,
        assignment_id: &str,
    ) -> Vec<String> {
        let event = AssignmentEvent {
            assignment_id: assignment_id.to_string(),
            slot_title: slot_title.to_string(),
            slot_start,
        };
        self.planner.on_assignment_created(&event, role).await
    }

    /// Call after the assignment delete has been confirmed by the backend.
    pub async fn cancel_assignment_reminders(&self, assignment_id: &str) {
        self.planner.on_assignment_removed(assignment_id).await
    }
}
