//! crates/roster_notify_core/src/gateway.rs
//!
//! The local alert gateway: a thin wrapper over the platform's
//! schedule/cancel-by-identifier primitive. It absorbs every platform failure,
//! so callers only ever see "scheduled under this id" or "not scheduled".
//!
//! Clones share one permission flag. Once a denial is recorded every
//! schedule, cancel and present call is a no-op.

use chrono::{DateTime, Utc};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use crate::clock::is_future;
use crate::domain::Reminder;
use crate::ports::{Clock, NotificationPlatform, PortError};

#[derive(Clone)]
pub struct LocalAlerts {
    platform: Arc<dyn NotificationPlatform>,
    clock: Arc<dyn Clock>,
    permitted: Arc<AtomicBool>,
}

impl LocalAlerts {
    /// Alerts start out permitted; [`LocalAlerts::set_permitted`] records the
    /// outcome of the permission prompt.
    pub fn new(platform: Arc<dyn NotificationPlatform>, clock: Arc<dyn Clock>) -> Self {
        Self {
            platform,
            clock,
            permitted: Arc::new(AtomicBool::new(true)),
        }
    }

    pub fn set_permitted(&self, permitted: bool) {
        self.permitted.store(permitted, Ordering::SeqCst);
    }

    pub fn is_permitted(&self) -> bool {
        self.permitted.load(Ordering::SeqCst)
    }

    pub fn platform(&self) -> &Arc<dyn NotificationPlatform> {
        &self.platform
    }

    pub fn clock(&self) -> &Arc<dyn Clock> {
        &self.clock
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    /// Requests a one-shot alert.
    ///
    /// Returns `None` without failing when notification permission was denied,
    /// when the platform cannot schedule alerts, when the trigger time is not
    /// in the future, or when the platform call errors. A pending alert with
    /// the same identifier is replaced by the platform.
    pub async fn schedule(&self, reminder: Reminder) -> Option<String> {
        if !self.is_permitted() {
            debug!("Permission denied; not scheduling '{}'", reminder.identifier);
            return None;
        }
        if !self.platform.supports_scheduling() {
            info!(
                "Scheduled alerts are not supported on this platform; dropping '{}'",
                reminder.identifier
            );
            return None;
        }

        let now = self.clock.now();
        if !is_future(reminder.trigger_at, now) {
            debug!(
                "Not scheduling '{}': trigger time {} is not after {}",
                reminder.identifier, reminder.trigger_at, now
            );
            return None;
        }

        match self.platform.schedule_alert(&reminder).await {
            Ok(id) => {
                debug!("Scheduled '{}' for {}", id, reminder.trigger_at);
                Some(id)
            }
            Err(PortError::PermissionDenied(reason)) => {
                info!("Platform refused '{}': {}", reminder.identifier, reason);
                None
            }
            Err(e) => {
                error!("Error scheduling alert '{}': {:?}", reminder.identifier, e);
                None
            }
        }
    }

    /// Same as [`LocalAlerts::schedule`], taking the alert's parts separately.
    pub async fn schedule_at(
        &self,
        at: DateTime<Utc>,
        title: &str,
        body: &str,
        identifier: &str,
    ) -> Option<String> {
        self.schedule(Reminder {
            trigger_at: at,
            title: title.to_string(),
            body: body.to_string(),
            identifier: identifier.to_string(),
        })
        .await
    }

    /// Cancels a pending alert. Unknown or already fired identifiers are not an error.
    pub async fn cancel(&self, identifier: &str) {
        if !self.is_permitted() || !self.platform.supports_scheduling() {
            return;
        }
        if let Err(e) = self.platform.cancel_alert(identifier).await {
            warn!("Error canceling alert '{}': {:?}", identifier, e);
        }
    }

    /// Shows an alert immediately. Returns whether the platform accepted it.
    pub async fn present(&self, title: &str, body: &str) -> bool {
        if !self.is_permitted() {
            debug!("Permission denied; not presenting '{}'", title);
            return false;
        }
        match self.platform.present_alert(title, body).await {
            Ok(()) => true,
            Err(e) => {
                warn!("Error presenting alert '{}': {:?}", title, e);
                false
            }
        }
    }
}
