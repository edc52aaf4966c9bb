//! crates/roster_notify_core/src/daily.rs
//!
//! Administrator-managed daily reminders: a stored list of `HH:MM` messages
//! that can be scheduled for their next occurrence or canceled in bulk.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use chrono_tz::Tz;
use std::sync::Arc;
use tracing::{info, warn};

use crate::clock::{local_date, localize};
use crate::domain::{DailyReminder, Reminder};
use crate::gateway::LocalAlerts;
use crate::ports::{DailyReminderStore, PortResult};

pub const DAILY_REMINDER_TITLE: &str = "Reminder";

pub fn default_daily_reminders() -> Vec<DailyReminder> {
    let at = |h: u32| NaiveTime::from_hms_opt(h, 0, 0).unwrap_or(NaiveTime::MIN);
    vec![
        DailyReminder {
            id: "good-morning".to_string(),
            hour: at(8),
            message: "Good morning! Check today's roster.".to_string(),
        },
        DailyReminder {
            id: "end-of-day".to_string(),
            hour: at(18),
            message: "End of the day! Don't forget to log your hours.".to_string(),
        },
        DailyReminder {
            id: "weekly-review".to_string(),
            hour: at(9),
            message: "Weekly reminder: review your commitments.".to_string(),
        },
    ]
}

/// Today's occurrence of `hour`, or tomorrow's when today's is already earlier than `now`.
pub fn next_daily_occurrence(tz: Tz, now: DateTime<Utc>, hour: NaiveTime) -> Option<DateTime<Utc>> {
    let today = local_date(tz, now);
    match localize(tz, today, hour) {
        Some(at) if at >= now => Some(at),
        _ => localize(tz, today + Duration::days(1), hour),
    }
}

pub struct DailyReminders {
    store: Arc<dyn DailyReminderStore>,
    alerts: LocalAlerts,
    tz: Tz,
}

impl DailyReminders {
    pub fn new(store: Arc<dyn DailyReminderStore>, alerts: LocalAlerts, tz: Tz) -> Self {
        Self { store, alerts, tz }
    }

    pub async fn list(&self) -> PortResult<Vec<DailyReminder>> {
        self.store.load().await
    }

    /// Replaces the stored list with [`default_daily_reminders`].
    pub async fn populate_defaults(&self) -> PortResult<Vec<DailyReminder>> {
        let defaults = default_daily_reminders();
        self.store.save(&defaults).await?;
        info!("Saved {} default daily reminders", defaults.len());
        Ok(defaults)
    }

    /// Schedules every stored reminder at its next occurrence. Returns how many
    /// the platform accepted.
    pub async fn schedule_all(&self) -> PortResult<usize> {
        let reminders = self.store.load().await?;
        let now = self.alerts.now();
        let mut scheduled = 0;
        for daily in reminders {
            let Some(at) = next_daily_occurrence(self.tz, now, daily.hour) else {
                warn!("Daily reminder '{}' has no valid next occurrence", daily.id);
                continue;
            };
            let reminder = Reminder {
                trigger_at: at,
                title: DAILY_REMINDER_TITLE.to_string(),
                body: daily.message,
                identifier: daily.id,
            };
            if self.alerts.schedule(reminder).await.is_some() {
                scheduled += 1;
            }
        }
        info!("Scheduled {} daily reminder(s)", scheduled);
        Ok(scheduled)
    }

    /// Cancels every stored reminder. Returns how many cancellations were attempted.
    pub async fn cancel_all(&self) -> PortResult<usize> {
        let reminders = self.store.load().await?;
        for daily in &reminders {
            self.alerts.cancel(&daily.id).await;
        }
        Ok(reminders.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn passed_hour_rolls_to_tomorrow() {
        let now = Utc.with_ymd_and_hms(2024, 6, 5, 10, 0, 0).unwrap();
        let eight = NaiveTime::from_hms_opt(8, 0, 0).unwrap();
        let eighteen = NaiveTime::from_hms_opt(18, 0, 0).unwrap();

        assert_eq!(
            next_daily_occurrence(Tz::UTC, now, eight),
            Some(Utc.with_ymd_and_hms(2024, 6, 6, 8, 0, 0).unwrap())
        );
        assert_eq!(
            next_daily_occurrence(Tz::UTC, now, eighteen),
            Some(Utc.with_ymd_and_hms(2024, 6, 5, 18, 0, 0).unwrap())
        );
    }

    #[test]
    fn defaults_have_unique_ids() {
        let defaults = default_daily_reminders();
        let mut ids: Vec<&str> = defaults.iter().map(|d| d.id.as_str()).collect();
        ids.dedup();
        assert_eq!(ids.len(), 3);
    }
}
