//! crates/roster_notify_core/src/domain.rs
//!
//! Defines the pure data structures of the notification scheduler.
//! Nothing here is persisted by the core: reminders are computed, handed to the
//! platform port and dropped. The only durable artifact is the platform's own
//! alert queue.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

//=========================================================================================
// Assignment Reminders
//=========================================================================================

/// A one-shot local alert, ready to be registered with the platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reminder {
    pub trigger_at: DateTime<Utc>,
    pub title: String,
    pub body: String,
    /// Deterministic key used to replace or cancel this alert.
    pub identifier: String,
}

/// Role flags read from the user's profile at the moment a reminder set is computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleContext {
    #[serde(default)]
    pub is_teacher: bool,
    #[serde(default)]
    pub is_musician: bool,
    #[serde(default)]
    pub is_admin: bool,
}

/// The offsets before an assignment's start at which reminders can fire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReminderKind {
    DayBefore,
    TwoDaysBefore,
    SixHoursBefore,
}

impl ReminderKind {
    pub fn hours_before(self) -> i64 {
        match self {
            ReminderKind::DayBefore => 24,
            ReminderKind::TwoDaysBefore => 48,
            ReminderKind::SixHoursBefore => 6,
        }
    }

    pub fn tag(self) -> &'static str {
        match self {
            ReminderKind::DayBefore => "24h",
            ReminderKind::TwoDaysBefore => "48h",
            ReminderKind::SixHoursBefore => "6h",
        }
    }

    /// Builds the alert identifier, e.g. `assignment_24h_<assignment_id>`.
    pub fn identifier(self, assignment_id: &str) -> String {
        format!("assignment_{}_{}", self.tag(), assignment_id)
    }
}

/// A user's claim on a slot, as seen by the reminder planner.
#[derive(Debug, Clone)]
pub struct AssignmentEvent {
    pub assignment_id: String,
    pub slot_title: String,
    pub slot_start: DateTime<Utc>,
}

//=========================================================================================
// Routines
//=========================================================================================

/// The closed set of actions a routine can dispatch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RoutineAction {
    /// Shows today's events, or the free-day message when there are none.
    CheckTodayEvents,
    EncourageMusicians,
    EncourageTeachers,
}

/// One row of the static routine table shipped with the app.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoutineDefinition {
    pub id: String,
    pub days: Vec<Weekday>,
    #[serde(with = "hh_mm")]
    pub time: NaiveTime,
    pub action: RoutineAction,
}

impl RoutineDefinition {
    pub fn runs_on(&self, day: Weekday) -> bool {
        self.days.contains(&day)
    }
}

/// A daily reminder managed by administrators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyReminder {
    pub id: String,
    #[serde(with = "hh_mm")]
    pub hour: NaiveTime,
    pub message: String,
}

//=========================================================================================
// Process Readiness & Permissions
//=========================================================================================

/// Process-wide notification state published by the notification context.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NotificationReadiness {
    pub permissions_granted: bool,
    /// Becomes true once permission resolution and the first routine check are done.
    pub initialized: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    Undetermined,
}

//=========================================================================================
// Data From External Collaborators
//=========================================================================================

/// An entry of the public events listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublicEvent {
    pub id: String,
    pub title: String,
    pub date: NaiveDate,
    #[serde(default)]
    pub description: Option<String>,
}

/// A freshly inserted announcement delivered by the change feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Announcement {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub message: Option<String>,
}

/// Serde helpers for `"HH:MM"` times of day.
pub mod hh_mm {
    use chrono::NaiveTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%H:%M";

    pub fn serialize<S: Serializer>(time: &NaiveTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&time.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveTime::parse_from_str(raw.trim(), FORMAT).map_err(|e| {
            serde::de::Error::custom(format!("'{}' is not a valid HH:MM time: {}", raw, e))
        })
    }
}
