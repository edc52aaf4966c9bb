//! crates/roster_notify_core/src/planner.rs
//!
//! Turns one assignment into its reminder set and pushes it through the
//! gateway, and reverses that when the assignment is removed.

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::clock::{is_future, offset_before};
use crate::domain::{AssignmentEvent, Reminder, ReminderKind, RoleContext};
use crate::gateway::LocalAlerts;

const ROSTER_TITLE: &str = "Roster reminder";
const MUSIC_TITLE: &str = "Music reminder";
const TEACHER_TITLE: &str = "Roster reminder (teacher)";

/// Reminder kinds whose identifiers are canceled when an assignment is removed.
// TODO: confirm with the product owner whether the 6h teacher reminder should be canceled too.
pub const CANCELED_ON_REMOVAL: [ReminderKind; 2] =
    [ReminderKind::DayBefore, ReminderKind::TwoDaysBefore];

/// Computes every reminder an assignment is entitled to, before the future filter.
///
/// Everyone gets the 24h reminder (musical copy for musicians). Teachers also
/// get the 48h and 6h reminders. The two role flags are independent.
pub fn plan_assignment_reminders(event: &AssignmentEvent, role: RoleContext) -> Vec<Reminder> {
    let slot = &event.slot_title;
    let mut reminders = Vec::with_capacity(3);

    let (title, body) = if role.is_musician {
        (
            MUSIC_TITLE,
            format!("Don't forget to study the repertoire for \"{}\"!", slot),
        )
    } else {
        (ROSTER_TITLE, format!("You have \"{}\" in 24 hours", slot))
    };
    reminders.push(build(event, ReminderKind::DayBefore, title, body));

    if role.is_teacher {
        reminders.push(build(
            event,
            ReminderKind::TwoDaysBefore,
            TEACHER_TITLE,
            format!("You have \"{}\" in 48 hours - prepare the material", slot),
        ));
        reminders.push(build(
            event,
            ReminderKind::SixHoursBefore,
            TEACHER_TITLE,
            format!("You have \"{}\" in 6 hours - final preparations!", slot),
        ));
    }

    reminders
}

fn build(event: &AssignmentEvent, kind: ReminderKind, title: &str, body: String) -> Reminder {
    Reminder {
        trigger_at: offset_before(event.slot_start, kind.hours_before()),
        title: title.to_string(),
        body,
        identifier: kind.identifier(&event.assignment_id),
    }
}

/// Keeps only reminders whose trigger time is strictly after `now`.
pub fn admit(reminders: Vec<Reminder>, now: DateTime<Utc>) -> Vec<Reminder> {
    reminders
        .into_iter()
        .filter(|r| is_future(r.trigger_at, now))
        .collect()
}

#[derive(Clone)]
pub struct ReminderPlanner {
    alerts: LocalAlerts,
}

impl ReminderPlanner {
    pub fn new(alerts: LocalAlerts) -> Self {
        Self { alerts }
    }

    /// Schedules the reminders for a newly created assignment and returns the
    /// identifiers the platform accepted. An empty result is a valid outcome.
    pub async fn on_assignment_created(
        &self,
        event: &AssignmentEvent,
        role: RoleContext,
    ) -> Vec<String> {
        let now = self.alerts.now();
        let due = admit(plan_assignment_reminders(event, role), now);
        if due.is_empty() {
            debug!(
                "Assignment {} starts too soon for any reminder",
                event.assignment_id
            );
            return Vec::new();
        }

        let mut scheduled = Vec::with_capacity(due.len());
        for reminder in due {
            if let Some(id) = self.alerts.schedule(reminder).await {
                scheduled.push(id);
            }
        }
        info!(
            "Scheduled {} reminder(s) for assignment {}",
            scheduled.len(),
            event.assignment_id
        );
        scheduled
    }

    pub async fn on_assignment_removed(&self, assignment_id: &str) {
        for kind in CANCELED_ON_REMOVAL {
            self.alerts.cancel(&kind.identifier(assignment_id)).await;
        }
        debug!("Canceled reminders for assignment {}", assignment_id);
    }
}
