//! crates/roster_notify_core/src/actions.rs
//!
//! The handlers behind each [`RoutineAction`]. Dispatch is an exhaustive match
//! over the closed action set.

use chrono_tz::Tz;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::clock::local_date;
use crate::domain::{PublicEvent, RoleContext, RoutineAction};
use crate::encouragement::EncouragementPicker;
use crate::gateway::LocalAlerts;
use crate::ports::{EventsListing, PortResult, ProfileLookup};

pub const FREE_DAY_TITLE: &str = "Free day";
pub const FREE_DAY_BODY: &str = "No events on the roster today. Enjoy your day!";
pub const EVENTS_TODAY_TITLE: &str = "Today's events";

/// What the today's-events check ended up showing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TodayOutcome {
    FreeDay,
    EventsToday(usize),
}

pub struct RoutineActions {
    alerts: LocalAlerts,
    events: Arc<dyn EventsListing>,
    profiles: Arc<dyn ProfileLookup>,
    picker: Arc<EncouragementPicker>,
    /// The signed-in user, if any.
    user_id: Option<String>,
    tz: Tz,
}

impl RoutineActions {
    pub fn new(
        alerts: LocalAlerts,
        events: Arc<dyn EventsListing>,
        profiles: Arc<dyn ProfileLookup>,
        picker: Arc<EncouragementPicker>,
        user_id: Option<String>,
        tz: Tz,
    ) -> Self {
        Self {
            alerts,
            events,
            profiles,
            picker,
            user_id,
            tz,
        }
    }

    pub async fn run(&self, action: RoutineAction) -> PortResult<()> {
        match action {
            RoutineAction::CheckTodayEvents => {
                self.check_today_events().await;
                Ok(())
            }
            RoutineAction::EncourageMusicians => self.encourage(|role| role.is_musician).await,
            RoutineAction::EncourageTeachers => self.encourage(|role| role.is_teacher).await,
        }
    }

    /// Shows today's events, or the free-day message. A failed listing counts
    /// as a day without events.
    pub async fn check_today_events(&self) -> TodayOutcome {
        let today = local_date(self.tz, self.alerts.now());
        let todays: Vec<PublicEvent> = match self.events.list_events().await {
            Ok(events) => events.into_iter().filter(|e| e.date == today).collect(),
            Err(e) => {
                warn!("Could not list events, assuming a free day: {:?}", e);
                Vec::new()
            }
        };

        if todays.is_empty() {
            self.alerts.present(FREE_DAY_TITLE, FREE_DAY_BODY).await;
            return TodayOutcome::FreeDay;
        }

        let titles = todays
            .iter()
            .map(|e| e.title.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        let body = format!("You have {} event(s) today: {}", todays.len(), titles);
        self.alerts.present(EVENTS_TODAY_TITLE, &body).await;
        TodayOutcome::EventsToday(todays.len())
    }

    async fn encourage(&self, eligible: fn(&RoleContext) -> bool) -> PortResult<()> {
        let Some(user_id) = self.user_id.as_deref() else {
            debug!("No signed-in user; skipping encouragement");
            return Ok(());
        };

        let role = self.profiles.role_context(user_id).await?;
        if eligible(&role) {
            self.picker.schedule(&self.alerts, user_id).await;
        } else {
            debug!("User {} is not targeted by this encouragement", user_id);
        }
        Ok(())
    }
}
