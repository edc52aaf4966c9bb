pub mod actions;
pub mod announcements;
pub mod clock;
pub mod daily;
pub mod domain;
pub mod encouragement;
pub mod gateway;
pub mod lifecycle;
pub mod planner;
pub mod ports;
pub mod routine;

pub use actions::{RoutineActions, TodayOutcome};
pub use announcements::relay_announcements;
pub use daily::DailyReminders;
pub use domain::{
    Announcement, AssignmentEvent, DailyReminder, NotificationReadiness, PermissionStatus,
    PublicEvent, Reminder, ReminderKind, RoleContext, RoutineAction, RoutineDefinition,
};
pub use encouragement::EncouragementPicker;
pub use gateway::LocalAlerts;
pub use lifecycle::NotificationContext;
pub use planner::ReminderPlanner;
pub use ports::{
    AnnouncementFeed, AnnouncementStream, CacheInvalidator, Clock, DailyReminderStore,
    EventsListing, NotificationPlatform, PortError, PortResult, ProfileLookup, SystemClock,
};
pub use routine::{ArmedTimer, RoutineScheduler};
