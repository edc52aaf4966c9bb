//! services/notifier/src/state.rs
//!
//! Wires the adapters into the core services. Built once at startup.

use chrono_tz::Tz;
use roster_notify_core::ports::{AnnouncementFeed, CacheInvalidator, Clock, SystemClock};
use roster_notify_core::{
    DailyReminders, EncouragementPicker, LocalAlerts, NotificationContext, RoutineActions,
    RoutineScheduler,
};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

use crate::adapters::{
    ConsolePlatform, JsonDailyReminderStore, JsonEventsListing, JsonProfileLookup, QueryCache,
};
use crate::config::Config;
use crate::error::NotifierError;
use crate::routine_table::load_routine_table;

//=========================================================================================
// AppState (Shared Across the Whole Process)
//=========================================================================================

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub platform: Arc<ConsolePlatform>,
    pub notifications: Arc<NotificationContext>,
    pub daily: Arc<DailyReminders>,
    pub cache: Arc<QueryCache>,
    pub feed: Arc<dyn AnnouncementFeed>,
    /// Cancels armed routines and the announcement relay.
    pub shutdown: CancellationToken,
}

impl AppState {
    /// Builds the state with the system clock.
    pub async fn build(
        config: Arc<Config>,
        feed: Arc<dyn AnnouncementFeed>,
    ) -> Result<Self, NotifierError> {
        Self::build_with_clock(config, feed, Arc::new(SystemClock)).await
    }

    pub async fn build_with_clock(
        config: Arc<Config>,
        feed: Arc<dyn AnnouncementFeed>,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, NotifierError> {
        let tz: Tz = config.timezone;
        let platform = Arc::new(ConsolePlatform::new(
            config.platform,
            config.permission,
            clock.clone(),
        ));
        let alerts = LocalAlerts::new(platform.clone(), clock.clone());

        let actions = Arc::new(RoutineActions::new(
            alerts.clone(),
            Arc::new(JsonEventsListing::new(config.events_path())),
            Arc::new(JsonProfileLookup::new(config.profiles_path())),
            Arc::new(EncouragementPicker::from_entropy(tz)),
            config.user_id.clone(),
            tz,
        ));

        let definitions = load_routine_table(&config.routines_path()).await?;
        info!("Loaded {} routine definitions", definitions.len());

        let shutdown = CancellationToken::new();
        let routines = RoutineScheduler::new(definitions, tz, clock, actions, shutdown.clone());
        let notifications = Arc::new(NotificationContext::new(alerts.clone(), routines));

        let daily = Arc::new(DailyReminders::new(
            Arc::new(JsonDailyReminderStore::new(config.daily_reminders_path())),
            alerts,
            tz,
        ));

        Ok(Self {
            config,
            platform,
            notifications,
            daily,
            cache: Arc::new(QueryCache::new()),
            feed,
            shutdown,
        })
    }

    pub fn cache_invalidator(&self) -> Arc<dyn CacheInvalidator> {
        self.cache.clone()
    }
}
