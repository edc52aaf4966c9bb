//! services/notifier/src/bin/notifier.rs

use notifier_lib::{
    adapters::LineAnnouncementFeed, config::Config, error::NotifierError, state::AppState,
};
use roster_notify_core::relay_announcements;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), NotifierError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!("Configuration loaded. Starting notifier...");

    // --- 2. Build the Shared AppState ---
    let state = AppState::build(config.clone(), Arc::new(LineAnnouncementFeed::stdin())).await?;

    // --- 3. Initialize Notifications ---
    let readiness = state.notifications.initialize().await;
    info!(
        "Notifications ready (permissions granted: {})",
        readiness.permissions_granted
    );

    // --- 4. Daily Reminders ---
    if config.schedule_daily_reminders {
        if state.daily.list().await?.is_empty() {
            state.daily.populate_defaults().await?;
        }
        state.daily.schedule_all().await?;
    }

    // --- 5. Relay Announcements Until Shutdown ---
    let relay = tokio::spawn(relay_announcements(
        state.feed.clone(),
        state.notifications.alerts().clone(),
        state.cache_invalidator(),
        state.shutdown.clone(),
    ));

    tokio::signal::ctrl_c().await?;
    info!("Shutting down...");
    state.shutdown.cancel();

    match relay.await {
        Ok(relayed) => info!("Relayed {} announcement(s)", relayed),
        Err(e) => warn!("Announcement relay ended abnormally: {}", e),
    }
    for timer in state.notifications.take_armed_routines() {
        timer.wait().await;
    }
    info!(
        "Delivered {} alert(s); pending alerts left behind: {:?}",
        state.platform.delivered_count(),
        state.platform.pending_identifiers()
    );

    Ok(())
}
