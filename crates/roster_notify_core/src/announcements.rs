//! crates/roster_notify_core/src/announcements.rs
//!
//! Relays inserts from the announcements change feed: each one shows an
//! immediate alert and marks the cached announcement list as stale.

use futures::StreamExt;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::gateway::LocalAlerts;
use crate::ports::{AnnouncementFeed, CacheInvalidator};

pub const ANNOUNCEMENTS_CACHE_KEY: &str = "announcements";

/// Runs until the feed ends or `shutdown` fires. Returns how many
/// announcements were relayed. A failed subscription ends the relay quietly.
pub async fn relay_announcements(
    feed: Arc<dyn AnnouncementFeed>,
    alerts: LocalAlerts,
    cache: Arc<dyn CacheInvalidator>,
    shutdown: CancellationToken,
) -> usize {
    let mut stream = match feed.subscribe().await {
        Ok(stream) => stream,
        Err(e) => {
            warn!("Could not subscribe to announcements: {:?}", e);
            return 0;
        }
    };
    info!("Listening for new announcements");

    let mut relayed = 0;
    loop {
        tokio::select! {
            _ = shutdown.cancelled() => {
                debug!("Announcement relay stopped on shutdown");
                break;
            }
            next = stream.next() => {
                let Some(announcement) = next else {
                    debug!("Announcement feed closed");
                    break;
                };
                let body = announcement.message.as_deref().unwrap_or_default();
                alerts.present(&announcement.title, body).await;
                cache.invalidate(ANNOUNCEMENTS_CACHE_KEY);
                relayed += 1;
            }
        }
    }
    relayed
}
