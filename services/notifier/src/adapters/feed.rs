//! services/notifier/src/adapters/feed.rs
//!
//! An announcement feed that reads one JSON announcement per line from an
//! async reader (stdin in the binary). Malformed lines are logged and skipped.

use async_trait::async_trait;
use futures::{stream, StreamExt};
use roster_notify_core::domain::Announcement;
use roster_notify_core::ports::{AnnouncementFeed, AnnouncementStream, PortError, PortResult};
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::Mutex;
use tracing::warn;

pub struct LineAnnouncementFeed<R> {
    reader: Mutex<Option<R>>,
}

impl<R> LineAnnouncementFeed<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader: Mutex::new(Some(reader)),
        }
    }
}

impl LineAnnouncementFeed<tokio::io::Stdin> {
    pub fn stdin() -> Self {
        Self::new(tokio::io::stdin())
    }
}

#[async_trait]
impl<R> AnnouncementFeed for LineAnnouncementFeed<R>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    /// The underlying reader can only be consumed once.
    async fn subscribe(&self) -> PortResult<AnnouncementStream> {
        let reader = self
            .reader
            .lock()
            .await
            .take()
            .ok_or_else(|| PortError::Unexpected("announcement feed already subscribed".to_string()))?;

        let lines = BufReader::new(reader).lines();
        let announcements = stream::unfold(lines, |mut lines| async move {
            loop {
                match lines.next_line().await {
                    Ok(Some(line)) if line.trim().is_empty() => continue,
                    Ok(Some(line)) => match serde_json::from_str::<Announcement>(&line) {
                        Ok(announcement) => return Some((announcement, lines)),
                        Err(e) => warn!("Skipping malformed announcement line: {}", e),
                    },
                    Ok(None) => return None,
                    Err(e) => {
                        warn!("Announcement feed read failed: {}", e);
                        return None;
                    }
                }
            }
        });
        Ok(announcements.boxed())
    }
}
