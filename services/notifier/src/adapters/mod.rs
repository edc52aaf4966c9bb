pub mod cache;
pub mod console;
pub mod feed;
pub mod files;

pub use cache::QueryCache;
pub use console::ConsolePlatform;
pub use feed::LineAnnouncementFeed;
pub use files::{JsonDailyReminderStore, JsonEventsListing, JsonProfileLookup};
