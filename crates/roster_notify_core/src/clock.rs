//! crates/roster_notify_core/src/clock.rs
//!
//! Wall-clock arithmetic shared by the planners: trigger times as offsets before
//! a target instant, the "still in the future" admission check, and resolving
//! local times of day in the configured time zone.

use chrono::{DateTime, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use chrono_tz::Tz;

/// Returns `target` minus `hours`.
pub fn offset_before(target: DateTime<Utc>, hours: i64) -> DateTime<Utc> {
    target - Duration::hours(hours)
}

/// The single admission rule for alerts: only strictly future instants are scheduled.
pub fn is_future(at: DateTime<Utc>, now: DateTime<Utc>) -> bool {
    at > now
}

/// Resolves a local date and time in `tz` to an instant.
///
/// A time that falls inside a DST gap does not exist and yields `None`; an
/// ambiguous time resolves to its earlier instant.
pub fn localize(tz: Tz, date: NaiveDate, time: NaiveTime) -> Option<DateTime<Utc>> {
    tz.from_local_datetime(&date.and_time(time))
        .earliest()
        .map(|local| local.with_timezone(&Utc))
}

/// The local calendar date of `now` in `tz`.
pub fn local_date(tz: Tz, now: DateTime<Utc>) -> NaiveDate {
    now.with_timezone(&tz).date_naive()
}

/// Today's occurrence of `time` in `tz`.
pub fn occurrence_today(tz: Tz, now: DateTime<Utc>, time: NaiveTime) -> Option<DateTime<Utc>> {
    localize(tz, local_date(tz, now), time)
}

/// How long to wait from `now` until `at`; zero when `at` has passed.
pub fn delay_until(at: DateTime<Utc>, now: DateTime<Utc>) -> std::time::Duration {
    (at - now).to_std().unwrap_or(std::time::Duration::ZERO)
}
