//! crates/roster_notify_core/src/encouragement.rs
//!
//! Picks an encouragement message and a random daytime moment within the next
//! week. The random source is injected so the picks are reproducible in tests.

use chrono::{DateTime, Duration, NaiveTime, Utc};
use chrono_tz::Tz;
use rand::{rngs::StdRng, Rng, RngCore, SeedableRng};
use std::sync::{Mutex, MutexGuard, PoisonError};

use crate::clock::{local_date, localize};
use crate::domain::Reminder;
use crate::gateway::LocalAlerts;

pub const ENCOURAGEMENT_TITLE: &str = "A word of encouragement";

pub const ENCOURAGEMENT_MESSAGES: [&str; 5] = [
    "Has anyone told you you're doing great? Keep giving your best. You are loved!",
    "Stay strong! Your effort makes a difference.",
    "You matter to this team. Don't give up!",
    "You are not alone at any rehearsal or performance!",
    "Your talent is a gift. Use it with joy!",
];

const WINDOW_DAYS: i64 = 7;
/// First hour of the day an encouragement may fire at.
const FIRST_HOUR: u32 = 9;
/// Hours from this one on are too late.
const END_HOUR: u32 = 21;

pub struct EncouragementPicker {
    rng: Mutex<Box<dyn RngCore + Send>>,
    tz: Tz,
}

impl EncouragementPicker {
    pub fn new(rng: Box<dyn RngCore + Send>, tz: Tz) -> Self {
        Self {
            rng: Mutex::new(rng),
            tz,
        }
    }

    pub fn from_entropy(tz: Tz) -> Self {
        Self::new(Box::new(StdRng::from_entropy()), tz)
    }

    fn rng(&self) -> MutexGuard<'_, Box<dyn RngCore + Send>> {
        self.rng.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Uniformly picks one of [`ENCOURAGEMENT_MESSAGES`].
    pub fn pick_message(&self) -> &'static str {
        let index = self.rng().gen_range(0..ENCOURAGEMENT_MESSAGES.len());
        ENCOURAGEMENT_MESSAGES[index]
    }

    /// Picks a moment strictly after `now` and at most a week away, at a local
    /// hour in `[9, 21)`.
    ///
    /// The day offset, hour and minute are drawn uniformly. A draw that lands
    /// earlier today is moved to the same local time one week later.
    pub fn pick_moment(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        let today = local_date(self.tz, now);
        let latest = now + Duration::days(WINDOW_DAYS);
        let mut rng = self.rng();
        loop {
            let day_offset = rng.gen_range(0..WINDOW_DAYS);
            let hour = rng.gen_range(FIRST_HOUR..END_HOUR);
            let minute = rng.gen_range(0..60);
            let Some(time) = NaiveTime::from_hms_opt(hour, minute, 0) else {
                continue;
            };
            let date = today + Duration::days(day_offset);

            // Local times inside a DST gap are redrawn.
            let Some(candidate) = localize(self.tz, date, time) else {
                continue;
            };
            if candidate > now {
                return candidate;
            }
            if let Some(next_week) = localize(self.tz, date + Duration::days(WINDOW_DAYS), time) {
                if next_week > now && next_week <= latest {
                    return next_week;
                }
            }
        }
    }

    /// Schedules one encouragement alert for `user_id` and returns its identifier.
    pub async fn schedule(&self, alerts: &LocalAlerts, user_id: &str) -> Option<String> {
        let moment = self.pick_moment(alerts.now());
        let message = self.pick_message();
        alerts
            .schedule(Reminder {
                trigger_at: moment,
                title: ENCOURAGEMENT_TITLE.to_string(),
                body: message.to_string(),
                identifier: format!("encouragement_{}_{}", user_id, moment.timestamp_millis()),
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};
    use rand_pcg::Pcg64;

    fn picker(seed: u64, tz: Tz) -> EncouragementPicker {
        EncouragementPicker::new(Box::new(Pcg64::seed_from_u64(seed)), tz)
    }

    #[test]
    fn same_seed_gives_same_picks() {
        let now = Utc.with_ymd_and_hms(2024, 6, 3, 12, 0, 0).unwrap();
        let a = picker(7, Tz::UTC);
        let b = picker(7, Tz::UTC);
        assert_eq!(a.pick_moment(now), b.pick_moment(now));
        assert_eq!(a.pick_message(), b.pick_message());
    }

    #[test]
    fn late_evening_never_picks_the_past() {
        // At 23:00 every same-day draw is already over.
        let now = Utc.with_ymd_and_hms(2024, 6, 3, 23, 0, 0).unwrap();
        let p = picker(11, Tz::UTC);
        for _ in 0..200 {
            let moment = p.pick_moment(now);
            assert!(moment > now);
            assert!(moment <= now + Duration::days(7));
            assert!((9..21).contains(&moment.hour()));
        }
    }

    #[test]
    fn message_comes_from_the_fixed_set() {
        let p = picker(3, Tz::UTC);
        for _ in 0..20 {
            assert!(ENCOURAGEMENT_MESSAGES.contains(&p.pick_message()));
        }
    }
}
