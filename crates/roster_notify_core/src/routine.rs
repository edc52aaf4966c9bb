//! crates/roster_notify_core/src/routine.rs
//!
//! The routine scheduler. Once per process it looks at the routine table,
//! arms a single-shot countdown for every routine still due today, and on
//! expiry dispatches the routine's action.
//!
//! Routines whose time already passed today are skipped, with no catch-up. There
//! is no re-arming at midnight: other days are picked up on the next process start.

use chrono::{DateTime, Datelike, NaiveTime, Utc, Weekday};
use chrono_tz::Tz;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::actions::RoutineActions;
use crate::clock::{delay_until, is_future, occurrence_today};
use crate::domain::{RoutineAction, RoutineDefinition};
use crate::ports::Clock;

/// The routine table used when none is configured.
pub fn default_routines() -> Vec<RoutineDefinition> {
    let at = |h: u32| NaiveTime::from_hms_opt(h, 0, 0).unwrap_or(NaiveTime::MIN);
    vec![
        RoutineDefinition {
            id: "check-today-events".to_string(),
            days: vec![
                Weekday::Mon,
                Weekday::Tue,
                Weekday::Wed,
                Weekday::Thu,
                Weekday::Fri,
                Weekday::Sat,
                Weekday::Sun,
            ],
            time: at(7),
            action: RoutineAction::CheckTodayEvents,
        },
        RoutineDefinition {
            id: "encourage-musicians".to_string(),
            days: vec![Weekday::Wed, Weekday::Sat],
            time: at(10),
            action: RoutineAction::EncourageMusicians,
        },
        RoutineDefinition {
            id: "encourage-teachers".to_string(),
            days: vec![Weekday::Mon, Weekday::Thu],
            time: at(10),
            action: RoutineAction::EncourageTeachers,
        },
    ]
}

//=========================================================================================
// Planning (pure)
//=========================================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoutineState {
    /// Today's weekday is not in the routine's days.
    NotToday,
    /// Today's occurrence is already at or before now.
    SkippedToday,
    Armed { due_at: DateTime<Utc> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoutinePlan {
    pub routine_id: String,
    pub action: RoutineAction,
    pub state: RoutineState,
}

/// Decides, for each routine, whether it should be armed for today.
pub fn plan_today(
    definitions: &[RoutineDefinition],
    tz: Tz,
    now: DateTime<Utc>,
) -> Vec<RoutinePlan> {
    let weekday = now.with_timezone(&tz).weekday();
    definitions
        .iter()
        .map(|routine| {
            let state = if !routine.runs_on(weekday) {
                RoutineState::NotToday
            } else {
                match occurrence_today(tz, now, routine.time) {
                    Some(due_at) if is_future(due_at, now) => RoutineState::Armed { due_at },
                    _ => RoutineState::SkippedToday,
                }
            };
            RoutinePlan {
                routine_id: routine.id.clone(),
                action: routine.action,
                state,
            }
        })
        .collect()
}

//=========================================================================================
// Arming
//=========================================================================================

/// A pending countdown for today's occurrence of one routine.
#[derive(Debug)]
pub struct ArmedTimer {
    pub routine_id: String,
    pub action: RoutineAction,
    pub due_at: DateTime<Utc>,
    handle: JoinHandle<()>,
}

impl ArmedTimer {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Waits until the countdown has fired (or was dropped on shutdown).
    pub async fn wait(self) {
        if let Err(e) = self.handle.await {
            error!("Routine '{}' task ended abnormally: {:?}", self.routine_id, e);
        }
    }
}

pub struct RoutineScheduler {
    definitions: Vec<RoutineDefinition>,
    tz: Tz,
    clock: Arc<dyn Clock>,
    actions: Arc<RoutineActions>,
    shutdown: CancellationToken,
    armed: AtomicBool,
}

impl RoutineScheduler {
    pub fn new(
        definitions: Vec<RoutineDefinition>,
        tz: Tz,
        clock: Arc<dyn Clock>,
        actions: Arc<RoutineActions>,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            definitions,
            tz,
            clock,
            actions,
            shutdown,
            armed: AtomicBool::new(false),
        }
    }

    pub fn definitions(&self) -> &[RoutineDefinition] {
        &self.definitions
    }

    pub fn actions(&self) -> &Arc<RoutineActions> {
        &self.actions
    }

    pub fn is_armed(&self) -> bool {
        self.armed.load(Ordering::SeqCst)
    }

    /// Arms today's remaining routines. Only the first call per process does
    /// anything; later calls return an empty list.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn arm(&self) -> Vec<ArmedTimer> {
        if self.armed.swap(true, Ordering::SeqCst) {
            debug!("Routines already armed for this process");
            return Vec::new();
        }

        let now = self.clock.now();
        let mut timers = Vec::new();
        for plan in plan_today(&self.definitions, self.tz, now) {
            match plan.state {
                RoutineState::Armed { due_at } => {
                    timers.push(self.spawn_countdown(plan.routine_id, plan.action, due_at, now));
                }
                RoutineState::SkippedToday => {
                    debug!("Routine '{}' already passed today", plan.routine_id);
                }
                RoutineState::NotToday => {}
            }
        }
        info!("Armed {} routine(s) for today", timers.len());
        timers
    }

    fn spawn_countdown(
        &self,
        routine_id: String,
        action: RoutineAction,
        due_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> ArmedTimer {
        let deadline = tokio::time::Instant::now() + delay_until(due_at, now);
        let actions = self.actions.clone();
        let shutdown = self.shutdown.clone();
        let id = routine_id.clone();
        debug!("Routine '{}' ({:?}) armed for {}", id, action, due_at);

        let handle = tokio::spawn(async move {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    debug!("Routine '{}' dropped on shutdown", id);
                }
                _ = tokio::time::sleep_until(deadline) => {
                    fire(&actions, &id, action).await;
                }
            }
        });

        ArmedTimer {
            routine_id,
            action,
            due_at,
            handle,
        }
    }
}

/// Runs one routine's action. A failing handler is logged and never reaches
/// the scheduler or the other routines.
async fn fire(actions: &RoutineActions, routine_id: &str, action: RoutineAction) {
    info!("Routine '{}' fired", routine_id);
    if let Err(e) = actions.run(action).await {
        warn!("Routine '{}' failed: {:?}", routine_id, e);
    }
}
