//! Weekly workout plan service
//!
//! Keeps the seven-day plan in memory and writes the whole list back to the
//! settings store after every edit. Stored entries are checked against the
//! workout label set on load; anything unrecognised becomes "Rest Day".

use crate::repositories::SettingsStore;
use chrono::{Datelike, Local};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use total_evolve_shared::validation::validate_plan_edit;
use total_evolve_shared::{PlanError, WeeklyPlan, Weekday, WorkoutLabel, DAYS_PER_WEEK};
use tracing::{debug, error, info, warn};

/// Settings key holding the seven-entry plan
pub const PLAN_KEY: &str = "muscles";

/// Per-day key written by the old single-day editor
fn legacy_key(day: Weekday) -> String {
    format!("{}{}", PLAN_KEY, day.name())
}

/// Weekday of the local calendar date
pub fn current_weekday() -> Weekday {
    Local::now().weekday().into()
}

/// Weekly plan backed by durable settings
pub struct WeeklyPlanStore {
    storage: Arc<dyn SettingsStore>,
    plan: Mutex<WeeklyPlan>,
}

impl WeeklyPlanStore {
    /// Open the store, loading the persisted plan
    pub fn open(storage: Arc<dyn SettingsStore>) -> Self {
        let plan = Self::load(storage.as_ref());
        Self {
            storage,
            plan: Mutex::new(plan),
        }
    }

    /// Read the plan from storage
    ///
    /// Falls back to seven "Rest Day" entries when the key is unreadable,
    /// holds something other than a string list, or does not hold exactly
    /// seven entries. Legacy per-day keys are read only when the key is absent.
    pub fn load(storage: &dyn SettingsStore) -> WeeklyPlan {
        let stored = storage
            .contains(PLAN_KEY)
            .and_then(|present| {
                storage
                    .string_array(PLAN_KEY)
                    .map(|entries| (present, entries))
            });

        let entries = match stored {
            Ok((false, _)) => return Self::load_legacy(storage),
            Ok((true, Some(entries))) => entries,
            Ok((true, None)) => {
                warn!(key = PLAN_KEY, "Stored weekly plan is not a string list, using default");
                return WeeklyPlan::default();
            }
            Err(e) => {
                error!(error = %e, "Failed to read weekly plan, using default");
                return WeeklyPlan::default();
            }
        };

        match WeeklyPlan::from_stored(&entries) {
            Some((plan, rejected)) => {
                for (index, entry) in rejected {
                    warn!(day = index, entry = %entry, "Unknown workout in stored plan, using Rest Day");
                }
                debug!("Loaded weekly plan");
                plan
            }
            None => {
                warn!(
                    entries = entries.len(),
                    expected = DAYS_PER_WEEK,
                    "Stored weekly plan has wrong length, using default"
                );
                WeeklyPlan::default()
            }
        }
    }

    fn load_legacy(storage: &dyn SettingsStore) -> WeeklyPlan {
        let mut plan = WeeklyPlan::default();
        let mut migrated = 0;
        for day in Weekday::ALL {
            let entry = match storage.string(&legacy_key(day)) {
                Ok(Some(entry)) => entry,
                Ok(None) => continue,
                Err(e) => {
                    warn!(day = %day, error = %e, "Failed to read legacy plan entry");
                    continue;
                }
            };
            match entry.parse::<WorkoutLabel>() {
                Ok(workout) => {
                    plan.set(day, workout);
                    migrated += 1;
                }
                Err(_) => {
                    warn!(day = %day, entry = %entry, "Unknown workout in legacy plan entry, using Rest Day")
                }
            }
        }
        if migrated > 0 {
            info!(days = migrated, "Migrated legacy per-day plan entries");
        }
        plan
    }

    fn lock(&self) -> MutexGuard<'_, WeeklyPlan> {
        self.plan.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current in-memory plan
    pub fn plan(&self) -> WeeklyPlan {
        *self.lock()
    }

    pub fn workout_for(&self, day: Weekday) -> WorkoutLabel {
        self.lock().workout(day)
    }

    /// Today's weekday and its workout
    pub fn today(&self) -> (Weekday, WorkoutLabel) {
        let day = current_weekday();
        (day, self.workout_for(day))
    }

    /// Assign `workout` to the day at `day_index` (0 = Monday) and persist
    ///
    /// A failed write is logged and the edit is kept in memory.
    pub fn set_workout(&self, day_index: usize, workout: &str) -> Result<WeeklyPlan, PlanError> {
        let (day, label) = validate_plan_edit(day_index, workout)?;

        let mut plan = self.lock();
        plan.set(day, label);
        match self.storage.set_string_array(PLAN_KEY, &plan.to_stored()) {
            Ok(()) => info!(day = %day, workout = %label, "Weekly plan updated"),
            Err(e) => error!(day = %day, error = %e, "Failed to persist weekly plan"),
        }
        Ok(*plan)
    }
}
