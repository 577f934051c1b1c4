use chrono::{Duration, NaiveDateTime};

use shared_models::therapy::TherapySession;

use crate::models::TherapyError;

pub const DEFAULT_WINDOW_MINUTES: i64 = 59;

/// Closed interval `[t - minutes, t + minutes]` that must be free of a
/// practitioner's other sessions before a new one is booked at `t`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConflictWindow {
    minutes: i64,
}

impl Default for ConflictWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_MINUTES)
    }
}

impl ConflictWindow {
    pub fn new(minutes: i64) -> Self {
        Self { minutes: minutes.max(0) }
    }

    pub fn minutes(&self) -> i64 {
        self.minutes
    }

    /// Fails with a validation error when the width or either edge falls
    /// outside the representable date range.
    pub fn bounds(
        &self,
        proposed: NaiveDateTime,
    ) -> Result<(NaiveDateTime, NaiveDateTime), TherapyError> {
        let half = Duration::try_minutes(self.minutes).ok_or_else(width_out_of_range)?;
        let start = proposed.checked_sub_signed(half).ok_or_else(date_out_of_range)?;
        let end = proposed.checked_add_signed(half).ok_or_else(date_out_of_range)?;
        Ok((start, end))
    }

    pub fn contains(
        &self,
        proposed: NaiveDateTime,
        existing: NaiveDateTime,
    ) -> Result<bool, TherapyError> {
        let (start, end) = self.bounds(proposed)?;
        Ok(existing >= start && existing <= end)
    }

    /// First session (in the given order) that falls inside the window.
    pub fn first_conflict<'a>(
        &self,
        proposed: NaiveDateTime,
        sessions: &'a [TherapySession],
    ) -> Result<Option<&'a TherapySession>, TherapyError> {
        let (start, end) = self.bounds(proposed)?;
        Ok(sessions
            .iter()
            .find(|s| s.scheduled_date >= start && s.scheduled_date <= end))
    }
}

fn width_out_of_range() -> TherapyError {
    TherapyError::Validation("Conflict window is out of range".to_string())
}

fn date_out_of_range() -> TherapyError {
    TherapyError::Validation("Scheduled date is out of range".to_string())
}

pub fn conflict_error(existing: &TherapySession) -> TherapyError {
    TherapyError::ScheduleConflict {
        procedure: existing.procedure_name.clone(),
        at: existing.scheduled_date.format("%Y-%m-%d %H:%M").to_string(),
    }
}
