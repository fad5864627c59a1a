//! Domain model for a scheduled training session.

use chrono::{DateTime, NaiveDate, NaiveTime, Timelike, Utc};
use serde::{Deserialize, Serialize};

use super::{Trainer, TrainingType};

pub const MINUTES_PER_DAY: u32 = 24 * 60;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Activity {
    pub id: String,
    pub date: NaiveDate,
    pub training_type_id: String,
    pub trainer_ids: Vec<String>,
    pub hours: f64,
    pub start_time: Option<NaiveTime>,
    pub notes: Option<String>,
    /// Set when the activity was materialized from a recurring series
    pub series_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Activity {
    /// Duration in whole minutes
    pub fn duration_minutes(&self) -> u32 {
        (self.hours * 60.0).round().max(0.0) as u32
    }

    /// `[start, end)` in minutes from midnight, `None` for untimed activities.
    /// The end may run past midnight.
    pub fn minute_span(&self) -> Option<(u32, u32)> {
        self.start_time.map(|start| {
            let begin = start.hour() * 60 + start.minute();
            (begin, begin + self.duration_minutes())
        })
    }

    /// End time clamped to 23:59
    pub fn end_time(&self) -> Option<NaiveTime> {
        let (_, end) = self.minute_span()?;
        let end = end.min(MINUTES_PER_DAY - 1);
        NaiveTime::from_hms_opt(end / 60, end % 60, 0)
    }

    pub fn has_trainer(&self, trainer_id: &str) -> bool {
        self.trainer_ids.iter().any(|t| t == trainer_id)
    }
}

/// Activity joined with its training type and trainers
#[derive(Debug, Clone, PartialEq)]
pub struct ActivityDetails {
    pub activity: Activity,
    pub training_type: Option<TrainingType>,
    pub trainers: Vec<Trainer>,
}
