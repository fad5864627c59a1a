//! Template of a recurring activity.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};
use serde::{Deserialize, Serialize};

use super::Activity;
use crate::domain::recurrence;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringSeries {
    pub id: String,
    pub training_type_id: String,
    pub trainer_ids: Vec<String>,
    pub weekdays: Vec<Weekday>,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub hours: f64,
    pub start_time: Option<NaiveTime>,
    pub notes: Option<String>,
    pub excluded_dates: Vec<NaiveDate>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl RecurringSeries {
    /// All dates this series materializes on
    pub fn occurrence_dates(&self) -> Vec<NaiveDate> {
        recurrence::expand_weekdays(
            self.start_date,
            self.end_date,
            &self.weekdays,
            &self.excluded_dates,
        )
    }

    /// Build one activity per occurrence on or after `from`
    pub fn materialize_from(&self, from: NaiveDate, now: DateTime<Utc>) -> Vec<Activity> {
        self.occurrence_dates()
            .into_iter()
            .filter(|date| *date >= from)
            .map(|date| Activity {
                id: super::generate_id(),
                date,
                training_type_id: self.training_type_id.clone(),
                trainer_ids: self.trainer_ids.clone(),
                hours: self.hours,
                start_time: self.start_time,
                notes: self.notes.clone(),
                series_id: Some(self.id.clone()),
                created_at: now,
                updated_at: now,
            })
            .collect()
    }
}
