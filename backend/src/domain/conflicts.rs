//! Per-day trainer double-booking detection.
//!
//! A trainer is double-booked when two of their activities on the same day
//! overlap. Timed activities overlap when their `[start, end)` intervals
//! intersect; an untimed activity blocks the whole day.

use std::collections::BTreeMap;

use chrono::NaiveDate;

use crate::domain::models::Activity;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Conflict {
    pub date: NaiveDate,
    pub trainer_id: String,
    pub first_activity_id: String,
    pub second_activity_id: String,
}

impl Conflict {
    pub fn involves(&self, activity_id: &str) -> bool {
        self.first_activity_id == activity_id || self.second_activity_id == activity_id
    }
}

/// Whether two activities on the same day would collide
pub fn overlaps(a: &Activity, b: &Activity) -> bool {
    match (a.minute_span(), b.minute_span()) {
        (Some((a_start, a_end)), Some((b_start, b_end))) => a_start < b_end && b_start < a_end,
        _ => true,
    }
}

/// Every overlapping pair, once per shared trainer, ordered by date,
/// trainer and start time.
pub fn detect_conflicts(activities: &[Activity]) -> Vec<Conflict> {
    let mut by_day_and_trainer: BTreeMap<(NaiveDate, &str), Vec<&Activity>> = BTreeMap::new();
    for activity in activities {
        let mut seen: Vec<&str> = Vec::new();
        for trainer_id in &activity.trainer_ids {
            if seen.contains(&trainer_id.as_str()) {
                continue;
            }
            seen.push(trainer_id.as_str());
            by_day_and_trainer
                .entry((activity.date, trainer_id.as_str()))
                .or_default()
                .push(activity);
        }
    }

    let mut conflicts = Vec::new();
    for ((date, trainer_id), mut group) in by_day_and_trainer {
        if group.len() < 2 {
            continue;
        }
        group.sort_by(|a, b| a.start_time.cmp(&b.start_time).then_with(|| a.id.cmp(&b.id)));
        for (i, first) in group.iter().enumerate() {
            for second in &group[i + 1..] {
                if overlaps(first, second) {
                    conflicts.push(Conflict {
                        date,
                        trainer_id: trainer_id.to_string(),
                        first_activity_id: first.id.clone(),
                        second_activity_id: second.id.clone(),
                    });
                }
            }
        }
    }
    conflicts
}

/// Conflicts that involve at least one of `activity_ids`
pub fn conflicts_involving(activities: &[Activity], activity_ids: &[String]) -> Vec<Conflict> {
    detect_conflicts(activities)
        .into_iter()
        .filter(|c| activity_ids.iter().any(|id| c.involves(id)))
        .collect()
}
