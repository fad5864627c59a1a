//! Expansion of a weekly recurrence template into concrete dates.

use chrono::{Datelike, NaiveDate, Weekday};

use crate::domain::error::{DomainError, DomainResult};

/// Longest allowed span of a series, inclusive of both ends
pub const MAX_SERIES_SPAN_DAYS: i64 = 366;

/// Every date in `start..=end` whose weekday is in `weekdays`, minus
/// `excluded`. Dates come back in ascending order.
pub fn expand_weekdays(
    start: NaiveDate,
    end: NaiveDate,
    weekdays: &[Weekday],
    excluded: &[NaiveDate],
) -> Vec<NaiveDate> {
    start
        .iter_days()
        .take_while(|date| *date <= end)
        .filter(|date| weekdays.contains(&date.weekday()))
        .filter(|date| !excluded.contains(date))
        .collect()
}

/// Check that a template can be expanded
pub fn validate_template(
    start: NaiveDate,
    end: NaiveDate,
    weekdays: &[Weekday],
) -> DomainResult<()> {
    if weekdays.is_empty() {
        return Err(DomainError::validation(
            "A recurring series needs at least one weekday",
        ));
    }
    if end < start {
        return Err(DomainError::validation(
            "Series end date must not be before its start date",
        ));
    }
    let span = (end - start).num_days() + 1;
    if span > MAX_SERIES_SPAN_DAYS {
        return Err(DomainError::Validation(format!(
            "A recurring series may span at most {} days (got {})",
            MAX_SERIES_SPAN_DAYS, span
        )));
    }
    Ok(())
}

/// Sort and deduplicate a weekday selection, Monday first
pub fn normalize_weekdays(weekdays: &[Weekday]) -> Vec<Weekday> {
    let mut normalized: Vec<Weekday> = weekdays.to_vec();
    normalized.sort_by_key(|w| w.num_days_from_monday());
    normalized.dedup();
    normalized
}
