//! Conversions between the shared wire DTOs and domain types.
//!
//! Dates, times and weekdays arrive as strings and ISO numbers; anything
//! malformed is a 400 before the domain is reached.

pub mod activity_mapper;
pub mod budget_mapper;
pub mod package_mapper;
pub mod series_mapper;
pub mod trainer_mapper;
pub mod training_type_mapper;
pub mod user_mapper;

use chrono::{DateTime, NaiveDate, NaiveTime, Utc, Weekday};

use crate::domain::dates;
use crate::io::rest::error::ApiError;

pub fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ApiError> {
    dates::parse_date(value).ok_or_else(|| {
        ApiError::BadRequest(format!("Invalid {} '{}', expected YYYY-MM-DD", field, value))
    })
}

pub fn parse_optional_date(field: &str, value: Option<&str>) -> Result<Option<NaiveDate>, ApiError> {
    value.map(|v| parse_date(field, v)).transpose()
}

pub fn parse_time(field: &str, value: &str) -> Result<NaiveTime, ApiError> {
    dates::parse_time(value).ok_or_else(|| {
        ApiError::BadRequest(format!("Invalid {} '{}', expected HH:MM", field, value))
    })
}

/// Blank strings count as "no time"
pub fn parse_optional_time(field: &str, value: Option<&str>) -> Result<Option<NaiveTime>, ApiError> {
    match value {
        Some(v) if !v.trim().is_empty() => parse_time(field, v).map(Some),
        _ => Ok(None),
    }
}

/// `None` leaves the time alone, `Some("")` clears it
pub fn parse_time_update(field: &str, value: Option<&str>) -> Result<Option<Option<NaiveTime>>, ApiError> {
    value.map(|v| parse_optional_time(field, Some(v))).transpose()
}

/// `None` leaves the text alone, a blank string clears it
pub fn text_update(value: Option<String>) -> Option<Option<String>> {
    value.map(|v| {
        let v = v.trim();
        if v.is_empty() {
            None
        } else {
            Some(v.to_string())
        }
    })
}

pub fn parse_weekdays(values: &[u8]) -> Result<Vec<Weekday>, ApiError> {
    values
        .iter()
        .map(|&n| {
            dates::weekday_from_iso(n).ok_or_else(|| {
                ApiError::BadRequest(format!("Invalid weekday {}, expected 1 (Monday) to 7 (Sunday)", n))
            })
        })
        .collect()
}

pub fn parse_dates(field: &str, values: &[String]) -> Result<Vec<NaiveDate>, ApiError> {
    values.iter().map(|v| parse_date(field, v)).collect()
}

pub fn format_timestamp(value: DateTime<Utc>) -> String {
    value.to_rfc3339()
}
