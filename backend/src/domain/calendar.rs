//! Calendar domain logic for the club planner.
//!
//! Builds the year, month and week grids the frontend renders. The grids are
//! pure view models: activities are loaded and filtered by the activity
//! service, enriched into `ActivityView`s and handed in here to be laid out.

use std::collections::HashMap;

use chrono::{Datelike, Duration, Local, NaiveDate};
use log::{debug, warn};
use shared::{
    ActivityView, CalendarDay, CalendarDayType, CalendarMonth, CalendarWeek, CalendarWeekRow,
    CalendarYear, CurrentDateResponse,
};

use crate::domain::dates;
use crate::domain::error::{DomainError, DomainResult};

/// Calendar service that lays activities out on calendar grids
#[derive(Clone, Default)]
pub struct CalendarService {
    /// Fixed "today", used by tests. `None` means the local date.
    today: Option<NaiveDate>,
}

impl CalendarService {
    pub fn new() -> Self {
        Self { today: None }
    }

    /// Calendar pinned to a given date
    pub fn with_today(today: NaiveDate) -> Self {
        Self { today: Some(today) }
    }

    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// First and last day of a month
    pub fn month_range(&self, year: i32, month: u32) -> DomainResult<(NaiveDate, NaiveDate)> {
        check_year(year)?;
        if !(1..=12).contains(&month) {
            return Err(DomainError::validation(format!(
                "Invalid month {}, expected 1-12",
                month
            )));
        }
        match (dates::first_of_month(year, month), dates::last_of_month(year, month)) {
            (Some(first), Some(last)) => Ok((first, last)),
            _ => Err(DomainError::validation(format!("Invalid year {}", year))),
        }
    }

    pub fn year_range(&self, year: i32) -> DomainResult<(NaiveDate, NaiveDate)> {
        let (first, _) = self.month_range(year, 1)?;
        let (_, last) = self.month_range(year, 12)?;
        Ok((first, last))
    }

    /// Monday and Sunday of an ISO week
    pub fn week_range(&self, iso_year: i32, week: u32) -> DomainResult<(NaiveDate, NaiveDate)> {
        check_year(iso_year)?;
        let max_week = dates::weeks_in_iso_year(iso_year);
        if week == 0 || week > max_week {
            return Err(DomainError::validation(format!(
                "Invalid week {}, {} has {} ISO weeks",
                week, iso_year, max_week
            )));
        }
        let monday = dates::iso_week_start(iso_year, week)
            .ok_or_else(|| DomainError::validation(format!("Invalid year {}", iso_year)))?;
        Ok((monday, monday + Duration::days(6)))
    }

    /// Generate a month grid of Monday-first rows of seven cells.
    ///
    /// Cells outside the month are padding with day 0 and no activities.
    /// Activities outside the month are ignored.
    pub fn generate_month(
        &self,
        year: i32,
        month: u32,
        activities: &[ActivityView],
    ) -> DomainResult<CalendarMonth> {
        let (first, last) = self.month_range(year, month)?;
        let grid_start = dates::week_start(first);
        let grid_end = dates::week_start(last) + Duration::days(6);
        debug!(
            "Generating calendar for {}-{:02}: grid {} to {}",
            year, month, grid_start, grid_end
        );

        let by_date = group_by_date(activities);
        let today = self.today();

        let mut weeks = Vec::new();
        let mut total_hours = 0.0;
        let mut activity_count = 0;
        let mut row_start = grid_start;
        while row_start <= grid_end {
            let (_, iso_week) = dates::iso_week(row_start);
            let days: Vec<CalendarDay> = row_start
                .iter_days()
                .take(7)
                .map(|date| {
                    let day_type = if date < first {
                        CalendarDayType::PaddingBefore
                    } else if date > last {
                        CalendarDayType::PaddingAfter
                    } else {
                        CalendarDayType::MonthDay
                    };
                    let cell = match day_type {
                        CalendarDayType::MonthDay => build_day(date, date.day(), day_type, today, &by_date),
                        _ => build_day(date, 0, day_type, today, &HashMap::new()),
                    };
                    total_hours += cell.total_hours;
                    activity_count += cell.activities.len();
                    cell
                })
                .collect();
            weeks.push(CalendarWeekRow { iso_week, days });
            row_start += Duration::days(7);
        }

        Ok(CalendarMonth {
            year,
            month,
            month_name: dates::month_name(month).to_string(),
            weeks,
            total_hours: round_hours(total_hours),
            activity_count,
        })
    }

    /// Twelve month grids
    pub fn generate_year(&self, year: i32, activities: &[ActivityView]) -> DomainResult<CalendarYear> {
        let months = (1..=12)
            .map(|month| self.generate_month(year, month, activities))
            .collect::<DomainResult<Vec<_>>>()?;
        let total_hours = round_hours(months.iter().map(|m| m.total_hours).sum());
        let activity_count = months.iter().map(|m| m.activity_count).sum();
        Ok(CalendarYear {
            year,
            months,
            total_hours,
            activity_count,
        })
    }

    /// Seven days of an ISO week, Monday first
    pub fn generate_week(
        &self,
        iso_year: i32,
        week: u32,
        activities: &[ActivityView],
    ) -> DomainResult<CalendarWeek> {
        let (monday, sunday) = self.week_range(iso_year, week)?;
        let by_date = group_by_date(activities);
        let today = self.today();

        let days: Vec<CalendarDay> = monday
            .iter_days()
            .take(7)
            .map(|date| build_day(date, date.day(), CalendarDayType::MonthDay, today, &by_date))
            .collect();
        let total_hours = round_hours(days.iter().map(|d| d.total_hours).sum());

        Ok(CalendarWeek {
            iso_year,
            iso_week: week,
            start_date: dates::format_date(monday),
            end_date: dates::format_date(sunday),
            days,
            total_hours,
        })
    }

    pub fn current_date(&self) -> CurrentDateResponse {
        let today = self.today();
        let (iso_year, iso_week) = dates::iso_week(today);
        CurrentDateResponse {
            year: today.year(),
            month: today.month(),
            day: today.day(),
            iso_year,
            iso_week,
            formatted_date: dates::format_date_for_display(today),
            iso_date: dates::format_date(today),
        }
    }
}

fn check_year(year: i32) -> DomainResult<()> {
    if dates::is_supported_year(year) {
        Ok(())
    } else {
        Err(DomainError::validation(format!(
            "Year must be between {} and {}",
            dates::MIN_YEAR,
            dates::MAX_YEAR
        )))
    }
}

fn group_by_date(activities: &[ActivityView]) -> HashMap<NaiveDate, Vec<ActivityView>> {
    let mut by_date: HashMap<NaiveDate, Vec<ActivityView>> = HashMap::new();
    for activity in activities {
        match dates::parse_date(&activity.date) {
            Some(date) => by_date.entry(date).or_default().push(activity.clone()),
            None => warn!("Skipping activity {} with unreadable date {}", activity.id, activity.date),
        }
    }
    by_date
}

fn build_day(
    date: NaiveDate,
    day: u32,
    day_type: CalendarDayType,
    today: NaiveDate,
    by_date: &HashMap<NaiveDate, Vec<ActivityView>>,
) -> CalendarDay {
    let activities = by_date.get(&date).cloned().unwrap_or_default();
    let total_hours = round_hours(activities.iter().map(|a| a.hours).sum());
    CalendarDay {
        day,
        date: dates::format_date(date),
        weekday: dates::day_of_week(date),
        day_type,
        is_today: date == today,
        activities,
        total_hours,
    }
}

fn round_hours(hours: f64) -> f64 {
    (hours * 100.0).round() / 100.0
}
