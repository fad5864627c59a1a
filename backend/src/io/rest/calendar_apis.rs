//! # REST API for Calendar Views
//!
//! Month, year and week grids filled with activity views. Missing year,
//! month or week parameters default to the calendar's today.

use axum::{
    extract::{Query, State},
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use chrono::{Datelike, NaiveDate};
use log::info;
use serde::Deserialize;
use shared::ActivityView;

use crate::domain::commands::activities::ActivityQuery;
use crate::domain::dates;
use crate::io::rest::activity_apis::non_blank;
use crate::io::rest::auth::AuthUser;
use crate::io::rest::error::ApiError;
use crate::io::rest::mappers::activity_mapper::ActivityMapper;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CalendarQuery {
    pub year: Option<i32>,
    pub month: Option<u32>,
    pub week: Option<u32>,
    pub trainer_id: Option<String>,
    pub training_type_id: Option<String>,
}

/// Create a router for calendar related APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/month", get(get_calendar_month))
        .route("/year", get(get_calendar_year))
        .route("/week", get(get_calendar_week))
        .route("/current-date", get(get_current_date))
}

/// Activity views between two dates, with the query's filters applied
async fn load_views(
    state: &AppState,
    query: &CalendarQuery,
    (start, end): (NaiveDate, NaiveDate),
) -> Result<Vec<ActivityView>, ApiError> {
    let activity_query = ActivityQuery {
        start: Some(start),
        end: Some(end),
        trainer_id: non_blank(&query.trainer_id),
        training_type_id: non_blank(&query.training_type_id),
    };
    let activities = state.activity_service.list_activities(&activity_query).await?;
    Ok(ActivityMapper::to_views(activities))
}

pub async fn get_calendar_month(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<CalendarQuery>,
) -> Result<impl IntoResponse, ApiError> {
    info!("GET /api/calendar/month - query: {:?}", query);
    let today = state.calendar_service.today();
    let year = query.year.unwrap_or(today.year());
    let month = query.month.unwrap_or(today.month());

    let range = state.calendar_service.month_range(year, month)?;
    let views = load_views(&state, &query, range).await?;
    let calendar = state.calendar_service.generate_month(year, month, &views)?;
    info!(
        "Calendar {}-{:02}: {} activities, {} hours",
        year, month, calendar.activity_count, calendar.total_hours
    );
    Ok(Json(calendar))
}

pub async fn get_calendar_year(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<CalendarQuery>,
) -> Result<impl IntoResponse, ApiError> {
    info!("GET /api/calendar/year - query: {:?}", query);
    let year = query.year.unwrap_or(state.calendar_service.today().year());

    let range = state.calendar_service.year_range(year)?;
    let views = load_views(&state, &query, range).await?;
    let calendar = state.calendar_service.generate_year(year, &views)?;
    Ok(Json(calendar))
}

pub async fn get_calendar_week(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<CalendarQuery>,
) -> Result<impl IntoResponse, ApiError> {
    info!("GET /api/calendar/week - query: {:?}", query);
    let (current_year, current_week) = dates::iso_week(state.calendar_service.today());
    let iso_year = query.year.unwrap_or(current_year);
    let week = query.week.unwrap_or(current_week);

    let range = state.calendar_service.week_range(iso_year, week)?;
    let views = load_views(&state, &query, range).await?;
    let calendar = state.calendar_service.generate_week(iso_year, week, &views)?;
    Ok(Json(calendar))
}

pub async fn get_current_date(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> impl IntoResponse {
    info!("GET /api/calendar/current-date");
    Json(state.calendar_service.current_date())
}
