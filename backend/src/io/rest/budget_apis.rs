//! # REST API for the Yearly Budget
//!
//! Sections group costs for one year, entries are the hand-entered lines of
//! manual sections and the report combines both with activity costs. A
//! missing `year` means the calendar's current year.

use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{IntoResponse, Json},
    routing::{get, put},
    Router,
};
use chrono::Datelike;
use log::info;
use serde::Deserialize;
use shared::{
    CreateBudgetEntryRequest, CreateBudgetSectionRequest, UpdateBudgetEntryRequest,
    UpdateBudgetSectionRequest,
};

use crate::io::rest::auth::AuthUser;
use crate::io::rest::error::ApiError;
use crate::io::rest::mappers::budget_mapper::BudgetMapper;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct YearQuery {
    pub year: Option<i32>,
}

impl YearQuery {
    fn resolve(&self, state: &AppState) -> i32 {
        self.year.unwrap_or_else(|| state.calendar_service.today().year())
    }
}

/// Create a router for budget APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/sections", get(list_sections).post(create_section))
        .route("/sections/:id", put(update_section).delete(delete_section))
        .route("/sections/:id/entries", get(list_entries).post(create_entry))
        .route("/entries/:id", put(update_entry).delete(delete_entry))
        .route("/report", get(get_report))
        .route("/report.csv", get(export_report_csv))
}

pub async fn list_sections(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<YearQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let year = query.resolve(&state);
    info!("GET /api/budget/sections - year: {}", year);
    let sections = state.budget_service.list_sections(&auth.actor(), year).await?;
    Ok(Json(BudgetMapper::to_section_list_dto(sections)))
}

pub async fn create_section(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateBudgetSectionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("POST /api/budget/sections - request: {:?}", request);
    let command = BudgetMapper::to_create_section_command(request);
    let section = state.budget_service.create_section(&auth.actor(), command).await?;
    Ok((StatusCode::CREATED, Json(BudgetMapper::section_to_dto(section))))
}

pub async fn update_section(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(section_id): Path<String>,
    Json(request): Json<UpdateBudgetSectionRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("PUT /api/budget/sections/{} - request: {:?}", section_id, request);
    let command = BudgetMapper::to_update_section_command(request);
    let section = state
        .budget_service
        .update_section(&auth.actor(), &section_id, command)
        .await?;
    Ok(Json(BudgetMapper::section_to_dto(section)))
}

pub async fn delete_section(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(section_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    info!("DELETE /api/budget/sections/{}", section_id);
    state.budget_service.delete_section(&auth.actor(), &section_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_entries(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(section_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    info!("GET /api/budget/sections/{}/entries", section_id);
    let entries = state.budget_service.list_entries(&auth.actor(), &section_id).await?;
    Ok(Json(BudgetMapper::to_entry_list_dto(entries)))
}

pub async fn create_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(section_id): Path<String>,
    Json(request): Json<CreateBudgetEntryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("POST /api/budget/sections/{}/entries - request: {:?}", section_id, request);
    let command = BudgetMapper::to_create_entry_command(section_id, request)?;
    let entry = state.budget_service.create_entry(&auth.actor(), command).await?;
    Ok((StatusCode::CREATED, Json(BudgetMapper::entry_to_dto(entry))))
}

pub async fn update_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(entry_id): Path<String>,
    Json(request): Json<UpdateBudgetEntryRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("PUT /api/budget/entries/{} - request: {:?}", entry_id, request);
    let command = BudgetMapper::to_update_entry_command(request)?;
    let entry = state
        .budget_service
        .update_entry(&auth.actor(), &entry_id, command)
        .await?;
    Ok(Json(BudgetMapper::entry_to_dto(entry)))
}

pub async fn delete_entry(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(entry_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    info!("DELETE /api/budget/entries/{}", entry_id);
    state.budget_service.delete_entry(&auth.actor(), &entry_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<YearQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let year = query.resolve(&state);
    info!("GET /api/budget/report - year: {}", year);
    let report = state.budget_service.report(&auth.actor(), year).await?;
    Ok(Json(report))
}

pub async fn export_report_csv(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<YearQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let year = query.resolve(&state);
    info!("GET /api/budget/report.csv - year: {}", year);
    let csv = state.budget_service.export_report_csv(&auth.actor(), year).await?;
    let headers = [
        (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"budget-{}.csv\"", year),
        ),
    ];
    Ok((headers, csv))
}
