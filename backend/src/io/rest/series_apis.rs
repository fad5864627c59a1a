//! # REST API for Recurring Series
//!
//! `PUT` and `DELETE` take an optional `?from=YYYY-MM-DD`: occurrences
//! before that date are left alone.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use log::info;
use serde::Deserialize;
use shared::{CreateSeriesRequest, UpdateSeriesRequest};

use crate::domain::commands::series::DeleteSeriesScope;
use crate::io::rest::auth::AuthUser;
use crate::io::rest::error::ApiError;
use crate::io::rest::mappers::parse_optional_date;
use crate::io::rest::mappers::series_mapper::SeriesMapper;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct FromQuery {
    pub from: Option<String>,
}

/// Create a router for recurring series APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_series).post(create_series))
        .route("/:id", get(get_series).put(update_series).delete(delete_series))
}

pub async fn list_series(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    info!("GET /api/series");
    let series = state.activity_service.list_series().await?;
    Ok(Json(SeriesMapper::to_list_dto(series)))
}

pub async fn get_series(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(series_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    info!("GET /api/series/{}", series_id);
    let result = state.activity_service.get_series(&series_id).await?;
    Ok(Json(SeriesMapper::to_response(result)))
}

pub async fn create_series(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateSeriesRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("POST /api/series - request: {:?}", request);
    let command = SeriesMapper::to_create_command(request)?;
    let result = state
        .activity_service
        .create_series(&auth.actor(), command)
        .await?;
    info!(
        "Series {} created with {} occurrences",
        result.series.id, result.activity_count
    );
    Ok((StatusCode::CREATED, Json(SeriesMapper::to_response(result))))
}

pub async fn update_series(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(series_id): Path<String>,
    Query(query): Query<FromQuery>,
    Json(request): Json<UpdateSeriesRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("PUT /api/series/{} - from: {:?}, request: {:?}", series_id, query.from, request);
    let command = SeriesMapper::to_update_command(request, query.from.as_deref())?;
    let result = state
        .activity_service
        .update_series(&auth.actor(), &series_id, command)
        .await?;
    Ok(Json(SeriesMapper::to_response(result)))
}

pub async fn delete_series(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(series_id): Path<String>,
    Query(query): Query<FromQuery>,
) -> Result<impl IntoResponse, ApiError> {
    info!("DELETE /api/series/{} - from: {:?}", series_id, query.from);
    let scope = match parse_optional_date("from", query.from.as_deref())? {
        Some(from) => DeleteSeriesScope::From(from),
        None => DeleteSeriesScope::All,
    };
    let result = state
        .activity_service
        .delete_series(&auth.actor(), &series_id, scope)
        .await?;
    Ok(Json(SeriesMapper::to_delete_response(result)))
}
