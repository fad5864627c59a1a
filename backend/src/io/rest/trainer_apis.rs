//! # REST API for Trainers

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use log::info;
use serde::Deserialize;
use shared::{CreateTrainerRequest, TrainerHoursResponse, UpdateTrainerRequest};

use crate::domain::commands::trainers::TrainerHoursQuery;
use crate::domain::dates::format_date;
use crate::io::rest::auth::AuthUser;
use crate::io::rest::error::ApiError;
use crate::io::rest::mappers::parse_date;
use crate::io::rest::mappers::trainer_mapper::TrainerMapper;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ActiveOnlyQuery {
    #[serde(default)]
    pub active_only: bool,
}

#[derive(Debug, Deserialize)]
pub struct HoursQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

/// Create a router for trainer APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_trainers).post(create_trainer))
        .route("/hours", get(get_trainer_hours))
        .route("/:id", get(get_trainer).put(update_trainer).delete(delete_trainer))
}

pub async fn list_trainers(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ActiveOnlyQuery>,
) -> Result<impl IntoResponse, ApiError> {
    info!("GET /api/trainers - active_only: {}", query.active_only);
    let trainers = state.trainer_service.list_trainers(query.active_only).await?;
    Ok(Json(TrainerMapper::to_list_dto(trainers)))
}

pub async fn get_trainer(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(trainer_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    info!("GET /api/trainers/{}", trainer_id);
    let trainer = state.trainer_service.get_trainer(&trainer_id).await?;
    Ok(Json(TrainerMapper::to_dto(trainer)))
}

pub async fn create_trainer(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateTrainerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("POST /api/trainers - request: {:?}", request);
    let command = TrainerMapper::to_create_command(request);
    let trainer = state.trainer_service.create_trainer(&auth.actor(), command).await?;
    Ok((StatusCode::CREATED, Json(TrainerMapper::to_dto(trainer))))
}

pub async fn update_trainer(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(trainer_id): Path<String>,
    Json(request): Json<UpdateTrainerRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("PUT /api/trainers/{} - request: {:?}", trainer_id, request);
    let command = TrainerMapper::to_update_command(request);
    let trainer = state
        .trainer_service
        .update_trainer(&auth.actor(), &trainer_id, command)
        .await?;
    Ok(Json(TrainerMapper::to_dto(trainer)))
}

pub async fn delete_trainer(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(trainer_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    info!("DELETE /api/trainers/{}", trainer_id);
    state.trainer_service.delete_trainer(&auth.actor(), &trainer_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_trainer_hours(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<HoursQuery>,
) -> Result<impl IntoResponse, ApiError> {
    info!("GET /api/trainers/hours - query: {:?}", query);
    let (Some(start), Some(end)) = (query.start.as_deref(), query.end.as_deref()) else {
        return Err(ApiError::bad_request("Both start and end are required"));
    };
    let query = TrainerHoursQuery {
        start: parse_date("start", start)?,
        end: parse_date("end", end)?,
    };
    let trainers = state.trainer_service.hours_summary(query.clone()).await?;
    Ok(Json(TrainerHoursResponse {
        start: format_date(query.start),
        end: format_date(query.end),
        trainers,
    }))
}
