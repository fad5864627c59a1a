//! # REST API for Activities
//!
//! Single activities and the trainer conflict listing. Create and update
//! answer with the stored activity and the conflicts it takes part in.

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use log::{info, warn};
use serde::Deserialize;
use shared::{CreateActivityRequest, UpdateActivityRequest};

use crate::domain::commands::activities::{ActivityQuery, ConflictQuery};
use crate::io::rest::auth::AuthUser;
use crate::io::rest::error::ApiError;
use crate::io::rest::mappers::activity_mapper::ActivityMapper;
use crate::io::rest::mappers::{parse_date, parse_optional_date};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ActivityListQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    pub trainer_id: Option<String>,
    pub training_type_id: Option<String>,
}

impl ActivityListQuery {
    fn to_query(&self) -> Result<ActivityQuery, ApiError> {
        Ok(ActivityQuery {
            start: parse_optional_date("start", self.start.as_deref())?,
            end: parse_optional_date("end", self.end.as_deref())?,
            trainer_id: non_blank(&self.trainer_id),
            training_type_id: non_blank(&self.training_type_id),
        })
    }
}

#[derive(Debug, Deserialize)]
pub struct ConflictListQuery {
    pub start: Option<String>,
    pub end: Option<String>,
    pub trainer_id: Option<String>,
}

/// Create a router for activity APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_activities).post(create_activity))
        .route("/conflicts", get(list_conflicts))
        .route(
            "/:id",
            get(get_activity).put(update_activity).delete(delete_activity),
        )
}

pub(crate) fn non_blank(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

pub async fn list_activities(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ActivityListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    info!("GET /api/activities - query: {:?}", query);
    let activities = state.activity_service.list_activities(&query.to_query()?).await?;
    Ok(Json(ActivityMapper::to_list_dto(activities)))
}

pub async fn get_activity(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(activity_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    info!("GET /api/activities/{}", activity_id);
    let activity = state.activity_service.get_activity(&activity_id).await?;
    Ok(Json(ActivityMapper::to_view(activity)))
}

pub async fn create_activity(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateActivityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("POST /api/activities - request: {:?}", request);
    let command = ActivityMapper::to_create_command(request)?;
    let result = state
        .activity_service
        .create_activity(&auth.actor(), command)
        .await?;
    if !result.conflicts.is_empty() {
        warn!(
            "Activity {} created with {} conflicts",
            result.activity.activity.id,
            result.conflicts.len()
        );
    }
    Ok((StatusCode::CREATED, Json(ActivityMapper::to_response(result))))
}

pub async fn update_activity(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(activity_id): Path<String>,
    Json(request): Json<UpdateActivityRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("PUT /api/activities/{} - request: {:?}", activity_id, request);
    let command = ActivityMapper::to_update_command(request)?;
    let result = state
        .activity_service
        .update_activity(&auth.actor(), &activity_id, command)
        .await?;
    Ok(Json(ActivityMapper::to_response(result)))
}

pub async fn delete_activity(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(activity_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    info!("DELETE /api/activities/{}", activity_id);
    state
        .activity_service
        .delete_activity(&auth.actor(), &activity_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn list_conflicts(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ConflictListQuery>,
) -> Result<impl IntoResponse, ApiError> {
    info!("GET /api/activities/conflicts - query: {:?}", query);
    let (Some(start), Some(end)) = (query.start.as_deref(), query.end.as_deref()) else {
        return Err(ApiError::bad_request("Both start and end are required"));
    };
    let query = ConflictQuery {
        start: parse_date("start", start)?,
        end: parse_date("end", end)?,
        trainer_id: non_blank(&query.trainer_id),
    };
    let conflicts = state.activity_service.list_conflicts(&query).await?;
    Ok(Json(ActivityMapper::to_conflict_list_dto(conflicts)))
}
