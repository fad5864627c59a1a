//! # REST API for Training Types

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use log::info;
use shared::{CreateTrainingTypeRequest, UpdateTrainingTypeRequest};

use crate::io::rest::auth::AuthUser;
use crate::io::rest::error::ApiError;
use crate::io::rest::mappers::training_type_mapper::TrainingTypeMapper;
use crate::AppState;

/// Create a router for training type APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_training_types).post(create_training_type))
        .route(
            "/:id",
            get(get_training_type)
                .put(update_training_type)
                .delete(delete_training_type),
        )
}

pub async fn list_training_types(
    State(state): State<AppState>,
    _auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    info!("GET /api/training-types");
    let types = state.training_type_service.list_training_types().await?;
    Ok(Json(TrainingTypeMapper::to_list_dto(types)))
}

pub async fn get_training_type(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(type_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    info!("GET /api/training-types/{}", type_id);
    let training_type = state.training_type_service.get_training_type(&type_id).await?;
    Ok(Json(TrainingTypeMapper::to_dto(training_type)))
}

pub async fn create_training_type(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateTrainingTypeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("POST /api/training-types - request: {:?}", request);
    let command = TrainingTypeMapper::to_create_command(request);
    let training_type = state
        .training_type_service
        .create_training_type(&auth.actor(), command)
        .await?;
    Ok((StatusCode::CREATED, Json(TrainingTypeMapper::to_dto(training_type))))
}

pub async fn update_training_type(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(type_id): Path<String>,
    Json(request): Json<UpdateTrainingTypeRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("PUT /api/training-types/{} - request: {:?}", type_id, request);
    let command = TrainingTypeMapper::to_update_command(request);
    let training_type = state
        .training_type_service
        .update_training_type(&auth.actor(), &type_id, command)
        .await?;
    Ok(Json(TrainingTypeMapper::to_dto(training_type)))
}

pub async fn delete_training_type(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(type_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    info!("DELETE /api/training-types/{}", type_id);
    state
        .training_type_service
        .delete_training_type(&auth.actor(), &type_id)
        .await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::io::rest::test_support::TestApp;
    use axum::http::StatusCode;
    use serde_json::json;

    #[tokio::test]
    async fn test_training_type_rules() {
        let app = TestApp::new().await;
        let token = app.admin_token.clone();
        let anna = app.create_trainer("Anna", 20.0).await;
        let youth = app.create_training_type("Youth", Some(&anna)).await;

        let (_, fetched) = app.get(&format!("/api/training-types/{}", youth), &token).await;
        assert_eq!(fetched["color"], "#3366ff");
        assert_eq!(fetched["default_trainer_id"], anna.as_str());

        let (status, _) = app
            .post(
                "/api/training-types",
                &token,
                json!({ "name": "youth", "color": "#000000", "default_trainer_id": null, "default_hours": 1.0, "description": null }),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = app
            .put(&format!("/api/training-types/{}", youth), &token, json!({ "color": "blue" }))
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, cleared) = app
            .put(
                &format!("/api/training-types/{}", youth),
                &token,
                json!({ "default_trainer_id": "" }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(cleared["default_trainer_id"].is_null());
    }

    #[tokio::test]
    async fn test_type_used_by_a_series_cannot_be_deleted() {
        let app = TestApp::new().await;
        let token = app.admin_token.clone();
        let youth = app.create_training_type("Youth", None).await;
        let (status, _) = app
            .post(
                "/api/series",
                &token,
                json!({ "training_type_id": youth, "weekdays": [2], "start_date": "2025-09-01", "end_date": "2025-09-30" }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = app.delete(&format!("/api/training-types/{}", youth), &token).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert!(body["error"].as_str().unwrap().contains("still used"));
    }
}
