//! # REST API for Training Packages

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use log::info;
use shared::{CreatePackageRequest, UpdatePackageRequest};

use crate::io::rest::auth::AuthUser;
use crate::io::rest::error::ApiError;
use crate::io::rest::mappers::package_mapper::PackageMapper;
use crate::io::rest::trainer_apis::ActiveOnlyQuery;
use crate::AppState;

/// Create a router for package APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_packages).post(create_package))
        .route("/:id", get(get_package).put(update_package).delete(delete_package))
}

pub async fn list_packages(
    State(state): State<AppState>,
    _auth: AuthUser,
    Query(query): Query<ActiveOnlyQuery>,
) -> Result<impl IntoResponse, ApiError> {
    info!("GET /api/packages - active_only: {}", query.active_only);
    let packages = state.package_service.list_packages(query.active_only).await?;
    Ok(Json(PackageMapper::to_list_dto(packages)))
}

pub async fn get_package(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(package_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    info!("GET /api/packages/{}", package_id);
    let package = state.package_service.get_package(&package_id).await?;
    Ok(Json(PackageMapper::to_dto(package)))
}

pub async fn create_package(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreatePackageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("POST /api/packages - request: {:?}", request);
    let command = PackageMapper::to_create_command(request);
    let package = state.package_service.create_package(&auth.actor(), command).await?;
    Ok((StatusCode::CREATED, Json(PackageMapper::to_dto(package))))
}

pub async fn update_package(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(package_id): Path<String>,
    Json(request): Json<UpdatePackageRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("PUT /api/packages/{} - request: {:?}", package_id, request);
    let command = PackageMapper::to_update_command(request);
    let package = state
        .package_service
        .update_package(&auth.actor(), &package_id, command)
        .await?;
    Ok(Json(PackageMapper::to_dto(package)))
}

pub async fn delete_package(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(package_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    info!("DELETE /api/packages/{}", package_id);
    state.package_service.delete_package(&auth.actor(), &package_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
