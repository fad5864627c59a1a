//! # REST API for User Accounts
//!
//! Administrator-only management of login accounts.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::get,
    Router,
};
use log::info;
use shared::{CreateUserRequest, UpdateUserRequest};

use crate::io::rest::auth::AuthUser;
use crate::io::rest::error::ApiError;
use crate::io::rest::mappers::user_mapper::UserMapper;
use crate::AppState;

/// Create a router for user APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_users).post(create_user))
        .route("/:id", get(get_user).put(update_user).delete(delete_user))
}

pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<impl IntoResponse, ApiError> {
    info!("GET /api/users");
    let users = state.user_service.list_users(&auth.actor()).await?;
    Ok(Json(UserMapper::to_list_dto(users)))
}

pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    info!("GET /api/users/{}", user_id);
    let actor = auth.actor();
    if actor.user_id != user_id {
        actor.require_admin()?;
    }
    let user = state.user_service.get_user(&user_id).await?;
    Ok(Json(UserMapper::to_dto(user)))
}

pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<CreateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("POST /api/users - username: {}, role: {:?}", request.username, request.role);
    let command = UserMapper::to_create_command(request);
    let user = state.user_service.create_user(&auth.actor(), command).await?;
    Ok((StatusCode::CREATED, Json(UserMapper::to_dto(user))))
}

pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
    Json(request): Json<UpdateUserRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("PUT /api/users/{} - role: {:?}", user_id, request.role);
    let command = UserMapper::to_update_command(request);
    let user = state
        .user_service
        .update_user(&auth.actor(), &user_id, command)
        .await?;
    Ok(Json(UserMapper::to_dto(user)))
}

pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    info!("DELETE /api/users/{}", user_id);
    state.user_service.delete_user(&auth.actor(), &user_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::io::rest::test_support::TestApp;
    use axum::http::StatusCode;
    use serde_json::json;
    use shared::Role;

    #[tokio::test]
    async fn test_admin_manages_users() {
        let app = TestApp::new().await;
        let token = app.admin_token.clone();
        let trainer_id = app.create_trainer("Anna", 20.0).await;

        let (status, created) = app
            .post(
                "/api/users",
                &token,
                json!({ "username": "anna", "password": "password123", "role": "trainer", "trainer_id": trainer_id }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", created);
        assert_eq!(created["role"], "trainer");
        assert!(created.get("password_hash").is_none());
        let user_id = created["id"].as_str().unwrap().to_string();

        let (status, _) = app
            .post(
                "/api/users",
                &token,
                json!({ "username": "Anna", "password": "password123", "role": "user", "trainer_id": null }),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, updated) = app
            .put(&format!("/api/users/{}", user_id), &token, json!({ "trainer_id": "" }))
            .await;
        assert_eq!(status, StatusCode::OK);
        assert!(updated["trainer_id"].is_null());

        let (_, list) = app.get("/api/users", &token).await;
        assert_eq!(list["users"].as_array().unwrap().len(), 2);

        let (status, _) = app.delete(&format!("/api/users/{}", user_id), &token).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn test_last_admin_and_self_delete_are_conflicts() {
        let app = TestApp::new().await;
        let token = app.admin_token.clone();
        let admin_id = app.admin.id.clone();

        let (status, _) = app.delete(&format!("/api/users/{}", admin_id), &token).await;
        assert_eq!(status, StatusCode::CONFLICT);

        let (status, _) = app
            .put(&format!("/api/users/{}", admin_id), &token, json!({ "role": "user" }))
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn test_plain_users_cannot_manage_accounts() {
        let app = TestApp::new().await;
        let member = app.login_as("member", Role::User, None).await;

        let (status, _) = app.get("/api/users", &member).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        let (status, _) = app
            .get(&format!("/api/users/{}", app.admin.id), &member)
            .await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }
}
