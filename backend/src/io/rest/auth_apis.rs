//! # REST API for Authentication
//!
//! Login sets the JWT as an HttpOnly cookie and also returns it in the body.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json},
    routing::{get, post, put},
    Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use log::info;
use shared::{ChangePasswordRequest, LoginRequest, LoginResponse};

use crate::domain::commands::users::ChangePasswordCommand;
use crate::io::rest::auth::{AuthUser, TOKEN_COOKIE};
use crate::io::rest::error::ApiError;
use crate::io::rest::mappers::user_mapper::UserMapper;
use crate::AppState;

/// Create a router for authentication APIs
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/me", get(me))
        .route("/password", put(change_password))
}

pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("POST /api/auth/login - username: {}", request.username);

    let (user, token) = state
        .auth_service
        .login(&request.username, &request.password)
        .await?;
    let max_age = time::Duration::seconds(state.auth_service.token_ttl().num_seconds());
    let cookie = Cookie::build((TOKEN_COOKIE, token.clone()))
        .http_only(true)
        .same_site(SameSite::Lax)
        .path("/")
        .max_age(max_age);

    let response = LoginResponse {
        user: UserMapper::to_dto(user),
        token,
    };
    Ok((jar.add(cookie), Json(response)))
}

pub async fn logout(auth: AuthUser, jar: CookieJar) -> impl IntoResponse {
    info!("POST /api/auth/logout - user: {}", auth.0.username);
    let jar = jar.remove(Cookie::build((TOKEN_COOKIE, "")).path("/"));
    (jar, StatusCode::NO_CONTENT)
}

pub async fn me(auth: AuthUser) -> impl IntoResponse {
    info!("GET /api/auth/me - user: {}", auth.0.username);
    Json(UserMapper::to_dto(auth.0))
}

pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(request): Json<ChangePasswordRequest>,
) -> Result<impl IntoResponse, ApiError> {
    info!("PUT /api/auth/password - user: {}", auth.0.username);

    let command = ChangePasswordCommand {
        current_password: request.current_password,
        new_password: request.new_password,
    };
    state.user_service.change_password(&auth.actor(), command).await?;
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::io::rest::test_support::{TestApp, ADMIN_PASSWORD};
    use axum::{
        body::Body,
        http::{header, Method, Request, StatusCode},
    };
    use serde_json::json;
    use tower::util::ServiceExt; // for `oneshot`

    #[tokio::test]
    async fn test_login_sets_cookie_that_authenticates() {
        let app = TestApp::new().await;

        let request = Request::builder()
            .method(Method::POST)
            .uri("/api/auth/login")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({ "username": "ADMIN", "password": ADMIN_PASSWORD }).to_string(),
            ))
            .unwrap();
        let response = app.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let set_cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(set_cookie.starts_with("token="));
        assert!(set_cookie.contains("HttpOnly"));
        assert!(set_cookie.contains("SameSite=Lax"));

        let cookie = set_cookie.split(';').next().unwrap().to_string();
        let request = Request::builder()
            .uri("/api/auth/me")
            .header(header::COOKIE, cookie)
            .body(Body::empty())
            .unwrap();
        let response = app.router().oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let user: shared::User = serde_json::from_slice(&body).unwrap();
        assert_eq!(user.username, "admin");
        assert_eq!(user.role, shared::Role::Admin);
    }

    #[tokio::test]
    async fn test_wrong_password_and_missing_token_are_unauthorized() {
        let app = TestApp::new().await;

        let (status, body) = app
            .send(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "username": "admin", "password": "nope-nope" })),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert!(body["error"].is_string());

        let (status, _) = app.send(Method::GET, "/api/auth/me", None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        let (status, _) = app.get("/api/trainers", "garbage").await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_change_password() {
        let app = TestApp::new().await;
        let token = app.admin_token.clone();

        let (status, _) = app
            .put(
                "/api/auth/password",
                &token,
                json!({ "current_password": "wrong-password", "new_password": "another-one" }),
            )
            .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = app
            .put(
                "/api/auth/password",
                &token,
                json!({ "current_password": ADMIN_PASSWORD, "new_password": "another-one" }),
            )
            .await;
        assert_eq!(status, StatusCode::NO_CONTENT);

        let (status, _) = app
            .send(
                Method::POST,
                "/api/auth/login",
                None,
                Some(json!({ "username": "admin", "password": "another-one" })),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
    }
}
