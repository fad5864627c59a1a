//! # REST API Interface Layer
//!
//! JSON endpoints under `/api`. Each `*_apis` module exposes a `router()`
//! that is nested under its resource path. Every route except login and
//! health requires an authenticated user (see [`auth::AuthUser`]).
//!
//! Handlers log their route at `info!`, convert wire DTOs with the
//! `mappers`, call one domain service and map failures through
//! [`error::ApiError`].

pub mod activity_apis;
pub mod auth;
pub mod auth_apis;
pub mod budget_apis;
pub mod calendar_apis;
pub mod error;
pub mod health_apis;
pub mod mappers;
pub mod package_apis;
pub mod series_apis;
pub mod trainer_apis;
pub mod training_type_apis;
pub mod user_apis;

#[cfg(test)]
pub mod test_support;

use axum::{routing::get, Router};

use crate::AppState;

pub use auth::AuthUser;
pub use error::ApiError;

/// All API routes, to be nested under `/api`
pub fn api_router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth_apis::router())
        .nest("/users", user_apis::router())
        .nest("/activities", activity_apis::router())
        .nest("/series", series_apis::router())
        .nest("/calendar", calendar_apis::router())
        .nest("/trainers", trainer_apis::router())
        .nest("/training-types", training_type_apis::router())
        .nest("/packages", package_apis::router())
        .nest("/budget", budget_apis::router())
        .route("/health", get(health_apis::health))
}
