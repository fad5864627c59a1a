//! # Club Planner Backend
//!
//! Scheduling and budgeting server for a sports club: activities and
//! recurring series on a calendar, trainer double-booking warnings, the
//! trainer / training type / package catalog, user accounts with roles and
//! a yearly budget.
//!
//! ## Architecture
//!
//! ```text
//! IO Layer (REST API, handlers, mappers)
//!     ↓
//! Domain Layer (business rules, services)
//!     ↓
//! Storage Layer (JSON document on disk)
//! ```
//!
//! `initialize_backend` opens the data file, wires the services into an
//! [`AppState`] and creates the first administrator when the store is empty.
//! `create_router` mounts the API under `/api` and optionally serves a
//! built frontend.

pub mod config;
pub mod domain;
pub mod io;
pub mod storage;

use std::sync::Arc;

use anyhow::Result;
use axum::{
    http::{header, HeaderValue, Method},
    Router,
};
use log::{info, warn};
use tower_http::cors::CorsLayer;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

pub use config::Config;
use domain::{
    ActivityService, AuthService, BudgetService, CalendarService, PackageService, TrainerService,
    TrainingTypeService, UserService,
};
use storage::JsonConnection;

/// Services shared by all request handlers
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub activity_service: ActivityService,
    pub calendar_service: CalendarService,
    pub trainer_service: TrainerService,
    pub training_type_service: TrainingTypeService,
    pub package_service: PackageService,
    pub budget_service: BudgetService,
}

impl AppState {
    pub fn new(connection: JsonConnection, config: Config) -> Self {
        Self::with_calendar(connection, config, CalendarService::new())
    }

    /// State with a specific calendar, e.g. one pinned to a fixed date
    pub fn with_calendar(connection: JsonConnection, config: Config, calendar_service: CalendarService) -> Self {
        let auth_service = AuthService::new(
            connection.clone(),
            config.jwt_secret.as_bytes(),
            config.token_ttl_hours,
        );
        Self {
            auth_service,
            user_service: UserService::new(connection.clone(), config.bcrypt_cost),
            activity_service: ActivityService::new(connection.clone()),
            calendar_service,
            trainer_service: TrainerService::new(connection.clone()),
            training_type_service: TrainingTypeService::new(connection.clone()),
            package_service: PackageService::new(connection.clone()),
            budget_service: BudgetService::new(connection),
            config: Arc::new(config),
        }
    }
}

/// Open the store and build the application state
pub async fn initialize_backend(config: Config) -> Result<AppState> {
    info!("Opening data file {}", config.data_file.display());
    let connection = JsonConnection::open(&config.data_file).await?;

    info!("Setting up domain services");
    let state = AppState::new(connection, config);

    let admin = state
        .user_service
        .ensure_bootstrap_admin(&state.config.admin_username, &state.config.admin_password)
        .await?;
    if let Some(admin) = admin {
        info!("Bootstrap administrator {} is ready", admin.username);
    }

    Ok(state)
}

/// Create the Axum router with all routes configured
pub fn create_router(state: AppState) -> Router {
    let mut cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true);
    match state.config.cors_origin.parse::<HeaderValue>() {
        Ok(origin) => cors = cors.allow_origin(origin),
        Err(e) => warn!("Ignoring invalid CORS origin {:?}: {}", state.config.cors_origin, e),
    }

    let mut router = Router::new().nest("/api", io::rest::api_router());
    if let Some(static_dir) = &state.config.static_dir {
        info!("Serving frontend from {}", static_dir.display());
        let index = ServeFile::new(static_dir.join("index.html"));
        router = router.fallback_service(ServeDir::new(static_dir).fallback(index));
    }

    router
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
