//! Router harness for the REST tests.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use shared::Role;
use tower::util::ServiceExt; // for `oneshot`

use crate::config::Config;
use crate::domain::commands::users::CreateUserCommand;
use crate::domain::dates::parse_date;
use crate::domain::models::{Actor, User};
use crate::domain::CalendarService;
use crate::storage::json::test_utils::TestEnvironment;
use crate::{create_router, AppState};

pub const ADMIN_PASSWORD: &str = "changeme123";

pub struct TestApp {
    pub env: TestEnvironment,
    pub state: AppState,
    pub admin: User,
    pub admin_token: String,
}

impl TestApp {
    /// Fresh store with one administrator; the calendar's today is 2025-06-13
    pub async fn new() -> Self {
        let env = TestEnvironment::new().await.unwrap();
        let data_file = env.data_file.display().to_string();
        let config = Config::from_lookup(|key| match key {
            "CLUB_DATA_FILE" => Some(data_file.clone()),
            "CLUB_JWT_SECRET" => Some("test-secret".to_string()),
            "CLUB_BCRYPT_COST" => Some("4".to_string()),
            _ => None,
        })
        .unwrap();
        let today = parse_date("2025-06-13").unwrap();
        let state = AppState::with_calendar(
            env.connection.clone(),
            config,
            CalendarService::with_today(today),
        );
        let admin = state
            .user_service
            .ensure_bootstrap_admin("admin", ADMIN_PASSWORD)
            .await
            .unwrap()
            .unwrap();
        let admin_token = state.auth_service.issue_token(&admin).unwrap();
        Self {
            env,
            state,
            admin,
            admin_token,
        }
    }

    pub fn admin_actor(&self) -> Actor {
        self.admin.actor()
    }

    pub fn router(&self) -> Router {
        create_router(self.state.clone())
    }

    /// Create an account and return a token for it
    pub async fn login_as(&self, username: &str, role: Role, trainer_id: Option<&str>) -> String {
        let user = self
            .state
            .user_service
            .create_user(
                &self.admin_actor(),
                CreateUserCommand {
                    username: username.to_string(),
                    password: "password123".to_string(),
                    role,
                    trainer_id: trainer_id.map(str::to_string),
                },
            )
            .await
            .unwrap();
        self.state.auth_service.issue_token(&user).unwrap()
    }

    /// Send a request through the full router. Empty bodies come back as
    /// `Value::Null` and non-JSON bodies as a string.
    pub async fn send(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)
                .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(&bytes).to_string()))
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.send(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.send(Method::DELETE, uri, Some(token), None).await
    }

    /// Create a trainer through the API and return its id
    pub async fn create_trainer(&self, name: &str, hourly_rate: f64) -> String {
        let (status, body) = self
            .post(
                "/api/trainers",
                &self.admin_token,
                serde_json::json!({ "name": name, "email": null, "phone": null, "hourly_rate": hourly_rate }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["id"].as_str().unwrap().to_string()
    }

    /// Create a training type through the API and return its id
    pub async fn create_training_type(&self, name: &str, default_trainer_id: Option<&str>) -> String {
        let (status, body) = self
            .post(
                "/api/training-types",
                &self.admin_token,
                serde_json::json!({
                    "name": name,
                    "color": "#3366FF",
                    "default_trainer_id": default_trainer_id,
                    "default_hours": 1.5,
                    "description": null
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED, "{}", body);
        body["id"].as_str().unwrap().to_string()
    }
}
