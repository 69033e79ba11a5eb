#![allow(dead_code)]

use std::sync::Arc;

use axum::{
    body::{self, Body},
    http::{Method, Request},
    response::Response,
    Router,
};
use sea_orm::EntityTrait;
use serde_json::{json, Value};
use tempfile::TempDir;
use tower::ServiceExt;

use gas_station_api::{
    auth::{user, Role, ACCESS_TOKEN_HEADER},
    config::AppConfig,
    db,
    events::{self, EventSender},
    AppState,
};

pub const TEST_JWT_SECRET: &str =
    "Kq3v9ZtR2mXw7LpN4sYb8HcJ6dFgT1uVe5AoQiWrEyUxCzBnMlPkOjIhGfDsA0qw";
pub const TEST_PASSWORD: &str = "Station#2025";

/// Helper harness for spinning up the application against a throwaway SQLite file.
pub struct TestApp {
    router: Router,
    pub state: AppState,
    admin_token: String,
    super_admin_token: String,
    _db_dir: TempDir,
    _event_task: tokio::task::JoinHandle<()>,
}

impl TestApp {
    /// Construct a new test application with fresh database state.
    pub async fn new() -> Self {
        let db_dir = tempfile::tempdir().expect("create temp dir for test database");
        let db_path = db_dir.path().join("station.db");

        let mut cfg = AppConfig::new(
            format!("sqlite://{}?mode=rwc", db_path.display()),
            TEST_JWT_SECRET.to_string(),
            3600,
            "127.0.0.1".to_string(),
            18_080,
            "test".to_string(),
        );
        cfg.db_max_connections = 1;
        cfg.db_min_connections = 1;
        cfg.station_utc_offset_minutes = 60;

        let pool = db::establish_connection_from_app_config(&cfg)
            .await
            .expect("failed to create test database");
        db::run_migrations(&pool)
            .await
            .expect("failed to run migrations in tests");

        let (event_sender, event_rx) = EventSender::channel(256);
        let event_task = tokio::spawn(events::process_events(event_rx));

        let state = AppState::new(Arc::new(pool), cfg, event_sender);
        let router = gas_station_api::app(state.clone());

        let mut app = Self {
            router,
            state,
            admin_token: String::new(),
            super_admin_token: String::new(),
            _db_dir: db_dir,
            _event_task: event_task,
        };
        app.admin_token = app
            .create_user("Admin User", "admin@station.test", Role::Admin)
            .await;
        app.super_admin_token = app
            .create_user("Super Admin", "super@station.test", Role::SuperAdmin)
            .await;
        app
    }

    /// Creates an account directly and returns a freshly minted token for it.
    pub async fn create_user(&self, name: &str, email: &str, role: Role) -> String {
        let profile = self
            .state
            .auth
            .create_user(name, email, TEST_PASSWORD, role)
            .await
            .expect("create test user");
        let account = user::Entity::find_by_id(profile.id)
            .one(self.state.db.as_ref())
            .await
            .expect("load test user")
            .expect("test user exists");
        self.state
            .auth
            .generate_token(&account)
            .expect("mint test token")
    }

    pub fn admin_token(&self) -> &str {
        &self.admin_token
    }

    pub fn super_admin_token(&self) -> &str {
        &self.super_admin_token
    }

    /// Send a request against the router with an optional `x-access-token`.
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> Response {
        let mut builder = Request::builder().method(method).uri(uri);

        if let Some(tok) = token {
            builder = builder.header(ACCESS_TOKEN_HEADER, tok);
        }

        let body = if let Some(json) = body {
            builder = builder.header("content-type", "application/json");
            Body::from(serde_json::to_vec(&json).expect("failed to serialize json request body"))
        } else {
            Body::empty()
        };

        let request = builder.body(body).expect("failed to build request");
        self.router
            .clone()
            .oneshot(request)
            .await
            .expect("router error during test request")
    }

    /// Convenience helper for requests made as the station admin.
    pub async fn request_as_admin(&self, method: Method, uri: &str, body: Option<Value>) -> Response {
        self.request(method, uri, body, Some(self.admin_token())).await
    }

    /// Creates a pump through the API and returns its JSON.
    pub async fn create_pump(&self, name: &str, fuel_type: &str, price: f64, index: i64) -> Value {
        let response = self
            .request_as_admin(
                Method::POST,
                "/api/pumps",
                Some(json!({
                    "name": name,
                    "fuelType": fuel_type,
                    "pricePerLiter": price,
                    "currentIndex": index,
                    "previousIndex": index
                })),
            )
            .await;
        assert_eq!(response.status(), 201, "pump creation failed");
        response_json(response).await["pump"].clone()
    }

    /// Records a reading through the API and returns the transaction JSON.
    pub async fn record_reading(&self, pump_id: &str, index: i64, extra: Value) -> Value {
        let mut payload = json!({ "pumpId": pump_id, "currentIndex": index });
        if let (Some(target), Some(fields)) = (payload.as_object_mut(), extra.as_object()) {
            for (key, value) in fields {
                target.insert(key.clone(), value.clone());
            }
        }
        let response = self
            .request_as_admin(Method::POST, "/api/transactions", Some(payload))
            .await;
        assert_eq!(response.status(), 201, "reading was rejected");
        response_json(response).await["transaction"].clone()
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self._event_task.abort();
    }
}

pub async fn response_bytes(response: Response) -> Vec<u8> {
    body::to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body bytes")
        .to_vec()
}

pub async fn response_json(response: Response) -> Value {
    let bytes = response_bytes(response).await;
    serde_json::from_slice(&bytes).expect("json response")
}
