//! Gas Station API Library
//!
//! Pumps and their meter ledger, shop inventory, expenses, staff and sales
//! reports for a single fuel station, served over axum.
#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]
#![allow(elided_lifetimes_in_paths)]
#![warn(clippy::all, clippy::perf, clippy::dbg_macro)]

// Core modules
pub mod auth;
pub mod config;
pub mod db;
pub mod errors;
pub mod events;
pub mod handlers;
pub mod health;
pub mod middleware_helpers;
pub mod migrator;
pub mod models;
pub mod openapi;
pub mod reports;
pub mod services;
pub mod tracing;

use axum::{
    routing::{get, patch, post, put},
    Extension, Router,
};
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use crate::auth::{AuthRouterExt, AuthService, Role};
use crate::services::factory::{ServiceContainer, ServiceFactory};

// App state definition
#[derive(Clone)]
pub struct AppState {
    pub db: Arc<DatabaseConnection>,
    pub config: config::AppConfig,
    pub event_sender: events::EventSender,
    pub auth: Arc<AuthService>,
    pub services: ServiceContainer,
}

impl AppState {
    /// Wires the auth service and every domain service around one pool.
    pub fn new(
        db: Arc<DatabaseConnection>,
        config: config::AppConfig,
        event_sender: events::EventSender,
    ) -> Self {
        let auth = Arc::new(AuthService::new((&config).into(), db.clone()));
        let factory = ServiceFactory::from_config(db.clone(), event_sender.clone(), &config);
        Self {
            services: ServiceContainer::new(&factory),
            db,
            config,
            event_sender,
            auth,
        }
    }
}

/// Everything under `/api`, with token and role gates applied per group.
pub fn api_routes() -> Router<AppState> {
    let auth_public = Router::new()
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login));

    // Any authenticated staff member
    let staff = Router::new()
        .route("/auth/me", get(handlers::auth::me))
        .route("/pumps", get(handlers::pumps::list_pumps))
        .route("/pumps/:id", get(handlers::pumps::get_pump))
        .route(
            "/transactions",
            get(handlers::transactions::list_transactions)
                .post(handlers::transactions::record_reading),
        )
        .route(
            "/transactions/report",
            get(handlers::transactions::sales_report),
        )
        .route(
            "/transactions/:id",
            get(handlers::transactions::get_transaction),
        )
        .route("/inventory", get(handlers::inventory::list_inventory))
        .route("/inventory/low-stock", get(handlers::inventory::low_stock))
        .route("/inventory/sales", post(handlers::inventory::record_sales))
        .route(
            "/inventory/:id",
            get(handlers::inventory::get_inventory_item),
        )
        .route("/inventory/:id/sale", post(handlers::inventory::record_sale))
        .route("/expenses", get(handlers::expenses::list_expenses))
        .route("/expenses/:id", get(handlers::expenses::get_expense))
        .route("/employees", get(handlers::employees::list_employees))
        .route("/employees/:id", get(handlers::employees::get_employee))
        .route("/reports/sales", get(handlers::reports::sales_report))
        .route("/reports/daily", get(handlers::reports::daily_report))
        .with_auth();

    let admin = Router::new()
        .route("/pumps", post(handlers::pumps::create_pump))
        .route(
            "/pumps/:id",
            put(handlers::pumps::update_pump).delete(handlers::pumps::delete_pump),
        )
        .route("/pumps/:id/price", patch(handlers::pumps::set_price))
        .route("/pumps/:id/name", patch(handlers::pumps::set_name))
        .route(
            "/transactions/:id",
            put(handlers::transactions::edit_transaction)
                .delete(handlers::transactions::delete_transaction),
        )
        .route(
            "/inventory",
            post(handlers::inventory::create_inventory_item),
        )
        .route(
            "/inventory/:id",
            put(handlers::inventory::update_inventory_item)
                .delete(handlers::inventory::delete_inventory_item),
        )
        .route("/inventory/:id/restock", post(handlers::inventory::restock))
        .route("/expenses", post(handlers::expenses::create_expense))
        .route(
            "/expenses/:id",
            put(handlers::expenses::update_expense).delete(handlers::expenses::delete_expense),
        )
        .route("/employees", post(handlers::employees::create_employee))
        .route(
            "/employees/:id",
            put(handlers::employees::update_employee)
                .delete(handlers::employees::delete_employee),
        )
        .route("/state", get(handlers::snapshot::export_state))
        .with_role(Role::Admin);

    let super_admin = Router::new()
        .route("/state", axum::routing::delete(handlers::snapshot::reset_state))
        .with_role(Role::SuperAdmin);

    Router::new()
        .merge(auth_public)
        .merge(staff)
        .merge(admin)
        .merge(super_admin)
}

/// Full application router: API, health, docs, request ids and HTTP tracing.
///
/// CORS and request timeouts are added by the server binary.
pub fn app(state: AppState) -> Router {
    let auth_service = state.auth.clone();
    let db = state.db.clone();

    Router::new()
        .nest("/api", api_routes())
        .with_state(state)
        .merge(health::health_routes(db))
        .merge(openapi::swagger_ui())
        .layer(Extension(auth_service))
        .layer(crate::tracing::configure_http_tracing())
        .layer(axum::middleware::from_fn(
            middleware_helpers::request_id_middleware,
        ))
}
