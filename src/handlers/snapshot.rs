use crate::{
    errors::ServiceError,
    handlers::common::success_response,
    services::snapshot::{ResetSummary, StationSnapshot},
    AppState,
};
use axum::{extract::State, response::IntoResponse};
use serde_json::json;

/// Export every persisted record, keyed by domain
#[utoipa::path(
    get,
    path = "/api/state",
    responses(
        (status = 200, description = "Station snapshot", body = StationSnapshot),
        (status = 403, description = "Admin role required", body = crate::errors::ErrorResponse)
    ),
    security(("access_token" = [])),
    tag = "state"
)]
pub async fn export_state(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let snapshot = state.services.snapshot.export().await?;
    Ok(success_response(snapshot))
}

/// Clear transactions, inventory, expenses and staff; pumps return to 0/0
#[utoipa::path(
    delete,
    path = "/api/state",
    responses(
        (status = 200, description = "Operational data cleared", body = ResetSummary),
        (status = 403, description = "Super admin role required", body = crate::errors::ErrorResponse)
    ),
    security(("access_token" = [])),
    tag = "state"
)]
pub async fn reset_state(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let summary = state.services.snapshot.reset().await?;
    Ok(success_response(json!({
        "message": "Station data reset successfully",
        "summary": summary
    })))
}
