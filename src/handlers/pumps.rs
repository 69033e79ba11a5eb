use crate::{
    errors::ServiceError,
    handlers::{
        common::{created_response, message_response, success_response},
        extract::{Json, Path},
    },
    models::pump,
    services::pump_ledger::{
        CreatePumpRequest, PumpWithTransactions, SetNameRequest, SetPriceRequest,
        UpdatePumpRequest,
    },
    AppState,
};
use axum::{
    extract::State,
    response::IntoResponse,
};
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

/// List pumps ordered by name
#[utoipa::path(
    get,
    path = "/api/pumps",
    responses(
        (status = 200, description = "Pumps", body = [pump::Model]),
        (status = 401, description = "Invalid or expired token", body = crate::errors::ErrorResponse),
        (status = 403, description = "No token provided", body = crate::errors::ErrorResponse)
    ),
    security(("access_token" = [])),
    tag = "pumps"
)]
pub async fn list_pumps(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let pumps = state.services.pumps.list_pumps().await?;
    Ok(success_response(pumps))
}

/// Get a pump with its transactions in meter order
#[utoipa::path(
    get,
    path = "/api/pumps/{id}",
    params(("id" = Uuid, Path, description = "Pump ID")),
    responses(
        (status = 200, description = "Pump and its transactions", body = PumpWithTransactions),
        (status = 404, description = "Pump not found", body = crate::errors::ErrorResponse)
    ),
    security(("access_token" = [])),
    tag = "pumps"
)]
pub async fn get_pump(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let pump = state.services.pumps.get_pump(id).await?;
    Ok(success_response(pump))
}

/// Create a pump
#[utoipa::path(
    post,
    path = "/api/pumps",
    request_body = CreatePumpRequest,
    responses(
        (status = 201, description = "Pump created"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::errors::ErrorResponse)
    ),
    security(("access_token" = [])),
    tag = "pumps"
)]
pub async fn create_pump(
    State(state): State<AppState>,
    Json(payload): Json<CreatePumpRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let pump = state.services.pumps.create_pump(payload).await?;
    Ok(created_response(json!({
        "message": "Pump created successfully",
        "pump": pump
    })))
}

/// Update a pump's name, fuel type, price or status
#[utoipa::path(
    put,
    path = "/api/pumps/{id}",
    params(("id" = Uuid, Path, description = "Pump ID")),
    request_body = UpdatePumpRequest,
    responses(
        (status = 200, description = "Pump updated"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Pump not found", body = crate::errors::ErrorResponse)
    ),
    security(("access_token" = [])),
    tag = "pumps"
)]
pub async fn update_pump(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdatePumpRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let pump = state.services.pumps.update_pump(id, payload).await?;
    Ok(success_response(json!({
        "message": "Pump updated successfully",
        "pump": pump
    })))
}

/// Delete a pump and its transactions
#[utoipa::path(
    delete,
    path = "/api/pumps/{id}",
    params(("id" = Uuid, Path, description = "Pump ID")),
    responses(
        (status = 200, description = "Pump deleted"),
        (status = 403, description = "Admin role required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Pump not found", body = crate::errors::ErrorResponse)
    ),
    security(("access_token" = [])),
    tag = "pumps"
)]
pub async fn delete_pump(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.pumps.delete_pump(id).await?;
    Ok(message_response("Pump deleted successfully"))
}

/// Set the price applied to future readings
#[utoipa::path(
    patch,
    path = "/api/pumps/{id}/price",
    params(("id" = Uuid, Path, description = "Pump ID")),
    request_body = SetPriceRequest,
    responses(
        (status = 200, description = "Price updated"),
        (status = 400, description = "Price must be positive", body = crate::errors::ErrorResponse),
        (status = 404, description = "Pump not found", body = crate::errors::ErrorResponse)
    ),
    security(("access_token" = [])),
    tag = "pumps"
)]
pub async fn set_price(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetPriceRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    let pump = state
        .services
        .pumps
        .set_price(id, payload.price_per_liter)
        .await?;
    Ok(success_response(json!({
        "message": "Pump price updated successfully",
        "pump": pump
    })))
}

/// Rename a pump
#[utoipa::path(
    patch,
    path = "/api/pumps/{id}/name",
    params(("id" = Uuid, Path, description = "Pump ID")),
    request_body = SetNameRequest,
    responses(
        (status = 200, description = "Name updated"),
        (status = 400, description = "Name is required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Pump not found", body = crate::errors::ErrorResponse)
    ),
    security(("access_token" = [])),
    tag = "pumps"
)]
pub async fn set_name(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<SetNameRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    let pump = state.services.pumps.set_name(id, payload.name).await?;
    Ok(success_response(json!({
        "message": "Pump name updated successfully",
        "pump": pump
    })))
}
