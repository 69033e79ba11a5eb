use crate::{
    errors::ServiceError,
    handlers::{
        common::{created_response, message_response, success_response},
        extract::{Json, Path, Query},
    },
    services::inventory::{
        BatchSaleRequest, CreateInventoryItemRequest, InventoryFilter, InventoryItemView,
        QuantityRequest, UpdateInventoryItemRequest,
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

/// List inventory items, optionally by category
#[utoipa::path(
    get,
    path = "/api/inventory",
    params(InventoryFilter),
    responses(
        (status = 200, description = "Inventory items", body = [InventoryItemView]),
        (status = 401, description = "Invalid or expired token", body = crate::errors::ErrorResponse),
        (status = 403, description = "No token provided", body = crate::errors::ErrorResponse)
    ),
    security(("access_token" = [])),
    tag = "inventory"
)]
pub async fn list_inventory(
    State(state): State<AppState>,
    Query(filter): Query<InventoryFilter>,
) -> Result<impl IntoResponse, ServiceError> {
    let items = state.services.inventory.list(filter).await?;
    Ok(success_response(items))
}

/// Items at or below their low-stock threshold
#[utoipa::path(
    get,
    path = "/api/inventory/low-stock",
    responses(
        (status = 200, description = "Low-stock items, emptiest first", body = [InventoryItemView])
    ),
    security(("access_token" = [])),
    tag = "inventory"
)]
pub async fn low_stock(State(state): State<AppState>) -> Result<impl IntoResponse, ServiceError> {
    let items = state.services.inventory.list_low_stock().await?;
    Ok(success_response(items))
}

#[utoipa::path(
    get,
    path = "/api/inventory/{id}",
    params(("id" = Uuid, Path, description = "Inventory item ID")),
    responses(
        (status = 200, description = "Inventory item", body = InventoryItemView),
        (status = 404, description = "Inventory item not found", body = crate::errors::ErrorResponse)
    ),
    security(("access_token" = [])),
    tag = "inventory"
)]
pub async fn get_inventory_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let item = state.services.inventory.get(id).await?;
    Ok(success_response(item))
}

#[utoipa::path(
    post,
    path = "/api/inventory",
    request_body = CreateInventoryItemRequest,
    responses(
        (status = 201, description = "Inventory item created"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::errors::ErrorResponse)
    ),
    security(("access_token" = [])),
    tag = "inventory"
)]
pub async fn create_inventory_item(
    State(state): State<AppState>,
    Json(payload): Json<CreateInventoryItemRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let item = state.services.inventory.create(payload).await?;
    Ok(created_response(json!({
        "message": "Inventory item created successfully",
        "item": item
    })))
}

#[utoipa::path(
    put,
    path = "/api/inventory/{id}",
    params(("id" = Uuid, Path, description = "Inventory item ID")),
    request_body = UpdateInventoryItemRequest,
    responses(
        (status = 200, description = "Inventory item updated"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Inventory item not found", body = crate::errors::ErrorResponse)
    ),
    security(("access_token" = [])),
    tag = "inventory"
)]
pub async fn update_inventory_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateInventoryItemRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let item = state.services.inventory.update(id, payload).await?;
    Ok(success_response(json!({
        "message": "Inventory item updated successfully",
        "item": item
    })))
}

#[utoipa::path(
    delete,
    path = "/api/inventory/{id}",
    params(("id" = Uuid, Path, description = "Inventory item ID")),
    responses(
        (status = 200, description = "Inventory item deleted"),
        (status = 403, description = "Admin role required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Inventory item not found", body = crate::errors::ErrorResponse)
    ),
    security(("access_token" = [])),
    tag = "inventory"
)]
pub async fn delete_inventory_item(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.inventory.delete(id).await?;
    Ok(message_response("Inventory item deleted successfully"))
}

/// Sell units of one item
#[utoipa::path(
    post,
    path = "/api/inventory/{id}/sale",
    params(("id" = Uuid, Path, description = "Inventory item ID")),
    request_body = QuantityRequest,
    responses(
        (status = 200, description = "Sale recorded"),
        (status = 400, description = "Quantity must be at least 1", body = crate::errors::ErrorResponse),
        (status = 404, description = "Inventory item not found", body = crate::errors::ErrorResponse),
        (status = 422, description = "Not enough stock", body = crate::errors::ErrorResponse)
    ),
    security(("access_token" = [])),
    tag = "inventory"
)]
pub async fn record_sale(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<QuantityRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    let item = state
        .services
        .inventory
        .record_sale(id, payload.quantity)
        .await?;
    Ok(success_response(json!({
        "message": "Sale recorded successfully",
        "item": item
    })))
}

/// Sell several items at once; nothing is applied if any line fails
#[utoipa::path(
    post,
    path = "/api/inventory/sales",
    request_body = BatchSaleRequest,
    responses(
        (status = 200, description = "Sales recorded"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 404, description = "Inventory item not found", body = crate::errors::ErrorResponse),
        (status = 422, description = "Not enough stock", body = crate::errors::ErrorResponse)
    ),
    security(("access_token" = [])),
    tag = "inventory"
)]
pub async fn record_sales(
    State(state): State<AppState>,
    Json(payload): Json<BatchSaleRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let items = state.services.inventory.record_sales(payload).await?;
    Ok(success_response(json!({
        "message": "Sales recorded successfully",
        "items": items
    })))
}

#[utoipa::path(
    post,
    path = "/api/inventory/{id}/restock",
    params(("id" = Uuid, Path, description = "Inventory item ID")),
    request_body = QuantityRequest,
    responses(
        (status = 200, description = "Stock increased"),
        (status = 400, description = "Quantity must be at least 1", body = crate::errors::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Inventory item not found", body = crate::errors::ErrorResponse)
    ),
    security(("access_token" = [])),
    tag = "inventory"
)]
pub async fn restock(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<QuantityRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    payload.validate()?;
    let item = state
        .services
        .inventory
        .restock(id, payload.quantity)
        .await?;
    Ok(success_response(json!({
        "message": "Inventory item restocked successfully",
        "item": item
    })))
}
