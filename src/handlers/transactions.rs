use crate::{
    errors::ServiceError,
    handlers::{
        common::{created_response, success_response},
        extract::{Json, Path, Query},
    },
    models::fuel_transaction,
    services::{
        pump_ledger::{DeletedTransaction, EditTransactionRequest, RecordReadingRequest, TransactionFilter},
        reports::{ReportQuery, SalesReport},
    },
    AppState,
};
use axum::{
    extract::State,
    response::IntoResponse,
};
use serde::Deserialize;
use serde_json::json;
use utoipa::IntoParams;
use uuid::Uuid;

#[derive(Debug, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct DeleteTransactionParams {
    /// When given, the transaction must belong to this pump.
    pub pump_id: Option<Uuid>,
}

/// Record a meter reading; the transaction is derived from the index delta
#[utoipa::path(
    post,
    path = "/api/transactions",
    request_body = RecordReadingRequest,
    responses(
        (status = 201, description = "Transaction created"),
        (status = 400, description = "Index not above the pump's current index", body = crate::errors::ErrorResponse),
        (status = 404, description = "Pump not found", body = crate::errors::ErrorResponse)
    ),
    security(("access_token" = [])),
    tag = "transactions"
)]
pub async fn record_reading(
    State(state): State<AppState>,
    Json(payload): Json<RecordReadingRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let transaction = state.services.pumps.record_reading(payload).await?;
    Ok(created_response(json!({
        "message": "Transaction created successfully",
        "transaction": transaction
    })))
}

/// List transactions, newest first
#[utoipa::path(
    get,
    path = "/api/transactions",
    params(TransactionFilter),
    responses(
        (status = 200, description = "Transactions", body = [fuel_transaction::Model]),
        (status = 400, description = "Invalid date range", body = crate::errors::ErrorResponse)
    ),
    security(("access_token" = [])),
    tag = "transactions"
)]
pub async fn list_transactions(
    State(state): State<AppState>,
    Query(filter): Query<TransactionFilter>,
) -> Result<impl IntoResponse, ServiceError> {
    let transactions = state.services.pumps.list_transactions(filter).await?;
    Ok(success_response(transactions))
}

/// Sales report over a date range and shift
#[utoipa::path(
    get,
    path = "/api/transactions/report",
    params(ReportQuery),
    responses(
        (status = 200, description = "Sales report", body = SalesReport),
        (status = 400, description = "Invalid date range", body = crate::errors::ErrorResponse)
    ),
    security(("access_token" = [])),
    tag = "transactions"
)]
pub async fn sales_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<impl IntoResponse, ServiceError> {
    let report = state.services.reports.sales_report(&query).await?;
    Ok(success_response(report))
}

#[utoipa::path(
    get,
    path = "/api/transactions/{id}",
    params(("id" = Uuid, Path, description = "Transaction ID")),
    responses(
        (status = 200, description = "Transaction", body = fuel_transaction::Model),
        (status = 404, description = "Transaction not found", body = crate::errors::ErrorResponse)
    ),
    security(("access_token" = [])),
    tag = "transactions"
)]
pub async fn get_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let transaction = state.services.pumps.get_transaction(id).await?;
    Ok(success_response(transaction))
}

/// Correct a transaction's closing index
#[utoipa::path(
    put,
    path = "/api/transactions/{id}",
    params(("id" = Uuid, Path, description = "Transaction ID")),
    request_body = EditTransactionRequest,
    responses(
        (status = 200, description = "Transaction updated"),
        (status = 400, description = "Index breaks the meter chain", body = crate::errors::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Transaction not found", body = crate::errors::ErrorResponse)
    ),
    security(("access_token" = [])),
    tag = "transactions"
)]
pub async fn edit_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<EditTransactionRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let transaction = state.services.pumps.edit_transaction(id, payload).await?;
    Ok(success_response(json!({
        "message": "Transaction updated successfully",
        "transaction": transaction
    })))
}

/// Delete a transaction; removing the latest one rolls the pump back
#[utoipa::path(
    delete,
    path = "/api/transactions/{id}",
    params(("id" = Uuid, Path, description = "Transaction ID"), DeleteTransactionParams),
    responses(
        (status = 200, description = "Transaction deleted", body = DeletedTransaction),
        (status = 403, description = "Admin role required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Transaction not found", body = crate::errors::ErrorResponse)
    ),
    security(("access_token" = [])),
    tag = "transactions"
)]
pub async fn delete_transaction(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(params): Query<DeleteTransactionParams>,
) -> Result<impl IntoResponse, ServiceError> {
    let deleted = state
        .services
        .pumps
        .delete_transaction(id, params.pump_id)
        .await?;
    Ok(success_response(json!({
        "message": "Transaction deleted successfully",
        "transactionId": deleted.transaction_id,
        "wasMostRecent": deleted.was_most_recent,
        "pump": deleted.pump
    })))
}
