use crate::{
    errors::ServiceError,
    handlers::{
        common::{created_response, message_response, success_response},
        extract::{Json, Path, Query},
    },
    models::expense,
    services::expenses::{CreateExpenseRequest, ExpenseFilter, ExpenseList, UpdateExpenseRequest},
    AppState,
};
use axum::{
    extract::State,
    response::IntoResponse,
};
use serde_json::json;
use uuid::Uuid;

/// Expenses in a date range with their total
#[utoipa::path(
    get,
    path = "/api/expenses",
    params(ExpenseFilter),
    responses(
        (status = 200, description = "Expenses and their total", body = ExpenseList),
        (status = 400, description = "Invalid date range", body = crate::errors::ErrorResponse)
    ),
    security(("access_token" = [])),
    tag = "expenses"
)]
pub async fn list_expenses(
    State(state): State<AppState>,
    Query(filter): Query<ExpenseFilter>,
) -> Result<impl IntoResponse, ServiceError> {
    let list = state.services.expenses.list(filter).await?;
    Ok(success_response(list))
}

#[utoipa::path(
    get,
    path = "/api/expenses/{id}",
    params(("id" = Uuid, Path, description = "Expense ID")),
    responses(
        (status = 200, description = "Expense", body = expense::Model),
        (status = 404, description = "Expense not found", body = crate::errors::ErrorResponse)
    ),
    security(("access_token" = [])),
    tag = "expenses"
)]
pub async fn get_expense(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let expense = state.services.expenses.get(id).await?;
    Ok(success_response(expense))
}

#[utoipa::path(
    post,
    path = "/api/expenses",
    request_body = CreateExpenseRequest,
    responses(
        (status = 201, description = "Expense recorded"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::errors::ErrorResponse)
    ),
    security(("access_token" = [])),
    tag = "expenses"
)]
pub async fn create_expense(
    State(state): State<AppState>,
    Json(payload): Json<CreateExpenseRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let expense = state.services.expenses.create(payload).await?;
    Ok(created_response(json!({
        "message": "Expense created successfully",
        "expense": expense
    })))
}

#[utoipa::path(
    put,
    path = "/api/expenses/{id}",
    params(("id" = Uuid, Path, description = "Expense ID")),
    request_body = UpdateExpenseRequest,
    responses(
        (status = 200, description = "Expense updated"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Expense not found", body = crate::errors::ErrorResponse)
    ),
    security(("access_token" = [])),
    tag = "expenses"
)]
pub async fn update_expense(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateExpenseRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let expense = state.services.expenses.update(id, payload).await?;
    Ok(success_response(json!({
        "message": "Expense updated successfully",
        "expense": expense
    })))
}

#[utoipa::path(
    delete,
    path = "/api/expenses/{id}",
    params(("id" = Uuid, Path, description = "Expense ID")),
    responses(
        (status = 200, description = "Expense deleted"),
        (status = 403, description = "Admin role required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Expense not found", body = crate::errors::ErrorResponse)
    ),
    security(("access_token" = [])),
    tag = "expenses"
)]
pub async fn delete_expense(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.expenses.delete(id).await?;
    Ok(message_response("Expense deleted successfully"))
}
