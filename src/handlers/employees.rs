use crate::{
    errors::ServiceError,
    handlers::{
        common::{created_response, message_response, success_response},
        extract::{Json, Path, Query},
    },
    models::employee,
    services::employees::{CreateEmployeeRequest, EmployeeFilter, UpdateEmployeeRequest},
    AppState,
};
use axum::{
    extract::State,
    response::IntoResponse,
};
use serde_json::json;
use uuid::Uuid;

/// Employees, optionally filtered by status and shift
#[utoipa::path(
    get,
    path = "/api/employees",
    params(EmployeeFilter),
    responses(
        (status = 200, description = "Employees ordered by name", body = [employee::Model])
    ),
    security(("access_token" = [])),
    tag = "employees"
)]
pub async fn list_employees(
    State(state): State<AppState>,
    Query(filter): Query<EmployeeFilter>,
) -> Result<impl IntoResponse, ServiceError> {
    let employees = state.services.employees.list(filter).await?;
    Ok(success_response(employees))
}

#[utoipa::path(
    get,
    path = "/api/employees/{id}",
    params(("id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee", body = employee::Model),
        (status = 404, description = "Employee not found", body = crate::errors::ErrorResponse)
    ),
    security(("access_token" = [])),
    tag = "employees"
)]
pub async fn get_employee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    let employee = state.services.employees.get(id).await?;
    Ok(success_response(employee))
}

#[utoipa::path(
    post,
    path = "/api/employees",
    request_body = CreateEmployeeRequest,
    responses(
        (status = 201, description = "Employee created"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::errors::ErrorResponse)
    ),
    security(("access_token" = [])),
    tag = "employees"
)]
pub async fn create_employee(
    State(state): State<AppState>,
    Json(payload): Json<CreateEmployeeRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let employee = state.services.employees.create(payload).await?;
    Ok(created_response(json!({
        "message": "Employee created successfully",
        "employee": employee
    })))
}

#[utoipa::path(
    put,
    path = "/api/employees/{id}",
    params(("id" = Uuid, Path, description = "Employee ID")),
    request_body = UpdateEmployeeRequest,
    responses(
        (status = 200, description = "Employee updated"),
        (status = 400, description = "Invalid request", body = crate::errors::ErrorResponse),
        (status = 403, description = "Admin role required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Employee not found", body = crate::errors::ErrorResponse)
    ),
    security(("access_token" = [])),
    tag = "employees"
)]
pub async fn update_employee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEmployeeRequest>,
) -> Result<impl IntoResponse, ServiceError> {
    let employee = state.services.employees.update(id, payload).await?;
    Ok(success_response(json!({
        "message": "Employee updated successfully",
        "employee": employee
    })))
}

#[utoipa::path(
    delete,
    path = "/api/employees/{id}",
    params(("id" = Uuid, Path, description = "Employee ID")),
    responses(
        (status = 200, description = "Employee deleted"),
        (status = 403, description = "Admin role required", body = crate::errors::ErrorResponse),
        (status = 404, description = "Employee not found", body = crate::errors::ErrorResponse)
    ),
    security(("access_token" = [])),
    tag = "employees"
)]
pub async fn delete_employee(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, ServiceError> {
    state.services.employees.delete(id).await?;
    Ok(message_response("Employee deleted successfully"))
}
