use crate::{
    db::DbPool,
    errors::ServiceError,
    models::employee::{self, EmployeeShift, EmployeeStatus, Entity as EmployeeEntity},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

fn validate_salary(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new("salary_must_be_non_negative"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateEmployeeRequest {
    #[validate(length(min = 1, max = 255, message = "Employee name is required"))]
    pub name: String,
    pub shift: EmployeeShift,
    #[validate(custom = "validate_salary")]
    pub salary: f64,
    #[validate(length(min = 1, max = 100, message = "Position is required"))]
    pub position: String,
    pub hire_date: NaiveDate,
    pub status: Option<EmployeeStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateEmployeeRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    pub shift: Option<EmployeeShift>,
    #[validate(custom = "validate_salary")]
    pub salary: Option<f64>,
    #[validate(length(min = 1, max = 100))]
    pub position: Option<String>,
    pub hire_date: Option<NaiveDate>,
    pub status: Option<EmployeeStatus>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct EmployeeFilter {
    pub status: Option<EmployeeStatus>,
    pub shift: Option<EmployeeShift>,
}

/// Staff registry.
#[derive(Clone)]
pub struct EmployeeService {
    db_pool: Arc<DbPool>,
}

impl EmployeeService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    #[instrument(skip(self))]
    pub async fn list(&self, filter: EmployeeFilter) -> Result<Vec<employee::Model>, ServiceError> {
        let mut query = EmployeeEntity::find();
        if let Some(status) = filter.status {
            query = query.filter(employee::Column::Status.eq(status));
        }
        if let Some(shift) = filter.shift {
            query = query.filter(employee::Column::Shift.eq(shift));
        }
        Ok(query
            .order_by_asc(employee::Column::Name)
            .all(self.db_pool.as_ref())
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get(&self, employee_id: Uuid) -> Result<employee::Model, ServiceError> {
        EmployeeEntity::find_by_id(employee_id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::not_found("Employee", employee_id))
    }

    #[instrument(skip(self))]
    pub async fn create(&self, request: CreateEmployeeRequest) -> Result<employee::Model, ServiceError> {
        request.validate()?;
        let created = employee::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            shift: Set(request.shift),
            salary: Set(request.salary),
            position: Set(request.position.trim().to_string()),
            hire_date: Set(request.hire_date),
            status: Set(request.status.unwrap_or(EmployeeStatus::Active)),
            created_at: Set(Utc::now()),
        }
        .insert(self.db_pool.as_ref())
        .await?;

        info!(employee_id = %created.id, "employee added");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        employee_id: Uuid,
        request: UpdateEmployeeRequest,
    ) -> Result<employee::Model, ServiceError> {
        request.validate()?;
        let mut active: employee::ActiveModel = self.get(employee_id).await?.into();
        if let Some(name) = request.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(shift) = request.shift {
            active.shift = Set(shift);
        }
        if let Some(salary) = request.salary {
            active.salary = Set(salary);
        }
        if let Some(position) = request.position {
            active.position = Set(position.trim().to_string());
        }
        if let Some(hire_date) = request.hire_date {
            active.hire_date = Set(hire_date);
        }
        if let Some(status) = request.status {
            active.status = Set(status);
        }
        Ok(active.update(self.db_pool.as_ref()).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, employee_id: Uuid) -> Result<(), ServiceError> {
        let result = EmployeeEntity::delete_by_id(employee_id)
            .exec(self.db_pool.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Employee", employee_id));
        }
        info!(employee_id = %employee_id, "employee removed");
        Ok(())
    }
}
