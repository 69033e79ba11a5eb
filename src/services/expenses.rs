use crate::{
    db::DbPool,
    errors::ServiceError,
    models::expense::{self, Entity as ExpenseEntity, ExpenseCategory},
};
use chrono::{NaiveDate, Utc};
use sea_orm::{
    sea_query::{Expr, Func},
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, Set,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

fn validate_amount(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new("amount_must_be_non_negative"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct CreateExpenseRequest {
    pub date: NaiveDate,
    pub category: ExpenseCategory,
    #[validate(length(min = 1, max = 500, message = "Description is required"))]
    pub description: String,
    #[validate(custom = "validate_amount")]
    pub amount: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
pub struct UpdateExpenseRequest {
    pub date: Option<NaiveDate>,
    pub category: Option<ExpenseCategory>,
    #[validate(length(min = 1, max = 500))]
    pub description: Option<String>,
    #[validate(custom = "validate_amount")]
    pub amount: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct ExpenseFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub category: Option<ExpenseCategory>,
    /// Case-insensitive substring of the description.
    pub search: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExpenseList {
    pub expenses: Vec<expense::Model>,
    pub total: f64,
}

/// Expense book: dated station costs.
#[derive(Clone)]
pub struct ExpenseService {
    db_pool: Arc<DbPool>,
}

impl ExpenseService {
    pub fn new(db_pool: Arc<DbPool>) -> Self {
        Self { db_pool }
    }

    /// Expenses whose date lies in the inclusive range, newest first.
    #[instrument(skip(self))]
    pub async fn list(&self, filter: ExpenseFilter) -> Result<ExpenseList, ServiceError> {
        if let (Some(s), Some(e)) = (filter.start_date, filter.end_date) {
            if s > e {
                return Err(ServiceError::BadRequest(format!(
                    "startDate {} is after endDate {}",
                    s, e
                )));
            }
        }

        let mut query = ExpenseEntity::find();
        if let Some(start) = filter.start_date {
            query = query.filter(expense::Column::Date.gte(start));
        }
        if let Some(end) = filter.end_date {
            query = query.filter(expense::Column::Date.lte(end));
        }
        if let Some(category) = filter.category {
            query = query.filter(expense::Column::Category.eq(category));
        }
        if let Some(search) = filter.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
            let pattern = format!("%{}%", search.to_lowercase());
            query = query.filter(
                Expr::expr(Func::lower(Expr::col(expense::Column::Description))).like(pattern),
            );
        }

        let expenses = query
            .order_by_desc(expense::Column::Date)
            .order_by_desc(expense::Column::CreatedAt)
            .all(self.db_pool.as_ref())
            .await?;
        let total = expenses.iter().map(|e| e.amount).sum();
        Ok(ExpenseList { expenses, total })
    }

    #[instrument(skip(self))]
    pub async fn get(&self, expense_id: Uuid) -> Result<expense::Model, ServiceError> {
        ExpenseEntity::find_by_id(expense_id)
            .one(self.db_pool.as_ref())
            .await?
            .ok_or_else(|| ServiceError::not_found("Expense", expense_id))
    }

    #[instrument(skip(self))]
    pub async fn create(&self, request: CreateExpenseRequest) -> Result<expense::Model, ServiceError> {
        request.validate()?;
        let created = expense::ActiveModel {
            id: Set(Uuid::new_v4()),
            date: Set(request.date),
            category: Set(request.category),
            description: Set(request.description.trim().to_string()),
            amount: Set(request.amount),
            created_at: Set(Utc::now()),
        }
        .insert(self.db_pool.as_ref())
        .await?;

        info!(expense_id = %created.id, category = %created.category, amount = created.amount, "expense recorded");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        expense_id: Uuid,
        request: UpdateExpenseRequest,
    ) -> Result<expense::Model, ServiceError> {
        request.validate()?;
        let mut active: expense::ActiveModel = self.get(expense_id).await?.into();
        if let Some(date) = request.date {
            active.date = Set(date);
        }
        if let Some(category) = request.category {
            active.category = Set(category);
        }
        if let Some(description) = request.description {
            active.description = Set(description.trim().to_string());
        }
        if let Some(amount) = request.amount {
            active.amount = Set(amount);
        }
        Ok(active.update(self.db_pool.as_ref()).await?)
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, expense_id: Uuid) -> Result<(), ServiceError> {
        let result = ExpenseEntity::delete_by_id(expense_id)
            .exec(self.db_pool.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Expense", expense_id));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_amount_is_invalid() {
        let request = CreateExpenseRequest {
            date: NaiveDate::from_ymd_opt(2025, 4, 1).unwrap(),
            category: ExpenseCategory::Oil,
            description: "Vidange".into(),
            amount: -1.0,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn category_uses_snake_case_on_the_wire() {
        let parsed: CreateExpenseRequest = serde_json::from_value(serde_json::json!({
            "date": "2025-04-01",
            "category": "maintenance",
            "description": "Pompe 2",
            "amount": 120.5
        }))
        .unwrap();
        assert_eq!(parsed.category, ExpenseCategory::Maintenance);
        assert_eq!(parsed.category.label_fr(), "Maintenance");
    }
}
