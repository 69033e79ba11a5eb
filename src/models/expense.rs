use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
    ToSchema,
    strum::Display,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum ExpenseCategory {
    #[sea_orm(string_value = "fuel")]
    Fuel,
    #[sea_orm(string_value = "oil")]
    Oil,
    #[sea_orm(string_value = "filter")]
    Filter,
    #[sea_orm(string_value = "salary")]
    Salary,
    #[sea_orm(string_value = "maintenance")]
    Maintenance,
    #[sea_orm(string_value = "other")]
    Other,
}

impl ExpenseCategory {
    /// Label printed in exported reports.
    pub fn label_fr(&self) -> &'static str {
        match self {
            ExpenseCategory::Fuel => "Carburant",
            ExpenseCategory::Oil => "Huile",
            ExpenseCategory::Filter => "Filtre",
            ExpenseCategory::Salary => "Salaire",
            ExpenseCategory::Maintenance => "Maintenance",
            ExpenseCategory::Other => "Autre",
        }
    }
}

/// The `expenses` table. Expenses are dated, not timestamped.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "expenses")]
#[serde(rename_all = "camelCase")]
#[schema(as = Expense)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub date: NaiveDate,
    pub category: ExpenseCategory,
    pub description: String,
    pub amount: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

impl ActiveModelBehavior for ActiveModel {}
