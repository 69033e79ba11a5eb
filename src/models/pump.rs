use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Operational state of a dispenser.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
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
pub enum PumpStatus {
    #[sea_orm(string_value = "available")]
    Available,
    #[sea_orm(string_value = "in_use")]
    InUse,
    #[sea_orm(string_value = "maintenance")]
    Maintenance,
}

/// The `pumps` table.
///
/// `current_index` is the cumulative meter reading and only moves through the
/// pump ledger; `previous_index` is the reading before the last transaction.
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize, ToSchema)]
#[sea_orm(table_name = "pumps")]
#[serde(rename_all = "camelCase")]
#[schema(as = Pump)]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub name: String,
    pub fuel_type: String,
    pub status: PumpStatus,
    pub current_index: i64,
    pub previous_index: i64,
    pub price_per_liter: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// A pump owns its transactions; deleting it cascades.
    #[sea_orm(has_many = "super::fuel_transaction::Entity")]
    FuelTransactions,
}

impl Related<super::fuel_transaction::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::FuelTransactions.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl Model {
    /// `current >= previous >= 0`
    pub fn indices_consistent(&self) -> bool {
        self.current_index >= self.previous_index && self.previous_index >= 0
    }
}
