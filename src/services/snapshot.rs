use crate::{
    db::DbPool,
    errors::ServiceError,
    events::{Event, EventSender},
    models::{employee, expense, fuel_transaction, inventory_item, pump, PumpStatus},
    services::{
        inventory::InventoryItemView,
        pump_ledger::{PumpLedgerService, PumpWithTransactions},
    },
};
use chrono::{DateTime, Utc};
use sea_orm::{sea_query::Expr, ColumnTrait, EntityTrait, QueryFilter, QueryOrder, TransactionTrait};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{instrument, warn};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct GasStationState {
    pub pumps: Vec<PumpWithTransactions>,
    pub total_liters_dispensed: f64,
    pub total_revenue: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct InventoryState {
    pub items: Vec<InventoryItemView>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct ExpenseState {
    pub expenses: Vec<expense::Model>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct EmployeeState {
    pub employees: Vec<employee::Model>,
}

/// Everything the station persists, keyed by domain.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StationSnapshot {
    pub gas_station_state: GasStationState,
    pub inventory_state: InventoryState,
    pub expense_state: ExpenseState,
    pub employee_state: EmployeeState,
    pub exported_at: DateTime<Utc>,
}

/// Row counts removed by a reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ResetSummary {
    pub transactions_deleted: u64,
    pub pumps_reset: u64,
    pub inventory_items_deleted: u64,
    pub expenses_deleted: u64,
    pub employees_deleted: u64,
}

/// Whole-station export and reset
#[derive(Clone)]
pub struct SnapshotService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
    pumps: Arc<PumpLedgerService>,
}

impl SnapshotService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender, pumps: Arc<PumpLedgerService>) -> Self {
        Self {
            db_pool,
            event_sender,
            pumps,
        }
    }

    #[instrument(skip(self))]
    pub async fn export(&self) -> Result<StationSnapshot, ServiceError> {
        let db = self.db_pool.as_ref();

        let pumps = pump::Entity::find()
            .order_by_asc(pump::Column::Name)
            .all(db)
            .await?;
        let transactions = fuel_transaction::Entity::find()
            .order_by_asc(fuel_transaction::Column::Sequence)
            .all(db)
            .await?;

        let total_liters_dispensed = transactions.iter().map(|t| t.liters_dispensed).sum();
        let total_revenue = transactions.iter().map(|t| t.revenue).sum();

        let mut by_pump: HashMap<Uuid, Vec<fuel_transaction::Model>> = HashMap::new();
        for tx in transactions {
            by_pump.entry(tx.pump_id).or_default().push(tx);
        }
        let pumps = pumps
            .into_iter()
            .map(|pump| {
                let transactions = by_pump.remove(&pump.id).unwrap_or_default();
                PumpWithTransactions { pump, transactions }
            })
            .collect();

        let items = inventory_item::Entity::find()
            .order_by_asc(inventory_item::Column::Name)
            .all(db)
            .await?
            .into_iter()
            .map(InventoryItemView::from)
            .collect();
        let expenses = expense::Entity::find()
            .order_by_desc(expense::Column::Date)
            .all(db)
            .await?;
        let employees = employee::Entity::find()
            .order_by_asc(employee::Column::Name)
            .all(db)
            .await?;

        Ok(StationSnapshot {
            gas_station_state: GasStationState {
                pumps,
                total_liters_dispensed,
                total_revenue,
            },
            inventory_state: InventoryState { items },
            expense_state: ExpenseState { expenses },
            employee_state: EmployeeState { employees },
            exported_at: Utc::now(),
        })
    }

    /// Clears operational data in one transaction. Pumps keep their name,
    /// fuel type and price but return to index 0/0; users are untouched.
    /// Holds every pump's ledger lock until the reset commits.
    #[instrument(skip(self))]
    pub async fn reset(&self) -> Result<ResetSummary, ServiceError> {
        let freeze = self.pumps.lock_all_pumps().await?;
        let pump_ids = freeze.pump_ids().to_vec();
        let now = Utc::now();
        let txn = self.db_pool.begin().await?;

        let transactions = fuel_transaction::Entity::delete_many()
            .filter(fuel_transaction::Column::PumpId.is_in(pump_ids.clone()))
            .exec(&txn)
            .await?;
        let pumps = pump::Entity::update_many()
            .col_expr(pump::Column::CurrentIndex, Expr::value(0i64))
            .col_expr(pump::Column::PreviousIndex, Expr::value(0i64))
            .col_expr(pump::Column::Status, Expr::value(PumpStatus::Available))
            .col_expr(pump::Column::UpdatedAt, Expr::value(now))
            .filter(pump::Column::Id.is_in(pump_ids))
            .exec(&txn)
            .await?;
        let items = inventory_item::Entity::delete_many().exec(&txn).await?;
        let expenses = expense::Entity::delete_many().exec(&txn).await?;
        let employees = employee::Entity::delete_many().exec(&txn).await?;

        txn.commit().await?;
        drop(freeze);

        let summary = ResetSummary {
            transactions_deleted: transactions.rows_affected,
            pumps_reset: pumps.rows_affected,
            inventory_items_deleted: items.rows_affected,
            expenses_deleted: expenses.rows_affected,
            employees_deleted: employees.rows_affected,
        };
        warn!(?summary, "station data reset");
        self.event_sender.emit(Event::StationReset { at: now });
        Ok(summary)
    }
}
