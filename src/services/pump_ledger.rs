//! Pump ledger: meter indices, fuel transactions derived from readings, and
//! edit/delete with recomputation of the pump's tail.
//!
//! Every mutation of a pump's indices holds that pump's async mutex and runs
//! inside one database transaction, so concurrent readings on the same pump
//! serialize and none is lost.

use crate::{
    db::DbPool,
    errors::ServiceError,
    events::{Event, EventSender},
    models::{
        fuel_transaction::{self, Shift},
        pump::{self, PumpStatus},
    },
    services::period::day_bounds,
};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use dashmap::DashMap;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter, QueryOrder, Set,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::{info, instrument, warn};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

pub const DEFAULT_PAYMENT_METHOD: &str = "cash";

/// Volume and revenue of one meter interval.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub previous_index: i64,
    pub current_index: i64,
    pub liters_dispensed: f64,
    pub revenue: f64,
}

impl Reading {
    fn between(previous_index: i64, current_index: i64, price_per_liter: f64) -> Self {
        let liters_dispensed = (current_index - previous_index) as f64;
        Self {
            previous_index,
            current_index,
            liters_dispensed,
            revenue: liters_dispensed * price_per_liter,
        }
    }
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("new index {new_index} must be greater than current index {current_index}")]
    NotAboveCurrent { current_index: i64, new_index: i64 },

    #[error("new index {new_index} must be greater than previous index {previous_index}")]
    NotAbovePrevious { previous_index: i64, new_index: i64 },

    #[error("new index {new_index} exceeds the starting index {next_previous} of the following transaction")]
    BreaksContinuity { next_previous: i64, new_index: i64 },
}

impl From<LedgerError> for ServiceError {
    fn from(err: LedgerError) -> Self {
        ServiceError::InvalidIndex(err.to_string())
    }
}

/// Interval for a new reading taken against the pump's current index.
pub fn derive_reading(
    pump_current: i64,
    price_per_liter: f64,
    new_index: i64,
) -> Result<Reading, LedgerError> {
    if new_index <= pump_current {
        return Err(LedgerError::NotAboveCurrent {
            current_index: pump_current,
            new_index,
        });
    }
    Ok(Reading::between(pump_current, new_index, price_per_liter))
}

/// Interval for an edited transaction; its start index and frozen price are kept.
pub fn rederive(
    previous_index: i64,
    price_per_liter: f64,
    new_current: i64,
) -> Result<Reading, LedgerError> {
    if new_current <= previous_index {
        return Err(LedgerError::NotAbovePrevious {
            previous_index,
            new_index: new_current,
        });
    }
    Ok(Reading::between(previous_index, new_current, price_per_liter))
}

pub(crate) fn validate_positive_price(price: f64) -> Result<(), ValidationError> {
    if price.is_finite() && price > 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new("price_must_be_positive"))
    }
}

fn validate_non_negative_index(index: i64) -> Result<(), ValidationError> {
    if index >= 0 {
        Ok(())
    } else {
        Err(ValidationError::new("index_must_be_non_negative"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreatePumpRequest {
    #[validate(length(min = 1, max = 100, message = "Pump name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 50, message = "Fuel type is required"))]
    pub fuel_type: String,
    #[validate(custom = "validate_positive_price")]
    pub price_per_liter: f64,
    #[validate(custom = "validate_non_negative_index")]
    pub current_index: Option<i64>,
    #[validate(custom = "validate_non_negative_index")]
    pub previous_index: Option<i64>,
    pub status: Option<PumpStatus>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePumpRequest {
    #[validate(length(min = 1, max = 100))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 50))]
    pub fuel_type: Option<String>,
    #[validate(custom = "validate_positive_price")]
    pub price_per_liter: Option<f64>,
    pub status: Option<PumpStatus>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SetPriceRequest {
    #[validate(custom = "validate_positive_price")]
    pub price_per_liter: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct SetNameRequest {
    #[validate(length(min = 1, max = 100, message = "Pump name is required"))]
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RecordReadingRequest {
    pub pump_id: Uuid,
    /// New cumulative meter index; must exceed the pump's current index.
    #[validate(custom = "validate_non_negative_index")]
    pub current_index: i64,
    pub shift: Option<Shift>,
    pub timestamp: Option<DateTime<Utc>>,
    #[validate(length(min = 1, max = 50))]
    pub payment_method: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct EditTransactionRequest {
    #[validate(custom = "validate_non_negative_index")]
    pub current_index: i64,
    /// When given, the transaction must belong to this pump.
    pub pump_id: Option<Uuid>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[serde(rename_all = "camelCase")]
#[into_params(parameter_in = Query)]
pub struct TransactionFilter {
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub pump_id: Option<Uuid>,
}

/// A pump together with its transactions in meter order.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PumpWithTransactions {
    #[serde(flatten)]
    pub pump: pump::Model,
    pub transactions: Vec<fuel_transaction::Model>,
}

/// Result of removing a transaction.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct DeletedTransaction {
    pub transaction_id: Uuid,
    pub was_most_recent: bool,
    pub pump: pump::Model,
}

/// Every listed pump's ledger lock, held until dropped. Indices of those
/// pumps cannot move while it is alive.
pub struct LedgerFreeze {
    pump_ids: Vec<Uuid>,
    _guards: Vec<OwnedMutexGuard<()>>,
}

impl LedgerFreeze {
    pub fn pump_ids(&self) -> &[Uuid] {
        &self.pump_ids
    }
}

/// Service for pumps and their fuel transactions
#[derive(Clone)]
pub struct PumpLedgerService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
    station_offset: FixedOffset,
    pump_locks: Arc<DashMap<Uuid, Arc<Mutex<()>>>>,
}

impl PumpLedgerService {
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender, station_offset: FixedOffset) -> Self {
        Self {
            db_pool,
            event_sender,
            station_offset,
            pump_locks: Arc::new(DashMap::new()),
        }
    }

    fn lock_for(&self, pump_id: Uuid) -> Arc<Mutex<()>> {
        self.pump_locks.entry(pump_id).or_default().clone()
    }

    /// Takes the ledger lock of an existing pump. Unknown ids never get an
    /// entry in the lock map, and a pump deleted while we waited drops its own.
    async fn lock_pump(&self, pump_id: Uuid) -> Result<OwnedMutexGuard<()>, ServiceError> {
        let db = self.db_pool.as_ref();
        Self::find_pump(db, pump_id).await?;
        let guard = self.lock_for(pump_id).lock_owned().await;
        if pump::Entity::find_by_id(pump_id).one(db).await?.is_none() {
            drop(guard);
            self.pump_locks.remove(&pump_id);
            return Err(ServiceError::not_found("Pump", pump_id));
        }
        Ok(guard)
    }

    /// Locks every pump's ledger in id order. Every other ledger operation
    /// holds at most one pump lock at a time.
    #[instrument(skip(self))]
    pub async fn lock_all_pumps(&self) -> Result<LedgerFreeze, ServiceError> {
        let db = self.db_pool.as_ref();
        let mut pump_ids: Vec<Uuid> = pump::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();
        pump_ids.sort();

        let mut guards = Vec::with_capacity(pump_ids.len());
        for pump_id in &pump_ids {
            guards.push(self.lock_for(*pump_id).lock_owned().await);
        }

        // Pumps deleted while we queued for their lock.
        let remaining: HashSet<Uuid> = pump::Entity::find()
            .all(db)
            .await?
            .into_iter()
            .map(|p| p.id)
            .collect();
        pump_ids.retain(|id| {
            let kept = remaining.contains(id);
            if !kept {
                self.pump_locks.remove(id);
            }
            kept
        });

        Ok(LedgerFreeze {
            pump_ids,
            _guards: guards,
        })
    }

    async fn find_pump<C: ConnectionTrait>(conn: &C, pump_id: Uuid) -> Result<pump::Model, ServiceError> {
        pump::Entity::find_by_id(pump_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Pump", pump_id))
    }

    async fn find_transaction<C: ConnectionTrait>(
        conn: &C,
        transaction_id: Uuid,
        expected_pump: Option<Uuid>,
    ) -> Result<fuel_transaction::Model, ServiceError> {
        fuel_transaction::Entity::find_by_id(transaction_id)
            .one(conn)
            .await?
            .filter(|tx| expected_pump.map_or(true, |p| tx.pump_id == p))
            .ok_or_else(|| ServiceError::not_found("Transaction", transaction_id))
    }

    /// Highest-sequence transaction of a pump.
    async fn tail<C: ConnectionTrait>(
        conn: &C,
        pump_id: Uuid,
    ) -> Result<Option<fuel_transaction::Model>, ServiceError> {
        Ok(fuel_transaction::Entity::find()
            .filter(fuel_transaction::Column::PumpId.eq(pump_id))
            .order_by_desc(fuel_transaction::Column::Sequence)
            .one(conn)
            .await?)
    }

    /// First transaction recorded after `sequence` on the same pump.
    async fn successor<C: ConnectionTrait>(
        conn: &C,
        pump_id: Uuid,
        sequence: i64,
    ) -> Result<Option<fuel_transaction::Model>, ServiceError> {
        Ok(fuel_transaction::Entity::find()
            .filter(fuel_transaction::Column::PumpId.eq(pump_id))
            .filter(fuel_transaction::Column::Sequence.gt(sequence))
            .order_by_asc(fuel_transaction::Column::Sequence)
            .one(conn)
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn create_pump(&self, request: CreatePumpRequest) -> Result<pump::Model, ServiceError> {
        request.validate()?;
        let current_index = request.current_index.unwrap_or(0);
        let previous_index = request.previous_index.unwrap_or(0);
        if current_index < previous_index {
            return Err(ServiceError::ValidationError(format!(
                "currentIndex {} must not be below previousIndex {}",
                current_index, previous_index
            )));
        }

        let now = Utc::now();
        let created = pump::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            fuel_type: Set(request.fuel_type.trim().to_string()),
            status: Set(request.status.unwrap_or(PumpStatus::Available)),
            current_index: Set(current_index),
            previous_index: Set(previous_index),
            price_per_liter: Set(request.price_per_liter),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(self.db_pool.as_ref())
        .await?;

        info!(pump_id = %created.id, name = %created.name, "pump created");
        Ok(created)
    }

    #[instrument(skip(self))]
    pub async fn list_pumps(&self) -> Result<Vec<pump::Model>, ServiceError> {
        Ok(pump::Entity::find()
            .order_by_asc(pump::Column::Name)
            .all(self.db_pool.as_ref())
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get_pump(&self, pump_id: Uuid) -> Result<PumpWithTransactions, ServiceError> {
        let db = self.db_pool.as_ref();
        let pump = Self::find_pump(db, pump_id).await?;
        let transactions = fuel_transaction::Entity::find()
            .filter(fuel_transaction::Column::PumpId.eq(pump_id))
            .order_by_asc(fuel_transaction::Column::Sequence)
            .all(db)
            .await?;
        Ok(PumpWithTransactions { pump, transactions })
    }

    /// Updates descriptive fields; indices only move through readings.
    #[instrument(skip(self))]
    pub async fn update_pump(
        &self,
        pump_id: Uuid,
        request: UpdatePumpRequest,
    ) -> Result<pump::Model, ServiceError> {
        request.validate()?;
        let _guard = self.lock_pump(pump_id).await?;

        let existing = Self::find_pump(self.db_pool.as_ref(), pump_id).await?;
        let old_price = existing.price_per_liter;
        let mut active: pump::ActiveModel = existing.into();
        if let Some(name) = request.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(fuel_type) = request.fuel_type {
            active.fuel_type = Set(fuel_type.trim().to_string());
        }
        if let Some(price) = request.price_per_liter {
            active.price_per_liter = Set(price);
        }
        if let Some(status) = request.status {
            active.status = Set(status);
        }
        active.updated_at = Set(Utc::now());
        let updated = active.update(self.db_pool.as_ref()).await?;

        if updated.price_per_liter != old_price {
            self.event_sender.emit(Event::PumpPriceChanged {
                pump_id,
                old_price,
                new_price: updated.price_per_liter,
            });
        }
        Ok(updated)
    }

    /// Changes the price applied to future readings; recorded sales keep theirs.
    #[instrument(skip(self))]
    pub async fn set_price(&self, pump_id: Uuid, price_per_liter: f64) -> Result<pump::Model, ServiceError> {
        self.update_pump(
            pump_id,
            UpdatePumpRequest {
                price_per_liter: Some(price_per_liter),
                ..Default::default()
            },
        )
        .await
    }

    #[instrument(skip(self))]
    pub async fn set_name(&self, pump_id: Uuid, name: String) -> Result<pump::Model, ServiceError> {
        self.update_pump(
            pump_id,
            UpdatePumpRequest {
                name: Some(name),
                ..Default::default()
            },
        )
        .await
    }

    /// Deletes the pump together with its transactions.
    #[instrument(skip(self))]
    pub async fn delete_pump(&self, pump_id: Uuid) -> Result<(), ServiceError> {
        let _guard = self.lock_pump(pump_id).await?;

        let txn = self.db_pool.begin().await?;
        Self::find_pump(&txn, pump_id).await?;
        let removed = fuel_transaction::Entity::delete_many()
            .filter(fuel_transaction::Column::PumpId.eq(pump_id))
            .exec(&txn)
            .await?;
        pump::Entity::delete_by_id(pump_id).exec(&txn).await?;
        txn.commit().await?;

        self.pump_locks.remove(&pump_id);
        info!(pump_id = %pump_id, transactions = removed.rows_affected, "pump deleted");
        Ok(())
    }

    /// Records a meter reading and the sale it implies.
    #[instrument(skip(self))]
    pub async fn record_reading(
        &self,
        request: RecordReadingRequest,
    ) -> Result<fuel_transaction::Model, ServiceError> {
        request.validate()?;
        let pump_id = request.pump_id;
        let _guard = self.lock_pump(pump_id).await?;

        let txn = self.db_pool.begin().await?;
        let pump = Self::find_pump(&txn, pump_id).await?;
        let reading = derive_reading(pump.current_index, pump.price_per_liter, request.current_index)
            .map_err(|e| {
                warn!(pump_id = %pump_id, error = %e, "reading rejected");
                e
            })?;

        let sequence = Self::tail(&txn, pump_id)
            .await?
            .map_or(1, |last| last.sequence + 1);
        let now = Utc::now();
        let timestamp = request.timestamp.unwrap_or(now);
        let shift = request
            .shift
            .unwrap_or_else(|| Shift::containing(timestamp, self.station_offset));
        let payment_method = request
            .payment_method
            .map(|m| m.trim().to_string())
            .unwrap_or_else(|| DEFAULT_PAYMENT_METHOD.to_string());

        let transaction = fuel_transaction::ActiveModel {
            id: Set(Uuid::new_v4()),
            pump_id: Set(pump_id),
            sequence: Set(sequence),
            previous_index: Set(reading.previous_index),
            current_index: Set(reading.current_index),
            liters_dispensed: Set(reading.liters_dispensed),
            price_per_liter: Set(pump.price_per_liter),
            revenue: Set(reading.revenue),
            fuel_type: Set(pump.fuel_type.clone()),
            shift: Set(shift),
            payment_method: Set(payment_method),
            timestamp: Set(timestamp),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(&txn)
        .await?;

        let mut active: pump::ActiveModel = pump.into();
        active.previous_index = Set(reading.previous_index);
        active.current_index = Set(reading.current_index);
        active.status = Set(PumpStatus::InUse);
        active.updated_at = Set(now);
        active.update(&txn).await?;

        txn.commit().await?;

        info!(
            pump_id = %pump_id,
            transaction_id = %transaction.id,
            liters = transaction.liters_dispensed,
            revenue = transaction.revenue,
            "reading recorded"
        );
        self.event_sender.emit(Event::ReadingRecorded {
            pump_id,
            transaction_id: transaction.id,
            previous_index: transaction.previous_index,
            current_index: transaction.current_index,
            liters: transaction.liters_dispensed,
            revenue: transaction.revenue,
        });
        Ok(transaction)
    }

    /// Corrects the closing index of a transaction and recomputes its sale.
    #[instrument(skip(self))]
    pub async fn edit_transaction(
        &self,
        transaction_id: Uuid,
        request: EditTransactionRequest,
    ) -> Result<fuel_transaction::Model, ServiceError> {
        request.validate()?;
        let located =
            Self::find_transaction(self.db_pool.as_ref(), transaction_id, request.pump_id).await?;
        let pump_id = located.pump_id;
        let _guard = self.lock_pump(pump_id).await?;

        let txn = self.db_pool.begin().await?;
        let existing = Self::find_transaction(&txn, transaction_id, Some(pump_id)).await?;
        let reading = rederive(
            existing.previous_index,
            existing.price_per_liter,
            request.current_index,
        )?;

        let successor = Self::successor(&txn, pump_id, existing.sequence).await?;
        if let Some(next) = &successor {
            if reading.current_index > next.previous_index {
                return Err(LedgerError::BreaksContinuity {
                    next_previous: next.previous_index,
                    new_index: reading.current_index,
                }
                .into());
            }
        }

        let old_current_index = existing.current_index;
        let now = Utc::now();
        let mut active: fuel_transaction::ActiveModel = existing.into();
        active.current_index = Set(reading.current_index);
        active.liters_dispensed = Set(reading.liters_dispensed);
        active.revenue = Set(reading.revenue);
        active.updated_at = Set(now);
        let updated = active.update(&txn).await?;

        if successor.is_none() {
            let pump = Self::find_pump(&txn, pump_id).await?;
            let mut pump_active: pump::ActiveModel = pump.into();
            pump_active.current_index = Set(reading.current_index);
            pump_active.updated_at = Set(now);
            pump_active.update(&txn).await?;
        }

        txn.commit().await?;

        info!(
            pump_id = %pump_id,
            transaction_id = %transaction_id,
            old_current_index,
            new_current_index = reading.current_index,
            "transaction edited"
        );
        self.event_sender.emit(Event::TransactionEdited {
            pump_id,
            transaction_id,
            old_current_index,
            new_current_index: reading.current_index,
        });
        Ok(updated)
    }

    /// Removes a transaction. Deleting the most recent one rolls the pump
    /// back to the new tail, or to 0/0 when none remain.
    #[instrument(skip(self))]
    pub async fn delete_transaction(
        &self,
        transaction_id: Uuid,
        expected_pump: Option<Uuid>,
    ) -> Result<DeletedTransaction, ServiceError> {
        let located =
            Self::find_transaction(self.db_pool.as_ref(), transaction_id, expected_pump).await?;
        let pump_id = located.pump_id;
        let _guard = self.lock_pump(pump_id).await?;

        let txn = self.db_pool.begin().await?;
        let existing = Self::find_transaction(&txn, transaction_id, Some(pump_id)).await?;
        let was_most_recent = Self::successor(&txn, pump_id, existing.sequence)
            .await?
            .is_none();

        fuel_transaction::Entity::delete_by_id(transaction_id)
            .exec(&txn)
            .await?;

        let mut pump = Self::find_pump(&txn, pump_id).await?;
        if was_most_recent {
            let (previous_index, current_index) = Self::tail(&txn, pump_id)
                .await?
                .map_or((0, 0), |tail| (tail.previous_index, tail.current_index));
            let mut active: pump::ActiveModel = pump.into();
            active.previous_index = Set(previous_index);
            active.current_index = Set(current_index);
            active.updated_at = Set(Utc::now());
            pump = active.update(&txn).await?;
        }

        txn.commit().await?;

        info!(
            pump_id = %pump_id,
            transaction_id = %transaction_id,
            was_most_recent,
            "transaction deleted"
        );
        self.event_sender.emit(Event::TransactionDeleted {
            pump_id,
            transaction_id,
            was_most_recent,
        });
        Ok(DeletedTransaction {
            transaction_id,
            was_most_recent,
            pump,
        })
    }

    #[instrument(skip(self))]
    pub async fn list_transactions(
        &self,
        filter: TransactionFilter,
    ) -> Result<Vec<fuel_transaction::Model>, ServiceError> {
        let range = day_bounds(filter.start_date, filter.end_date, self.station_offset)?;
        let mut query = fuel_transaction::Entity::find();
        if let Some(start) = range.start {
            query = query.filter(fuel_transaction::Column::Timestamp.gte(start));
        }
        if let Some(end) = range.end {
            query = query.filter(fuel_transaction::Column::Timestamp.lt(end));
        }
        if let Some(pump_id) = filter.pump_id {
            query = query.filter(fuel_transaction::Column::PumpId.eq(pump_id));
        }
        Ok(query
            .order_by_desc(fuel_transaction::Column::Timestamp)
            .all(self.db_pool.as_ref())
            .await?)
    }

    #[instrument(skip(self))]
    pub async fn get_transaction(
        &self,
        transaction_id: Uuid,
    ) -> Result<fuel_transaction::Model, ServiceError> {
        Self::find_transaction(self.db_pool.as_ref(), transaction_id, None).await
    }
}
