use crate::{
    db::DbPool,
    errors::ServiceError,
    events::{Event, EventSender},
    models::inventory_item::{self, Entity as InventoryItemEntity, DEFAULT_LOW_STOCK_THRESHOLD},
};
use chrono::Utc;
use sea_orm::{
    sea_query::Expr, ActiveModelTrait, ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter,
    QueryOrder, Set, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use utoipa::{IntoParams, ToSchema};
use uuid::Uuid;
use validator::{Validate, ValidationError};

fn validate_non_negative_amount(value: f64) -> Result<(), ValidationError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ValidationError::new("amount_must_be_non_negative"))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateInventoryItemRequest {
    #[validate(length(min = 1, max = 255, message = "Item name is required"))]
    pub name: String,
    #[validate(length(min = 1, max = 100, message = "Category is required"))]
    pub category: String,
    #[validate(range(min = 0, message = "Quantity must be non-negative"))]
    pub quantity: Option<i32>,
    #[validate(custom = "validate_non_negative_amount")]
    pub unit_price: f64,
    #[validate(length(max = 255))]
    pub supplier: Option<String>,
    #[validate(range(min = 0, message = "Low stock threshold must be non-negative"))]
    pub low_stock_threshold: Option<i32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UpdateInventoryItemRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: Option<String>,
    #[validate(length(min = 1, max = 100))]
    pub category: Option<String>,
    #[validate(range(min = 0, message = "Quantity must be non-negative"))]
    pub quantity: Option<i32>,
    #[validate(custom = "validate_non_negative_amount")]
    pub unit_price: Option<f64>,
    #[validate(length(max = 255))]
    pub supplier: Option<String>,
    #[validate(range(min = 0, message = "Low stock threshold must be non-negative"))]
    pub low_stock_threshold: Option<i32>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct QuantityRequest {
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SaleLine {
    pub item_id: Uuid,
    #[validate(range(min = 1, message = "Quantity must be at least 1"))]
    pub quantity: i32,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate, ToSchema)]
pub struct BatchSaleRequest {
    #[validate(length(min = 1, message = "At least one sale line is required"))]
    #[validate]
    pub sales: Vec<SaleLine>,
}

#[derive(Debug, Clone, Default, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct InventoryFilter {
    pub category: Option<String>,
}

/// Item as returned by the API, with its derived low-stock flag.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct InventoryItemView {
    #[serde(flatten)]
    pub item: inventory_item::Model,
    pub low_stock: bool,
}

impl From<inventory_item::Model> for InventoryItemView {
    fn from(item: inventory_item::Model) -> Self {
        let low_stock = item.is_low_stock();
        Self { item, low_stock }
    }
}

/// True when a stock movement takes an item from above its threshold to at or below it.
pub fn crosses_low_stock(before: i32, after: i32, threshold: i32) -> bool {
    before > threshold && after <= threshold
}

/// Service for managing shop inventory
#[derive(Clone)]
pub struct InventoryService {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
}

impl InventoryService {
    /// Creates a new inventory service instance
    pub fn new(db_pool: Arc<DbPool>, event_sender: EventSender) -> Self {
        Self {
            db_pool,
            event_sender,
        }
    }

    async fn find_item<C: ConnectionTrait>(
        conn: &C,
        item_id: Uuid,
    ) -> Result<inventory_item::Model, ServiceError> {
        InventoryItemEntity::find_by_id(item_id)
            .one(conn)
            .await?
            .ok_or_else(|| ServiceError::not_found("Inventory item", item_id))
    }

    #[instrument(skip(self))]
    pub async fn list(&self, filter: InventoryFilter) -> Result<Vec<InventoryItemView>, ServiceError> {
        let mut query = InventoryItemEntity::find();
        if let Some(category) = filter.category.filter(|c| !c.trim().is_empty()) {
            query = query.filter(inventory_item::Column::Category.eq(category.trim()));
        }
        let items = query
            .order_by_asc(inventory_item::Column::Name)
            .all(self.db_pool.as_ref())
            .await?;
        Ok(items.into_iter().map(InventoryItemView::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, item_id: Uuid) -> Result<InventoryItemView, ServiceError> {
        Ok(Self::find_item(self.db_pool.as_ref(), item_id).await?.into())
    }

    #[instrument(skip(self))]
    pub async fn create(&self, request: CreateInventoryItemRequest) -> Result<InventoryItemView, ServiceError> {
        request.validate()?;
        let now = Utc::now();
        let item = inventory_item::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(request.name.trim().to_string()),
            category: Set(request.category.trim().to_string()),
            quantity: Set(request.quantity.unwrap_or(0)),
            unit_price: Set(request.unit_price),
            supplier: Set(request.supplier),
            low_stock_threshold: Set(request
                .low_stock_threshold
                .unwrap_or(DEFAULT_LOW_STOCK_THRESHOLD)),
            last_updated: Set(now),
            created_at: Set(now),
        }
        .insert(self.db_pool.as_ref())
        .await?;

        info!(item_id = %item.id, name = %item.name, "inventory item created");
        Ok(item.into())
    }

    #[instrument(skip(self))]
    pub async fn update(
        &self,
        item_id: Uuid,
        request: UpdateInventoryItemRequest,
    ) -> Result<InventoryItemView, ServiceError> {
        request.validate()?;
        let existing = Self::find_item(self.db_pool.as_ref(), item_id).await?;
        let mut active: inventory_item::ActiveModel = existing.into();
        if let Some(name) = request.name {
            active.name = Set(name.trim().to_string());
        }
        if let Some(category) = request.category {
            active.category = Set(category.trim().to_string());
        }
        if let Some(quantity) = request.quantity {
            active.quantity = Set(quantity);
        }
        if let Some(unit_price) = request.unit_price {
            active.unit_price = Set(unit_price);
        }
        if let Some(supplier) = request.supplier {
            active.supplier = Set(Some(supplier));
        }
        if let Some(threshold) = request.low_stock_threshold {
            active.low_stock_threshold = Set(threshold);
        }
        active.last_updated = Set(Utc::now());
        Ok(active.update(self.db_pool.as_ref()).await?.into())
    }

    #[instrument(skip(self))]
    pub async fn delete(&self, item_id: Uuid) -> Result<(), ServiceError> {
        let result = InventoryItemEntity::delete_by_id(item_id)
            .exec(self.db_pool.as_ref())
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::not_found("Inventory item", item_id));
        }
        info!(item_id = %item_id, "inventory item deleted");
        Ok(())
    }

    /// Decrements stock inside `conn`; returns the updated item and any event to emit.
    ///
    /// The decrement is a single conditional UPDATE, so concurrent sales of
    /// the same item can never take it below zero.
    async fn apply_sale<C: ConnectionTrait>(
        conn: &C,
        item_id: Uuid,
        quantity: i32,
    ) -> Result<(inventory_item::Model, Vec<Event>), ServiceError> {
        if quantity < 1 {
            return Err(ServiceError::ValidationError(
                "Quantity must be at least 1".to_string(),
            ));
        }
        let item = Self::find_item(conn, item_id).await?;

        let result = InventoryItemEntity::update_many()
            .col_expr(
                inventory_item::Column::Quantity,
                Expr::col(inventory_item::Column::Quantity).sub(quantity),
            )
            .col_expr(inventory_item::Column::LastUpdated, Expr::value(Utc::now()))
            .filter(inventory_item::Column::Id.eq(item_id))
            .filter(inventory_item::Column::Quantity.gte(quantity))
            .exec(conn)
            .await?;
        if result.rows_affected == 0 {
            let available = Self::find_item(conn, item_id).await?.quantity;
            warn!(item_id = %item_id, requested = quantity, available, "sale rejected");
            return Err(ServiceError::InsufficientStock(format!(
                "requested {} of {} but only {} in stock",
                quantity, item.name, available
            )));
        }

        let updated = Self::find_item(conn, item_id).await?;
        let before = updated.quantity + quantity;
        let threshold = updated.low_stock_threshold;
        let mut events = vec![Event::InventorySold {
            item_id,
            quantity,
            remaining: updated.quantity,
        }];
        if crosses_low_stock(before, updated.quantity, threshold) {
            events.push(Event::LowStockReached {
                item_id,
                name: updated.name.clone(),
                quantity: updated.quantity,
                threshold,
            });
        }
        Ok((updated, events))
    }

    /// Records the sale of `quantity` units of one item.
    #[instrument(skip(self))]
    pub async fn record_sale(&self, item_id: Uuid, quantity: i32) -> Result<InventoryItemView, ServiceError> {
        let txn = self.db_pool.begin().await?;
        let (item, events) = Self::apply_sale(&txn, item_id, quantity).await?;
        txn.commit().await?;

        info!(item_id = %item_id, quantity, remaining = item.quantity, "inventory sale recorded");
        events.into_iter().for_each(|e| self.event_sender.emit(e));
        Ok(item.into())
    }

    /// Records several sales atomically: either every line applies or none does.
    #[instrument(skip(self))]
    pub async fn record_sales(&self, request: BatchSaleRequest) -> Result<Vec<InventoryItemView>, ServiceError> {
        request.validate()?;
        let txn = self.db_pool.begin().await?;
        let mut updated = Vec::with_capacity(request.sales.len());
        let mut events = Vec::new();
        for line in &request.sales {
            let (item, line_events) = Self::apply_sale(&txn, line.item_id, line.quantity).await?;
            updated.push(item);
            events.extend(line_events);
        }
        txn.commit().await?;

        info!(lines = updated.len(), "inventory batch sale recorded");
        events.into_iter().for_each(|e| self.event_sender.emit(e));
        Ok(updated.into_iter().map(InventoryItemView::from).collect())
    }

    #[instrument(skip(self))]
    pub async fn restock(&self, item_id: Uuid, quantity: i32) -> Result<InventoryItemView, ServiceError> {
        if quantity < 1 {
            return Err(ServiceError::ValidationError(
                "Quantity must be at least 1".to_string(),
            ));
        }
        let txn = self.db_pool.begin().await?;
        Self::find_item(&txn, item_id).await?;
        let result = InventoryItemEntity::update_many()
            .col_expr(
                inventory_item::Column::Quantity,
                Expr::col(inventory_item::Column::Quantity).add(quantity),
            )
            .col_expr(inventory_item::Column::LastUpdated, Expr::value(Utc::now()))
            .filter(inventory_item::Column::Id.eq(item_id))
            .filter(inventory_item::Column::Quantity.lte(i32::MAX - quantity))
            .exec(&txn)
            .await?;
        if result.rows_affected == 0 {
            return Err(ServiceError::ValidationError(
                "Restock quantity overflows stock counter".to_string(),
            ));
        }
        let updated = Self::find_item(&txn, item_id).await?;
        txn.commit().await?;

        let new_quantity = updated.quantity;
        self.event_sender.emit(Event::InventoryRestocked {
            item_id,
            quantity,
            new_quantity,
        });
        Ok(updated.into())
    }

    /// Items at or below their alert threshold, emptiest first.
    #[instrument(skip(self))]
    pub async fn list_low_stock(&self) -> Result<Vec<InventoryItemView>, ServiceError> {
        let items = InventoryItemEntity::find()
            .filter(
                Expr::col(inventory_item::Column::Quantity)
                    .lte(Expr::col(inventory_item::Column::LowStockThreshold)),
            )
            .order_by_asc(inventory_item::Column::Quantity)
            .all(self.db_pool.as_ref())
            .await?;
        Ok(items.into_iter().map(InventoryItemView::from).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(11, 10, 10, true)]
    #[case(15, 9, 10, true)]
    #[case(10, 9, 10, false)]
    #[case(20, 11, 10, false)]
    #[case(1, 0, 0, true)]
    fn low_stock_crossing(
        #[case] before: i32,
        #[case] after: i32,
        #[case] threshold: i32,
        #[case] expected: bool,
    ) {
        assert_eq!(crosses_low_stock(before, after, threshold), expected);
    }

    #[test]
    fn view_flags_low_stock_at_threshold() {
        let now = Utc::now();
        let item = inventory_item::Model {
            id: Uuid::new_v4(),
            name: "Huile moteur 5W30".into(),
            category: "oil".into(),
            quantity: 10,
            unit_price: 35.0,
            supplier: None,
            low_stock_threshold: 10,
            last_updated: now,
            created_at: now,
        };
        let view = InventoryItemView::from(item);
        assert!(view.low_stock);
        let json = serde_json::to_value(&view).unwrap();
        assert_eq!(json["lowStock"], true);
        assert_eq!(json["lowStockThreshold"], 10);
    }

    #[test]
    fn batch_request_requires_lines() {
        let empty = BatchSaleRequest { sales: vec![] };
        assert!(empty.validate().is_err());
        let zero = BatchSaleRequest {
            sales: vec![SaleLine {
                item_id: Uuid::new_v4(),
                quantity: 0,
            }],
        };
        assert!(zero.validate().is_err());
    }
}
