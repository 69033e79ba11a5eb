use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{info, warn};
use uuid::Uuid;

#[derive(Debug, Clone)]
pub struct EventSender {
    sender: mpsc::Sender<Event>,
}

impl EventSender {
    /// Creates a new EventSender
    pub fn new(sender: mpsc::Sender<Event>) -> Self {
        Self { sender }
    }

    /// Bounded channel plus its sender; the receiver goes to [`process_events`].
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Event>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tx), rx)
    }

    /// Queues an event without waiting. A full or closed channel drops the
    /// event with a warning and never fails the caller.
    pub fn emit(&self, event: Event) {
        if let Err(e) = self.sender.try_send(event) {
            match e {
                mpsc::error::TrySendError::Full(event) => {
                    warn!(event = ?event, "event channel full, dropping event")
                }
                mpsc::error::TrySendError::Closed(event) => {
                    warn!(event = ?event, "event channel closed, dropping event")
                }
            }
        }
    }
}

// Define the various events that can occur at the station.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Event {
    // Pump ledger events
    ReadingRecorded {
        pump_id: Uuid,
        transaction_id: Uuid,
        previous_index: i64,
        current_index: i64,
        liters: f64,
        revenue: f64,
    },
    TransactionEdited {
        pump_id: Uuid,
        transaction_id: Uuid,
        old_current_index: i64,
        new_current_index: i64,
    },
    TransactionDeleted {
        pump_id: Uuid,
        transaction_id: Uuid,
        was_most_recent: bool,
    },
    PumpPriceChanged {
        pump_id: Uuid,
        old_price: f64,
        new_price: f64,
    },

    // Inventory events
    InventorySold {
        item_id: Uuid,
        quantity: i32,
        remaining: i32,
    },
    InventoryRestocked {
        item_id: Uuid,
        quantity: i32,
        new_quantity: i32,
    },
    LowStockReached {
        item_id: Uuid,
        name: String,
        quantity: i32,
        threshold: i32,
    },

    // Station events
    StationReset {
        at: DateTime<Utc>,
    },
}

/// Drains the event channel until every sender is dropped.
pub async fn process_events(mut rx: mpsc::Receiver<Event>) {
    info!("Starting event processing loop");

    while let Some(event) = rx.recv().await {
        match &event {
            Event::LowStockReached {
                item_id,
                name,
                quantity,
                threshold,
            } => {
                warn!(
                    item_id = %item_id,
                    item = %name,
                    quantity,
                    threshold,
                    "low stock alert"
                );
            }
            Event::StationReset { at } => {
                warn!(at = %at, "station operational data reset");
            }
            other => {
                info!(event = ?other, "station event");
            }
        }
    }

    info!("Event processing loop stopped");
}
