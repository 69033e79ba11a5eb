use std::sync::Arc;

use chrono::FixedOffset;

use crate::{
    config::AppConfig,
    db::DbPool,
    events::EventSender,
    services::{
        employees::EmployeeService, expenses::ExpenseService, inventory::InventoryService,
        pump_ledger::PumpLedgerService, reports::ReportService, snapshot::SnapshotService,
    },
};

/// Factory for creating service instances with shared dependencies
pub struct ServiceFactory {
    db_pool: Arc<DbPool>,
    event_sender: EventSender,
    station_offset: FixedOffset,
    currency: String,
}

impl ServiceFactory {
    pub fn new(
        db_pool: Arc<DbPool>,
        event_sender: EventSender,
        station_offset: FixedOffset,
        currency: String,
    ) -> Self {
        Self {
            db_pool,
            event_sender,
            station_offset,
            currency,
        }
    }

    /// Factory wired from the application configuration.
    pub fn from_config(db_pool: Arc<DbPool>, event_sender: EventSender, config: &AppConfig) -> Self {
        Self::new(
            db_pool,
            event_sender,
            config.station_offset(),
            config.currency.clone(),
        )
    }

    pub fn pump_ledger_service(&self) -> PumpLedgerService {
        PumpLedgerService::new(
            self.db_pool.clone(),
            self.event_sender.clone(),
            self.station_offset,
        )
    }

    pub fn inventory_service(&self) -> InventoryService {
        InventoryService::new(self.db_pool.clone(), self.event_sender.clone())
    }

    pub fn expense_service(&self) -> ExpenseService {
        ExpenseService::new(self.db_pool.clone())
    }

    pub fn employee_service(&self) -> EmployeeService {
        EmployeeService::new(self.db_pool.clone())
    }

    pub fn report_service(&self) -> ReportService {
        ReportService::new(self.db_pool.clone(), self.station_offset, self.currency.clone())
    }

    /// The reset locks pump ledgers through `pumps`, which must be the
    /// instance that serves readings.
    pub fn snapshot_service(&self, pumps: Arc<PumpLedgerService>) -> SnapshotService {
        SnapshotService::new(self.db_pool.clone(), self.event_sender.clone(), pumps)
    }
}

/// Service container holding all service instances
#[derive(Clone)]
pub struct ServiceContainer {
    pub pumps: Arc<PumpLedgerService>,
    pub inventory: Arc<InventoryService>,
    pub expenses: Arc<ExpenseService>,
    pub employees: Arc<EmployeeService>,
    pub reports: Arc<ReportService>,
    pub snapshot: Arc<SnapshotService>,
}

impl ServiceContainer {
    /// Creates a new service container with all services initialized
    pub fn new(factory: &ServiceFactory) -> Self {
        let pumps = Arc::new(factory.pump_ledger_service());
        Self {
            pumps: pumps.clone(),
            inventory: Arc::new(factory.inventory_service()),
            expenses: Arc::new(factory.expense_service()),
            employees: Arc::new(factory.employee_service()),
            reports: Arc::new(factory.report_service()),
            snapshot: Arc::new(factory.snapshot_service(pumps)),
        }
    }
}
