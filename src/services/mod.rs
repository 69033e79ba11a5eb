// Station ledgers
pub mod inventory;
pub mod pump_ledger;

// Back office
pub mod employees;
pub mod expenses;

// Reporting and whole-station operations
pub mod reports;
pub mod snapshot;

// Local calendar helpers shared by the ledgers and reports
pub mod period;

// Service factory for dependency injection
pub mod factory;
