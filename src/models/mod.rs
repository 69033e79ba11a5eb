//! Persistent station records.

pub mod employee;
pub mod expense;
pub mod fuel_transaction;
pub mod inventory_item;
pub mod pump;

pub use employee::{EmployeeShift, EmployeeStatus};
pub use expense::ExpenseCategory;
pub use fuel_transaction::Shift;
pub use pump::PumpStatus;
