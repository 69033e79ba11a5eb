pub mod auth;
pub mod common;
pub mod employees;
pub mod expenses;
pub mod extract;
pub mod inventory;
pub mod pumps;
pub mod reports;
pub mod snapshot;
pub mod transactions;
