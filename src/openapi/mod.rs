use utoipa::{
    openapi::security::{ApiKey, ApiKeyValue, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

pub const OPENAPI_JSON_PATH: &str = "/api-docs/openapi.json";

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Gas Station API",
        version = "1.0.0",
        description = r#"
# Gas Station Management API

Backend for a fuel station dashboard: pumps and their meter ledger, shop
inventory, expenses, staff, and sales reports by period and shift.

## Authentication

Log in through `/api/auth/login` and send the returned token on every other
call, either as `x-access-token: <token>` or `Authorization: Bearer <token>`.
A missing token answers 403, an invalid or expired one 401. Mutations on
pumps, inventory, expenses, employees and the station state need the
`admin` role; wiping the station needs `super_admin`.

## Errors

```json
{
  "error": "Not Found",
  "message": "Pump 6f0c... not found",
  "requestId": "a1b2c3",
  "timestamp": "2025-04-01T08:00:00Z"
}
```
"#
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "auth", description = "Registration, login and the current user"),
        (name = "pumps", description = "Pumps, prices and names"),
        (name = "transactions", description = "Meter readings and the pump ledger"),
        (name = "inventory", description = "Shop items, sales and restocks"),
        (name = "expenses", description = "Station expenses"),
        (name = "employees", description = "Station staff"),
        (name = "reports", description = "Sales reports and exports"),
        (name = "state", description = "Whole-station export and reset")
    ),
    paths(
        crate::handlers::auth::register,
        crate::handlers::auth::login,
        crate::handlers::auth::me,

        crate::handlers::pumps::list_pumps,
        crate::handlers::pumps::get_pump,
        crate::handlers::pumps::create_pump,
        crate::handlers::pumps::update_pump,
        crate::handlers::pumps::delete_pump,
        crate::handlers::pumps::set_price,
        crate::handlers::pumps::set_name,

        crate::handlers::transactions::record_reading,
        crate::handlers::transactions::list_transactions,
        crate::handlers::transactions::sales_report,
        crate::handlers::transactions::get_transaction,
        crate::handlers::transactions::edit_transaction,
        crate::handlers::transactions::delete_transaction,

        crate::handlers::inventory::list_inventory,
        crate::handlers::inventory::low_stock,
        crate::handlers::inventory::get_inventory_item,
        crate::handlers::inventory::create_inventory_item,
        crate::handlers::inventory::update_inventory_item,
        crate::handlers::inventory::delete_inventory_item,
        crate::handlers::inventory::record_sale,
        crate::handlers::inventory::record_sales,
        crate::handlers::inventory::restock,

        crate::handlers::expenses::list_expenses,
        crate::handlers::expenses::get_expense,
        crate::handlers::expenses::create_expense,
        crate::handlers::expenses::update_expense,
        crate::handlers::expenses::delete_expense,

        crate::handlers::employees::list_employees,
        crate::handlers::employees::get_employee,
        crate::handlers::employees::create_employee,
        crate::handlers::employees::update_employee,
        crate::handlers::employees::delete_employee,

        crate::handlers::reports::sales_report,
        crate::handlers::reports::daily_report,

        crate::handlers::snapshot::export_state,
        crate::handlers::snapshot::reset_state
    ),
    components(
        schemas(
            // Auth
            crate::auth::types::RegisterRequest,
            crate::auth::types::LoginRequest,
            crate::auth::types::LoginResponse,
            crate::auth::types::RegisterResponse,

            // Records
            crate::models::pump::Model,
            crate::models::PumpStatus,
            crate::models::fuel_transaction::Model,
            crate::models::Shift,
            crate::models::inventory_item::Model,
            crate::models::expense::Model,
            crate::models::ExpenseCategory,
            crate::models::employee::Model,
            crate::models::EmployeeShift,
            crate::models::EmployeeStatus,

            // Pumps and ledger
            crate::services::pump_ledger::CreatePumpRequest,
            crate::services::pump_ledger::UpdatePumpRequest,
            crate::services::pump_ledger::SetPriceRequest,
            crate::services::pump_ledger::SetNameRequest,
            crate::services::pump_ledger::RecordReadingRequest,
            crate::services::pump_ledger::EditTransactionRequest,
            crate::services::pump_ledger::PumpWithTransactions,
            crate::services::pump_ledger::DeletedTransaction,

            // Inventory
            crate::services::inventory::CreateInventoryItemRequest,
            crate::services::inventory::UpdateInventoryItemRequest,
            crate::services::inventory::QuantityRequest,
            crate::services::inventory::SaleLine,
            crate::services::inventory::BatchSaleRequest,
            crate::services::inventory::InventoryItemView,

            // Expenses and staff
            crate::services::expenses::CreateExpenseRequest,
            crate::services::expenses::UpdateExpenseRequest,
            crate::services::expenses::ExpenseList,
            crate::services::employees::CreateEmployeeRequest,
            crate::services::employees::UpdateEmployeeRequest,

            // Reports
            crate::services::reports::ShiftFilter,
            crate::services::reports::ReportFormat,
            crate::services::reports::FuelTypeTotals,
            crate::services::reports::PaymentMethodTotals,
            crate::services::reports::SalesSummary,
            crate::services::reports::ReportTransaction,
            crate::services::reports::ReportPeriod,
            crate::services::reports::SalesReport,

            // Station state
            crate::services::snapshot::GasStationState,
            crate::services::snapshot::InventoryState,
            crate::services::snapshot::ExpenseState,
            crate::services::snapshot::EmployeeState,
            crate::services::snapshot::StationSnapshot,
            crate::services::snapshot::ResetSummary,

            crate::errors::ErrorResponse
        )
    )
)]
pub struct ApiDoc;

/// Registers the `access_token` scheme referenced by every protected path.
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "access_token",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new(
                crate::auth::ACCESS_TOKEN_HEADER,
            ))),
        );
    }
}

pub fn swagger_ui() -> SwaggerUi {
    SwaggerUi::new("/swagger-ui")
        .url(OPENAPI_JSON_PATH, ApiDoc::openapi())
        .config(utoipa_swagger_ui::Config::from(OPENAPI_JSON_PATH).try_it_out_enabled(true))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn document_lists_station_paths() {
        let json = serde_json::to_string(&ApiDoc::openapi()).unwrap();
        assert!(json.contains("Gas Station API"));
        assert!(json.contains("/api/pumps/{id}/price"));
        assert!(json.contains("/api/transactions/report"));
        assert!(json.contains("/api/state"));
        assert!(json.contains("x-access-token"));
    }
}
