mod common;

use axum::http::Method;
use serde_json::json;

use common::{response_json, TestApp};

async fn busy_station() -> TestApp {
    let app = TestApp::new().await;
    let pump = app.create_pump("Pompe 1", "Gasoil", 2.0, 0).await;
    app.record_reading(pump["id"].as_str().unwrap(), 100, json!({}))
        .await;

    for (uri, payload) in [
        (
            "/api/inventory",
            json!({ "name": "Lave-Glace", "category": "Accessoires Auto", "quantity": 4, "unitPrice": 4.99 }),
        ),
        (
            "/api/expenses",
            json!({ "date": "2025-04-01", "category": "salary", "description": "Avance", "amount": 150.0 }),
        ),
        (
            "/api/employees",
            json!({
                "name": "Karim",
                "shift": "night",
                "salary": 900.0,
                "position": "Pompiste",
                "hireDate": "2024-09-01"
            }),
        ),
    ] {
        let response = app.request_as_admin(Method::POST, uri, Some(payload)).await;
        assert_eq!(response.status(), 201, "seeding {} failed", uri);
    }
    app
}

#[tokio::test]
async fn export_mirrors_every_store() {
    let app = busy_station().await;
    let response = app.request_as_admin(Method::GET, "/api/state", None).await;
    assert_eq!(response.status(), 200);
    let snapshot = response_json(response).await;

    let station = &snapshot["gasStationState"];
    assert_eq!(station["pumps"].as_array().unwrap().len(), 1);
    assert_eq!(station["pumps"][0]["transactions"].as_array().unwrap().len(), 1);
    assert_eq!(station["totalLitersDispensed"], 100.0);
    assert_eq!(station["totalRevenue"], 200.0);
    assert_eq!(snapshot["inventoryState"]["items"][0]["name"], "Lave-Glace");
    assert_eq!(snapshot["expenseState"]["expenses"][0]["amount"], 150.0);
    assert_eq!(snapshot["employeeState"]["employees"][0]["name"], "Karim");
    assert!(snapshot["exportedAt"].is_string());
}

#[tokio::test]
async fn reset_clears_operational_data_but_keeps_pumps_and_users() {
    let app = busy_station().await;
    let response = app
        .request(Method::DELETE, "/api/state", None, Some(app.super_admin_token()))
        .await;
    assert_eq!(response.status(), 200);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Station data reset successfully");
    assert_eq!(body["summary"]["transactionsDeleted"], 1);
    assert_eq!(body["summary"]["pumpsReset"], 1);
    assert_eq!(body["summary"]["inventoryItemsDeleted"], 1);
    assert_eq!(body["summary"]["expensesDeleted"], 1);
    assert_eq!(body["summary"]["employeesDeleted"], 1);

    let pumps = response_json(app.request_as_admin(Method::GET, "/api/pumps", None).await).await;
    let pump = &pumps[0];
    assert_eq!(pump["name"], "Pompe 1");
    assert_eq!(pump["pricePerLiter"], 2.0);
    assert_eq!(pump["currentIndex"], 0);
    assert_eq!(pump["previousIndex"], 0);
    assert_eq!(pump["status"], "available");

    // The admin token still resolves to an account.
    let response = app.request_as_admin(Method::GET, "/api/auth/me", None).await;
    assert_eq!(response.status(), 200);

    let employees =
        response_json(app.request_as_admin(Method::GET, "/api/employees", None).await).await;
    assert!(employees.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn employee_filters_and_updates() {
    let app = busy_station().await;
    let night = response_json(
        app.request_as_admin(Method::GET, "/api/employees?shift=night", None)
            .await,
    )
    .await;
    assert_eq!(night.as_array().unwrap().len(), 1);
    let id = night[0]["id"].as_str().unwrap().to_string();
    assert_eq!(night[0]["status"], "active");

    let response = app
        .request_as_admin(
            Method::PUT,
            &format!("/api/employees/{}", id),
            Some(json!({ "status": "inactive" })),
        )
        .await;
    assert_eq!(response.status(), 200);

    let active = response_json(
        app.request_as_admin(Method::GET, "/api/employees?status=active", None)
            .await,
    )
    .await;
    assert!(active.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn reset_waits_for_pump_ledger_locks() {
    let app = busy_station().await;
    let pumps = app.state.services.pumps.clone();
    let snapshot = app.state.services.snapshot.clone();

    let freeze = pumps.lock_all_pumps().await.unwrap();
    let reset = tokio::spawn(async move { snapshot.reset().await });
    tokio::time::sleep(std::time::Duration::from_millis(100)).await;
    assert!(!reset.is_finished(), "reset ran while a pump ledger was locked");

    drop(freeze);
    let summary = reset.await.unwrap().unwrap();
    assert_eq!(summary.pumps_reset, 1);
    assert_eq!(summary.transactions_deleted, 1);

    // The first reading after a reset starts from zero.
    let pump = response_json(app.request_as_admin(Method::GET, "/api/pumps", None).await).await;
    let tx = app
        .record_reading(pump[0]["id"].as_str().unwrap(), 40, json!({}))
        .await;
    assert_eq!(tx["previousIndex"], 0);
    assert_eq!(tx["litersDispensed"], 40.0);
}
