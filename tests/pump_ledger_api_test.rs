mod common;

use axum::http::Method;
use serde_json::json;

use common::{response_json, TestApp};

#[tokio::test]
async fn reading_derives_liters_and_revenue() {
    let app = TestApp::new().await;
    let pump = app.create_pump("Pompe 1", "Gasoil", 2.5, 1000).await;
    let pump_id = pump["id"].as_str().unwrap();

    let tx = app.record_reading(pump_id, 1200, json!({})).await;
    assert_eq!(tx["previousIndex"], 1000);
    assert_eq!(tx["currentIndex"], 1200);
    assert_eq!(tx["litersDispensed"], 200.0);
    assert_eq!(tx["revenue"], 500.0);
    assert_eq!(tx["fuelType"], "Gasoil");
    assert_eq!(tx["paymentMethod"], "cash");

    let response = app
        .request_as_admin(Method::GET, &format!("/api/pumps/{}", pump_id), None)
        .await;
    assert_eq!(response.status(), 200);
    let body = response_json(response).await;
    assert_eq!(body["currentIndex"], 1200);
    assert_eq!(body["previousIndex"], 1000);
    assert_eq!(body["status"], "in_use");
    assert_eq!(body["transactions"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn reading_at_or_below_current_index_is_rejected() {
    let app = TestApp::new().await;
    let pump = app.create_pump("Pompe 1", "Gasoil", 2.5, 1000).await;
    let pump_id = pump["id"].as_str().unwrap();

    for index in [1000, 900] {
        let response = app
            .request_as_admin(
                Method::POST,
                "/api/transactions",
                Some(json!({ "pumpId": pump_id, "currentIndex": index })),
            )
            .await;
        assert_eq!(response.status(), 400);
        let body = response_json(response).await;
        assert!(body["message"].as_str().unwrap().contains("must be greater"));
    }
}

#[tokio::test]
async fn reading_for_unknown_pump_is_not_found() {
    let app = TestApp::new().await;
    let response = app
        .request_as_admin(
            Method::POST,
            "/api/transactions",
            Some(json!({ "pumpId": uuid::Uuid::new_v4(), "currentIndex": 10 })),
        )
        .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn price_change_applies_to_future_readings_only() {
    let app = TestApp::new().await;
    let pump = app.create_pump("Pompe 1", "Gasoil", 2.0, 0).await;
    let pump_id = pump["id"].as_str().unwrap();
    let first = app.record_reading(pump_id, 100, json!({})).await;

    let response = app
        .request_as_admin(
            Method::PATCH,
            &format!("/api/pumps/{}/price", pump_id),
            Some(json!({ "pricePerLiter": 3.0 })),
        )
        .await;
    assert_eq!(response.status(), 200);
    let body = response_json(response).await;
    assert_eq!(body["message"], "Pump price updated successfully");
    assert_eq!(body["pump"]["pricePerLiter"], 3.0);

    let second = app.record_reading(pump_id, 150, json!({})).await;
    assert_eq!(second["revenue"], 150.0);

    let response = app
        .request_as_admin(
            Method::GET,
            &format!("/api/transactions/{}", first["id"].as_str().unwrap()),
            None,
        )
        .await;
    let stored = response_json(response).await;
    assert_eq!(stored["pricePerLiter"], 2.0);
    assert_eq!(stored["revenue"], 200.0);
}

#[tokio::test]
async fn editing_latest_transaction_moves_the_pump() {
    let app = TestApp::new().await;
    let pump = app.create_pump("Pompe 1", "Gasoil", 2.0, 0).await;
    let pump_id = pump["id"].as_str().unwrap();
    let tx = app.record_reading(pump_id, 100, json!({})).await;

    let response = app
        .request_as_admin(
            Method::PUT,
            &format!("/api/transactions/{}", tx["id"].as_str().unwrap()),
            Some(json!({ "currentIndex": 120 })),
        )
        .await;
    assert_eq!(response.status(), 200);
    let body = response_json(response).await;
    assert_eq!(body["transaction"]["litersDispensed"], 120.0);
    assert_eq!(body["transaction"]["revenue"], 240.0);

    let pump = response_json(
        app.request_as_admin(Method::GET, &format!("/api/pumps/{}", pump_id), None)
            .await,
    )
    .await;
    assert_eq!(pump["currentIndex"], 120);
}

#[tokio::test]
async fn editing_older_transaction_keeps_continuity() {
    let app = TestApp::new().await;
    let pump = app.create_pump("Pompe 1", "Gasoil", 2.0, 0).await;
    let pump_id = pump["id"].as_str().unwrap();
    let first = app.record_reading(pump_id, 100, json!({})).await;
    app.record_reading(pump_id, 150, json!({})).await;
    let first_uri = format!("/api/transactions/{}", first["id"].as_str().unwrap());

    // Past the next transaction's starting index.
    let response = app
        .request_as_admin(Method::PUT, &first_uri, Some(json!({ "currentIndex": 120 })))
        .await;
    assert_eq!(response.status(), 400);

    // Not above its own starting index.
    let response = app
        .request_as_admin(Method::PUT, &first_uri, Some(json!({ "currentIndex": 0 })))
        .await;
    assert_eq!(response.status(), 400);

    let response = app
        .request_as_admin(Method::PUT, &first_uri, Some(json!({ "currentIndex": 90 })))
        .await;
    assert_eq!(response.status(), 200);

    let pump = response_json(
        app.request_as_admin(Method::GET, &format!("/api/pumps/{}", pump_id), None)
            .await,
    )
    .await;
    assert_eq!(pump["currentIndex"], 150);
}

#[tokio::test]
async fn deleting_latest_transaction_rolls_back_and_only_one_resets() {
    let app = TestApp::new().await;
    let pump = app.create_pump("Pompe 1", "Gasoil", 2.0, 0).await;
    let pump_id = pump["id"].as_str().unwrap();
    let first = app.record_reading(pump_id, 100, json!({})).await;
    let second = app.record_reading(pump_id, 150, json!({})).await;

    let response = app
        .request_as_admin(
            Method::DELETE,
            &format!("/api/transactions/{}", second["id"].as_str().unwrap()),
            None,
        )
        .await;
    assert_eq!(response.status(), 200);
    let body = response_json(response).await;
    assert_eq!(body["wasMostRecent"], true);
    assert_eq!(body["pump"]["currentIndex"], 100);
    assert_eq!(body["pump"]["previousIndex"], 0);

    let response = app
        .request_as_admin(
            Method::DELETE,
            &format!("/api/transactions/{}", first["id"].as_str().unwrap()),
            None,
        )
        .await;
    let body = response_json(response).await;
    assert_eq!(body["pump"]["currentIndex"], 0);
    assert_eq!(body["pump"]["previousIndex"], 0);
}

#[tokio::test]
async fn deleting_older_transaction_leaves_pump_alone() {
    let app = TestApp::new().await;
    let pump = app.create_pump("Pompe 1", "Gasoil", 2.0, 0).await;
    let pump_id = pump["id"].as_str().unwrap();
    let first = app.record_reading(pump_id, 100, json!({})).await;
    app.record_reading(pump_id, 150, json!({})).await;

    let response = app
        .request_as_admin(
            Method::DELETE,
            &format!("/api/transactions/{}", first["id"].as_str().unwrap()),
            None,
        )
        .await;
    let body = response_json(response).await;
    assert_eq!(body["wasMostRecent"], false);
    assert_eq!(body["pump"]["currentIndex"], 150);
}

#[tokio::test]
async fn deleting_pump_cascades_to_transactions() {
    let app = TestApp::new().await;
    let pump = app.create_pump("Pompe 1", "Gasoil", 2.0, 0).await;
    let pump_id = pump["id"].as_str().unwrap();
    let tx = app.record_reading(pump_id, 100, json!({})).await;

    let response = app
        .request_as_admin(Method::DELETE, &format!("/api/pumps/{}", pump_id), None)
        .await;
    assert_eq!(response.status(), 200);

    let response = app
        .request_as_admin(
            Method::GET,
            &format!("/api/transactions/{}", tx["id"].as_str().unwrap()),
            None,
        )
        .await;
    assert_eq!(response.status(), 404);
}

#[tokio::test]
async fn concurrent_readings_on_one_pump_are_serialized() {
    let app = TestApp::new().await;
    let pump = app.create_pump("Pompe 1", "Gasoil", 1.0, 0).await;
    let pump_id: uuid::Uuid = pump["id"].as_str().unwrap().parse().unwrap();

    let service = app.state.services.pumps.clone();
    let handles: Vec<_> = (1..=5)
        .map(|step| {
            let service = service.clone();
            tokio::spawn(async move {
                service
                    .record_reading(gas_station_api::services::pump_ledger::RecordReadingRequest {
                        pump_id,
                        current_index: step * 100,
                        shift: None,
                        timestamp: None,
                        payment_method: None,
                    })
                    .await
            })
        })
        .collect();
    for handle in handles {
        // Out-of-order readings are rejected; none may corrupt the ledger.
        let _ = handle.await.unwrap();
    }

    let ledger = service.get_pump(pump_id).await.unwrap();
    let mut expected_previous = 0;
    for tx in &ledger.transactions {
        assert_eq!(tx.previous_index, expected_previous);
        expected_previous = tx.current_index;
    }
    assert_eq!(ledger.pump.current_index, expected_previous);
}

#[tokio::test]
async fn mistyped_reading_is_a_json_bad_request() {
    let app = TestApp::new().await;
    let pump = app.create_pump("Pompe 1", "Gasoil", 2.0, 0).await;
    let response = app
        .request_as_admin(
            Method::POST,
            "/api/transactions",
            Some(json!({ "pumpId": pump["id"], "currentIndex": "abc" })),
        )
        .await;
    assert_eq!(response.status(), 400);
    assert!(response.headers()["content-type"]
        .to_str()
        .unwrap()
        .starts_with("application/json"));
    let body = response_json(response).await;
    assert_eq!(body["error"], "Bad Request");
    assert!(body["message"].as_str().unwrap().contains("currentIndex"));

    let pump = response_json(
        app.request_as_admin(
            Method::GET,
            &format!("/api/pumps/{}", pump["id"].as_str().unwrap()),
            None,
        )
        .await,
    )
    .await;
    assert!(pump["transactions"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn pump_id_that_is_not_a_uuid_is_a_bad_request() {
    let app = TestApp::new().await;
    let response = app
        .request_as_admin(Method::GET, "/api/pumps/pompe-1", None)
        .await;
    assert_eq!(response.status(), 400);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Bad Request");
    assert!(body["requestId"].is_string());
}
