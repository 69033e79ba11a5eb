mod common;

use axum::http::{header, Method};
use serde_json::json;

use common::{response_bytes, response_json, TestApp};

const DAY: &str = "startDate=2025-04-01&endDate=2025-04-01";

/// One Gasoil pump with a morning sale of 500 and a night sale of 1000
/// (station time is UTC+1), plus a 300 fuel expense.
async fn station_day() -> TestApp {
    let app = TestApp::new().await;
    let pump = app.create_pump("Pompe 1", "Gasoil", 2.5, 0).await;
    let pump_id = pump["id"].as_str().unwrap();
    app.record_reading(pump_id, 200, json!({ "timestamp": "2025-04-01T07:00:00Z" }))
        .await;
    app.record_reading(
        pump_id,
        600,
        json!({ "timestamp": "2025-04-01T19:30:00Z", "paymentMethod": "card" }),
    )
    .await;

    let response = app
        .request_as_admin(
            Method::POST,
            "/api/expenses",
            Some(json!({
                "date": "2025-04-01",
                "category": "fuel",
                "description": "Livraison citerne",
                "amount": 300.0
            })),
        )
        .await;
    assert_eq!(response.status(), 201);
    app
}

#[tokio::test]
async fn json_report_summarizes_the_day() {
    let app = station_day().await;
    let response = app
        .request_as_admin(Method::GET, &format!("/api/reports/sales?{}", DAY), None)
        .await;
    assert_eq!(response.status(), 200);
    let report = response_json(response).await;

    let summary = &report["summary"];
    assert_eq!(summary["totalTransactions"], 2);
    assert_eq!(summary["totalLiters"], 600.0);
    assert_eq!(summary["totalRevenue"], 1500.0);
    assert_eq!(summary["totalExpenses"], 300.0);
    assert_eq!(summary["netRevenue"], 1200.0);
    assert_eq!(summary["fuelTypeSummary"]["Gasoil"]["amount"], 1500.0);
    assert_eq!(summary["paymentMethodSummary"]["card"]["count"], 1);
    assert_eq!(summary["expensesByCategory"]["fuel"], 300.0);
    assert_eq!(report["transactions"][0]["pumpName"], "Pompe 1");
    assert_eq!(report["period"]["shift"], "all");
}

#[tokio::test]
async fn shift_filter_uses_station_local_time() {
    let app = station_day().await;

    let morning = response_json(
        app.request_as_admin(
            Method::GET,
            &format!("/api/reports/sales?{}&shift=morning", DAY),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(morning["summary"]["totalRevenue"], 500.0);

    let night = response_json(
        app.request_as_admin(
            Method::GET,
            &format!("/api/transactions/report?{}&shift=night", DAY),
            None,
        )
        .await,
    )
    .await;
    assert_eq!(night["summary"]["totalRevenue"], 1000.0);
    assert_eq!(night["summary"]["totalTransactions"], 1);
}

#[tokio::test]
async fn csv_export_uses_french_format() {
    let app = station_day().await;
    let response = app
        .request_as_admin(
            Method::GET,
            &format!("/api/reports/sales?{}&shift=morning&format=csv", DAY),
            None,
        )
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "text/csv; charset=utf-8"
    );
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"Rapport-Station-Service-2025-04-01-a-2025-04-01-Equipe-Matin.csv\""
    );

    let text = String::from_utf8(response_bytes(response).await).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("Date,Heure,Pompe,Index Précédent"));
    assert_eq!(
        lines[1],
        r#"01/04/2025,08:00:00,Pompe 1,"0,00","200,00","200,00","2,50","500,00""#
    );
}

#[tokio::test]
async fn pdf_export_is_a_complete_document() {
    let app = station_day().await;
    let response = app
        .request_as_admin(
            Method::GET,
            &format!("/api/reports/sales?{}&format=pdf", DAY),
            None,
        )
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.headers()[header::CONTENT_TYPE], "application/pdf");
    let disposition = response.headers()[header::CONTENT_DISPOSITION]
        .to_str()
        .unwrap()
        .to_string();
    assert!(disposition.ends_with("-Toutes-Equipes.pdf\""));

    let bytes = response_bytes(response).await;
    assert!(bytes.starts_with(b"%PDF-1.4"));
    assert!(bytes.ends_with(b"%%EOF\n"));
}

#[tokio::test]
async fn daily_report_is_one_shift_of_one_day() {
    let app = station_day().await;
    let response = app
        .request_as_admin(
            Method::GET,
            "/api/reports/daily?date=2025-04-01&shift=night",
            None,
        )
        .await;
    assert_eq!(response.status(), 200);
    assert_eq!(
        response.headers()[header::CONTENT_DISPOSITION],
        "attachment; filename=\"Rapport-Station-Service-2025-04-01-Equipe-Nuit.csv\""
    );
    let text = String::from_utf8(response_bytes(response).await).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert!(lines[1].starts_with("01/04/2025,20:30:00,Pompe 1"));
}

#[tokio::test]
async fn inverted_range_is_rejected() {
    let app = station_day().await;
    let response = app
        .request_as_admin(
            Method::GET,
            "/api/reports/sales?startDate=2025-04-02&endDate=2025-04-01",
            None,
        )
        .await;
    assert_eq!(response.status(), 400);
}

#[tokio::test]
async fn expenses_list_reports_its_total() {
    let app = station_day().await;
    let response = app
        .request_as_admin(Method::GET, &format!("/api/expenses?{}", DAY), None)
        .await;
    assert_eq!(response.status(), 200);
    let body = response_json(response).await;
    assert_eq!(body["expenses"].as_array().unwrap().len(), 1);
    assert_eq!(body["total"], 300.0);
}

#[tokio::test]
async fn unparsable_date_is_a_json_bad_request() {
    let app = TestApp::new().await;
    let response = app
        .request_as_admin(Method::GET, "/api/reports/sales?startDate=2025-13-45", None)
        .await;
    assert_eq!(response.status(), 400);
    let body = response_json(response).await;
    assert_eq!(body["error"], "Bad Request");
    assert!(body["message"].is_string());
}

#[tokio::test]
async fn expenses_search_matches_description_ignoring_case() {
    let app = station_day().await;
    let found = response_json(
        app.request_as_admin(Method::GET, "/api/expenses?search=CITERNE", None)
            .await,
    )
    .await;
    assert_eq!(found["expenses"].as_array().unwrap().len(), 1);
    assert_eq!(found["total"], 300.0);

    let missing = response_json(
        app.request_as_admin(Method::GET, "/api/expenses?search=loyer", None)
            .await,
    )
    .await;
    assert!(missing["expenses"].as_array().unwrap().is_empty());
    assert_eq!(missing["total"], 0.0);
}
