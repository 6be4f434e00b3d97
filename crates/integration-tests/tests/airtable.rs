//! Airtable stock table client and the Airtable-backed stock page.

use std::collections::HashMap;

use axum::http::StatusCode;
use nexus_core::ToolId;
use nexus_integration_tests::{TestClient, base_vars, config};
use nexus_storefront::config::AirtableConfig;
use nexus_storefront::services::{AirtableClient, AirtableError};
use serde_json::json;
use wiremock::matchers::{body_partial_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const API_KEY: &str = "patQ8f2LkM1xZ9.b7c4e1a9f03d52c8e6b1a7d4f9c2e05b";
const TABLE_PATH: &str = "/v0/appNexus/Stock";

fn airtable_vars(server: &MockServer) -> HashMap<String, String> {
    let mut vars = base_vars();
    vars.extend([
        ("AIRTABLE_API_URL".to_string(), format!("{}/v0", server.uri())),
        ("AIRTABLE_BASE_ID".to_string(), "appNexus".to_string()),
        ("AIRTABLE_API_KEY".to_string(), API_KEY.to_string()),
    ]);
    vars
}

fn client(server: &MockServer) -> AirtableClient {
    let config = config(&airtable_vars(server));
    let airtable: &AirtableConfig = config
        .airtable
        .as_ref()
        .unwrap_or_else(|| panic!("airtable not configured"));
    AirtableClient::new(airtable).unwrap_or_else(|e| panic!("client: {e}"))
}

fn record(record_id: &str, id: &str, name: &str, quantity: u32, min_stock: u32) -> serde_json::Value {
    json!({
        "id": record_id,
        "createdTime": "2024-05-01T10:00:00.000Z",
        "fields": {
            "id": id,
            "name": name,
            "category": "Drill",
            "brand": "Guhring",
            "quantity": quantity,
            "minStock": min_stock,
            "price": "980",
            "location": "Rack B2",
            "lastUpdated": "2024-05-01",
            "description": "Cobalt drill",
        },
    })
}

#[tokio::test]
async fn test_list_stock_follows_offsets() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .and(query_param("offset", "itrPage2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [record("rec2", "NX-DR-2004", "Cobalt Drill 12mm", 4, 5)],
        })))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .and(query_param("maxRecords", "1000"))
        .and(query_param("view", "Grid view"))
        .and(header("authorization", format!("Bearer {API_KEY}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [record("rec1", "NX-DR-2002", "HSS Jobber Drill 5mm", 150, 20)],
            "offset": "itrPage2",
        })))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    let records = client(&server).list_stock().await.unwrap_or_else(|e| panic!("{e}"));

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].record_id, "rec1");
    assert_eq!(records[0].quantity, 150);
    assert_eq!(records[1].id, ToolId::new("NX-DR-2004"));
    assert_eq!(records[1].min_stock, 5);
    assert_eq!(records[1].location, "Rack B2");
}

#[tokio::test]
async fn test_update_quantity_patches_found_record() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .and(query_param("filterByFormula", "{id}='NX-DR-2004'"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [record("recDrill", "NX-DR-2004", "Cobalt Drill 12mm", 4, 5)],
        })))
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .and(path(format!("{TABLE_PATH}/recDrill")))
        .and(body_partial_json(json!({
            "fields": { "quantity": 42, "lastUpdated": "2024-06-15" },
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(record(
            "recDrill",
            "NX-DR-2004",
            "Cobalt Drill 12mm",
            42,
            5,
        )))
        .expect(1)
        .mount(&server)
        .await;

    let today = chrono_date(2024, 6, 15);
    let updated = client(&server)
        .update_quantity(&ToolId::new("NX-DR-2004"), 42, today)
        .await
        .unwrap_or_else(|e| panic!("{e}"));

    assert_eq!(updated.quantity, 42);
}

#[tokio::test]
async fn test_update_quantity_unknown_tool() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "records": [] })))
        .mount(&server)
        .await;

    let result = client(&server)
        .update_quantity(&ToolId::new("NX-NOPE"), 1, chrono_date(2024, 6, 15))
        .await;

    assert!(matches!(result, Err(AirtableError::RecordNotFound(_))));
}

#[tokio::test]
async fn test_api_error_is_reported() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(401).set_body_string("AUTHENTICATION_REQUIRED"))
        .mount(&server)
        .await;

    let result = client(&server).list_stock().await;

    assert!(matches!(result, Err(AirtableError::Api { status: 401, .. })));
}

#[tokio::test]
async fn test_stock_page_reads_airtable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "records": [
                record("rec1", "NX-DR-2002", "HSS Jobber Drill 5mm", 150, 20),
                record("rec2", "NX-DR-2004", "Cobalt Drill 12mm", 4, 5),
            ],
        })))
        .mount(&server)
        .await;

    let mut vars = airtable_vars(&server);
    vars.insert("STOCK_SOURCE".to_string(), "airtable".to_string());
    let mut client = TestClient::new(config(&vars));

    let response = client.get("/stock?search=drill").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("live stock table"));
    assert!(response.body.contains("HSS Jobber Drill 5mm"));
    assert!(response.body.contains("Cobalt Drill 12mm"));
    // Four on hand against a minimum of five.
    assert!(response.body.contains("low-stock"));
}

#[tokio::test]
async fn test_stock_page_reports_airtable_outage() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(TABLE_PATH))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let mut vars = airtable_vars(&server);
    vars.insert("STOCK_SOURCE".to_string(), "airtable".to_string());
    let mut client = TestClient::new(config(&vars));

    let response = client.get("/stock?search=drill").await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
}

fn chrono_date(year: i32, month: u32, day: u32) -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(year, month, day)
        .unwrap_or_else(|| panic!("invalid date {year}-{month}-{day}"))
}
