//! Contact and quote submissions.

use axum::http::StatusCode;
use nexus_integration_tests::{TestClient, config, email_vars};
use serde_json::json;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SEND_PATH: &str = "/api/v1.0/email/send";

async fn accepting_server() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(&server)
        .await;
    server
}

fn quote_fields<'a>(extra: &[(&'a str, &'a str)]) -> Vec<(&'a str, &'a str)> {
    let mut fields = vec![
        ("customer_name", "Karthik S"),
        ("company_name", "Sri Murugan Engineering"),
        ("email", "karthik@smeng.test"),
        ("phone", "9842012345"),
        ("quantity", "25"),
        ("timeline", "1-2 weeks"),
        ("message", "Please quote for 25 pieces."),
    ];
    fields.extend_from_slice(extra);
    fields
}

#[tokio::test]
async fn test_contact_message_is_forwarded() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .and(body_partial_json(json!({
            "service_id": "service_nexus",
            "template_id": "template_contact",
            "user_id": "pk_nexus",
            "template_params": {
                "to_email": "contact@nexus.test",
                "from_name": "Meena Iyer",
                "reply_to": "meena@example.test",
            },
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = TestClient::new(config(&email_vars(&server.uri())));
    let response = client
        .post_json(
            "/contact",
            &json!({
                "first_name": "Meena",
                "last_name": "Iyer",
                "email": "meena@example.test",
                "message": "Do you stock PCD inserts?",
            }),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body["success"], true);
    assert!(body["message"].as_str().unwrap_or_default().starts_with("Thank you!"));
}

#[tokio::test]
async fn test_contact_validation() {
    let server = MockServer::start().await;
    let mut client = TestClient::new(config(&email_vars(&server.uri())));

    let response = client
        .post_json(
            "/contact",
            &json!({ "first_name": "Meena", "email": "not-an-email", "message": "Hello" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.json()["success"], false);

    let response = client
        .post_json(
            "/contact",
            &json!({ "first_name": " ", "email": "meena@example.test", "message": "Hello" }),
        )
        .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_contact_without_email_service() {
    let mut client = TestClient::with_defaults();
    let response = client
        .post_json(
            "/contact",
            &json!({ "first_name": "Meena", "email": "meena@example.test", "message": "Hello" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(response.json()["success"], false);
}

#[tokio::test]
async fn test_contact_delivery_failure() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .respond_with(ResponseTemplate::new(400).set_body_string("The template ID is invalid"))
        .mount(&server)
        .await;

    let mut client = TestClient::new(config(&email_vars(&server.uri())));
    let response = client
        .post_json(
            "/contact",
            &json!({ "first_name": "Meena", "email": "meena@example.test", "message": "Hello" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_GATEWAY);
    let body = response.json();
    assert_eq!(body["success"], false);
    assert!(!body["message"].as_str().unwrap_or_default().contains("template ID"));
}

#[tokio::test]
async fn test_contact_is_rate_limited() {
    let server = accepting_server().await;
    let mut client = TestClient::new(config(&email_vars(&server.uri()))).from_ip("198.51.100.7");
    let body = json!({ "first_name": "Meena", "email": "meena@example.test", "message": "Hello" });

    let mut statuses = Vec::new();
    for _ in 0..8 {
        statuses.push(client.post_json("/contact", &body).await.status);
    }

    assert_eq!(statuses[0], StatusCode::OK);
    assert!(statuses.contains(&StatusCode::TOO_MANY_REQUESTS));
}

#[tokio::test]
async fn test_quote_page_prefills_product() {
    let mut client = TestClient::with_defaults();
    let response = client.get("/quote?product=NX-RM-5001").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Machine Reamer H7 10mm"));
    assert!(response.body.contains("Part Number: NX-RM-5001"));
    assert!(response.body.contains("Request a Quote"));
}

#[tokio::test]
async fn test_bulk_quote_page_lists_tools() {
    let mut client = TestClient::with_defaults();
    let response = client
        .get("/quote?products=NX-EM-1001&products=NX-DR-2001")
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Bulk Quote Request"));
    assert!(response.body.contains("NX-EM-1001,NX-DR-2001"));
}

#[tokio::test]
async fn test_quote_submission_sends_request_and_auto_reply() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .and(body_partial_json(json!({
            "template_id": "quote_request",
            "template_params": {
                "to_email": "sales@nexus.test",
                "from_email": "karthik@smeng.test",
                "company_name": "Sri Murugan Engineering",
            },
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .and(body_partial_json(json!({
            "template_id": "quote_request_auto_reply",
            "template_params": { "to_email": "karthik@smeng.test" },
        })))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = TestClient::new(config(&email_vars(&server.uri())));
    client.get("/quote?product=NX-RM-5001").await;
    let response = client
        .post_form(
            "/quote",
            &quote_fields(&[
                ("type", "standard"),
                ("product", "NX-RM-5001"),
                ("product_name", "Machine Reamer H7 10mm"),
            ]),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Quote request sent"));
    assert!(response.body.contains("QT"));
}

#[tokio::test]
async fn test_quote_auto_reply_failure_still_confirms() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .and(body_partial_json(json!({ "template_id": "quote_request" })))
        .respond_with(ResponseTemplate::new(200).set_body_string("OK"))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path(SEND_PATH))
        .and(body_partial_json(json!({ "template_id": "quote_request_auto_reply" })))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let mut client = TestClient::new(config(&email_vars(&server.uri())));
    let response = client.post_form("/quote", &quote_fields(&[])).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Quote request sent"));
}

#[tokio::test]
async fn test_quote_validation_keeps_input() {
    let server = MockServer::start().await;
    let mut client = TestClient::new(config(&email_vars(&server.uri())));

    let mut fields = quote_fields(&[]);
    for field in &mut fields {
        match field.0 {
            "quantity" => field.1 = "0",
            "email" => field.1 = "karthik",
            _ => {}
        }
    }
    let response = client.post_form("/quote", &fields).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Quantity must be a whole number of at least 1"));
    assert!(response.body.contains("Email is invalid"));
    assert!(response.body.contains("Sri Murugan Engineering"));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_quote_without_email_service() {
    let mut client = TestClient::with_defaults();
    let response = client.post_form("/quote", &quote_fields(&[])).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Failed to send quote request. Please try again."));
}
