//! Page rendering through the full router.

use axum::http::StatusCode;
use nexus_integration_tests::TestClient;

#[tokio::test]
async fn test_health() {
    let mut client = TestClient::with_defaults();
    let response = client.get("/health").await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body, "ok");
}

#[tokio::test]
async fn test_home_page_has_security_headers() {
    let mut client = TestClient::with_defaults();
    let response = client.get("/").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Precision Cutting Tools"));
    assert!(response.body.contains("id=\"contact-form\""));

    let policy = response
        .headers
        .get("content-security-policy")
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default();
    assert!(policy.contains("https://checkout.razorpay.com"));
    assert!(response.headers.contains_key("x-request-id"));
}

#[tokio::test]
async fn test_shop_lists_rows_with_tool_ids() {
    let mut client = TestClient::with_defaults();

    let response = client.get("/shop").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("3 Flute Aluminium End Mill 12mm"));

    let response = client.get("/shop?search=face+mill").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Face Mill Body 80mm"));
    // The row without a Tool ID is not offered for sale.
    assert!(!response.body.contains("Face Mill Body 63mm"));
}

#[tokio::test]
async fn test_shop_filters_by_facet_and_search() {
    let mut client = TestClient::with_defaults();
    let response = client.get("/shop?tool_type=Tap&search=blind").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Spiral Flute Tap M8x1.25"));
    assert!(!response.body.contains("Spiral Point Tap M10x1.5"));
    assert!(!response.body.contains("Solid Carbide Drill"));
}

#[tokio::test]
async fn test_shop_in_stock_only_hides_empty_items() {
    let mut client = TestClient::with_defaults();
    let response = client.get("/shop?tool_type=Drill&in_stock=on").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Solid Carbide Drill 8.5mm"));
    assert!(!response.body.contains("Spot Drill 90 Degree 10mm"));
}

#[tokio::test]
async fn test_shop_item_detail_and_missing_item() {
    let mut client = TestClient::with_defaults();

    let response = client.get("/shop/NX-RM-5001").await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Machine Reamer H7 10mm"));
    assert!(response.body.contains("Precision bores to H7 tolerance"));

    let response = client.get("/shop/NX-NOPE").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stock_page_waits_for_a_filter() {
    let mut client = TestClient::with_defaults();
    let response = client.get("/stock").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Enter a search term or choose a filter"));
    assert!(!response.body.contains("NX-EM-1001"));
}

#[tokio::test]
async fn test_stock_page_search_covers_rows_without_ids() {
    let mut client = TestClient::with_defaults();
    let response = client.get("/stock?search=face+mill").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains("Face Mill Body 80mm"));
    // Row 19 has no Tool ID and gets one from its position.
    assert!(response.body.contains("Face Mill Body 63mm"));
    assert!(response.body.contains("T019"));
}

#[tokio::test]
async fn test_stock_page_filters_by_workpiece_material() {
    let mut client = TestClient::with_defaults();
    let response = client.get("/stock?workpiece=Aluminum").await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body.contains(r#"<select name="workpiece">"#));
    assert!(!response.body.contains("Enter a search term or choose a filter"));
    assert!(response.body.contains("3 Flute Aluminium End Mill 12mm"));
    assert!(response.body.contains("DCGT Aluminium Insert"));
    assert!(!response.body.contains("CNMG Turning Insert"));
    assert!(!response.body.contains("ER32 Collet Chuck BT40"));
}

#[tokio::test]
async fn test_stock_page_sorts_by_quantity() {
    let mut client = TestClient::with_defaults();
    let response = client
        .get("/stock?tool_type=Turning+Insert&sort=quantity&dir=desc")
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let cnmg = response.body.find("CNMG Turning Insert");
    let wnmg = response.body.find("WNMG Turning Insert");
    let dcgt = response.body.find("DCGT Aluminium Insert");
    assert!(cnmg.is_some() && wnmg.is_some() && dcgt.is_some());
    assert!(cnmg < wnmg && wnmg < dcgt);
}

#[tokio::test]
async fn test_unknown_route_is_not_found() {
    let mut client = TestClient::with_defaults();
    let response = client.get("/account").await;

    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
