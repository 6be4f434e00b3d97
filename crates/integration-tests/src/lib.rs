//! Integration tests for the Nexus Automation storefront.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p nexus-integration-tests
//! ```
//!
//! Requests are driven through the full router (middleware included) with
//! `tower::ServiceExt::oneshot`; EmailJS and Airtable are replaced by
//! `wiremock` servers. No network access or running server is needed.
//!
//! # Test Categories
//!
//! - `storefront_pages` - Page rendering, filters and health
//! - `cart_checkout` - Cart, checkout, payment and confirmation flows
//! - `forms` - Contact and quote submissions
//! - `airtable` - Stock table client and the Airtable-backed stock page

#![allow(clippy::missing_panics_doc)]

use std::collections::HashMap;

use axum::Router;
use axum::body::Body;
use axum::http::{HeaderMap, Request, StatusCode, header};
use nexus_storefront::config::StorefrontConfig;
use nexus_storefront::middleware::session::SESSION_COOKIE_NAME;
use nexus_storefront::state::AppState;
use tower::ServiceExt;

/// Largest response body the helpers will buffer.
const BODY_LIMIT: usize = 4 * 1024 * 1024;

/// Catalog spreadsheet shipped with the storefront.
#[must_use]
pub fn catalog_path() -> String {
    format!(
        "{}/../storefront/data/cutting_tools_catalog.csv",
        env!("CARGO_MANIFEST_DIR")
    )
}

/// Variables every test configuration starts from.
#[must_use]
pub fn base_vars() -> HashMap<String, String> {
    HashMap::from([
        ("NEXUS_BASE_URL".to_string(), "http://localhost:3000".to_string()),
        ("CATALOG_SPREADSHEET_PATH".to_string(), catalog_path()),
    ])
}

/// Variables pointing EmailJS at a mock server.
#[must_use]
pub fn email_vars(api_url: &str) -> HashMap<String, String> {
    let mut vars = base_vars();
    vars.extend([
        ("EMAILJS_API_URL".to_string(), api_url.to_string()),
        ("EMAILJS_SERVICE_ID".to_string(), "service_nexus".to_string()),
        ("EMAILJS_PUBLIC_KEY".to_string(), "pk_nexus".to_string()),
        ("SALES_EMAIL".to_string(), "sales@nexus.test".to_string()),
        ("CONTACT_EMAIL".to_string(), "contact@nexus.test".to_string()),
    ]);
    vars
}

/// Build a configuration from a variable map.
///
/// # Panics
///
/// Panics if the variables do not form a valid configuration.
#[must_use]
pub fn config(vars: &HashMap<String, String>) -> StorefrontConfig {
    StorefrontConfig::from_lookup(|key| vars.get(key).cloned())
        .unwrap_or_else(|e| panic!("invalid test configuration: {e}"))
}

/// A buffered response.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: String,
}

impl TestResponse {
    /// Redirect target, if any.
    #[must_use]
    pub fn location(&self) -> Option<&str> {
        self.headers
            .get(header::LOCATION)
            .and_then(|value| value.to_str().ok())
    }

    /// Parse the body as JSON.
    ///
    /// # Panics
    ///
    /// Panics if the body is not JSON.
    #[must_use]
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_str(&self.body)
            .unwrap_or_else(|e| panic!("response is not JSON ({e}): {}", self.body))
    }
}

/// One visitor talking to an in-process storefront.
///
/// Carries the session cookie between requests like a browser would.
pub struct TestClient {
    router: Router,
    cookie: Option<String>,
    client_ip: String,
}

impl TestClient {
    /// Start a storefront with the given configuration.
    ///
    /// # Panics
    ///
    /// Panics if the application state cannot be built.
    #[must_use]
    pub fn new(config: StorefrontConfig) -> Self {
        let state = AppState::new(config)
            .unwrap_or_else(|e| panic!("failed to build app state: {e}"));
        Self {
            router: nexus_storefront::app(state),
            cookie: None,
            client_ip: "203.0.113.10".to_string(),
        }
    }

    /// Start a storefront with only the base variables.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(config(&base_vars()))
    }

    /// Use a different client address for rate limiting.
    #[must_use]
    pub fn from_ip(mut self, ip: &str) -> Self {
        self.client_ip = ip.to_string();
        self
    }

    /// Send a GET request.
    pub async fn get(&mut self, uri: &str) -> TestResponse {
        self.send(Request::get(uri), Body::empty()).await
    }

    /// Send a GET request marked as a fragment request.
    pub async fn get_fragment(&mut self, uri: &str) -> TestResponse {
        self.send(Request::get(uri).header("hx-request", "true"), Body::empty())
            .await
    }

    /// POST an urlencoded form.
    pub async fn post_form(&mut self, uri: &str, fields: &[(&str, &str)]) -> TestResponse {
        let builder = Request::post(uri).header(
            header::CONTENT_TYPE,
            "application/x-www-form-urlencoded",
        );
        self.send(builder, Body::from(encode_form(fields))).await
    }

    /// POST an urlencoded form marked as a fragment request.
    pub async fn post_form_fragment(
        &mut self,
        uri: &str,
        fields: &[(&str, &str)],
    ) -> TestResponse {
        let builder = Request::post(uri)
            .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
            .header("hx-request", "true");
        self.send(builder, Body::from(encode_form(fields))).await
    }

    /// POST a JSON body.
    pub async fn post_json(&mut self, uri: &str, body: &serde_json::Value) -> TestResponse {
        let builder = Request::post(uri).header(header::CONTENT_TYPE, "application/json");
        self.send(builder, Body::from(body.to_string())).await
    }

    async fn send(&mut self, builder: axum::http::request::Builder, body: Body) -> TestResponse {
        let mut builder = builder.header("x-forwarded-for", &self.client_ip);
        if let Some(cookie) = &self.cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        let request = builder
            .body(body)
            .unwrap_or_else(|e| panic!("invalid request: {e}"));

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .unwrap_or_else(|e| panic!("request failed: {e}"));

        let status = response.status();
        let headers = response.headers().clone();
        self.remember_session(&headers);

        let bytes = axum::body::to_bytes(response.into_body(), BODY_LIMIT)
            .await
            .unwrap_or_else(|e| panic!("failed to read body: {e}"));
        TestResponse {
            status,
            headers,
            body: String::from_utf8_lossy(&bytes).into_owned(),
        }
    }

    fn remember_session(&mut self, headers: &HeaderMap) {
        let prefix = format!("{SESSION_COOKIE_NAME}=");
        for value in headers.get_all(header::SET_COOKIE) {
            if let Some(pair) = value
                .to_str()
                .ok()
                .and_then(|cookie| cookie.split(';').next())
                .filter(|pair| pair.starts_with(&prefix))
            {
                self.cookie = Some(pair.to_string());
            }
        }
    }
}

fn encode_form(fields: &[(&str, &str)]) -> String {
    url::form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish()
}

/// Customer fields that pass checkout validation.
#[must_use]
pub fn valid_customer() -> Vec<(&'static str, &'static str)> {
    vec![
        ("step", "customer"),
        ("company_name", "Precision Gears Pvt Ltd"),
        ("contact_name", "Anitha R"),
        ("email", "anitha@precisiongears.test"),
        ("phone", "98430 12345"),
        ("address", "14 SIDCO Industrial Estate"),
        ("city", "Coimbatore"),
        ("state", "Tamil Nadu"),
        ("pincode", "641021"),
        ("gst", "33AABCP1234F1Z5"),
    ]
}
