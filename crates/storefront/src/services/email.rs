//! EmailJS client for contact messages, order confirmations and quotes.
//!
//! Every send is one `POST /api/v1.0/email/send` naming a template and the
//! parameters it renders. Recipients are part of the parameters.

use nexus_core::{OrderReceipt, QuoteId, QuoteRequest};
use reqwest::header::{HeaderMap, HeaderValue};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

use crate::config::{EmailJsConfig, InboxConfig};

const SEND_PATH: &str = "api/v1.0/email/send";

const ORDER_CONFIRMATION_TEMPLATE: &str = "order_confirmation";
const ORDER_NOTIFICATION_TEMPLATE: &str = "internal_order_notification";
const QUOTE_REQUEST_TEMPLATE: &str = "quote_request";
const QUOTE_AUTO_REPLY_TEMPLATE: &str = "quote_request_auto_reply";

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API returned an error response.
    #[error("API error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Failed to build the request.
    #[error("Configuration error: {0}")]
    Config(String),
}

/// A message from the home page contact form.
#[derive(Debug, Clone, Serialize)]
pub struct ContactMessage {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub company: String,
    pub message: String,
}

impl ContactMessage {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

#[derive(Serialize)]
struct SendRequest<'a> {
    service_id: &'a str,
    template_id: &'a str,
    user_id: &'a str,
    #[serde(rename = "accessToken", skip_serializing_if = "Option::is_none")]
    access_token: Option<&'a str>,
    template_params: Value,
}

/// EmailJS API client.
#[derive(Clone)]
pub struct EmailClient {
    client: reqwest::Client,
    send_url: Url,
    service_id: String,
    public_key: String,
    private_key: Option<SecretString>,
    contact_template: String,
    inboxes: InboxConfig,
}

impl EmailClient {
    /// Create a new EmailJS client.
    ///
    /// # Errors
    ///
    /// Returns error if the API URL is invalid or the HTTP client fails to build.
    pub fn new(config: &EmailJsConfig, inboxes: &InboxConfig) -> Result<Self, EmailError> {
        let mut headers = HeaderMap::new();
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .build()?;

        let base = format!("{}/", config.api_url.trim_end_matches('/'));
        let send_url = Url::parse(&base)
            .and_then(|base| base.join(SEND_PATH))
            .map_err(|e| EmailError::Config(format!("Invalid API URL: {e}")))?;

        Ok(Self {
            client,
            send_url,
            service_id: config.service_id.clone(),
            public_key: config.public_key.clone(),
            private_key: config.private_key.clone(),
            contact_template: config.contact_template.clone(),
            inboxes: inboxes.clone(),
        })
    }

    /// Send one templated email.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or EmailJS rejects it.
    #[instrument(skip(self, template_params))]
    pub async fn send(&self, template_id: &str, template_params: Value) -> Result<(), EmailError> {
        let body = SendRequest {
            service_id: &self.service_id,
            template_id,
            user_id: &self.public_key,
            access_token: self.private_key.as_ref().map(|key| key.expose_secret()),
            template_params,
        };

        let response = self
            .client
            .post(self.send_url.clone())
            .json(&body)
            .send()
            .await?;
        let status = response.status();

        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(EmailError::Api {
                status: status.as_u16(),
                message,
            });
        }

        debug!("Email sent");
        Ok(())
    }

    /// Forward a contact form message to the contact inbox.
    ///
    /// # Errors
    ///
    /// Returns error if sending fails.
    pub async fn send_contact(&self, message: &ContactMessage) -> Result<(), EmailError> {
        let params = json!({
            "to_email": self.inboxes.contact_email,
            "from_name": message.full_name(),
            "from_email": message.email.trim(),
            "phone": message.phone.trim(),
            "company": message.company.trim(),
            "message": message.message.trim(),
            "reply_to": message.email.trim(),
        });
        self.send(&self.contact_template, params).await
    }

    /// Confirm an order to the customer and notify the sales inbox.
    ///
    /// # Errors
    ///
    /// Returns the first failure; the internal notice is not sent if the
    /// customer confirmation fails.
    pub async fn send_order_confirmation(&self, receipt: &OrderReceipt) -> Result<(), EmailError> {
        let order = &receipt.order;
        let customer = &order.customer_info;
        let params = json!({
            "to_email": customer.email.trim(),
            "customer_name": customer.contact_name.trim(),
            "company_name": customer.company_name.trim(),
            "order_id": order.id.as_str(),
            "order_total": order.totals.total.to_string(),
            "payment_id": receipt.payment_id.as_deref().unwrap_or("Pending"),
            "payment_method": order.payment_method.label(),
            "order_items": order.items_summary(),
            "delivery_address": customer.full_address(),
        });
        self.send(ORDER_CONFIRMATION_TEMPLATE, params).await?;
        self.send_order_notification(receipt).await
    }

    async fn send_order_notification(&self, receipt: &OrderReceipt) -> Result<(), EmailError> {
        let order = &receipt.order;
        let customer = &order.customer_info;
        let params = json!({
            "to_email": self.inboxes.sales_email,
            "order_id": order.id.as_str(),
            "customer_name": customer.contact_name.trim(),
            "company_name": customer.company_name.trim(),
            "customer_email": customer.email.trim(),
            "customer_phone": customer.phone.trim(),
            "gst_number": customer.gst_or_placeholder(),
            "order_total": order.totals.total.to_string(),
            "payment_method": order.payment_method.label(),
            "order_items": order.items_summary(),
        });
        self.send(ORDER_NOTIFICATION_TEMPLATE, params).await
    }

    /// Send a quote request to the sales inbox.
    ///
    /// # Errors
    ///
    /// Returns error if sending fails.
    pub async fn send_quote_request(
        &self,
        quote: &QuoteRequest,
        quote_id: &QuoteId,
    ) -> Result<(), EmailError> {
        let params = json!({
            "to_email": self.inboxes.sales_email,
            "quote_id": quote_id.as_str(),
            "from_name": quote.customer_name.trim(),
            "from_email": quote.email.trim(),
            "company_name": quote.company_or_individual(),
            "phone": quote.phone_or_placeholder(),
            "subject": quote.subject(),
            "customer_details": quote.customer_details(),
            "product_details": quote.product_details(),
            "quote_details": quote.quote_details(),
            "message": quote.message.trim(),
            "quote_type": quote.kind.label(),
        });
        self.send(QUOTE_REQUEST_TEMPLATE, params).await
    }

    /// Acknowledge a quote request to the customer.
    ///
    /// # Errors
    ///
    /// Returns error if sending fails.
    pub async fn send_quote_auto_reply(
        &self,
        quote: &QuoteRequest,
        quote_id: &QuoteId,
    ) -> Result<(), EmailError> {
        let params = json!({
            "to_email": quote.email.trim(),
            "customer_name": quote.customer_name.trim(),
            "quote_id": quote_id.as_str(),
        });
        self.send(QUOTE_AUTO_REPLY_TEMPLATE, params).await
    }
}
