//! Quote request form.
//!
//! A quote can start from one tool (`?product=T001&name=...`), from a
//! bulk selection (`?products=T001,T002&type=bulk`) or blank. The tool a
//! visitor last asked about is remembered in the session until a request
//! is sent.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{RawQuery, State},
    response::IntoResponse,
};
use nexus_core::quote::TIMELINES;
use nexus_core::{CatalogItem, FieldErrors, QuoteId, QuoteKind, QuoteRequest, ToolId};
use serde::Deserialize;
use tracing::instrument;
use url::form_urlencoded;

use crate::error::Result;
use crate::filters;
use crate::middleware::CspNonce;
use crate::models::VisitorSession;
use crate::state::AppState;

/// Where a quote request started from.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct QuoteTarget {
    pub product: Option<ToolId>,
    pub name: Option<String>,
    pub products: Vec<ToolId>,
    pub kind: QuoteKind,
}

impl QuoteTarget {
    /// Read the target from a query string.
    ///
    /// `products` may repeat and each value may hold a comma separated list.
    #[must_use]
    pub fn from_query(query: &str) -> Self {
        let mut target = Self::default();
        for (key, value) in form_urlencoded::parse(query.as_bytes()) {
            let value = value.trim();
            if value.is_empty() {
                continue;
            }
            match key.as_ref() {
                "product" => target.product = Some(ToolId::new(value)),
                "name" => target.name = Some(value.to_string()),
                "products" => target.products.extend(
                    value
                        .split(',')
                        .map(str::trim)
                        .filter(|id| !id.is_empty())
                        .map(ToolId::new),
                ),
                "type" => target.kind = QuoteKind::parse(value),
                _ => {}
            }
        }
        if !target.products.is_empty() && target.product.is_none() {
            target.kind = QuoteKind::Bulk;
        }
        target
    }
}

/// Submitted quote form.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct QuoteForm {
    pub customer_name: String,
    pub company_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub quantity: String,
    pub timeline: String,
    pub application_details: String,
    pub additional_requirements: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub product: String,
    pub product_name: String,
    pub products: String,
}

pub struct TimelineOption {
    pub value: &'static str,
    pub label: &'static str,
    pub selected: bool,
}

/// Quote request template.
#[derive(Template, WebTemplate)]
#[template(path = "quote.html")]
pub struct QuoteTemplate {
    pub quote: QuoteRequest,
    pub bulk: bool,
    pub product_id: String,
    pub product_ids: String,
    pub timelines: Vec<TimelineOption>,
    pub errors: FieldErrors,
    pub error: Option<String>,
    pub sent: Option<String>,
    pub nonce: String,
}

impl QuoteTemplate {
    fn new(quote: QuoteRequest, nonce: String) -> Self {
        let product_id = quote
            .product
            .as_ref()
            .map(|item| item.id.to_string())
            .unwrap_or_default();
        let product_ids = quote
            .product_ids
            .iter()
            .map(ToolId::as_str)
            .collect::<Vec<_>>()
            .join(",");
        let timelines = TIMELINES
            .into_iter()
            .map(|(value, label)| TimelineOption {
                value,
                label,
                selected: value == quote.timeline,
            })
            .collect();

        Self {
            bulk: quote.kind == QuoteKind::Bulk,
            product_id,
            product_ids,
            timelines,
            quote,
            errors: FieldErrors::new(),
            error: None,
            sent: None,
            nonce,
        }
    }
}

/// Build the prefilled request for a target.
///
/// A tool found in the catalog (or remembered in the session) gives the
/// full snapshot; otherwise the name from the link is used.
fn prefill(
    target: &QuoteTarget,
    found: Option<&CatalogItem>,
    remembered: Option<QuoteRequest>,
) -> QuoteRequest {
    if let Some(id) = &target.product {
        if let Some(item) = found {
            return QuoteRequest::for_product(item);
        }
        if let Some(remembered) =
            remembered.filter(|r| r.product.as_ref().is_some_and(|item| &item.id == id))
        {
            return remembered;
        }
        let name = target.name.as_deref().unwrap_or(id.as_str());
        return QuoteRequest::for_named(id, name);
    }

    if !target.products.is_empty() {
        return QuoteRequest::for_bulk(target.products.clone());
    }

    remembered.unwrap_or_default()
}

/// Display the quote form.
#[instrument(skip(state, session, query, nonce))]
pub async fn show(
    State(state): State<AppState>,
    session: VisitorSession,
    RawQuery(query): RawQuery,
    CspNonce(nonce): CspNonce,
) -> Result<impl IntoResponse> {
    let target = QuoteTarget::from_query(query.as_deref().unwrap_or(""));

    let found = match &target.product {
        Some(id) => state.catalog().find(id).await,
        None => None,
    };
    let remembered = session.quote_product().await?;
    let quote = prefill(&target, found.as_ref(), remembered);

    if quote.product.is_some() {
        session.set_quote_product(&quote).await?;
    }

    Ok(QuoteTemplate::new(quote, nonce))
}

/// Send a quote request to the sales inbox.
#[instrument(skip(state, session, form, nonce), fields(email = %form.email))]
pub async fn submit(
    State(state): State<AppState>,
    session: VisitorSession,
    CspNonce(nonce): CspNonce,
    Form(form): Form<QuoteForm>,
) -> Result<impl IntoResponse> {
    let product = match form.product.trim() {
        "" => None,
        id => state.catalog().find(&ToolId::new(id)).await,
    };
    let product_ids = form
        .products
        .split(',')
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .map(ToolId::new)
        .collect();
    let product_name = product
        .as_ref()
        .map(|item| item.name.clone())
        .or_else(|| Some(form.product_name.trim().to_string()).filter(|n| !n.is_empty()));

    let quote = QuoteRequest {
        customer_name: form.customer_name.trim().to_string(),
        company_name: form.company_name.trim().to_string(),
        email: form.email.trim().to_string(),
        phone: form.phone.trim().to_string(),
        address: form.address.trim().to_string(),
        quantity: form.quantity.trim().to_string(),
        timeline: form.timeline.trim().to_string(),
        application_details: form.application_details,
        additional_requirements: form.additional_requirements,
        message: form.message,
        kind: QuoteKind::parse(&form.kind),
        product,
        product_name,
        product_ids,
    };

    let mut page = QuoteTemplate::new(quote, nonce);
    if let Err(errors) = page.quote.validate() {
        page.errors = errors;
        return Ok(page);
    }

    let Some(email) = state.email() else {
        tracing::error!("EmailJS not configured, quote request dropped");
        page.error = Some("Failed to send quote request. Please try again.".to_string());
        return Ok(page);
    };

    let quote_id = QuoteId::generate();
    if let Err(e) = email.send_quote_request(&page.quote, &quote_id).await {
        let event_id = sentry::capture_error(&e);
        tracing::error!(error = %e, sentry_event_id = %event_id, "Failed to send quote request");
        page.error = Some("Failed to send quote request. Please try again.".to_string());
        return Ok(page);
    }

    if let Err(e) = email.send_quote_auto_reply(&page.quote, &quote_id).await {
        tracing::warn!(error = %e, quote_id = %quote_id, "Quote auto-reply failed");
    }

    session.clear_quote_product().await?;
    tracing::info!(quote_id = %quote_id, kind = page.quote.kind.label(), "Quote request sent");
    page.sent = Some(quote_id.to_string());
    Ok(page)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use nexus_core::catalog::sample_catalog;

    use super::*;

    #[test]
    fn test_target_single_product() {
        let target = QuoteTarget::from_query("product=T001&name=Solid%20End%20Mill");
        assert_eq!(target.product, Some(ToolId::new("T001")));
        assert_eq!(target.name.as_deref(), Some("Solid End Mill"));
        assert_eq!(target.kind, QuoteKind::Standard);
    }

    #[test]
    fn test_target_bulk_accepts_lists_and_repeats() {
        let target = QuoteTarget::from_query("products=T001,T002&products=T005&type=bulk");
        assert_eq!(
            target.products,
            vec![ToolId::new("T001"), ToolId::new("T002"), ToolId::new("T005")]
        );
        assert_eq!(target.kind, QuoteKind::Bulk);

        let implied = QuoteTarget::from_query("products=T003");
        assert_eq!(implied.kind, QuoteKind::Bulk);
    }

    #[test]
    fn test_prefill_prefers_catalog_snapshot() {
        let catalog = sample_catalog();
        let item = &catalog[0];
        let target = QuoteTarget::from_query(&format!("product={}&name=Other", item.id));
        let quote = prefill(&target, Some(item), None);
        assert_eq!(quote.product.as_ref().unwrap().id, item.id);
        assert!(quote.message.contains(&item.brand));
    }

    #[test]
    fn test_prefill_uses_session_then_name() {
        let catalog = sample_catalog();
        let item = &catalog[1];
        let remembered = QuoteRequest::for_product(item);
        let target = QuoteTarget::from_query(&format!("product={}", item.id));
        let quote = prefill(&target, None, Some(remembered.clone()));
        assert_eq!(quote, remembered);

        let target = QuoteTarget::from_query("product=X9&name=Custom%20Reamer");
        let quote = prefill(&target, None, Some(remembered));
        assert!(quote.product.is_none());
        assert!(quote.message.contains("Custom Reamer (Part #X9)"));
    }

    #[test]
    fn test_prefill_bulk() {
        let target = QuoteTarget::from_query("products=T001,T004");
        let quote = prefill(&target, None, None);
        assert_eq!(quote.kind, QuoteKind::Bulk);
        assert!(quote.message.contains("Product IDs: T001,T004"));
    }
}
