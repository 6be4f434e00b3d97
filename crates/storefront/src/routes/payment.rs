//! Payment widget page and its success callback.
//!
//! The widget runs in the browser. This page renders its options and
//! `payment.js` posts the returned payment id to `/payment/complete`.
//! The payment id is recorded as given; it is not verified with the
//! gateway.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use nexus_core::OrderDraft;
use nexus_core::types::money::CURRENCY_CODE;
use serde::Deserialize;
use serde_json::json;
use tracing::instrument;

use super::cart::{CartLineView, TotalsView};
use super::orders;
use crate::error::{AppError, Result};
use crate::filters;
use crate::middleware::CspNonce;
use crate::middleware::security_headers::PAYMENT_WIDGET_ORIGIN;
use crate::models::VisitorSession;
use crate::state::AppState;

const MERCHANT_NAME: &str = "NEXUS AUTOMATION";
const THEME_COLOR: &str = "#475569";

/// Success callback form data.
#[derive(Debug, Deserialize)]
pub struct CompleteForm {
    pub order_id: String,
    #[serde(default)]
    pub payment_id: String,
}

/// Payment page template.
#[derive(Template, WebTemplate)]
#[template(path = "payment.html")]
pub struct PaymentTemplate {
    pub order_id: String,
    pub customer_name: String,
    pub company_name: String,
    pub lines: Vec<CartLineView>,
    pub totals: TotalsView,
    /// Widget options as JSON, safe to embed in a `<script>` element.
    pub options_json: Option<String>,
    pub widget_src: String,
    pub error: Option<String>,
    pub nonce: String,
}

/// Options object handed to the payment widget.
///
/// # Errors
///
/// Returns an error if the order total does not fit in paise.
pub fn widget_options(draft: &OrderDraft, key_id: &str) -> Result<serde_json::Value> {
    let amount = draft
        .amount_paise()
        .ok_or_else(|| AppError::Internal(format!("order {} total out of range", draft.id)))?;
    let customer = &draft.customer_info;

    Ok(json!({
        "key": key_id,
        "amount": amount,
        "currency": CURRENCY_CODE,
        "name": MERCHANT_NAME,
        "description": format!("Order #{}", draft.id),
        "prefill": {
            "name": customer.contact_name,
            "email": customer.email,
            "contact": customer.phone,
        },
        "notes": {
            "order_id": draft.id.as_str(),
            "company": customer.company_name,
            "gst": customer.gst_or_placeholder(),
        },
        "theme": { "color": THEME_COLOR },
    }))
}

/// Serialize JSON for an inline `<script type="application/json">` block.
fn embeddable_json(value: &serde_json::Value) -> String {
    value
        .to_string()
        .replace('<', "\\u003c")
        .replace('>', "\\u003e")
        .replace('&', "\\u0026")
}

/// Display the payment page for the pending order.
#[instrument(skip(state, session, nonce))]
pub async fn show(
    State(state): State<AppState>,
    session: VisitorSession,
    CspNonce(nonce): CspNonce,
) -> Result<Response> {
    let Some(draft) = session.order_draft().await? else {
        return Ok(Redirect::to("/checkout").into_response());
    };
    if !draft.payment_method.uses_gateway() {
        return Ok(Redirect::to("/checkout?step=payment").into_response());
    }

    let (options_json, error) = match state.config().payment.razorpay_key_id.as_deref() {
        Some(key_id) => (
            Some(embeddable_json(&widget_options(&draft, key_id)?)),
            None,
        ),
        None => {
            tracing::warn!(order_id = %draft.id, "Payment page requested without a gateway key");
            (
                None,
                Some("Online payment is not available right now. Please choose another payment method.".to_string()),
            )
        }
    };

    Ok(PaymentTemplate {
        order_id: draft.id.to_string(),
        customer_name: draft.customer_info.contact_name.clone(),
        company_name: draft.customer_info.company_name.clone(),
        lines: draft.cart.iter().map(CartLineView::from).collect(),
        totals: TotalsView::new(&draft.totals, state.pricing()),
        options_json,
        widget_src: format!("{PAYMENT_WIDGET_ORIGIN}/v1/checkout.js"),
        error,
        nonce,
    }
    .into_response())
}

/// Record a successful payment and complete the order.
#[instrument(skip(state, session, form), fields(order_id = %form.order_id))]
pub async fn complete(
    State(state): State<AppState>,
    session: VisitorSession,
    Form(form): Form<CompleteForm>,
) -> Result<Response> {
    let Some(draft) = session.order_draft().await? else {
        // A repeated callback after completion lands on the receipt.
        if session.order_receipt().await?.is_some() {
            return Ok(Redirect::to("/orders/confirmation").into_response());
        }
        return Ok(Redirect::to("/checkout").into_response());
    };

    if draft.id.as_str() != form.order_id.trim() {
        return Err(AppError::BadRequest(format!(
            "payment callback for unknown order {}",
            form.order_id
        )));
    }

    let payment_id = form.payment_id.trim().to_string();
    if payment_id.is_empty() {
        tracing::warn!("Payment callback without a payment id");
    }

    session.take_order_draft().await?;
    orders::finalize(&state, &session, draft, Some(payment_id)).await?;
    Ok(Redirect::to("/orders/confirmation").into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::{TimeZone, Utc};
    use nexus_core::catalog::sample_catalog;
    use nexus_core::{Cart, CustomerInfo, OrderId, PaymentMethod, PricingPolicy};

    use super::*;

    fn draft() -> OrderDraft {
        let mut cart = Cart::new();
        let catalog = sample_catalog();
        let item = catalog.iter().find(|item| item.quantity > 0).unwrap();
        cart.add(item, 1).unwrap();
        let customer = CustomerInfo {
            company_name: "Precision <Forge>".to_string(),
            contact_name: "Arun".to_string(),
            email: "arun@forge.in".to_string(),
            phone: "98765 43210".to_string(),
            ..CustomerInfo::default()
        };
        let at = Utc.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        OrderDraft::new(
            OrderId::at(at),
            customer,
            PaymentMethod::Online,
            &cart,
            &PricingPolicy::default(),
            at,
        )
        .unwrap()
    }

    #[test]
    fn test_widget_options() {
        let draft = draft();
        let options = widget_options(&draft, "rzp_test_key").unwrap();
        assert_eq!(options["key"], "rzp_test_key");
        assert_eq!(options["currency"], "INR");
        assert_eq!(options["amount"], draft.amount_paise().unwrap());
        assert_eq!(options["notes"]["order_id"], draft.id.as_str());
        assert_eq!(options["notes"]["gst"], "Not provided");
        assert_eq!(options["prefill"]["contact"], "98765 43210");
    }

    #[test]
    fn test_embeddable_json_escapes_markup() {
        let options = widget_options(&draft(), "rzp_test_key").unwrap();
        let embedded = embeddable_json(&options);
        assert!(!embedded.contains('<'));
        assert!(embedded.contains("Precision \\u003cForge\\u003e"));
        let parsed: serde_json::Value = serde_json::from_str(&embedded).unwrap();
        assert_eq!(parsed["notes"]["company"], "Precision <Forge>");
    }
}
