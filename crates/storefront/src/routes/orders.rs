//! Order completion and confirmation.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use nexus_core::{OrderDraft, OrderReceipt};
use tracing::instrument;

use super::cart::{CartLineView, TotalsView};
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::CspNonce;
use crate::models::VisitorSession;
use crate::state::AppState;

/// Turn a draft into a receipt, email it and reset the visitor's cart.
///
/// A failed confirmation email is logged; the order still completes.
///
/// # Errors
///
/// Returns error if the session store fails.
#[instrument(skip(state, session, draft), fields(order_id = %draft.id))]
pub async fn finalize(
    state: &AppState,
    session: &VisitorSession,
    draft: OrderDraft,
    payment_id: Option<String>,
) -> Result<OrderReceipt> {
    let receipt = draft.complete(payment_id, Utc::now());

    match state.email() {
        Some(email) => {
            if let Err(e) = email.send_order_confirmation(&receipt).await {
                let event_id = sentry::capture_error(&e);
                tracing::error!(error = %e, sentry_event_id = %event_id, "Order confirmation email failed");
            }
        }
        None => tracing::warn!("EmailJS not configured, order confirmation not sent"),
    }

    session.finish_order(&receipt).await?;
    add_breadcrumb(
        "order",
        "Order completed",
        Some(&[("order_id", receipt.order.id.as_str())]),
    );
    tracing::info!(
        method = receipt.order.payment_method.key(),
        total = %receipt.order.totals.total,
        "Order completed"
    );
    Ok(receipt)
}

/// Order confirmation template.
#[derive(Template, WebTemplate)]
#[template(path = "confirmation.html")]
pub struct ConfirmationTemplate {
    pub order_id: String,
    pub payment_id: Option<String>,
    pub payment_method: &'static str,
    pub offline_method: bool,
    pub customer_name: String,
    pub company_name: String,
    pub email: String,
    pub delivery_address: String,
    pub placed_at: String,
    pub lines: Vec<CartLineView>,
    pub totals: TotalsView,
    pub nonce: String,
}

/// Display the last completed order.
///
/// Without a receipt in the session the visitor is sent to the shop.
#[instrument(skip(state, session, nonce))]
pub async fn confirmation(
    State(state): State<AppState>,
    session: VisitorSession,
    CspNonce(nonce): CspNonce,
) -> Result<Response> {
    let Some(receipt) = session.order_receipt().await? else {
        return Ok(Redirect::to("/shop").into_response());
    };
    let order = &receipt.order;
    let customer = &order.customer_info;

    Ok(ConfirmationTemplate {
        order_id: order.id.to_string(),
        payment_id: receipt.payment_id.clone(),
        payment_method: order.payment_method.label(),
        offline_method: !order.payment_method.uses_gateway(),
        customer_name: customer.contact_name.clone(),
        company_name: customer.company_name.clone(),
        email: customer.email.clone(),
        delivery_address: customer.full_address(),
        placed_at: receipt.completed_at.format("%d %b %Y, %H:%M UTC").to_string(),
        lines: order.cart.iter().map(CartLineView::from).collect(),
        totals: TotalsView::new(&order.totals, state.pricing()),
        nonce,
    }
    .into_response())
}
