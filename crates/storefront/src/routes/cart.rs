//! Cart route handlers.
//!
//! The cart lives in the visitor's session. Mutations redirect back to the
//! cart page; requests sent by `site.js` (marked with `HX-Request`) get the
//! count badge fragment and a `cart-updated` trigger instead.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    http::HeaderMap,
    response::{AppendHeaders, IntoResponse, Redirect, Response},
};
use nexus_core::{Cart, CartError, CartLine, CartTotals, PricingPolicy, ToolId};
use serde::Deserialize;
use tracing::instrument;

use crate::error::{AppError, Result, add_breadcrumb};
use crate::filters;
use crate::middleware::CspNonce;
use crate::models::VisitorSession;
use crate::state::AppState;

/// Cart line display data for templates.
pub struct CartLineView {
    pub id: String,
    pub name: String,
    pub brand: String,
    pub price: String,
    pub quantity: u32,
    pub min_order: u32,
    pub stock: u32,
    pub line_total: String,
}

impl From<&CartLine> for CartLineView {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.item.id.to_string(),
            name: line.item.name.clone(),
            brand: line.item.brand.clone(),
            price: line.item.price.to_string(),
            quantity: line.quantity,
            min_order: line.item.min_order(),
            stock: line.item.quantity,
            line_total: line.line_total().to_string(),
        }
    }
}

/// Formatted totals, shared by the cart, checkout and confirmation pages.
pub struct TotalsView {
    pub subtotal: String,
    pub tax: String,
    pub tax_label: String,
    pub shipping: String,
    pub ships_free: bool,
    pub total: String,
    pub free_shipping_above: String,
}

impl TotalsView {
    #[must_use]
    pub fn new(totals: &CartTotals, policy: &PricingPolicy) -> Self {
        Self {
            subtotal: totals.subtotal.to_string(),
            tax: totals.tax.to_string(),
            tax_label: format!("GST ({}%)", policy.gst_percent()),
            shipping: totals.shipping.to_string(),
            ships_free: totals.ships_free(),
            total: totals.total.to_string(),
            free_shipping_above: policy.free_shipping_threshold.to_string(),
        }
    }
}

/// Add to cart form data.
#[derive(Debug, Deserialize)]
pub struct AddToCartForm {
    pub tool_id: String,
    pub quantity: Option<u32>,
}

/// Update cart form data.
#[derive(Debug, Deserialize)]
pub struct UpdateCartForm {
    pub tool_id: String,
    pub quantity: u32,
}

/// Remove from cart form data.
#[derive(Debug, Deserialize)]
pub struct RemoveFromCartForm {
    pub tool_id: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct CartQuery {
    pub error: Option<String>,
}

/// Cart page template.
#[derive(Template, WebTemplate)]
#[template(path = "cart.html")]
pub struct CartShowTemplate {
    pub lines: Vec<CartLineView>,
    pub item_count: u32,
    pub totals: TotalsView,
    pub error: Option<String>,
    pub notice: Option<String>,
    pub nonce: String,
}

/// Cart count badge fragment template.
#[derive(Template, WebTemplate)]
#[template(path = "partials/cart_count.html")]
pub struct CartCountTemplate {
    pub count: u32,
}

fn is_fragment_request(headers: &HeaderMap) -> bool {
    headers.contains_key("hx-request")
}

/// Reply to a successful mutation.
fn updated(headers: &HeaderMap, cart: &Cart) -> Response {
    if is_fragment_request(headers) {
        (
            AppendHeaders([("HX-Trigger", "cart-updated")]),
            CartCountTemplate {
                count: cart.item_count(),
            },
        )
            .into_response()
    } else {
        Redirect::to("/cart").into_response()
    }
}

/// Reply to a rejected mutation.
fn rejected(headers: &HeaderMap, err: CartError) -> Response {
    tracing::info!(error = %err, "Cart change rejected");
    if is_fragment_request(headers) {
        AppError::Cart(err).into_response()
    } else {
        let target = format!("/cart?error={}", urlencoding::encode(&err.to_string()));
        Redirect::to(&target).into_response()
    }
}

/// Display cart page.
///
/// Lines are re-checked against the current catalog so stock changes
/// since they were added show up here.
#[instrument(skip(state, session, nonce))]
pub async fn show(
    State(state): State<AppState>,
    session: VisitorSession,
    Query(query): Query<CartQuery>,
    CspNonce(nonce): CspNonce,
) -> Result<impl IntoResponse> {
    let mut cart = session.cart().await?;
    let items = state.catalog().shop_items().await;

    let changed = cart.refresh(&items);
    let notice = if changed > 0 {
        session.set_cart(&cart).await?;
        Some(format!(
            "{changed} item(s) in your cart were updated to match current stock."
        ))
    } else {
        None
    };

    let totals = cart.totals(state.pricing());
    Ok(CartShowTemplate {
        lines: cart.lines().iter().map(CartLineView::from).collect(),
        item_count: cart.item_count(),
        totals: TotalsView::new(&totals, state.pricing()),
        error: query.error.filter(|e| !e.trim().is_empty()),
        notice,
        nonce,
    })
}

/// Add item to cart.
#[instrument(skip(state, session, headers), fields(tool_id = %form.tool_id))]
pub async fn add(
    State(state): State<AppState>,
    session: VisitorSession,
    headers: HeaderMap,
    Form(form): Form<AddToCartForm>,
) -> Result<Response> {
    let tool_id = ToolId::new(&form.tool_id);
    let item = state
        .catalog()
        .find(&tool_id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Tool {tool_id}")))?;

    let mut cart = session.cart().await?;
    match cart.add(&item, form.quantity.unwrap_or(1)) {
        Ok(quantity) => {
            session.set_cart(&cart).await?;
            add_breadcrumb(
                "cart",
                "Added to cart",
                Some(&[("tool_id", tool_id.as_str())]),
            );
            tracing::info!(quantity, "Added to cart");
            Ok(updated(&headers, &cart))
        }
        Err(err) => Ok(rejected(&headers, err)),
    }
}

/// Change a line's quantity.
///
/// The cart is re-checked against the current catalog first so the new
/// quantity is capped at today's stock.
#[instrument(skip(state, session, headers), fields(tool_id = %form.tool_id))]
pub async fn update(
    State(state): State<AppState>,
    session: VisitorSession,
    headers: HeaderMap,
    Form(form): Form<UpdateCartForm>,
) -> Result<Response> {
    let tool_id = ToolId::new(&form.tool_id);
    let mut cart = session.cart().await?;
    cart.refresh(&state.catalog().shop_items().await);

    match cart.update(&tool_id, form.quantity) {
        Ok(quantity) => {
            session.set_cart(&cart).await?;
            tracing::info!(?quantity, "Cart line updated");
            Ok(updated(&headers, &cart))
        }
        Err(err) => Ok(rejected(&headers, err)),
    }
}

/// Remove a line.
#[instrument(skip(session, headers), fields(tool_id = %form.tool_id))]
pub async fn remove(
    session: VisitorSession,
    headers: HeaderMap,
    Form(form): Form<RemoveFromCartForm>,
) -> Result<Response> {
    let mut cart = session.cart().await?;
    if cart.remove(&ToolId::new(&form.tool_id)) {
        session.set_cart(&cart).await?;
    }
    Ok(updated(&headers, &cart))
}

/// Empty the cart.
#[instrument(skip(session, headers))]
pub async fn clear(session: VisitorSession, headers: HeaderMap) -> Result<Response> {
    let mut cart = session.cart().await?;
    cart.clear();
    session.set_cart(&cart).await?;
    Ok(updated(&headers, &cart))
}

/// Cart count badge.
#[instrument(skip(session))]
pub async fn count(session: VisitorSession) -> Result<impl IntoResponse> {
    let cart = session.cart().await?;
    Ok(CartCountTemplate {
        count: cart.item_count(),
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::{StatusCode, header};
    use nexus_core::Money;

    use super::*;

    #[test]
    fn test_rejected_form_post_redirects_with_message() {
        let response = rejected(&HeaderMap::new(), CartError::OutOfStock(ToolId::new("T9")));
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        let location = response.headers()[header::LOCATION].to_str().unwrap();
        assert_eq!(location, "/cart?error=T9%20is%20out%20of%20stock");
    }

    #[test]
    fn test_rejected_fragment_request_is_bad_request() {
        let mut headers = HeaderMap::new();
        headers.insert("hx-request", "true".parse().unwrap());
        let response = rejected(&headers, CartError::Empty);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_updated_fragment_sets_trigger() {
        let mut headers = HeaderMap::new();
        headers.insert("hx-request", "true".parse().unwrap());
        let response = updated(&headers, &Cart::new());
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()["hx-trigger"], "cart-updated");
    }

    #[test]
    fn test_totals_view_labels() {
        let policy = PricingPolicy::default();
        let totals = policy.totals(Money::from_rupees(2500));
        let view = TotalsView::new(&totals, &policy);
        assert_eq!(view.tax_label, "GST (18%)");
        assert_eq!(view.tax, "₹450.00");
        assert_eq!(view.total, "₹52,950.00");
        assert!(!view.ships_free);
    }
}
