//! HTTP route handlers for storefront.
//!
//! # Route Structure
//!
//! ```text
//! GET  /                       - Home page
//! POST /contact                - Contact form (JSON)
//! GET  /health                 - Health check (added in `app`)
//!
//! # Catalog
//! GET  /stock                  - Stock lookup
//! GET  /shop                   - Catalog listing
//! GET  /shop/{id}              - Catalog item detail
//!
//! # Cart
//! GET  /cart                   - Cart page
//! POST /cart/add               - Add to cart
//! POST /cart/update            - Change quantity
//! POST /cart/remove            - Remove line
//! POST /cart/clear             - Empty cart
//! GET  /cart/count             - Cart count badge (fragment)
//!
//! # Checkout
//! GET  /checkout               - Customer details, then payment method
//! POST /checkout               - Submit either step
//! GET  /payment                - Payment widget for the pending order
//! POST /payment/complete       - Payment success callback
//! GET  /orders/confirmation    - Last completed order
//!
//! # Quotes
//! GET  /quote                  - Quote request form
//! POST /quote                  - Send quote request
//! ```
//!
//! Form posts that send email or create orders share one per-IP rate
//! limiter.

pub mod cart;
pub mod checkout;
pub mod contact;
pub mod home;
pub mod listing;
pub mod orders;
pub mod payment;
pub mod quote;
pub mod shop;
pub mod stock;

use axum::{
    Router,
    routing::{get, post},
};

use crate::middleware::{RateLimiterLayer, form_rate_limiter};
use crate::state::AppState;

/// Create the shop routes router.
pub fn shop_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(shop::index))
        .route("/{id}", get(shop::show))
}

/// Create the cart routes router.
pub fn cart_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(cart::show))
        .route("/add", post(cart::add))
        .route("/update", post(cart::update))
        .route("/remove", post(cart::remove))
        .route("/clear", post(cart::clear))
        .route("/count", get(cart::count))
}

/// Create the checkout, payment and order routes router.
pub fn checkout_routes(limiter: &RateLimiterLayer) -> Router<AppState> {
    Router::new()
        .route(
            "/checkout",
            get(checkout::show).merge(post(checkout::submit).layer(limiter.clone())),
        )
        .route("/payment", get(payment::show))
        .route(
            "/payment/complete",
            post(payment::complete).layer(limiter.clone()),
        )
        .route("/orders/confirmation", get(orders::confirmation))
}

/// Create all routes for the storefront.
pub fn routes() -> Router<AppState> {
    let limiter = form_rate_limiter();

    Router::new()
        // Home page
        .route("/", get(home::home))
        .route("/contact", post(contact::submit).layer(limiter.clone()))
        // Catalog
        .route("/stock", get(stock::index))
        .nest("/shop", shop_routes())
        // Cart
        .nest("/cart", cart_routes())
        // Checkout
        .merge(checkout_routes(&limiter))
        // Quotes
        .route(
            "/quote",
            get(quote::show).merge(post(quote::submit).layer(limiter)),
        )
}
