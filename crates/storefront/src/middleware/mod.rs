//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, transactions)
//! 2. Session layer (tower-sessions, in-memory store)
//! 3. `TraceLayer` (request span)
//! 4. Request ID (recorded on the span and Sentry scope)
//! 5. CSP nonce (per-request nonce for script tags)
//! 6. Security headers (CSP built from the nonce)
//!
//! Form endpoints additionally sit behind a per-IP rate limiter.

pub mod csp;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use csp::{CspNonce, csp_nonce_middleware};
pub use rate_limit::{RateLimiterLayer, form_rate_limiter};
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::create_session_layer;
