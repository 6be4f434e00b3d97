//! Security headers middleware.
//!
//! Pages load scripts only from this origin (with the request nonce) and from
//! the Razorpay checkout widget, which also needs frame and connect access.

use axum::{
    extract::Request,
    http::{
        HeaderName, HeaderValue,
        header::{
            CACHE_CONTROL, CONTENT_SECURITY_POLICY, REFERRER_POLICY, X_CONTENT_TYPE_OPTIONS,
            X_FRAME_OPTIONS,
        },
    },
    middleware::Next,
    response::Response,
};

use super::csp::CspNonce;

/// Origin serving the payment widget script.
pub const PAYMENT_WIDGET_ORIGIN: &str = "https://checkout.razorpay.com";

/// Origins the payment widget talks to once loaded.
const PAYMENT_API_ORIGINS: &str = "https://api.razorpay.com https://lumberjack.razorpay.com";

/// Content security policy for one response.
#[must_use]
pub fn content_security_policy(nonce: Option<&CspNonce>) -> String {
    let script_nonce = nonce
        .filter(|nonce| !nonce.value().is_empty())
        .map(|nonce| format!(" 'nonce-{}'", nonce.value()))
        .unwrap_or_default();

    format!(
        "default-src 'none'; \
         script-src 'self'{script_nonce} {PAYMENT_WIDGET_ORIGIN}; \
         style-src 'self'; \
         font-src 'self'; \
         img-src 'self' data: https://cdn.razorpay.com; \
         connect-src 'self' {PAYMENT_WIDGET_ORIGIN} {PAYMENT_API_ORIGINS}; \
         frame-src {PAYMENT_WIDGET_ORIGIN} https://api.razorpay.com; \
         object-src 'none'; \
         base-uri 'self'; \
         form-action 'self'; \
         frame-ancestors 'none'"
    )
}

/// Add security headers to all responses.
///
/// - `X-Frame-Options: DENY`
/// - `X-Content-Type-Options: nosniff`
/// - `Referrer-Policy: strict-origin-when-cross-origin` (the widget checks the referrer)
/// - `Content-Security-Policy` from [`content_security_policy`]
/// - `Permissions-Policy` allowing only the Payment Request API
/// - `Cache-Control: no-store` on pages (static files keep their own caching)
pub async fn security_headers_middleware(request: Request, next: Next) -> Response {
    let policy = content_security_policy(request.extensions().get::<CspNonce>());
    let is_static = request.uri().path().starts_with("/static/");

    let mut response = next.run(request).await;
    let headers = response.headers_mut();

    headers.insert(X_FRAME_OPTIONS, HeaderValue::from_static("DENY"));
    headers.insert(X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff"));
    headers.insert(
        REFERRER_POLICY,
        HeaderValue::from_static("strict-origin-when-cross-origin"),
    );

    if let Ok(value) = HeaderValue::from_str(&policy) {
        headers.insert(CONTENT_SECURITY_POLICY, value);
    }

    headers.insert(
        HeaderName::from_static("permissions-policy"),
        HeaderValue::from_static(
            "camera=(), geolocation=(), microphone=(), usb=(), \
             payment=(self \"https://checkout.razorpay.com\" \"https://api.razorpay.com\")",
        ),
    );

    if !is_static {
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-store, max-age=0"));
    }

    headers.insert(
        HeaderName::from_static("cross-origin-opener-policy"),
        HeaderValue::from_static("same-origin-allow-popups"),
    );

    response
}
