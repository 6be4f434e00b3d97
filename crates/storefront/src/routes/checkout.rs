//! Two-step checkout.
//!
//! Step one collects and validates the buyer's details. Step two picks a
//! payment method and freezes the cart into an order draft: online
//! payment continues to `/payment`, offline methods complete right away.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use nexus_core::order::STATES;
use nexus_core::{Cart, CustomerInfo, FieldErrors, OrderDraft, OrderId, PaymentMethod};
use serde::Deserialize;
use tracing::instrument;

use super::cart::{CartLineView, TotalsView};
use super::orders;
use crate::error::{Result, add_breadcrumb};
use crate::filters;
use crate::middleware::CspNonce;
use crate::models::VisitorSession;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct CheckoutQuery {
    pub step: Option<String>,
}

/// Either step's form. `step` says which one was submitted.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CheckoutForm {
    pub step: String,
    pub company_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    pub gst: String,
    pub payment_method: String,
}

impl CheckoutForm {
    fn customer(&self) -> CustomerInfo {
        let trimmed = |value: &str| value.trim().to_string();
        let defaults = CustomerInfo::default();
        CustomerInfo {
            company_name: trimmed(&self.company_name),
            contact_name: trimmed(&self.contact_name),
            email: trimmed(&self.email),
            phone: trimmed(&self.phone),
            address: trimmed(&self.address),
            city: trimmed(&self.city),
            state: if self.state.trim().is_empty() {
                defaults.state
            } else {
                trimmed(&self.state)
            },
            pincode: trimmed(&self.pincode),
            gst: trimmed(&self.gst),
        }
    }
}

pub struct StateOption {
    pub name: &'static str,
    pub selected: bool,
}

pub struct MethodOption {
    pub key: &'static str,
    pub label: &'static str,
    pub description: &'static str,
    pub available: bool,
    pub selected: bool,
}

/// Checkout page template.
#[derive(Template, WebTemplate)]
#[template(path = "checkout.html")]
pub struct CheckoutTemplate {
    pub payment_step: bool,
    pub customer: CustomerInfo,
    pub errors: FieldErrors,
    pub states: Vec<StateOption>,
    pub methods: Vec<MethodOption>,
    pub lines: Vec<CartLineView>,
    pub totals: TotalsView,
    pub error: Option<String>,
    pub nonce: String,
}

struct CheckoutPage<'a> {
    state: &'a AppState,
    cart: &'a Cart,
    nonce: String,
}

impl CheckoutPage<'_> {
    fn render(
        self,
        payment_step: bool,
        customer: CustomerInfo,
        errors: FieldErrors,
        selected: PaymentMethod,
        error: Option<String>,
    ) -> CheckoutTemplate {
        let online_available = self.state.config().payment.razorpay_key_id.is_some();
        let totals = self.cart.totals(self.state.pricing());
        CheckoutTemplate {
            payment_step,
            states: STATES
                .into_iter()
                .map(|name| StateOption {
                    name,
                    selected: name == customer.state,
                })
                .collect(),
            methods: PaymentMethod::ALL
                .into_iter()
                .map(|method| MethodOption {
                    key: method.key(),
                    label: method.label(),
                    description: method.description(),
                    available: !method.uses_gateway() || online_available,
                    selected: method == selected,
                })
                .collect(),
            customer,
            errors,
            lines: self.cart.lines().iter().map(CartLineView::from).collect(),
            totals: TotalsView::new(&totals, self.state.pricing()),
            error,
            nonce: self.nonce,
        }
    }
}

/// Payment method preselected on step two.
fn default_method(state: &AppState) -> PaymentMethod {
    if state.config().payment.razorpay_key_id.is_some() {
        PaymentMethod::Online
    } else {
        PaymentMethod::BankTransfer
    }
}

/// Display the checkout form.
///
/// An empty cart goes back to the cart page. Step two is only shown once
/// step one has been completed.
#[instrument(skip(state, session, nonce))]
pub async fn show(
    State(state): State<AppState>,
    session: VisitorSession,
    Query(query): Query<CheckoutQuery>,
    CspNonce(nonce): CspNonce,
) -> Result<Response> {
    let cart = session.cart().await?;
    if cart.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }

    let saved = session.checkout_customer().await?;
    let payment_step = query.step.as_deref() == Some("payment") && saved.is_some();
    let page = CheckoutPage {
        state: &state,
        cart: &cart,
        nonce,
    };

    Ok(page
        .render(
            payment_step,
            saved.unwrap_or_default(),
            FieldErrors::new(),
            default_method(&state),
            None,
        )
        .into_response())
}

/// Handle either checkout step.
#[instrument(skip(state, session, form, nonce), fields(step = %form.step))]
pub async fn submit(
    State(state): State<AppState>,
    session: VisitorSession,
    CspNonce(nonce): CspNonce,
    Form(form): Form<CheckoutForm>,
) -> Result<Response> {
    let mut cart = session.cart().await?;
    if cart.refresh(&state.catalog().shop_items().await) > 0 {
        session.set_cart(&cart).await?;
    }
    if cart.is_empty() {
        return Ok(Redirect::to("/cart").into_response());
    }
    let page = CheckoutPage {
        state: &state,
        cart: &cart,
        nonce,
    };

    if form.step != "payment" {
        let customer = form.customer();
        return match customer.validate() {
            Ok(()) => {
                session.set_checkout_customer(&customer).await?;
                add_breadcrumb("checkout", "Customer details saved", None);
                Ok(Redirect::to("/checkout?step=payment").into_response())
            }
            Err(errors) => {
                tracing::debug!(fields = errors.len(), "Checkout details rejected");
                Ok(page
                    .render(false, customer, errors, default_method(&state), None)
                    .into_response())
            }
        };
    }

    let Some(customer) = session.checkout_customer().await? else {
        return Ok(Redirect::to("/checkout").into_response());
    };

    let method = PaymentMethod::parse(form.payment_method.trim());
    let online_available = state.config().payment.razorpay_key_id.is_some();
    let method = match method {
        Some(method) if !method.uses_gateway() || online_available => method,
        Some(_) => {
            return Ok(page
                .render(
                    true,
                    customer,
                    FieldErrors::new(),
                    PaymentMethod::BankTransfer,
                    Some("Online payment is not available right now. Please choose another method.".to_string()),
                )
                .into_response());
        }
        None => {
            return Ok(page
                .render(
                    true,
                    customer,
                    FieldErrors::new(),
                    default_method(&state),
                    Some("Please choose a payment method.".to_string()),
                )
                .into_response());
        }
    };

    let draft = OrderDraft::new(
        OrderId::generate(),
        customer,
        method,
        &cart,
        state.pricing(),
        Utc::now(),
    )?;
    tracing::info!(order_id = %draft.id, method = method.key(), "Order draft created");

    if method.uses_gateway() {
        session.set_order_draft(&draft).await?;
        return Ok(Redirect::to("/payment").into_response());
    }

    orders::finalize(&state, &session, draft, None).await?;
    Ok(Redirect::to("/orders/confirmation").into_response())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use nexus_core::order::DEFAULT_STATE;

    use super::*;

    #[test]
    fn test_form_to_customer_trims_and_defaults_state() {
        let form = CheckoutForm {
            company_name: "  Precision Forge ".to_string(),
            contact_name: "Arun".to_string(),
            email: "arun@forge.in ".to_string(),
            ..CheckoutForm::default()
        };
        let customer = form.customer();
        assert_eq!(customer.company_name, "Precision Forge");
        assert_eq!(customer.email, "arun@forge.in");
        assert_eq!(customer.state, DEFAULT_STATE);
    }

    #[test]
    fn test_blank_form_reports_required_fields() {
        let errors = CheckoutForm::default().customer().validate().unwrap_err();
        for field in ["company_name", "contact_name", "email", "phone", "address", "city", "pincode"] {
            assert!(errors.contains(field), "{field} should be required");
        }
        assert!(!errors.contains("gst"));
    }
}
