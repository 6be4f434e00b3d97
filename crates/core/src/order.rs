//! Checkout customer details, order drafts and receipts.
//!
//! Checkout is two steps. The customer form is validated first; once a
//! payment method is chosen the cart is frozen into an [`OrderDraft`].
//! Completing payment (or choosing an offline method) turns the draft into
//! an [`OrderReceipt`].

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::{Cart, CartError, CartLine};
use crate::pricing::{CartTotals, PricingPolicy};
use crate::types::{Email, OrderId};

/// States offered by the checkout form.
pub const STATES: [&str; 5] = [
    "Tamil Nadu",
    "Kerala",
    "Karnataka",
    "Andhra Pradesh",
    "Telangana",
];

/// State preselected on the checkout form.
pub const DEFAULT_STATE: &str = "Tamil Nadu";

/// Per-field validation messages, keyed by form field name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<&'static str, String>);

impl FieldErrors {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, field: &'static str, message: impl Into<String>) {
        self.0.entry(field).or_insert_with(|| message.into());
    }

    #[must_use]
    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(String::as_str)
    }

    #[must_use]
    pub fn contains(&self, field: &str) -> bool {
        self.0.contains_key(field)
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// `Ok(())` when nothing was recorded.
    ///
    /// # Errors
    ///
    /// Returns `self` if any field failed.
    pub fn into_result(self) -> Result<(), Self> {
        if self.is_empty() { Ok(()) } else { Err(self) }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.0.iter().map(|(field, message)| (*field, message.as_str()))
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let joined = self
            .iter()
            .map(|(field, message)| format!("{field}: {message}"))
            .collect::<Vec<_>>()
            .join(", ");
        f.write_str(&joined)
    }
}

impl std::error::Error for FieldErrors {}

/// Record a "required" error when `value` is blank. Returns whether it was present.
pub(crate) fn require(errors: &mut FieldErrors, field: &'static str, value: &str, label: &str) -> bool {
    if value.trim().is_empty() {
        errors.insert(field, format!("{label} is required"));
        false
    } else {
        true
    }
}

/// Digits of a phone number with separators stripped.
#[must_use]
pub fn phone_digits(phone: &str) -> String {
    phone.chars().filter(char::is_ascii_digit).collect()
}

/// Buyer details collected on the first checkout step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerInfo {
    pub company_name: String,
    pub contact_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub pincode: String,
    /// GST registration number, optional.
    #[serde(default)]
    pub gst: String,
}

impl Default for CustomerInfo {
    fn default() -> Self {
        Self {
            company_name: String::new(),
            contact_name: String::new(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            city: String::new(),
            state: DEFAULT_STATE.to_owned(),
            pincode: String::new(),
            gst: String::new(),
        }
    }
}

impl CustomerInfo {
    /// Check the form.
    ///
    /// # Errors
    ///
    /// Returns every failing field with its message.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        require(&mut errors, "company_name", &self.company_name, "Company name");
        require(&mut errors, "contact_name", &self.contact_name, "Contact name");

        if require(&mut errors, "email", &self.email, "Email") && Email::parse(&self.email).is_err()
        {
            errors.insert("email", "Email is invalid");
        }

        if require(&mut errors, "phone", &self.phone, "Phone number")
            && phone_digits(&self.phone).len() != 10
        {
            errors.insert("phone", "Phone number must be 10 digits");
        }

        require(&mut errors, "address", &self.address, "Address");
        require(&mut errors, "city", &self.city, "City");

        if require(&mut errors, "pincode", &self.pincode, "Pincode")
            && !(self.pincode.len() == 6 && self.pincode.bytes().all(|b| b.is_ascii_digit()))
        {
            errors.insert("pincode", "Pincode must be 6 digits");
        }

        errors.into_result()
    }

    /// One-line delivery address.
    #[must_use]
    pub fn full_address(&self) -> String {
        format!(
            "{}, {}, {} - {}",
            self.address.trim(),
            self.city.trim(),
            self.state.trim(),
            self.pincode.trim()
        )
    }

    /// GST number, or a placeholder for the payment notes.
    #[must_use]
    pub fn gst_or_placeholder(&self) -> &str {
        let gst = self.gst.trim();
        if gst.is_empty() { "Not provided" } else { gst }
    }
}

/// How the customer intends to pay.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentMethod {
    #[default]
    Online,
    BankTransfer,
    PurchaseOrder,
}

impl PaymentMethod {
    pub const ALL: [Self; 3] = [Self::Online, Self::BankTransfer, Self::PurchaseOrder];

    #[must_use]
    pub fn parse(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|method| method.key() == key)
    }

    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Online => "online",
            Self::BankTransfer => "bank_transfer",
            Self::PurchaseOrder => "purchase_order",
        }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Online => "Online Payment",
            Self::BankTransfer => "Bank Transfer",
            Self::PurchaseOrder => "Purchase Order",
        }
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::Online => "Pay securely with card, UPI or net banking",
            Self::BankTransfer => "Direct transfer (NEFT/RTGS); details sent by email",
            Self::PurchaseOrder => "Submit your company PO; credit terms on approval",
        }
    }

    /// Whether this method goes through the payment widget.
    #[must_use]
    pub const fn uses_gateway(self) -> bool {
        matches!(self, Self::Online)
    }
}

/// A frozen cart awaiting payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub id: OrderId,
    pub customer_info: CustomerInfo,
    pub payment_method: PaymentMethod,
    pub cart: Vec<CartLine>,
    pub totals: CartTotals,
    pub created_at: DateTime<Utc>,
}

impl OrderDraft {
    /// Freeze a cart.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::Empty`] for an empty cart.
    pub fn new(
        id: OrderId,
        customer_info: CustomerInfo,
        payment_method: PaymentMethod,
        cart: &Cart,
        policy: &PricingPolicy,
        created_at: DateTime<Utc>,
    ) -> Result<Self, CartError> {
        cart.ensure_not_empty()?;
        Ok(Self {
            id,
            customer_info,
            payment_method,
            cart: cart.lines().to_vec(),
            totals: cart.totals(policy),
            created_at,
        })
    }

    /// Total in paise for the payment widget.
    #[must_use]
    pub fn amount_paise(&self) -> Option<i64> {
        self.totals.total.to_paise()
    }

    /// One line per cart line: `name - Qty: n - ₹total`.
    #[must_use]
    pub fn items_summary(&self) -> String {
        self.cart
            .iter()
            .map(|line| {
                format!(
                    "{} - Qty: {} - {}",
                    line.item.name,
                    line.quantity,
                    line.line_total()
                )
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Mark the order complete.
    #[must_use]
    pub fn complete(self, payment_id: Option<String>, completed_at: DateTime<Utc>) -> OrderReceipt {
        OrderReceipt {
            order: self,
            payment_id: payment_id.filter(|id| !id.trim().is_empty()),
            completed_at,
        }
    }
}

/// A completed order, shown on the confirmation page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderReceipt {
    pub order: OrderDraft,
    pub payment_id: Option<String>,
    pub completed_at: DateTime<Utc>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::catalog::sample_catalog;
    use crate::types::Money;
    use chrono::TimeZone;

    fn valid_customer() -> CustomerInfo {
        CustomerInfo {
            company_name: "Precision Parts Pvt Ltd".to_owned(),
            contact_name: "R. Kumar".to_owned(),
            email: "purchase@precisionparts.in".to_owned(),
            phone: "98765-43210".to_owned(),
            address: "12 Avinashi Road".to_owned(),
            city: "Coimbatore".to_owned(),
            pincode: "641018".to_owned(),
            ..CustomerInfo::default()
        }
    }

    #[test]
    fn test_valid_customer_passes() {
        assert_eq!(valid_customer().validate(), Ok(()));
        assert_eq!(valid_customer().state, "Tamil Nadu");
    }

    #[test]
    fn test_blank_form_reports_each_required_field() {
        let errors = CustomerInfo::default().validate().unwrap_err();
        for field in [
            "company_name",
            "contact_name",
            "email",
            "phone",
            "address",
            "city",
            "pincode",
        ] {
            assert!(errors.contains(field), "missing error for {field}");
        }
        assert!(!errors.contains("gst"));
        assert_eq!(errors.get("email"), Some("Email is required"));
    }

    #[test]
    fn test_format_checks() {
        let customer = CustomerInfo {
            email: "purchase@precisionparts".to_owned(),
            phone: "98765 4321".to_owned(),
            pincode: "64101".to_owned(),
            ..valid_customer()
        };
        let errors = customer.validate().unwrap_err();
        assert_eq!(errors.len(), 3);
        assert_eq!(errors.get("email"), Some("Email is invalid"));
        assert_eq!(errors.get("phone"), Some("Phone number must be 10 digits"));
        assert_eq!(errors.get("pincode"), Some("Pincode must be 6 digits"));
    }

    #[test]
    fn test_payment_method_keys() {
        for method in PaymentMethod::ALL {
            assert_eq!(PaymentMethod::parse(method.key()), Some(method));
        }
        assert_eq!(PaymentMethod::parse("cash"), None);
        assert!(PaymentMethod::Online.uses_gateway());
        assert!(!PaymentMethod::PurchaseOrder.uses_gateway());
    }

    #[test]
    fn test_draft_freezes_cart_and_totals() {
        let catalog = sample_catalog();
        let mut cart = Cart::new();
        cart.add(&catalog[3], 2).unwrap(); // 444 x 2

        let at = Utc.timestamp_millis_opt(1_718_000_000_000).unwrap();
        let draft = OrderDraft::new(
            OrderId::at(at),
            valid_customer(),
            PaymentMethod::Online,
            &cart,
            &PricingPolicy::default(),
            at,
        )
        .unwrap();

        assert_eq!(draft.totals.subtotal, Money::from_rupees(888));
        assert_eq!(
            draft.items_summary(),
            "Carbide Boring Bar - Heavy Duty - Qty: 2 - ₹888.00"
        );
        // 888 + 159.84 + 50000
        assert_eq!(draft.amount_paise(), Some(5_104_784));

        let receipt = draft.complete(Some("pay_123".to_owned()), at);
        assert_eq!(receipt.payment_id.as_deref(), Some("pay_123"));
    }

    #[test]
    fn test_draft_rejects_empty_cart() {
        let result = OrderDraft::new(
            OrderId::new("ORDER_1"),
            valid_customer(),
            PaymentMethod::BankTransfer,
            &Cart::new(),
            &PricingPolicy::default(),
            Utc::now(),
        );
        assert_eq!(result, Err(CartError::Empty));
    }

    #[test]
    fn test_blank_payment_id_is_dropped() {
        let draft = OrderDraft {
            id: OrderId::new("ORDER_1"),
            customer_info: valid_customer(),
            payment_method: PaymentMethod::PurchaseOrder,
            cart: Vec::new(),
            totals: CartTotals::default(),
            created_at: Utc::now(),
        };
        assert!(draft.complete(Some("  ".to_owned()), Utc::now()).payment_id.is_none());
    }

    #[test]
    fn test_full_address() {
        assert_eq!(
            valid_customer().full_address(),
            "12 Avinashi Road, Coimbatore, Tamil Nadu - 641018"
        );
        assert_eq!(valid_customer().gst_or_placeholder(), "Not provided");
    }
}
