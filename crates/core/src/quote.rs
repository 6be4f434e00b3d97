//! Quote requests sent to the sales team instead of checking out.

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogItem;
use crate::order::{FieldErrors, require};
use crate::types::{Email, ToolId};

/// Delivery timelines offered on the form as `(value, label)`.
pub const TIMELINES: [(&str, &str); 5] = [
    ("Immediate", "Immediate (Within 1 week)"),
    ("Within 2 weeks", "Within 2 weeks"),
    ("Within 1 month", "Within 1 month"),
    ("Within 2-3 months", "Within 2-3 months"),
    ("Flexible", "Flexible timeline"),
];

pub const DEFAULT_TIMELINE: &str = "Within 2 weeks";

const NOT_PROVIDED: &str = "Not provided";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuoteKind {
    #[default]
    Standard,
    Bulk,
}

impl QuoteKind {
    #[must_use]
    pub fn parse(key: &str) -> Self {
        if key == "bulk" { Self::Bulk } else { Self::Standard }
    }

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Standard => "Standard Quote Request",
            Self::Bulk => "Bulk Quote Request",
        }
    }
}

/// A filled-in quote request form.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuoteRequest {
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
    pub kind: QuoteKind,
    /// Snapshot of the tool the request was started from.
    pub product: Option<CatalogItem>,
    /// Name passed in the link when no snapshot is available.
    pub product_name: Option<String>,
    /// Tools selected for a bulk quote.
    pub product_ids: Vec<ToolId>,
}

impl Default for QuoteRequest {
    fn default() -> Self {
        Self {
            customer_name: String::new(),
            company_name: String::new(),
            email: String::new(),
            phone: String::new(),
            address: String::new(),
            quantity: "1".to_owned(),
            timeline: DEFAULT_TIMELINE.to_owned(),
            application_details: String::new(),
            additional_requirements: String::new(),
            message: String::new(),
            kind: QuoteKind::Standard,
            product: None,
            product_name: None,
            product_ids: Vec::new(),
        }
    }
}

fn or_default<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    let trimmed = value.trim();
    if trimmed.is_empty() { fallback } else { trimmed }
}

impl QuoteRequest {
    /// Form prefilled for one catalog tool.
    #[must_use]
    pub fn for_product(item: &CatalogItem) -> Self {
        Self {
            message: format!(
                "I am interested in requesting a quote for the following cutting tool:\n\n\
                 Product: {}\nBrand: {}\nPart Number: {}\nType: {}\nMaterial: {}\nCoating: {}\n\n\
                 Please provide pricing information and availability.",
                item.name, item.brand, item.id, item.tool_type, item.material, item.coating
            ),
            product_name: Some(item.name.clone()),
            product: Some(item.clone()),
            ..Self::default()
        }
    }

    /// Form prefilled from a tool id and name only.
    #[must_use]
    pub fn for_named(tool_id: &ToolId, name: &str) -> Self {
        Self {
            message: format!(
                "I am interested in requesting a quote for: {name} (Part #{tool_id})\n\n\
                 Please provide pricing information and availability."
            ),
            product_name: Some(name.to_owned()),
            ..Self::default()
        }
    }

    /// Form prefilled for several tools at once.
    #[must_use]
    pub fn for_bulk(product_ids: Vec<ToolId>) -> Self {
        let joined = product_ids
            .iter()
            .map(ToolId::as_str)
            .collect::<Vec<_>>()
            .join(",");
        Self {
            message: format!(
                "I am interested in requesting a bulk quote for multiple cutting tools.\n\n\
                 Product IDs: {joined}\n\n\
                 Please provide detailed pricing for these items including volume discounts if applicable."
            ),
            kind: QuoteKind::Bulk,
            product_ids,
            ..Self::default()
        }
    }

    /// Check the form.
    ///
    /// # Errors
    ///
    /// Returns every failing field with its message.
    pub fn validate(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();

        require(&mut errors, "customer_name", &self.customer_name, "Full name");
        if require(&mut errors, "email", &self.email, "Email") && Email::parse(&self.email).is_err()
        {
            errors.insert("email", "Email is invalid");
        }
        if !self.quantity.trim().parse::<u32>().is_ok_and(|q| q > 0) {
            errors.insert("quantity", "Quantity must be a whole number of at least 1");
        }
        require(&mut errors, "message", &self.message, "Message");

        errors.into_result()
    }

    #[must_use]
    pub fn company_or_individual(&self) -> &str {
        or_default(&self.company_name, "Individual Customer")
    }

    #[must_use]
    pub fn phone_or_placeholder(&self) -> &str {
        or_default(&self.phone, NOT_PROVIDED)
    }

    /// What the request is about, for subject lines.
    #[must_use]
    pub fn product_label(&self) -> &str {
        self.product_name
            .as_deref()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or("Multiple Products")
    }

    #[must_use]
    pub fn subject(&self) -> String {
        format!("Quote Request - {}", self.product_label())
    }

    #[must_use]
    pub fn customer_details(&self) -> String {
        format!(
            "Name: {}\nCompany: {}\nEmail: {}\nPhone: {}\nAddress: {}",
            self.customer_name.trim(),
            self.company_or_individual(),
            self.email.trim(),
            self.phone_or_placeholder(),
            or_default(&self.address, NOT_PROVIDED),
        )
    }

    #[must_use]
    pub fn product_details(&self) -> String {
        if let Some(item) = &self.product {
            return format!(
                "Product Name: {}\nBrand: {}\nPart Number: {}\nTool Type: {}\nMaterial: {}\n\
                 Coating: {}\nCurrent Price: {}\nApplication: {}",
                item.name,
                item.brand,
                item.id,
                item.tool_type,
                item.material,
                item.coating,
                item.price,
                item.application_notes
            );
        }
        if self.product_ids.is_empty() {
            format!("Product: {}", self.product_label())
        } else {
            let ids = self
                .product_ids
                .iter()
                .map(ToolId::as_str)
                .collect::<Vec<_>>()
                .join(", ");
            format!("Products: {ids}")
        }
    }

    #[must_use]
    pub fn quote_details(&self) -> String {
        format!(
            "Requested Quantity: {}\nTimeline: {}\nApplication Details: {}\nAdditional Requirements: {}",
            self.quantity.trim(),
            self.timeline.trim(),
            or_default(&self.application_details, "Not specified"),
            or_default(&self.additional_requirements, "None"),
        )
    }
}
