//! Catalog items and the values derived from them.
//!
//! A [`CatalogItem`] is one row of the cutting-tools catalog. Items are
//! loaded by the storefront (spreadsheet or hosted table) and never
//! mutated afterwards; everything in this module is a pure view over them.

use serde::{Deserialize, Serialize};

use crate::types::{Money, ToolId};

/// Quantity at or below which a spreadsheet row is shown as low stock.
///
/// Spreadsheet rows carry no per-item minimum, so this fixed threshold is
/// used instead.
pub const LOW_STOCK_THRESHOLD: u32 = 10;

/// Stock level bucket shown next to a tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Availability {
    InStock,
    LowStock,
    OutOfStock,
}

impl Availability {
    /// Classify a quantity against a low-stock threshold.
    ///
    /// Zero is always out of stock; anything up to and including
    /// `low_stock_at` is low stock.
    #[must_use]
    pub const fn classify(quantity: u32, low_stock_at: u32) -> Self {
        if quantity == 0 {
            Self::OutOfStock
        } else if quantity <= low_stock_at {
            Self::LowStock
        } else {
            Self::InStock
        }
    }

    /// Human-readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::InStock => "In Stock",
            Self::LowStock => "Low Stock",
            Self::OutOfStock => "Out of Stock",
        }
    }

    /// CSS modifier used by the templates.
    #[must_use]
    pub const fn css_class(self) -> &'static str {
        match self {
            Self::InStock => "in-stock",
            Self::LowStock => "low-stock",
            Self::OutOfStock => "out-of-stock",
        }
    }
}

impl std::fmt::Display for Availability {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

const fn default_min_order_qty() -> u32 {
    1
}

/// A cutting tool offered in the catalog.
///
/// Dimension columns are kept as the text found in the source since they
/// are only ever displayed and searched, never computed with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogItem {
    pub id: ToolId,
    pub name: String,
    pub brand: String,
    pub tool_type: String,
    pub material: String,
    pub coating: String,
    pub cutting_dia: String,
    pub shank_dia: String,
    pub overall_length: String,
    pub insert_size: String,
    pub workpiece_material: String,
    pub quantity: u32,
    pub price: Money,
    #[serde(default = "default_min_order_qty")]
    pub min_order_qty: u32,
    pub application_notes: String,
}

impl CatalogItem {
    /// Stock bucket using [`LOW_STOCK_THRESHOLD`].
    #[must_use]
    pub const fn availability(&self) -> Availability {
        Availability::classify(self.quantity, LOW_STOCK_THRESHOLD)
    }

    #[must_use]
    pub const fn is_in_stock(&self) -> bool {
        self.quantity > 0
    }

    /// Minimum order quantity, never below one.
    #[must_use]
    pub fn min_order(&self) -> u32 {
        self.min_order_qty.max(1)
    }

    /// Value of the stock on hand (`price × quantity`).
    #[must_use]
    pub fn stock_value(&self) -> Money {
        self.price * self.quantity
    }

    /// Dimension summary for listings, e.g. `Ø10 mm · shank 12 mm`.
    #[must_use]
    pub fn dimensions(&self) -> String {
        let parts = [
            ("Ø", &self.cutting_dia, " mm"),
            ("shank ", &self.shank_dia, " mm"),
            ("length ", &self.overall_length, " mm"),
            ("insert ", &self.insert_size, ""),
        ];
        parts
            .iter()
            .filter(|(_, value, _)| !value.is_empty())
            .map(|(prefix, value, unit)| format!("{prefix}{value}{unit}"))
            .collect::<Vec<_>>()
            .join(" · ")
    }

    /// Case-insensitive match against name, brand, id and application notes.
    ///
    /// `needle` must already be lowercase.
    #[must_use]
    pub fn matches_listing_text(&self, needle: &str) -> bool {
        [
            self.name.as_str(),
            self.brand.as_str(),
            self.id.as_str(),
            self.application_notes.as_str(),
        ]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
    }

    /// Case-insensitive match against every field, numeric ones included.
    ///
    /// `needle` must already be lowercase.
    #[must_use]
    pub fn matches_any_field(&self, needle: &str) -> bool {
        let text_fields = [
            self.id.as_str(),
            self.name.as_str(),
            self.brand.as_str(),
            self.tool_type.as_str(),
            self.material.as_str(),
            self.coating.as_str(),
            self.cutting_dia.as_str(),
            self.shank_dia.as_str(),
            self.overall_length.as_str(),
            self.insert_size.as_str(),
            self.workpiece_material.as_str(),
            self.application_notes.as_str(),
        ];
        text_fields
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
            || self.quantity.to_string().contains(needle)
            || self.price.amount().normalize().to_string().contains(needle)
    }
}

/// Distinct values offered by the facet dropdowns.
///
/// Values are non-empty and kept in first-seen order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FacetOptions {
    pub tool_types: Vec<String>,
    pub brands: Vec<String>,
    pub materials: Vec<String>,
    pub coatings: Vec<String>,
    pub workpieces: Vec<String>,
    /// Lowest and highest unit price, `None` for an empty catalog.
    pub price_range: Option<(Money, Money)>,
}

impl FacetOptions {
    /// Collect facet values from a catalog.
    #[must_use]
    pub fn collect(items: &[CatalogItem]) -> Self {
        let price_range = items.iter().map(|item| item.price).fold(
            None,
            |range: Option<(Money, Money)>, price| {
                Some(match range {
                    None => (price, price),
                    Some((lo, hi)) => (lo.min(price), hi.max(price)),
                })
            },
        );

        Self {
            tool_types: distinct(items.iter().map(|item| item.tool_type.as_str())),
            brands: distinct(items.iter().map(|item| item.brand.as_str())),
            materials: distinct(items.iter().map(|item| item.material.as_str())),
            coatings: distinct(items.iter().map(|item| item.coating.as_str())),
            workpieces: distinct(items.iter().map(|item| item.workpiece_material.as_str())),
            price_range,
        }
    }
}

fn distinct<'a>(values: impl Iterator<Item = &'a str>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for value in values {
        if !value.is_empty() && !seen.iter().any(|existing| existing == value) {
            seen.push(value.to_owned());
        }
    }
    seen
}

/// Total units on hand across a set of items.
#[must_use]
pub fn total_units<'a>(items: impl IntoIterator<Item = &'a CatalogItem>) -> u64 {
    items.into_iter().map(|item| u64::from(item.quantity)).sum()
}

/// Built-in inventory shown when the catalog spreadsheet cannot be read.
#[must_use]
pub fn sample_catalog() -> Vec<CatalogItem> {
    #[allow(clippy::type_complexity)]
    let rows: [(&str, &str, &str, &str, &str, &str, [&str; 3], &str, u32, i64, &str); 6] = [
        (
            "T001",
            "Solid End Mill - High Performance Carbide",
            "Walter",
            "Drilling",
            "HSS",
            "TiN",
            ["5.0", "", ""],
            "Aluminum",
            79,
            4368,
            "High-speed roughing operations",
        ),
        (
            "T002",
            "Precision Boring Bar - Advanced Threading",
            "Mitsubishi",
            "Threading",
            "PCD",
            "AlTiN",
            ["25.0", "", ""],
            "Aluminum",
            74,
            2832,
            "High-speed roughing applications",
        ),
        (
            "T003",
            "Solid End Mill - CBN Ultra Precision",
            "Kennametal",
            "Grooving",
            "CBN",
            "Uncoated",
            ["", "", ""],
            "Stainless Steel",
            200,
            3604,
            "Thread cutting precision work",
        ),
        (
            "T004",
            "Carbide Boring Bar - Heavy Duty",
            "Kennametal",
            "Turning",
            "Carbide",
            "TiN",
            ["", "7.0", ""],
            "Titanium",
            33,
            444,
            "Precision grooving operations",
        ),
        (
            "T005",
            "Threading End Mill - Multi-Purpose",
            "YG-1",
            "Threading",
            "Carbide",
            "TiN",
            ["", "", "192.0"],
            "Plastics",
            74,
            4430,
            "General-purpose turning applications",
        ),
        (
            "T006",
            "Ball Nose End Mill - Ceramic Coated",
            "YG-1",
            "Drilling",
            "Ceramic",
            "TiAlN",
            ["", "16.0", ""],
            "Cast Iron",
            170,
            2883,
            "Thread cutting applications",
        ),
    ];

    rows.into_iter()
        .map(
            |(id, name, brand, tool_type, material, coating, [cutting, shank, length], workpiece, quantity, price, notes)| {
                CatalogItem {
                    id: ToolId::new(id),
                    name: name.to_owned(),
                    brand: brand.to_owned(),
                    tool_type: tool_type.to_owned(),
                    material: material.to_owned(),
                    coating: coating.to_owned(),
                    cutting_dia: cutting.to_owned(),
                    shank_dia: shank.to_owned(),
                    overall_length: length.to_owned(),
                    insert_size: String::new(),
                    workpiece_material: workpiece.to_owned(),
                    quantity,
                    price: Money::from_rupees(price),
                    min_order_qty: 1,
                    application_notes: notes.to_owned(),
                }
            },
        )
        .collect()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_availability_buckets() {
        assert_eq!(Availability::classify(0, 10), Availability::OutOfStock);
        assert_eq!(Availability::classify(1, 10), Availability::LowStock);
        assert_eq!(Availability::classify(10, 10), Availability::LowStock);
        assert_eq!(Availability::classify(11, 10), Availability::InStock);
        assert_eq!(Availability::classify(5, 0), Availability::InStock);
        assert_eq!(Availability::LowStock.to_string(), "Low Stock");
    }

    #[test]
    fn test_sample_catalog_matches_fallback_inventory() {
        let items = sample_catalog();
        assert_eq!(items.len(), 6);
        assert_eq!(items[0].id.as_str(), "T001");
        assert_eq!(items[0].brand, "Walter");
        assert_eq!(items[3].price, Money::from_rupees(444));
        assert_eq!(total_units(&items), 79 + 74 + 200 + 33 + 74 + 170);
    }

    #[test]
    fn test_listing_search_ignores_other_columns() {
        let item = &sample_catalog()[0];
        assert!(item.matches_listing_text("walter"));
        assert!(item.matches_listing_text("t001"));
        assert!(item.matches_listing_text("roughing"));
        assert!(!item.matches_listing_text("aluminum"));
    }

    #[test]
    fn test_any_field_search_includes_numbers() {
        let item = &sample_catalog()[0];
        assert!(item.matches_any_field("aluminum"));
        assert!(item.matches_any_field("4368"));
        assert!(item.matches_any_field("79"));
        assert!(!item.matches_any_field("titanium"));
    }

    #[test]
    fn test_facet_options_are_distinct_in_first_seen_order() {
        let options = FacetOptions::collect(&sample_catalog());
        assert_eq!(options.brands, ["Walter", "Mitsubishi", "Kennametal", "YG-1"]);
        assert_eq!(
            options.tool_types,
            ["Drilling", "Threading", "Grooving", "Turning"]
        );
        assert_eq!(
            options.price_range,
            Some((Money::from_rupees(444), Money::from_rupees(4430)))
        );
    }

    #[test]
    fn test_facet_options_skip_empty_values() {
        let mut items = sample_catalog();
        items[1].coating = String::new();
        let options = FacetOptions::collect(&items);
        assert!(!options.coatings.iter().any(String::is_empty));
        assert!(FacetOptions::collect(&[]).price_range.is_none());
    }

    #[test]
    fn test_dimensions_skip_blank_columns() {
        let items = sample_catalog();
        assert_eq!(items[0].dimensions(), "Ø5.0 mm");
        assert_eq!(items[3].dimensions(), "shank 7.0 mm");
        assert_eq!(items[2].dimensions(), "");
    }
}
