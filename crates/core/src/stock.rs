//! Stock records kept in the hosted stock table.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::{Availability, CatalogItem};
use crate::types::{Money, ToolId};

/// One row of the stock table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockRecord {
    /// Row id assigned by the table service (`rec...`).
    pub record_id: String,
    pub id: ToolId,
    pub name: String,
    pub category: String,
    pub brand: String,
    pub quantity: u32,
    /// Quantity at or below which the item counts as low stock.
    pub min_stock: u32,
    pub price: Money,
    pub location: String,
    pub last_updated: Option<NaiveDate>,
    pub description: String,
}

impl StockRecord {
    #[must_use]
    pub const fn availability(&self) -> Availability {
        Availability::classify(self.quantity, self.min_stock)
    }

    /// View this record as a catalog item so the stock page can query it.
    #[must_use]
    pub fn to_catalog_item(&self) -> CatalogItem {
        CatalogItem {
            id: self.id.clone(),
            name: self.name.clone(),
            brand: self.brand.clone(),
            tool_type: self.category.clone(),
            material: String::new(),
            coating: String::new(),
            cutting_dia: String::new(),
            shank_dia: String::new(),
            overall_length: String::new(),
            insert_size: String::new(),
            workpiece_material: String::new(),
            quantity: self.quantity,
            price: self.price,
            min_order_qty: 1,
            application_notes: self.description.clone(),
        }
    }
}
