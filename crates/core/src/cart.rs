//! Shopping cart with stock and minimum-order clamping.
//!
//! Every line's quantity stays within `[minimum order quantity, stock]`.
//! Requests outside that range are clamped into it; a line only goes away
//! on a zero quantity or an explicit removal.

use serde::{Deserialize, Serialize};

use crate::catalog::CatalogItem;
use crate::pricing::{CartTotals, PricingPolicy};
use crate::types::{Money, ToolId};

/// Errors from cart operations.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum CartError {
    #[error("{0} is out of stock")]
    OutOfStock(ToolId),

    #[error("{tool_id} has {available} in stock, below the minimum order of {minimum}")]
    InsufficientStock {
        tool_id: ToolId,
        available: u32,
        minimum: u32,
    },

    #[error("{0} is not in the cart")]
    NotInCart(ToolId),

    #[error("cart is empty")]
    Empty,
}

/// One catalog item in the cart.
///
/// `item` is a snapshot taken when the line was added (or last refreshed).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub item: CatalogItem,
    pub quantity: u32,
}

impl CartLine {
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.item.price * self.quantity
    }
}

/// The visitor's cart.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Add `quantity` units of an item.
    ///
    /// An existing line grows up to the available stock. A new line starts
    /// at the larger of `quantity` and the item's minimum order, capped at
    /// stock. Returns the line's resulting quantity.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::OutOfStock`] when nothing is available and
    /// [`CartError::InsufficientStock`] when stock cannot cover the
    /// minimum order.
    pub fn add(&mut self, item: &CatalogItem, quantity: u32) -> Result<u32, CartError> {
        if item.quantity == 0 {
            return Err(CartError::OutOfStock(item.id.clone()));
        }
        let minimum = item.min_order();
        if item.quantity < minimum {
            return Err(CartError::InsufficientStock {
                tool_id: item.id.clone(),
                available: item.quantity,
                minimum,
            });
        }

        if let Some(line) = self.line_mut(&item.id) {
            line.item = item.clone();
            line.quantity = line
                .quantity
                .saturating_add(quantity)
                .clamp(minimum, item.quantity);
            return Ok(line.quantity);
        }

        let quantity = quantity.max(minimum).min(item.quantity);
        self.lines.push(CartLine {
            item: item.clone(),
            quantity,
        });
        Ok(quantity)
    }

    /// Set a line's quantity.
    ///
    /// Zero removes the line. Anything else is clamped to the item's
    /// minimum order and capped at stock. Returns the new quantity, or
    /// `None` if the line was removed.
    ///
    /// # Errors
    ///
    /// Returns [`CartError::NotInCart`] if no line has this id.
    pub fn update(&mut self, tool_id: &ToolId, quantity: u32) -> Result<Option<u32>, CartError> {
        let line = self
            .line_mut(tool_id)
            .ok_or_else(|| CartError::NotInCart(tool_id.clone()))?;

        if quantity == 0 {
            self.remove(tool_id);
            return Ok(None);
        }

        line.quantity = quantity.max(line.item.min_order()).min(line.item.quantity);
        Ok(Some(line.quantity))
    }

    /// Remove a line. Returns whether anything was removed.
    pub fn remove(&mut self, tool_id: &ToolId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|line| &line.item.id != tool_id);
        self.lines.len() != before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|line| line.quantity).sum()
    }

    /// Units of one tool in the cart, zero if absent.
    #[must_use]
    pub fn quantity_of(&self, tool_id: &ToolId) -> u32 {
        self.lines
            .iter()
            .find(|line| &line.item.id == tool_id)
            .map_or(0, |line| line.quantity)
    }

    #[must_use]
    pub fn subtotal(&self) -> Money {
        self.lines.iter().map(CartLine::line_total).sum()
    }

    #[must_use]
    pub fn totals(&self, policy: &PricingPolicy) -> CartTotals {
        policy.totals(self.subtotal())
    }

    /// # Errors
    ///
    /// Returns [`CartError::Empty`] if the cart has no lines.
    pub fn ensure_not_empty(&self) -> Result<(), CartError> {
        if self.is_empty() {
            Err(CartError::Empty)
        } else {
            Ok(())
        }
    }

    /// Re-apply the quantity bounds against a freshly loaded catalog.
    ///
    /// Lines whose tool vanished, sold out, or no longer meets its minimum
    /// are dropped; the rest are re-capped at current stock. Returns the
    /// number of lines that changed.
    pub fn refresh(&mut self, catalog: &[CatalogItem]) -> usize {
        let mut changed = 0;
        self.lines.retain_mut(|line| {
            let Some(current) = catalog.iter().find(|item| item.id == line.item.id) else {
                changed += 1;
                return false;
            };
            if current.quantity < current.min_order() {
                changed += 1;
                return false;
            }
            let quantity = line.quantity.clamp(current.min_order(), current.quantity);
            if quantity != line.quantity || current != &line.item {
                changed += 1;
            }
            line.quantity = quantity;
            line.item = current.clone();
            true
        });
        changed
    }

    fn line_mut(&mut self, tool_id: &ToolId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|line| &line.item.id == tool_id)
    }
}
