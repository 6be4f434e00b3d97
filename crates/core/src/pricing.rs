//! Tax and shipping policy.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::Money;

/// GST, tax added on top of the cart subtotal.
pub const DEFAULT_GST_RATE: Decimal = Decimal::from_parts(18, 0, 0, false, 2);

/// Orders whose subtotal is strictly above this ship free.
pub const DEFAULT_FREE_SHIPPING_THRESHOLD: Money = Money::new(Decimal::from_parts(1_000_000, 0, 0, false, 0));

/// Shipping charged on orders at or below the threshold.
pub const DEFAULT_FLAT_SHIPPING_FEE: Money = Money::new(Decimal::from_parts(50_000, 0, 0, false, 0));

/// Rates used to turn a subtotal into an order total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    pub gst_rate: Decimal,
    pub free_shipping_threshold: Money,
    pub flat_shipping_fee: Money,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            gst_rate: DEFAULT_GST_RATE,
            free_shipping_threshold: DEFAULT_FREE_SHIPPING_THRESHOLD,
            flat_shipping_fee: DEFAULT_FLAT_SHIPPING_FEE,
        }
    }
}

impl PricingPolicy {
    /// Shipping fee for a subtotal.
    #[must_use]
    pub fn shipping_for(&self, subtotal: Money) -> Money {
        if subtotal > self.free_shipping_threshold {
            Money::ZERO
        } else {
            self.flat_shipping_fee
        }
    }

    /// Compute totals for a subtotal. No rounding is applied.
    #[must_use]
    pub fn totals(&self, subtotal: Money) -> CartTotals {
        let tax = subtotal * self.gst_rate;
        let shipping = self.shipping_for(subtotal);
        CartTotals {
            subtotal,
            tax,
            shipping,
            total: subtotal + tax + shipping,
        }
    }

    /// GST rate as a whole percentage for display (`18`).
    #[must_use]
    pub fn gst_percent(&self) -> Decimal {
        (self.gst_rate * Decimal::ONE_HUNDRED).normalize()
    }
}

/// Breakdown of what the customer pays.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartTotals {
    pub subtotal: Money,
    pub tax: Money,
    pub shipping: Money,
    pub total: Money,
}

impl CartTotals {
    #[must_use]
    pub fn ships_free(&self) -> bool {
        self.shipping.is_zero()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_policy_constants() {
        let policy = PricingPolicy::default();
        assert_eq!(policy.gst_rate, Decimal::new(18, 2));
        assert_eq!(policy.free_shipping_threshold, Money::from_rupees(1_000_000));
        assert_eq!(policy.flat_shipping_fee, Money::from_rupees(50_000));
        assert_eq!(policy.gst_percent().to_string(), "18");
    }

    #[test]
    fn test_small_order_pays_flat_shipping() {
        let totals = PricingPolicy::default().totals(Money::from_rupees(2500));
        assert_eq!(totals.subtotal, Money::from_rupees(2500));
        assert_eq!(totals.tax, Money::from_rupees(450));
        assert_eq!(totals.shipping, Money::from_rupees(50_000));
        assert_eq!(totals.total, Money::from_rupees(52_950));
        assert!(!totals.ships_free());
    }

    #[test]
    fn test_threshold_is_exclusive() {
        let policy = PricingPolicy::default();
        assert_eq!(
            policy.shipping_for(Money::from_rupees(1_000_000)),
            Money::from_rupees(50_000)
        );
        assert!(policy.totals(Money::from_rupees(1_000_001)).ships_free());
    }

    #[test]
    fn test_totals_are_not_rounded() {
        let subtotal = Money::new(Decimal::new(333, 2)); // 3.33
        let totals = PricingPolicy::default().totals(subtotal);
        assert_eq!(totals.tax, Money::new(Decimal::new(5994, 4))); // 0.5994
    }
}
