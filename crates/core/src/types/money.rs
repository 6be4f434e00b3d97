//! Rupee amounts using decimal arithmetic.
//!
//! All prices in the catalog are Indian rupees. Amounts are kept exact
//! (`rust_decimal`) and only rounded when displayed or converted to paise
//! for the payment widget.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign, Mul};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};

/// ISO 4217 code for every amount handled by the storefront.
pub const CURRENCY_CODE: &str = "INR";

/// An amount of Indian rupees.
///
/// `Display` renders the rupee sign with Indian digit grouping
/// (`₹12,34,567.00`).
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// Zero rupees.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Wrap a decimal rupee amount.
    #[must_use]
    pub const fn new(amount: Decimal) -> Self {
        Self(amount)
    }

    /// Whole rupees.
    #[must_use]
    pub fn from_rupees(rupees: i64) -> Self {
        Self(Decimal::from(rupees))
    }

    /// The underlying decimal amount.
    #[must_use]
    pub const fn amount(&self) -> Decimal {
        self.0
    }

    /// Whether the amount is exactly zero.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Amount in paise, rounded half away from zero.
    ///
    /// Returns `None` if the amount does not fit in an `i64`.
    #[must_use]
    pub fn to_paise(&self) -> Option<i64> {
        (self.0 * Decimal::ONE_HUNDRED)
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
    }

    /// Render without the currency sign (`12,34,567.00`).
    #[must_use]
    pub fn grouped(&self) -> String {
        let rounded = format!(
            "{:.2}",
            self.0
                .abs()
                .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
        );
        let (whole, fraction) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));
        let sign = if self.0.is_sign_negative() && !self.0.is_zero() {
            "-"
        } else {
            ""
        };
        format!("{sign}{}.{fraction}", group_indian(whole))
    }
}

/// Insert separators using the Indian system: the last three digits form
/// one group, everything before that is grouped in pairs.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_owned();
    }

    let (mut head, tail) = digits.split_at(digits.len() - 3);
    let mut groups = Vec::new();
    while head.len() > 2 {
        let (rest, pair) = head.split_at(head.len() - 2);
        groups.push(pair);
        head = rest;
    }
    if !head.is_empty() {
        groups.push(head);
    }
    groups.reverse();

    format!("{},{tail}", groups.join(","))
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "₹{}", self.grouped())
    }
}

impl From<Decimal> for Money {
    fn from(amount: Decimal) -> Self {
        Self(amount)
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Mul<u32> for Money {
    type Output = Self;

    fn mul(self, quantity: u32) -> Self {
        Self(self.0 * Decimal::from(quantity))
    }
}

impl Mul<Decimal> for Money {
    type Output = Self;

    fn mul(self, rate: Decimal) -> Self {
        Self(self.0 * rate)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_uses_indian_grouping() {
        assert_eq!(Money::from_rupees(0).to_string(), "₹0.00");
        assert_eq!(Money::from_rupees(950).to_string(), "₹950.00");
        assert_eq!(Money::from_rupees(4368).to_string(), "₹4,368.00");
        assert_eq!(Money::from_rupees(100_000).to_string(), "₹1,00,000.00");
        assert_eq!(Money::from_rupees(1_234_567).to_string(), "₹12,34,567.00");
        assert_eq!(
            Money::from_rupees(123_456_789).to_string(),
            "₹12,34,56,789.00"
        );
    }

    #[test]
    fn test_display_rounds_to_two_places() {
        let money = Money::new(Decimal::new(1_999_995, 3)); // 1999.995
        assert_eq!(money.to_string(), "₹2,000.00");
    }

    #[test]
    fn test_negative_amounts_keep_sign() {
        assert_eq!(Money::from_rupees(-2500).grouped(), "-2,500.00");
    }

    #[test]
    fn test_to_paise() {
        assert_eq!(Money::from_rupees(52_950).to_paise(), Some(5_295_000));
        assert_eq!(Money::new(Decimal::new(10_005, 3)).to_paise(), Some(1001)); // 10.005
    }

    #[test]
    fn test_arithmetic() {
        let unit = Money::from_rupees(1000);
        assert_eq!(unit * 2, Money::from_rupees(2000));
        assert_eq!(unit * Decimal::new(18, 2), Money::from_rupees(180));
        let total: Money = [unit, Money::from_rupees(500)].into_iter().sum();
        assert_eq!(total, Money::from_rupees(1500));
    }
}
