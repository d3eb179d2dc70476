//! Monetary amounts.
//!
//! Catalog prices arrive as JSON numbers and are kept at full precision:
//! line totals and sums are computed on the unrounded values, and rounding
//! to cents happens only when an amount is rendered.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul};

/// A monetary value
///
/// ```
/// use storefront_cart::money::Money;
///
/// let bananas = Money::from_decimal(1.09);
/// assert_eq!(bananas.cents(), 109);
/// assert_eq!((bananas * 3).to_string(), "3.27");
///
/// // Sub-cent prices are multiplied before rounding
/// assert_eq!((Money::from_decimal(0.125) * 4).to_string(), "0.50");
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, PartialOrd, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(f64);

impl Money {
    /// Zero
    pub const ZERO: Self = Self(0.0);

    /// Creates a value from a decimal amount, kept as given
    #[must_use]
    pub const fn from_decimal(amount: f64) -> Self {
        Self(amount)
    }

    /// Creates a value from whole cents
    #[must_use]
    #[allow(clippy::cast_precision_loss)] // catalog prices are far below 2^53 cents
    pub fn from_cents(cents: i64) -> Self {
        Self(cents as f64 / 100.0)
    }

    /// Value as a decimal amount
    #[must_use]
    pub const fn to_decimal(self) -> f64 {
        self.0
    }

    /// Value rounded to whole cents, halves away from zero
    #[must_use]
    #[allow(clippy::cast_possible_truncation)] // saturating float-to-int cast
    pub fn cents(self) -> i64 {
        (self.0 * 100.0).round() as i64
    }
}

impl From<f64> for Money {
    fn from(amount: f64) -> Self {
        Self::from_decimal(amount)
    }
}

impl From<Money> for f64 {
    fn from(money: Money) -> Self {
        money.to_decimal()
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
        *self = *self + rhs;
    }
}

/// Price times quantity. Quantities are not validated, so this may be negative.
impl Mul<i64> for Money {
    type Output = Self;

    #[allow(clippy::cast_precision_loss)] // quantities are far below 2^53
    fn mul(self, quantity: i64) -> Self {
        Self(self.0 * quantity as f64)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

/// Exactly two decimals, no currency symbol: `23.25`, `-1.50`, `0.00`
///
/// Halves round away from zero, so `0.125` renders as `0.13`.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let cents = (self.0 * 100.0).round();
        f.pad(&format!("{:.2}", cents / 100.0))
    }
}
