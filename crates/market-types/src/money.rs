//! Fixed-point monetary amounts.
//!
//! All balances, budgets, bid amounts, and ledger entries use [`Money`]: a
//! `rust_decimal::Decimal` pinned to scale 2. Floating point never touches a
//! monetary value anywhere in the workspace.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Number of decimal places every amount carries.
pub const MONEY_SCALE: u32 = 2;

/// Errors converting raw decimals into [`Money`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    /// The value carries more than two decimal places.
    #[error("amount {0} has more than {MONEY_SCALE} decimal places")]
    TooPrecise(Decimal),

    /// Arithmetic overflowed the decimal range.
    #[error("monetary arithmetic overflow")]
    Overflow,
}

/// A monetary amount with exactly two decimal places.
///
/// Construction normalizes the scale, so two `Money` values compare equal
/// iff they denote the same amount. Arithmetic is checked; an overflow
/// surfaces as `None` rather than wrapping or panicking.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(transparent)]
pub struct Money(Decimal);

impl Money {
    /// The zero amount.
    pub const ZERO: Self = Self(Decimal::ZERO);

    /// Builds an amount from a whole number of cents.
    #[must_use]
    pub fn from_cents(cents: i64) -> Self {
        Self(Decimal::new(cents, MONEY_SCALE))
    }

    /// Builds an amount from a raw decimal, rejecting sub-cent precision.
    ///
    /// # Errors
    /// `MoneyError::TooPrecise` if the value has more than two decimal places.
    pub fn try_from_decimal(value: Decimal) -> Result<Self, MoneyError> {
        let normalized = value.normalize();
        if normalized.scale() > MONEY_SCALE {
            return Err(MoneyError::TooPrecise(value));
        }
        let mut pinned = normalized;
        pinned.rescale(MONEY_SCALE);
        Ok(Self(pinned))
    }

    /// Returns the underlying decimal (always scale 2).
    #[must_use]
    pub const fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// Checked addition.
    #[must_use]
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Checked subtraction.
    #[must_use]
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// True for amounts strictly greater than zero.
    #[must_use]
    pub fn is_positive(&self) -> bool {
        self.0 > Decimal::ZERO
    }

    /// True for amounts strictly less than zero.
    #[must_use]
    pub fn is_negative(&self) -> bool {
        self.0 < Decimal::ZERO
    }

    /// True for the zero amount.
    #[must_use]
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }
}

impl std::fmt::Display for Money {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut pinned = self.0;
        pinned.rescale(MONEY_SCALE);
        write!(f, "{pinned}")
    }
}
