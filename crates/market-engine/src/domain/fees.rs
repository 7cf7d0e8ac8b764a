//! Platform fee computation.
//!
//! The fee is rounded once, with banker's rounding, to the ledger scale;
//! the payout is defined as `total - fee` and never independently rounded.
//! That makes `debit(client) == credit(tasker) + fee` hold exactly for
//! every rate.

use market_types::{EngineError, Money, MoneyError, MONEY_SCALE};
use rust_decimal::{Decimal, RoundingStrategy};

/// A settled amount split into platform fee and tasker payout.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSplit {
    /// The platform's cut. Not a user-facing ledger entry, but derivable:
    /// it is exactly `debit - credit` for the task's entries.
    pub fee: Money,
    /// What the tasker receives: `total - fee`.
    pub payout: Money,
}

/// Splits `total` by `rate` (e.g. `0.05` for 5%).
///
/// # Errors
/// `Validation` for non-positive totals or a rate outside `[0, 1)`.
pub fn split(total: Money, rate: Decimal) -> Result<FeeSplit, EngineError> {
    if !total.is_positive() {
        return Err(EngineError::Validation {
            reason: "settlement amount must be positive".to_string(),
        });
    }
    if rate < Decimal::ZERO || rate >= Decimal::ONE {
        return Err(EngineError::Validation {
            reason: format!("fee rate {rate} outside [0, 1)"),
        });
    }

    let raw = total
        .as_decimal()
        .checked_mul(rate)
        .ok_or(MoneyError::Overflow)?;
    let fee = Money::try_from_decimal(
        raw.round_dp_with_strategy(MONEY_SCALE, RoundingStrategy::MidpointNearestEven),
    )?;
    let payout = total.checked_sub(fee).ok_or(MoneyError::Overflow)?;

    Ok(FeeSplit { fee, payout })
}
