//! Money arithmetic using rust_decimal
//!
//! Prices travel as `Decimal` in major currency units (rupees, euros). The
//! payment gateway works in integer minor units (paise, cents); conversion
//! happens only at that boundary.

use rust_decimal::prelude::*;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Rounding precision for monetary values (2 decimal places)
const DECIMAL_PLACES: u32 = 2;

/// Minor units per major unit
pub const MINOR_UNITS_PER_MAJOR: i64 = 100;

/// Tolerance for monetary comparisons (0.01)
pub const MONEY_TOLERANCE: Decimal = Decimal::from_parts(1, 0, 0, false, 2);

/// Default delivery fee in major units
pub const DEFAULT_DELIVERY_FEE: Decimal = Decimal::from_parts(30, 0, 0, false, 0);

/// Default tax rate in basis points (8%)
pub const DEFAULT_TAX_RATE_BPS: u32 = 800;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MoneyError {
    #[error("amount must be positive, got {0}")]
    NotPositive(Decimal),

    #[error("amount {0} is not a whole number of minor units")]
    Fractional(Decimal),

    #[error("amount {0} is out of range")]
    Overflow(Decimal),
}

/// Round to 2 decimal places, half away from zero
pub fn round_money(value: Decimal) -> Decimal {
    value.round_dp_with_strategy(DECIMAL_PLACES, RoundingStrategy::MidpointAwayFromZero)
}

/// unit price × quantity
pub fn line_total(unit_price: Decimal, quantity: u32) -> Decimal {
    unit_price * Decimal::from(quantity)
}

/// Whether two amounts are equal within [`MONEY_TOLERANCE`]
pub fn amounts_match(a: Decimal, b: Decimal) -> bool {
    (a - b).abs() < MONEY_TOLERANCE
}

/// Validate an amount already expressed in minor units.
///
/// Rejects zero, negative and fractional amounts.
pub fn validate_minor_units(amount: Decimal) -> Result<i64, MoneyError> {
    if amount <= Decimal::ZERO {
        return Err(MoneyError::NotPositive(amount));
    }
    if !amount.fract().is_zero() {
        return Err(MoneyError::Fractional(amount));
    }
    amount.to_i64().ok_or(MoneyError::Overflow(amount))
}

/// Convert a major-unit amount to gateway minor units.
pub fn to_minor_units(amount: Decimal) -> Result<i64, MoneyError> {
    let minor = amount * Decimal::from(MINOR_UNITS_PER_MAJOR);
    validate_minor_units(minor).map_err(|e| match e {
        MoneyError::Fractional(_) => MoneyError::Fractional(amount),
        MoneyError::NotPositive(_) => MoneyError::NotPositive(amount),
        MoneyError::Overflow(_) => MoneyError::Overflow(amount),
    })
}

/// Checkout breakdown for one cart
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Quote {
    pub subtotal: Decimal,
    pub delivery_fee: Decimal,
    pub tax: Decimal,
    pub total: Decimal,
}

/// Delivery fee and tax rules applied at checkout.
///
/// The server validates submitted totals against the same policy the client
/// used to build them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricingPolicy {
    pub delivery_fee: Decimal,
    pub tax_rate_bps: u32,
}

impl Default for PricingPolicy {
    fn default() -> Self {
        Self {
            delivery_fee: DEFAULT_DELIVERY_FEE,
            tax_rate_bps: DEFAULT_TAX_RATE_BPS,
        }
    }
}

impl PricingPolicy {
    pub fn new(delivery_fee: Decimal, tax_rate_bps: u32) -> Self {
        Self {
            delivery_fee,
            tax_rate_bps,
        }
    }

    /// Tax on a subtotal, rounded to whole currency units.
    pub fn tax(&self, subtotal: Decimal) -> Decimal {
        let rate = Decimal::new(i64::from(self.tax_rate_bps), 4);
        (subtotal * rate).round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
    }

    pub fn quote(&self, subtotal: Decimal) -> Quote {
        let tax = self.tax(subtotal);
        Quote {
            subtotal,
            delivery_fee: self.delivery_fee,
            tax,
            total: round_money(subtotal + self.delivery_fee + tax),
        }
    }
}
