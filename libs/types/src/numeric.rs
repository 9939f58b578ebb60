//! Fixed-point numeric types for prices and quantities
//!
//! Prices are a raw `i64` count of ticks at one millionth of a currency
//! unit, so all comparisons and arithmetic are plain integer operations
//! and identical on every platform. Decimal and floating-point forms are
//! conversions for external boundaries only.

use rust_decimal::prelude::*;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::NumericError;

/// Number of price ticks per currency unit.
pub const PRICE_SCALE: i64 = 1_000_000;

/// Order and trade quantity in whole units.
pub type Quantity = u64;

/// Price as a fixed-point tick count
///
/// Two prices with the same raw value are equal under every ordering.
/// Serialized as the raw tick count so wire values never lose precision.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    /// Zero price, the default for market orders.
    pub const ZERO: Price = Price(0);

    /// Create a price from a raw tick count
    pub const fn from_raw(raw: i64) -> Self {
        Self(raw)
    }

    /// Create a price from a floating-point currency amount, rounding to
    /// the nearest tick. Lossy; intended for external boundaries.
    pub fn from_f64(value: f64) -> Self {
        Self((value * PRICE_SCALE as f64).round() as i64)
    }

    /// Convert to a floating-point currency amount. Lossy.
    pub fn to_f64(self) -> f64 {
        self.0 as f64 / PRICE_SCALE as f64
    }

    /// Create a price from a decimal currency amount, rounding half away
    /// from zero to the nearest tick.
    pub fn from_decimal(value: Decimal) -> Result<Self, NumericError> {
        let ticks = (value * Decimal::from(PRICE_SCALE))
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
        ticks
            .to_i64()
            .map(Self)
            .ok_or(NumericError::PriceOutOfRange { value: value.to_string() })
    }

    /// Convert to an exact decimal currency amount.
    pub fn to_decimal(self) -> Decimal {
        Decimal::new(self.0, 6)
    }

    /// Get the raw tick count
    pub const fn raw(self) -> i64 {
        self.0
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_decimal())
    }
}
