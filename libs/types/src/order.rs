//! Order lifecycle types

use serde::{Deserialize, Serialize};

use crate::ids::{OrderId, Symbol};
use crate::numeric::{Price, Quantity};

/// Order side (buyer or seller)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Side {
    /// Buy order (bid)
    Buy,
    /// Sell order (ask)
    Sell,
}

impl Side {
    /// Get the opposite side
    pub fn opposite(&self) -> Self {
        match self {
            Side::Buy => Side::Sell,
            Side::Sell => Side::Buy,
        }
    }
}

/// Order pricing mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderType {
    /// Execute at the stated price or better, rest otherwise
    Limit,
    /// Execute against whatever is resting; the price field is reporting only
    Market,
}

/// Time-in-force policy for unfilled quantity
///
/// A sum type rather than per-flag booleans, so an order can never claim
/// to be both immediate-or-cancel and fill-or-kill.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum TimeInForce {
    /// Good-till-cancel: any residual rests on the book
    Gtc,
    /// Immediate-or-cancel: match what crosses now, discard the residual
    Ioc,
    /// Fill-or-kill: full immediate fill or reject with no effect
    Fok,
}

/// A live or incoming order
///
/// `remaining_quantity` is decremented by the matching engine only; an
/// order with zero remaining is terminal. Market orders carry their price
/// for reporting but it is ignored for matching.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub symbol: Symbol,
    pub side: Side,
    pub order_type: OrderType,
    pub price: Price,
    pub quantity: Quantity,
    pub remaining_quantity: Quantity,
    pub time_in_force: TimeInForce,
    /// Arrival timestamp, Unix nanos
    pub timestamp: i64,
}

impl Order {
    /// Create a new limit order
    pub fn limit(
        id: OrderId,
        symbol: Symbol,
        side: Side,
        price: Price,
        quantity: Quantity,
        time_in_force: TimeInForce,
        timestamp: i64,
    ) -> Self {
        Self {
            id,
            symbol,
            side,
            order_type: OrderType::Limit,
            price,
            quantity,
            remaining_quantity: quantity,
            time_in_force,
            timestamp,
        }
    }

    /// Create a new market order. Market orders never rest, so any
    /// residual is discarded regardless of the stated time in force.
    pub fn market(
        id: OrderId,
        symbol: Symbol,
        side: Side,
        quantity: Quantity,
        timestamp: i64,
    ) -> Self {
        Self {
            id,
            symbol,
            side,
            order_type: OrderType::Market,
            price: Price::ZERO,
            quantity,
            remaining_quantity: quantity,
            time_in_force: TimeInForce::Ioc,
            timestamp,
        }
    }

    pub fn is_buy(&self) -> bool {
        self.side == Side::Buy
    }

    pub fn is_sell(&self) -> bool {
        self.side == Side::Sell
    }

    pub fn is_limit(&self) -> bool {
        self.order_type == OrderType::Limit
    }

    pub fn is_market(&self) -> bool {
        self.order_type == OrderType::Market
    }

    pub fn is_ioc(&self) -> bool {
        self.time_in_force == TimeInForce::Ioc
    }

    pub fn is_fok(&self) -> bool {
        self.time_in_force == TimeInForce::Fok
    }

    /// Check if the order is completely filled
    pub fn is_filled(&self) -> bool {
        self.remaining_quantity == 0
    }

    /// Apply a fill to the remaining quantity
    ///
    /// # Panics
    /// Panics if the fill exceeds the remaining quantity.
    pub fn fill(&mut self, quantity: Quantity) {
        assert!(
            quantity <= self.remaining_quantity,
            "fill exceeds remaining quantity"
        );
        self.remaining_quantity -= quantity;
    }
}
