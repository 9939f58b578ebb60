//! Trade execution types

use serde::{Deserialize, Serialize};

use crate::ids::{OrderId, Symbol};
use crate::numeric::{Price, Quantity};

/// An executed match between a resting and an incoming order
///
/// Trades are append-only records and are never revised after emission.
/// The execution price is always the maker's resting price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    pub maker_order_id: OrderId,
    pub taker_order_id: OrderId,
    pub symbol: Symbol,
    pub price: Price,
    pub quantity: Quantity,
    /// Execution timestamp, Unix nanos
    pub executed_at: i64,
}

impl Trade {
    pub fn new(
        maker_order_id: OrderId,
        taker_order_id: OrderId,
        symbol: Symbol,
        price: Price,
        quantity: Quantity,
        executed_at: i64,
    ) -> Self {
        Self {
            maker_order_id,
            taker_order_id,
            symbol,
            price,
            quantity,
            executed_at,
        }
    }

    /// Trade value in raw price ticks, exact
    pub fn notional(&self) -> i128 {
        self.price.raw() as i128 * self.quantity as i128
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trade_creation() {
        let trade = Trade::new(
            OrderId::new(1),
            OrderId::new(2),
            Symbol::new(1),
            Price::from_f64(100.50),
            700,
            1_708_123_456_789_000_000,
        );

        assert_eq!(trade.maker_order_id, OrderId::new(1));
        assert_eq!(trade.taker_order_id, OrderId::new(2));
        assert_eq!(trade.quantity, 700);
    }

    #[test]
    fn test_trade_notional() {
        let trade = Trade::new(
            OrderId::new(1),
            OrderId::new(2),
            Symbol::new(1),
            Price::from_f64(100.50),
            1000,
            0,
        );

        assert_eq!(trade.notional(), 100_500_000i128 * 1000);
    }

    #[test]
    fn test_trade_serialization() {
        let trade = Trade::new(
            OrderId::new(10),
            OrderId::new(20),
            Symbol::new(1),
            Price::from_f64(100.60),
            300,
            1_708_123_456_789_000_000,
        );

        let json = serde_json::to_string(&trade).unwrap();
        let deserialized: Trade = serde_json::from_str(&json).unwrap();
        assert_eq!(trade, deserialized);
    }
}
