//! Request and response messages for the engine channels

use serde::{Deserialize, Serialize};
use types::ids::{OrderId, Symbol};
use types::numeric::Quantity;
use types::order::Order;
use types::trade::Trade;

/// A request consumed from the ingress channel
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "UPPERCASE")]
pub enum OrderRequest {
    /// Admit a new order for matching
    Add { order: Order },
    /// Cancel a resting order
    Cancel { symbol: Symbol, order_id: OrderId },
    /// Replace a resting order's quantity; zero behaves as Cancel
    Modify {
        symbol: Symbol,
        order_id: OrderId,
        new_quantity: Quantity,
    },
}

/// Outcome of a processed request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum MatchStatus {
    /// Order rested on the book without matching
    Added,
    /// Order generated at least one fill (or arrived already terminal)
    Matched,
    /// Resting order removed on request
    Cancelled,
    /// Resting order's quantity replaced
    Modified,
    /// Request refused; the book is unchanged unless trades are present
    Rejected,
}

/// The response pushed to the egress channel, one per processed request
///
/// Trades generated by a single request always travel together in one
/// result, in the order the matching loop produced them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub status: MatchStatus,
    pub order_id: OrderId,
    pub trades: Vec<Trade>,
}

impl MatchResult {
    pub fn new(status: MatchStatus, order_id: OrderId) -> Self {
        Self {
            status,
            order_id,
            trades: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::numeric::Price;
    use types::order::{Side, TimeInForce};

    #[test]
    fn test_request_serialization() {
        let order = Order::limit(
            OrderId::new(1),
            Symbol::new(1),
            Side::Buy,
            Price::from_f64(100.50),
            1000,
            TimeInForce::Gtc,
            1_708_123_456_789_000_000,
        );

        let request = OrderRequest::Add { order };
        let json = serde_json::to_string(&request).unwrap();
        assert!(json.contains("\"type\":\"ADD\""));

        let deserialized: OrderRequest = serde_json::from_str(&json).unwrap();
        assert_eq!(request, deserialized);
    }

    #[test]
    fn test_result_serialization() {
        let mut result = MatchResult::new(MatchStatus::Matched, OrderId::new(3));
        result.trades.push(Trade::new(
            OrderId::new(1),
            OrderId::new(3),
            Symbol::new(1),
            Price::from_f64(100.50),
            700,
            1_708_123_456_789_000_000,
        ));

        let json = serde_json::to_string(&result).unwrap();
        let deserialized: MatchResult = serde_json::from_str(&json).unwrap();
        assert_eq!(result, deserialized);
    }
}
