//! Crossing detection
//!
//! Determines when an incoming order can trade against a resting price,
//! and how much opposing depth an order could reach, which is what
//! decides fill-or-kill admission before any fill is applied.

use types::numeric::{Price, Quantity};
use types::order::{Order, Side};

use crate::book::OrderBook;

/// Whether an incoming order crosses a resting price
///
/// Market orders cross any resting price; a limit buy crosses asks at or
/// below its price, a limit sell crosses bids at or above.
pub fn crosses(side: Side, price: Price, is_market: bool, resting_price: Price) -> bool {
    if is_market {
        return true;
    }
    match side {
        Side::Buy => price >= resting_price,
        Side::Sell => price <= resting_price,
    }
}

/// Total opposing quantity the order could cross, capped at `target`
///
/// Walks opposing levels from the best price while they cross, summing
/// cached level totals. Stops as soon as `target` is reached, so the scan
/// is bounded by the depth actually needed.
pub fn crossable_quantity(book: &OrderBook, order: &Order, target: Quantity) -> Quantity {
    let mut available: Quantity = 0;

    match order.side {
        Side::Buy => {
            for (price, level) in book.ask_level_iter() {
                if !crosses(Side::Buy, order.price, order.is_market(), price) {
                    break;
                }
                available = available.saturating_add(level.total_quantity());
                if available >= target {
                    break;
                }
            }
        }
        Side::Sell => {
            for (price, level) in book.bid_level_iter() {
                if !crosses(Side::Sell, order.price, order.is_market(), price) {
                    break;
                }
                available = available.saturating_add(level.total_quantity());
                if available >= target {
                    break;
                }
            }
        }
    }

    available
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::OrderPool;
    use types::ids::{OrderId, Symbol};
    use types::order::TimeInForce;

    fn rest(book: &mut OrderBook, pool: &mut OrderPool, id: u64, side: Side, price: f64, qty: u64) {
        let order = Order::limit(
            OrderId::new(id),
            book.symbol(),
            side,
            Price::from_f64(price),
            qty,
            TimeInForce::Gtc,
            0,
        );
        let handle = pool.allocate(order).unwrap();
        assert!(book.add_order(pool, handle));
    }

    #[test]
    fn test_crosses_limit() {
        let price = Price::from_f64(100.50);

        assert!(crosses(Side::Buy, Price::from_f64(100.60), false, price));
        assert!(crosses(Side::Buy, price, false, price));
        assert!(!crosses(Side::Buy, Price::from_f64(100.40), false, price));

        assert!(crosses(Side::Sell, Price::from_f64(100.40), false, price));
        assert!(crosses(Side::Sell, price, false, price));
        assert!(!crosses(Side::Sell, Price::from_f64(100.60), false, price));
    }

    #[test]
    fn test_crosses_market_ignores_price() {
        assert!(crosses(
            Side::Buy,
            Price::ZERO,
            true,
            Price::from_f64(100.50)
        ));
        assert!(crosses(
            Side::Sell,
            Price::ZERO,
            true,
            Price::from_f64(100.50)
        ));
    }

    #[test]
    fn test_crossable_quantity_stops_at_price() {
        let mut pool = OrderPool::with_capacity(16);
        let mut book = OrderBook::new(Symbol::new(1));

        rest(&mut book, &mut pool, 1, Side::Sell, 100.60, 300);
        rest(&mut book, &mut pool, 2, Side::Sell, 100.70, 400);
        rest(&mut book, &mut pool, 3, Side::Sell, 100.90, 500);

        let buy = Order::limit(
            OrderId::new(10),
            Symbol::new(1),
            Side::Buy,
            Price::from_f64(100.75),
            10_000,
            TimeInForce::Fok,
            0,
        );

        // Only the two levels at or below 100.75 are reachable.
        assert_eq!(crossable_quantity(&book, &buy, 10_000), 700);
    }

    #[test]
    fn test_crossable_quantity_stops_once_target_reached() {
        let mut pool = OrderPool::with_capacity(16);
        let mut book = OrderBook::new(Symbol::new(1));

        rest(&mut book, &mut pool, 1, Side::Buy, 100.50, 300);
        rest(&mut book, &mut pool, 2, Side::Buy, 100.40, 400);
        rest(&mut book, &mut pool, 3, Side::Buy, 100.30, 500);

        let sell = Order::limit(
            OrderId::new(10),
            Symbol::new(1),
            Side::Sell,
            Price::from_f64(100.30),
            600,
            TimeInForce::Fok,
            0,
        );

        // The scan may stop early once the target is covered; either way
        // the answer is at least the target when enough depth crosses.
        assert!(crossable_quantity(&book, &sell, 600) >= 600);

        let sell_large = Order::limit(
            OrderId::new(11),
            Symbol::new(1),
            Side::Sell,
            Price::from_f64(100.35),
            10_000,
            TimeInForce::Fok,
            0,
        );

        // Levels below the limit price are unreachable.
        assert_eq!(crossable_quantity(&book, &sell_large, 10_000), 700);
    }

    #[test]
    fn test_crossable_quantity_market_sweeps_all_levels() {
        let mut pool = OrderPool::with_capacity(16);
        let mut book = OrderBook::new(Symbol::new(1));

        rest(&mut book, &mut pool, 1, Side::Sell, 100.60, 300);
        rest(&mut book, &mut pool, 2, Side::Sell, 101.80, 400);

        let buy = Order::market(OrderId::new(10), Symbol::new(1), Side::Buy, 10_000, 0);

        assert_eq!(crossable_quantity(&book, &buy, 10_000), 700);
    }
}
