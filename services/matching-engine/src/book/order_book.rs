//! Per-symbol order book
//!
//! Both sides live in price-ordered maps so the best price is always the
//! first (asks) or last (bids) key, and iteration order is deterministic.
//! The cached bests update monotonically on insert; only removing the
//! cached best forces a recompute, which the ordered map answers in
//! O(log L). Order storage belongs to the pool; the book owns the level
//! entries and the id index.

use std::collections::{BTreeMap, HashMap};

use types::ids::{OrderId, Symbol};
use types::numeric::{Price, Quantity};
use types::order::{Order, Side};

use super::price_level::PriceLevel;
use crate::pool::{OrderHandle, OrderPool};

/// Order book for a single symbol
#[derive(Debug)]
pub struct OrderBook {
    symbol: Symbol,
    /// Bid levels, best = last key
    bids: BTreeMap<Price, PriceLevel>,
    /// Ask levels, best = first key
    asks: BTreeMap<Price, PriceLevel>,
    /// Resting order index across both sides
    orders: HashMap<OrderId, OrderHandle>,
    best_bid: Option<Price>,
    best_ask: Option<Price>,
}

impl OrderBook {
    pub fn new(symbol: Symbol) -> Self {
        Self {
            symbol,
            bids: BTreeMap::new(),
            asks: BTreeMap::new(),
            orders: HashMap::new(),
            best_bid: None,
            best_ask: None,
        }
    }

    pub fn symbol(&self) -> Symbol {
        self.symbol
    }

    /// Whether an order id is resting on this book
    pub fn contains(&self, order_id: OrderId) -> bool {
        self.orders.contains_key(&order_id)
    }

    /// Rest a pooled order on the book
    ///
    /// Returns false when the id is already present, leaving the book
    /// unchanged.
    pub fn add_order(&mut self, pool: &mut OrderPool, handle: OrderHandle) -> bool {
        let order = pool.get(handle).order;
        if self.orders.contains_key(&order.id) {
            return false;
        }
        self.orders.insert(order.id, handle);

        match order.side {
            Side::Buy => {
                let level = self
                    .bids
                    .entry(order.price)
                    .or_insert_with(|| PriceLevel::new(order.price));
                level.append(pool, handle);

                if self.best_bid.map_or(true, |best| order.price > best) {
                    self.best_bid = Some(order.price);
                }
            }
            Side::Sell => {
                let level = self
                    .asks
                    .entry(order.price)
                    .or_insert_with(|| PriceLevel::new(order.price));
                level.append(pool, handle);

                if self.best_ask.map_or(true, |best| order.price < best) {
                    self.best_ask = Some(order.price);
                }
            }
        }

        true
    }

    /// Unlink an order and drop it from the index
    ///
    /// Returns the handle so the caller can release the pooled storage,
    /// or `None` when the id is unknown. An emptied level is dropped, and
    /// a removed best price is recomputed from the ordered map.
    pub fn remove_order(&mut self, pool: &mut OrderPool, order_id: OrderId) -> Option<OrderHandle> {
        let handle = self.orders.remove(&order_id)?;
        let order = pool.get(handle).order;

        match order.side {
            Side::Buy => {
                let level = self
                    .bids
                    .get_mut(&order.price)
                    .expect("resting order has no bid level");
                level.unlink(pool, handle);

                if level.is_empty() {
                    self.bids.remove(&order.price);
                    if self.best_bid == Some(order.price) {
                        self.best_bid = self.bids.keys().next_back().copied();
                    }
                }
            }
            Side::Sell => {
                let level = self
                    .asks
                    .get_mut(&order.price)
                    .expect("resting order has no ask level");
                level.unlink(pool, handle);

                if level.is_empty() {
                    self.asks.remove(&order.price);
                    if self.best_ask == Some(order.price) {
                        self.best_ask = self.asks.keys().next().copied();
                    }
                }
            }
        }

        Some(handle)
    }

    /// Refresh a level's cached total after the order's remaining
    /// quantity changed from `old_remaining`
    pub fn update_order_quantity(
        &mut self,
        pool: &OrderPool,
        order_id: OrderId,
        old_remaining: Quantity,
    ) {
        let Some(&handle) = self.orders.get(&order_id) else {
            return;
        };
        let order = pool.get(handle).order;

        let level = match order.side {
            Side::Buy => self.bids.get_mut(&order.price),
            Side::Sell => self.asks.get_mut(&order.price),
        }
        .expect("resting order has no level");

        level.update_quantity(pool, handle, old_remaining);
    }

    pub fn handle(&self, order_id: OrderId) -> Option<OrderHandle> {
        self.orders.get(&order_id).copied()
    }

    pub fn order<'a>(&self, pool: &'a OrderPool, order_id: OrderId) -> Option<&'a Order> {
        self.orders.get(&order_id).map(|&h| &pool.get(h).order)
    }

    pub fn best_bid(&self) -> Option<Price> {
        self.best_bid
    }

    pub fn best_ask(&self) -> Option<Price> {
        self.best_ask
    }

    pub fn has_best_bid(&self) -> bool {
        self.best_bid.is_some()
    }

    pub fn has_best_ask(&self) -> bool {
        self.best_ask.is_some()
    }

    pub fn buy_level(&self, price: Price) -> Option<&PriceLevel> {
        self.bids.get(&price)
    }

    pub fn sell_level(&self, price: Price) -> Option<&PriceLevel> {
        self.asks.get(&price)
    }

    /// Bid levels from best downward, for the crossable-depth scan
    pub fn bid_level_iter(&self) -> impl Iterator<Item = (Price, &PriceLevel)> {
        self.bids.iter().rev().map(|(price, level)| (*price, level))
    }

    /// Ask levels from best upward
    pub fn ask_level_iter(&self) -> impl Iterator<Item = (Price, &PriceLevel)> {
        self.asks.iter().map(|(price, level)| (*price, level))
    }

    /// Top `depth` bid levels, best first
    pub fn bid_levels(&self, depth: usize) -> Vec<(Price, Quantity)> {
        self.bids
            .iter()
            .rev()
            .take(depth)
            .map(|(price, level)| (*price, level.total_quantity()))
            .collect()
    }

    /// Top `depth` ask levels, best first
    pub fn ask_levels(&self, depth: usize) -> Vec<(Price, Quantity)> {
        self.asks
            .iter()
            .take(depth)
            .map(|(price, level)| (*price, level.total_quantity()))
            .collect()
    }

    /// Number of resting orders
    pub fn order_count(&self) -> usize {
        self.orders.len()
    }

    /// Number of non-empty price levels across both sides
    pub fn level_count(&self) -> usize {
        self.bids.len() + self.asks.len()
    }

    /// Drop every level and order, releasing pooled storage
    pub fn clear(&mut self, pool: &mut OrderPool) {
        for (_, handle) in self.orders.drain() {
            pool.release(handle);
        }
        self.bids.clear();
        self.asks.clear();
        self.best_bid = None;
        self.best_ask = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use types::order::{OrderType, TimeInForce};

    fn rest(
        book: &mut OrderBook,
        pool: &mut OrderPool,
        id: u64,
        side: Side,
        price: f64,
        quantity: Quantity,
    ) -> bool {
        let order = Order::limit(
            OrderId::new(id),
            book.symbol(),
            side,
            Price::from_f64(price),
            quantity,
            TimeInForce::Gtc,
            1_708_123_456_789_000_000,
        );
        let handle = pool.allocate(order).unwrap();
        let added = book.add_order(pool, handle);
        if !added {
            pool.release(handle);
        }
        added
    }

    #[test]
    fn test_empty_book() {
        let book = OrderBook::new(Symbol::new(1));
        assert!(!book.has_best_bid());
        assert!(!book.has_best_ask());
        assert_eq!(book.order_count(), 0);
        assert_eq!(book.level_count(), 0);
    }

    #[test]
    fn test_add_orders_updates_bests() {
        let mut pool = OrderPool::with_capacity(16);
        let mut book = OrderBook::new(Symbol::new(1));

        assert!(rest(&mut book, &mut pool, 1, Side::Buy, 100.50, 1000));
        assert_eq!(book.best_bid(), Some(Price::from_f64(100.50)));
        assert!(!book.has_best_ask());

        assert!(rest(&mut book, &mut pool, 2, Side::Sell, 100.60, 500));
        assert_eq!(book.best_ask(), Some(Price::from_f64(100.60)));

        // A better bid moves the cache, a worse one does not.
        assert!(rest(&mut book, &mut pool, 3, Side::Buy, 100.55, 300));
        assert_eq!(book.best_bid(), Some(Price::from_f64(100.55)));
        assert!(rest(&mut book, &mut pool, 4, Side::Buy, 100.40, 300));
        assert_eq!(book.best_bid(), Some(Price::from_f64(100.55)));

        assert_eq!(book.order_count(), 4);
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let mut pool = OrderPool::with_capacity(16);
        let mut book = OrderBook::new(Symbol::new(1));

        assert!(rest(&mut book, &mut pool, 1, Side::Buy, 100.50, 1000));
        assert!(!rest(&mut book, &mut pool, 1, Side::Buy, 100.60, 500));

        assert_eq!(book.order_count(), 1);
        assert_eq!(book.best_bid(), Some(Price::from_f64(100.50)));
        assert_eq!(pool.available(), 15);
    }

    #[test]
    fn test_remove_order_recomputes_best() {
        let mut pool = OrderPool::with_capacity(16);
        let mut book = OrderBook::new(Symbol::new(1));

        rest(&mut book, &mut pool, 1, Side::Buy, 100.50, 1000);
        rest(&mut book, &mut pool, 2, Side::Buy, 100.40, 500);

        let handle = book.remove_order(&mut pool, OrderId::new(1)).unwrap();
        pool.release(handle);

        assert_eq!(book.best_bid(), Some(Price::from_f64(100.40)));
        assert_eq!(book.order_count(), 1);

        let handle = book.remove_order(&mut pool, OrderId::new(2)).unwrap();
        pool.release(handle);

        assert!(!book.has_best_bid());
        assert_eq!(book.order_count(), 0);
        assert_eq!(book.level_count(), 0);
        assert!(book.remove_order(&mut pool, OrderId::new(999)).is_none());
    }

    #[test]
    fn test_levels_aggregate_quantity() {
        let mut pool = OrderPool::with_capacity(16);
        let mut book = OrderBook::new(Symbol::new(1));

        rest(&mut book, &mut pool, 1, Side::Buy, 100.50, 1000);
        rest(&mut book, &mut pool, 2, Side::Buy, 100.50, 500);
        rest(&mut book, &mut pool, 3, Side::Buy, 100.40, 300);

        let level = book.buy_level(Price::from_f64(100.50)).unwrap();
        assert_eq!(level.total_quantity(), 1500);
        assert_eq!(level.order_count(), 2);

        let bids = book.bid_levels(5);
        assert_eq!(bids.len(), 2);
        assert_eq!(bids[0], (Price::from_f64(100.50), 1500));
        assert_eq!(bids[1], (Price::from_f64(100.40), 300));
    }

    #[test]
    fn test_ask_levels_sorted_ascending() {
        let mut pool = OrderPool::with_capacity(16);
        let mut book = OrderBook::new(Symbol::new(1));

        rest(&mut book, &mut pool, 1, Side::Sell, 100.70, 400);
        rest(&mut book, &mut pool, 2, Side::Sell, 100.60, 300);
        rest(&mut book, &mut pool, 3, Side::Sell, 100.80, 200);

        let asks = book.ask_levels(2);
        assert_eq!(asks.len(), 2);
        assert_eq!(asks[0], (Price::from_f64(100.60), 300));
        assert_eq!(asks[1], (Price::from_f64(100.70), 400));
        assert_eq!(book.best_ask(), Some(Price::from_f64(100.60)));
    }

    #[test]
    fn test_order_lookup() {
        let mut pool = OrderPool::with_capacity(16);
        let mut book = OrderBook::new(Symbol::new(1));

        rest(&mut book, &mut pool, 1, Side::Buy, 100.50, 1000);

        let order = book.order(&pool, OrderId::new(1)).unwrap();
        assert_eq!(order.id, OrderId::new(1));
        assert_eq!(order.order_type, OrderType::Limit);
        assert!(book.order(&pool, OrderId::new(2)).is_none());
        assert!(book.contains(OrderId::new(1)));
    }

    #[test]
    fn test_clear_releases_storage() {
        let mut pool = OrderPool::with_capacity(16);
        let mut book = OrderBook::new(Symbol::new(1));

        rest(&mut book, &mut pool, 1, Side::Buy, 100.50, 1000);
        rest(&mut book, &mut pool, 2, Side::Sell, 100.60, 500);
        assert_eq!(pool.available(), 14);

        book.clear(&mut pool);

        assert_eq!(pool.available(), 16);
        assert_eq!(book.order_count(), 0);
        assert!(!book.has_best_bid());
        assert!(!book.has_best_ask());
    }
}
