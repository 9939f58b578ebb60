//! Matching engine core
//!
//! Single consumer of the ingress channel, single producer of the egress
//! channel, and sole owner of the books and the order pool. One thread
//! calls `process_orders` in a poll loop; submitters and result readers
//! stay on their own threads behind the channel endpoints.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tracing::{debug, error, warn};

use types::ids::{OrderId, Symbol};
use types::numeric::Quantity;
use types::order::{Order, Side};
use types::trade::Trade;

use crate::book::OrderBook;
use crate::matching::crossing;
use crate::messages::{MatchResult, MatchStatus, OrderRequest};
use crate::pool::{OrderHandle, OrderPool, DEFAULT_POOL_CAPACITY};
use crate::spsc;
use crate::time::current_time_nanos;

/// Default slot count for each channel; the usable capacity is one less.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 65_536;

/// Engine sizing knobs
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Number of order slots in the pool
    pub pool_capacity: usize,
    /// Slot count for the ingress and egress rings; must be a power of two
    pub channel_capacity: usize,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            pool_capacity: DEFAULT_POOL_CAPACITY,
            channel_capacity: DEFAULT_CHANNEL_CAPACITY,
        }
    }
}

/// Submitter endpoint of the ingress channel
pub struct OrderSender {
    tx: spsc::Producer<OrderRequest>,
}

impl OrderSender {
    /// Enqueue a request; false when the ingress ring is full
    pub fn submit_order(&mut self, request: OrderRequest) -> bool {
        self.tx.try_push(request).is_ok()
    }

    pub fn pending(&self) -> usize {
        self.tx.len()
    }
}

/// Reader endpoint of the egress channel
pub struct ResultReceiver {
    rx: spsc::Consumer<MatchResult>,
}

impl ResultReceiver {
    /// Dequeue the next result; `None` when the egress ring is empty
    pub fn get_result(&mut self) -> Option<MatchResult> {
        self.rx.try_pop()
    }

    pub fn pending(&self) -> usize {
        self.rx.len()
    }
}

/// Main matching engine
pub struct MatchingEngine {
    /// Order storage, confined to the matching thread
    pool: OrderPool,
    /// Order books per symbol, created lazily
    books: HashMap<Symbol, OrderBook>,
    running: AtomicBool,
    processed: AtomicU64,
    ingress: spsc::Consumer<OrderRequest>,
    egress: spsc::Producer<MatchResult>,
}

impl MatchingEngine {
    /// Create an engine together with its channel endpoints
    ///
    /// The engine moves to the matching thread; the sender and receiver
    /// go to the submitting and consuming threads respectively.
    pub fn new(config: EngineConfig) -> (Self, OrderSender, ResultReceiver) {
        let (request_tx, request_rx) = spsc::channel(config.channel_capacity);
        let (result_tx, result_rx) = spsc::channel(config.channel_capacity);

        let engine = Self {
            pool: OrderPool::with_capacity(config.pool_capacity),
            books: HashMap::new(),
            running: AtomicBool::new(false),
            processed: AtomicU64::new(0),
            ingress: request_rx,
            egress: result_tx,
        };

        (
            engine,
            OrderSender { tx: request_tx },
            ResultReceiver { rx: result_rx },
        )
    }

    /// Drain ingress until it is empty or egress is saturated
    ///
    /// A request is popped only when its result already has an egress
    /// slot, so a processed request's result can never be dropped; a
    /// saturated egress leaves the remaining requests queued for the
    /// next tick.
    pub fn process_orders(&mut self) {
        while !self.egress.is_full() {
            let Some(request) = self.ingress.try_pop() else {
                break;
            };

            let result = match request {
                OrderRequest::Add { order } => self.process_add(order),
                OrderRequest::Cancel { symbol, order_id } => self.process_cancel(symbol, order_id),
                OrderRequest::Modify {
                    symbol,
                    order_id,
                    new_quantity,
                } => self.process_modify(symbol, order_id, new_quantity),
            };

            if let Err(result) = self.egress.try_push(result) {
                error!(
                    order_id = %result.order_id,
                    "egress full after capacity check, result dropped"
                );
                break;
            }
            self.processed.fetch_add(1, Ordering::Relaxed);
        }
    }

    fn process_add(&mut self, order: Order) -> MatchResult {
        let book = self.books.entry(order.symbol).or_insert_with(|| {
            debug!(symbol = %order.symbol, "creating order book");
            OrderBook::new(order.symbol)
        });

        // Checked before any allocation or fill so a duplicate has no
        // side effects.
        if book.contains(order.id) {
            warn!(order_id = %order.id, "duplicate order id");
            return MatchResult::new(MatchStatus::Rejected, order.id);
        }

        // Fill-or-kill admission: reject up front unless the opposing
        // side has enough crossable depth for a complete fill.
        if order.is_fok() && crossing::crossable_quantity(book, &order, order.quantity) < order.quantity
        {
            return MatchResult::new(MatchStatus::Rejected, order.id);
        }

        let Some(handle) = self.pool.allocate(order) else {
            warn!(order_id = %order.id, "order pool exhausted");
            return MatchResult::new(MatchStatus::Rejected, order.id);
        };

        let mut result = MatchResult::new(MatchStatus::Added, order.id);
        Self::match_order(book, &mut self.pool, handle, &mut result.trades);
        if !result.trades.is_empty() {
            result.status = MatchStatus::Matched;
        }

        if self.pool.remaining(handle) == 0 {
            self.pool.release(handle);
            result.status = MatchStatus::Matched;
        } else if order.is_ioc() || order.is_market() {
            // Market orders never rest, whatever their stated time in force.
            self.pool.release(handle);
            if result.trades.is_empty() {
                result.status = MatchStatus::Rejected;
            }
        } else {
            // A fill-or-kill order never reaches here: admission
            // guaranteed a complete fill.
            debug_assert!(!order.is_fok());
            let added = book.add_order(&mut self.pool, handle);
            debug_assert!(added, "id was free before matching");
        }

        result
    }

    fn process_cancel(&mut self, symbol: Symbol, order_id: OrderId) -> MatchResult {
        let Some(book) = self.books.get_mut(&symbol) else {
            return MatchResult::new(MatchStatus::Rejected, order_id);
        };

        match book.remove_order(&mut self.pool, order_id) {
            Some(handle) => {
                self.pool.release(handle);
                MatchResult::new(MatchStatus::Cancelled, order_id)
            }
            None => MatchResult::new(MatchStatus::Rejected, order_id),
        }
    }

    fn process_modify(
        &mut self,
        symbol: Symbol,
        order_id: OrderId,
        new_quantity: Quantity,
    ) -> MatchResult {
        if new_quantity == 0 {
            return self.process_cancel(symbol, order_id);
        }

        let Some(book) = self.books.get_mut(&symbol) else {
            return MatchResult::new(MatchStatus::Rejected, order_id);
        };
        let Some(handle) = book.handle(order_id) else {
            return MatchResult::new(MatchStatus::Rejected, order_id);
        };

        let old_remaining = self.pool.remaining(handle);
        {
            let node = self.pool.get_mut(handle);
            node.order.quantity = new_quantity;
            node.order.remaining_quantity = new_quantity;
        }
        book.update_order_quantity(&self.pool, order_id, old_remaining);

        MatchResult::new(MatchStatus::Modified, order_id)
    }

    fn match_order(
        book: &mut OrderBook,
        pool: &mut OrderPool,
        incoming: OrderHandle,
        trades: &mut Vec<Trade>,
    ) {
        match pool.get(incoming).order.side {
            Side::Buy => Self::match_buy_order(book, pool, incoming, trades),
            Side::Sell => Self::match_sell_order(book, pool, incoming, trades),
        }
    }

    /// Match an incoming buy against asks, best price first and oldest
    /// order first within a level. The trade prints at the maker's price.
    fn match_buy_order(
        book: &mut OrderBook,
        pool: &mut OrderPool,
        incoming: OrderHandle,
        trades: &mut Vec<Trade>,
    ) {
        loop {
            let taker = pool.get(incoming).order;
            if taker.remaining_quantity == 0 {
                break;
            }
            let Some(ask) = book.best_ask() else {
                break;
            };
            if !crossing::crosses(Side::Buy, taker.price, taker.is_market(), ask) {
                break;
            }

            let level = book.sell_level(ask).expect("best ask has no level");
            let maker_handle = level.head().expect("non-empty level has no head");
            let maker = pool.get(maker_handle).order;

            let fill = taker.remaining_quantity.min(maker.remaining_quantity);
            trades.push(Trade::new(
                maker.id,
                taker.id,
                taker.symbol,
                ask,
                fill,
                current_time_nanos(),
            ));

            pool.get_mut(maker_handle).order.fill(fill);
            pool.get_mut(incoming).order.fill(fill);

            if maker.remaining_quantity == fill {
                let handle = book
                    .remove_order(pool, maker.id)
                    .expect("maker missing from book");
                pool.release(handle);
            } else {
                book.update_order_quantity(pool, maker.id, maker.remaining_quantity);
            }
        }
    }

    /// Match an incoming sell against bids; mirror of the buy path
    fn match_sell_order(
        book: &mut OrderBook,
        pool: &mut OrderPool,
        incoming: OrderHandle,
        trades: &mut Vec<Trade>,
    ) {
        loop {
            let taker = pool.get(incoming).order;
            if taker.remaining_quantity == 0 {
                break;
            }
            let Some(bid) = book.best_bid() else {
                break;
            };
            if !crossing::crosses(Side::Sell, taker.price, taker.is_market(), bid) {
                break;
            }

            let level = book.buy_level(bid).expect("best bid has no level");
            let maker_handle = level.head().expect("non-empty level has no head");
            let maker = pool.get(maker_handle).order;

            let fill = taker.remaining_quantity.min(maker.remaining_quantity);
            trades.push(Trade::new(
                maker.id,
                taker.id,
                taker.symbol,
                bid,
                fill,
                current_time_nanos(),
            ));

            pool.get_mut(maker_handle).order.fill(fill);
            pool.get_mut(incoming).order.fill(fill);

            if maker.remaining_quantity == fill {
                let handle = book
                    .remove_order(pool, maker.id)
                    .expect("maker missing from book");
                pool.release(handle);
            } else {
                book.update_order_quantity(pool, maker.id, maker.remaining_quantity);
            }
        }
    }

    /// Mark the engine running. Threading is the embedder's concern; this
    /// only toggles the observability flag.
    pub fn start(&self) {
        self.running.store(true, Ordering::Relaxed);
    }

    /// Mark the engine stopped. Queued requests stay on the channels and
    /// resume processing on the next `process_orders` call after `start`.
    pub fn stop(&self) {
        self.running.store(false, Ordering::Relaxed);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Relaxed)
    }

    /// Number of results successfully pushed to egress
    pub fn processed_orders(&self) -> u64 {
        self.processed.load(Ordering::Relaxed)
    }

    pub fn order_book(&self, symbol: Symbol) -> Option<&OrderBook> {
        self.books.get(&symbol)
    }

    pub fn order_book_count(&self) -> usize {
        self.books.len()
    }

    /// Resting orders across all books
    pub fn total_orders(&self) -> usize {
        self.books.values().map(OrderBook::order_count).sum()
    }

    pub fn order(&self, symbol: Symbol, order_id: OrderId) -> Option<&Order> {
        self.books.get(&symbol)?.order(&self.pool, order_id)
    }

    pub fn order_capacity(&self) -> usize {
        self.pool.capacity()
    }

    pub fn available_order_capacity(&self) -> usize {
        self.pool.available()
    }

    /// Drop every book and resting order and reset the processed counter
    pub fn clear_all_books(&mut self) {
        for book in self.books.values_mut() {
            book.clear(&mut self.pool);
        }
        self.books.clear();
        self.processed.store(0, Ordering::Relaxed);
    }
}
