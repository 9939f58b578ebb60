//! Price level with an intrusive FIFO queue
//!
//! A price level holds every resting order at one price on one side.
//! The queue is a doubly linked list threaded through the pool slots
//! themselves (`OrderNode::prev`/`next`), so unlinking an order from
//! anywhere in the queue is O(1) and the aggregate size stays cached.
//! The head of the queue is the oldest arrival and the next to match.

use types::numeric::{Price, Quantity};

use crate::pool::{OrderHandle, OrderPool};

/// FIFO queue of resting orders at a single price
#[derive(Debug, Clone)]
pub struct PriceLevel {
    price: Price,
    head: Option<OrderHandle>,
    tail: Option<OrderHandle>,
    total_quantity: Quantity,
    order_count: usize,
}

impl PriceLevel {
    pub fn new(price: Price) -> Self {
        Self {
            price,
            head: None,
            tail: None,
            total_quantity: 0,
            order_count: 0,
        }
    }

    /// Link an order at the tail of the queue
    pub fn append(&mut self, pool: &mut OrderPool, handle: OrderHandle) {
        let remaining = pool.remaining(handle);

        {
            let node = pool.get_mut(handle);
            node.prev = self.tail;
            node.next = None;
        }

        match self.tail {
            Some(tail) => pool.get_mut(tail).next = Some(handle),
            None => self.head = Some(handle),
        }
        self.tail = Some(handle);

        self.total_quantity += remaining;
        self.order_count += 1;
    }

    /// Unlink an order from wherever it sits in the queue
    pub fn unlink(&mut self, pool: &mut OrderPool, handle: OrderHandle) {
        let (prev, next, remaining) = {
            let node = pool.get(handle);
            (node.prev, node.next, node.order.remaining_quantity)
        };

        match prev {
            Some(prev) => pool.get_mut(prev).next = next,
            None => self.head = next,
        }
        match next {
            Some(next) => pool.get_mut(next).prev = prev,
            None => self.tail = prev,
        }

        let node = pool.get_mut(handle);
        node.prev = None;
        node.next = None;

        self.total_quantity -= remaining;
        self.order_count -= 1;
    }

    /// Refresh the cached total after an order's remaining quantity
    /// changed from `old_remaining`. Queue position is unchanged, so a
    /// quantity change never costs an order its time priority.
    pub fn update_quantity(
        &mut self,
        pool: &OrderPool,
        handle: OrderHandle,
        old_remaining: Quantity,
    ) {
        let new_remaining = pool.remaining(handle);
        self.total_quantity = self.total_quantity - old_remaining + new_remaining;
    }

    /// Oldest order at this level, the next to match
    pub fn head(&self) -> Option<OrderHandle> {
        self.head
    }

    pub fn price(&self) -> Price {
        self.price
    }

    pub fn is_empty(&self) -> bool {
        self.order_count == 0
    }

    pub fn total_quantity(&self) -> Quantity {
        self.total_quantity
    }

    pub fn order_count(&self) -> usize {
        self.order_count
    }

    /// Queue contents in arrival order, for assertions and depth dumps
    pub fn iter<'a>(&self, pool: &'a OrderPool) -> LevelIter<'a> {
        LevelIter {
            pool,
            next: self.head,
        }
    }
}

/// Iterator over a level's queue, head to tail
pub struct LevelIter<'a> {
    pool: &'a OrderPool,
    next: Option<OrderHandle>,
}

impl<'a> Iterator for LevelIter<'a> {
    type Item = OrderHandle;

    fn next(&mut self) -> Option<Self::Item> {
        let handle = self.next?;
        self.next = self.pool.get(handle).next;
        Some(handle)
    }
}
