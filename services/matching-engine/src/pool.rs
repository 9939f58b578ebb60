//! Bounded order pool
//!
//! A fixed-size slab of order slots with an index free list. Handles are
//! stable for the order's whole lifetime, which lets price levels keep
//! their FIFO queue as links embedded in the slots instead of a separate
//! allocation per queue entry.
//!
//! Exhaustion is an expected outcome: `allocate` returns `None` and the
//! engine reports the order as rejected. A handle that points at a vacant
//! slot is an engine bug and panics.

use types::numeric::Quantity;
use types::order::Order;

/// Default number of order slots
pub const DEFAULT_POOL_CAPACITY: usize = 1_000_000;

/// Stable index of a pooled order, valid until the order is released
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct OrderHandle(u32);

impl OrderHandle {
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// A pooled order together with its level queue links
///
/// `prev`/`next` are owned by the price level the order rests in and are
/// `None` while the order is not queued.
#[derive(Debug, Clone)]
pub struct OrderNode {
    pub order: Order,
    pub prev: Option<OrderHandle>,
    pub next: Option<OrderHandle>,
}

/// Bounded slab allocator for order records
#[derive(Debug)]
pub struct OrderPool {
    slots: Vec<Option<OrderNode>>,
    free: Vec<u32>,
}

impl OrderPool {
    /// Create a pool with a fixed number of slots
    ///
    /// # Panics
    /// Panics if `capacity` is zero or exceeds the `u32` handle range.
    pub fn with_capacity(capacity: usize) -> Self {
        assert!(capacity > 0, "pool capacity must be non-zero");
        assert!(
            capacity <= u32::MAX as usize,
            "pool capacity exceeds handle range"
        );

        let mut slots = Vec::with_capacity(capacity);
        slots.resize_with(capacity, || None);

        // Popped from the back, so reverse order hands out low indices first.
        let free: Vec<u32> = (0..capacity as u32).rev().collect();

        Self { slots, free }
    }

    /// Take a free slot for `order`, or `None` when the pool is exhausted
    pub fn allocate(&mut self, order: Order) -> Option<OrderHandle> {
        let index = self.free.pop()?;
        self.slots[index as usize] = Some(OrderNode {
            order,
            prev: None,
            next: None,
        });
        Some(OrderHandle(index))
    }

    /// Return a slot to the free list
    ///
    /// # Panics
    /// Panics if the slot is already vacant.
    pub fn release(&mut self, handle: OrderHandle) {
        let node = self.slots[handle.index()].take();
        assert!(node.is_some(), "released a vacant order slot");
        self.free.push(handle.0);
    }

    pub fn get(&self, handle: OrderHandle) -> &OrderNode {
        self.slots[handle.index()]
            .as_ref()
            .expect("order handle refers to a vacant order slot")
    }

    pub fn get_mut(&mut self, handle: OrderHandle) -> &mut OrderNode {
        self.slots[handle.index()]
            .as_mut()
            .expect("order handle refers to a vacant order slot")
    }

    /// Remaining quantity of the pooled order, a common read on the hot path
    pub fn remaining(&self, handle: OrderHandle) -> Quantity {
        self.get(handle).order.remaining_quantity
    }

    /// Total number of slots
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Number of free slots
    pub fn available(&self) -> usize {
        self.free.len()
    }
}
