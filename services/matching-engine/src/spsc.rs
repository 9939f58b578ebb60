//! Bounded single-producer single-consumer channel
//!
//! A power-of-two ring with one slot kept empty, split into a `Producer`
//! and a `Consumer` endpoint. Each endpoint caches the far index so the
//! common case touches only one shared atomic: the producer re-reads the
//! consumer's position only when the ring looks full, and vice versa.
//!
//! Contract: exactly one producer and one consumer. Both operations are
//! wait-free; a full ring rejects the push and an empty ring returns
//! nothing, without blocking.

use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crossbeam_utils::CachePadded;

struct RingBuffer<T> {
    /// Next slot to read, owned by the consumer
    head: CachePadded<AtomicUsize>,
    /// Next slot to write, owned by the producer
    tail: CachePadded<AtomicUsize>,
    mask: usize,
    slots: Box<[UnsafeCell<MaybeUninit<T>>]>,
}

// The producer and consumer never touch the same slot at the same time:
// a slot is written before the tail advance publishes it and read after
// the head load observes that advance.
unsafe impl<T: Send> Send for RingBuffer<T> {}
unsafe impl<T: Send> Sync for RingBuffer<T> {}

impl<T> RingBuffer<T> {
    fn new(capacity: usize) -> Self {
        assert!(
            capacity.is_power_of_two() && capacity >= 2,
            "channel capacity must be a power of two and at least 2"
        );

        let slots: Box<[UnsafeCell<MaybeUninit<T>>]> = (0..capacity)
            .map(|_| UnsafeCell::new(MaybeUninit::uninit()))
            .collect();

        Self {
            head: CachePadded::new(AtomicUsize::new(0)),
            tail: CachePadded::new(AtomicUsize::new(0)),
            mask: capacity - 1,
            slots,
        }
    }

    fn len(&self) -> usize {
        let tail = self.tail.load(Ordering::Acquire);
        let head = self.head.load(Ordering::Acquire);
        tail.wrapping_sub(head) & self.mask
    }

    /// Usable capacity; one slot stays empty to distinguish full from empty
    fn capacity(&self) -> usize {
        self.mask
    }
}

impl<T> Drop for RingBuffer<T> {
    fn drop(&mut self) {
        let mut head = *self.head.get_mut();
        let tail = *self.tail.get_mut();
        while head != tail {
            unsafe { (*self.slots[head].get()).assume_init_drop() };
            head = (head + 1) & self.mask;
        }
    }
}

/// Create a bounded SPSC channel
///
/// `capacity` must be a power of two; the usable capacity is one less.
pub fn channel<T>(capacity: usize) -> (Producer<T>, Consumer<T>) {
    let ring = Arc::new(RingBuffer::new(capacity));
    (
        Producer {
            ring: Arc::clone(&ring),
            cached_head: 0,
        },
        Consumer {
            ring,
            cached_tail: 0,
        },
    )
}

/// Sending endpoint of the channel
pub struct Producer<T> {
    ring: Arc<RingBuffer<T>>,
    cached_head: usize,
}

impl<T> Producer<T> {
    /// Push without blocking; hands the value back when the ring is full
    pub fn try_push(&mut self, value: T) -> Result<(), T> {
        let ring = &*self.ring;
        let tail = ring.tail.load(Ordering::Relaxed);
        let next_tail = (tail + 1) & ring.mask;

        if next_tail == self.cached_head {
            self.cached_head = ring.head.load(Ordering::Acquire);
            if next_tail == self.cached_head {
                return Err(value);
            }
        }

        unsafe { (*ring.slots[tail].get()).write(value) };
        ring.tail.store(next_tail, Ordering::Release);

        Ok(())
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == self.ring.capacity()
    }

    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }
}

/// Receiving endpoint of the channel
pub struct Consumer<T> {
    ring: Arc<RingBuffer<T>>,
    cached_tail: usize,
}

impl<T> Consumer<T> {
    /// Pop without blocking; `None` when the ring is empty
    pub fn try_pop(&mut self) -> Option<T> {
        let ring = &*self.ring;
        let head = ring.head.load(Ordering::Relaxed);

        if head == self.cached_tail {
            self.cached_tail = ring.tail.load(Ordering::Acquire);
            if head == self.cached_tail {
                return None;
            }
        }

        let value = unsafe { (*ring.slots[head].get()).assume_init_read() };
        ring.head.store((head + 1) & ring.mask, Ordering::Release);

        Some(value)
    }

    /// Pop up to `max_items` values into `f`, returning how many were popped
    pub fn pop_each<F>(&mut self, mut f: F, max_items: usize) -> usize
    where
        F: FnMut(T),
    {
        let ring = &*self.ring;
        let head = ring.head.load(Ordering::Relaxed);

        if head == self.cached_tail {
            self.cached_tail = ring.tail.load(Ordering::Acquire);
            if head == self.cached_tail {
                return 0;
            }
        }

        let available = self.cached_tail.wrapping_sub(head) & ring.mask;
        let to_pop = available.min(max_items);

        for i in 0..to_pop {
            let index = (head + i) & ring.mask;
            let value = unsafe { (*ring.slots[index].get()).assume_init_read() };
            ring.head.store((index + 1) & ring.mask, Ordering::Release);
            f(value);
        }

        to_pop
    }

    pub fn len(&self) -> usize {
        self.ring.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == self.ring.capacity()
    }

    pub fn capacity(&self) -> usize {
        self.ring.capacity()
    }
}
