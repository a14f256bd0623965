//! Fixed-capacity circular buffer.
//!
//! Backs click-interval history, CPS windows and tracked-entity position
//! history. Push overwrites the oldest element when full; there is no dynamic
//! growth.

/// A fixed-capacity ring buffer. All operations are O(1) except [`to_vec`]
/// and iteration, which are O(n).
///
/// [`to_vec`]: RingBuffer::to_vec
#[derive(Debug, Clone)]
pub struct RingBuffer<T> {
    slots: Vec<Option<T>>,
    head: usize,
    len: usize,
}

impl<T: Clone> RingBuffer<T> {
    /// Creates a buffer holding at most `capacity` elements.
    ///
    /// # Panics
    ///
    /// Panics if `capacity` is zero. A zero-capacity sample buffer is a
    /// configuration bug, not a runtime condition.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "ring buffer capacity must be positive");
        Self {
            slots: vec![None; capacity],
            head: 0,
            len: 0,
        }
    }

    /// Maximum number of elements.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Current number of elements.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Whether the buffer holds no elements.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Whether the buffer is at capacity; the next push will evict.
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len == self.slots.len()
    }

    /// Appends `value`, evicting and returning the oldest element when full.
    pub fn push(&mut self, value: T) -> Option<T> {
        let tail = (self.head + self.len) % self.slots.len();
        let evicted = if self.is_full() {
            let old = self.slots[self.head].take();
            self.head = (self.head + 1) % self.slots.len();
            old
        } else {
            self.len += 1;
            None
        };
        self.slots[tail] = Some(value);
        evicted
    }

    /// Removes and returns the oldest element.
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        let value = self.slots[self.head].take();
        self.head = (self.head + 1) % self.slots.len();
        self.len -= 1;
        value
    }

    /// The oldest element without removing it.
    #[must_use]
    pub fn peek(&self) -> Option<&T> {
        if self.len == 0 {
            None
        } else {
            self.slots[self.head].as_ref()
        }
    }

    /// The newest element.
    #[must_use]
    pub fn newest(&self) -> Option<&T> {
        if self.len == 0 {
            return None;
        }
        let idx = (self.head + self.len - 1) % self.slots.len();
        self.slots[idx].as_ref()
    }

    /// Removes every element.
    pub fn clear(&mut self) {
        for slot in &mut self.slots {
            *slot = None;
        }
        self.head = 0;
        self.len = 0;
    }

    /// Iterates oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        (0..self.len).filter_map(move |i| {
            let idx = (self.head + i) % self.slots.len();
            self.slots[idx].as_ref()
        })
    }

    /// Snapshot in insertion order, oldest first.
    #[must_use]
    pub fn to_vec(&self) -> Vec<T> {
        self.iter().cloned().collect()
    }
}
