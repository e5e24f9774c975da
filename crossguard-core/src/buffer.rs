//! Bounded FIFO History for Monitoring Ticks
//!
//! ## Overview
//!
//! The monitor keeps short histories in two places:
//! - the delay-compensation buffer of itom batches (one entry per tick)
//! - the smoothing windows of aggregate error vectors
//!
//! Both are ring buffers that overwrite their oldest entry when full. Unlike a
//! sensor history with a compile-time size, these capacities come from the
//! monitor configuration, so the storage is allocated once per (re)arm and then
//! reused.
//!
//! ## Memory Layout
//!
//! ```text
//! HistoryBuffer { capacity: 3 }
//! ┌─────┬─────┬─────┐
//! │  0  │  1  │  2  │  ← slots (Option<T>)
//! └─────┴─────┴─────┘
//!    ↑
//!    └── write_pos, wraps to 0 after slot 2
//! ```
//!
//! - `push()`: O(1), never allocates after construction
//! - `iter()`: oldest to newest
//! - `resize()`: drops all content (history is never carried across re-arms)
//!
//! ## Usage Example
//!
//! ```rust
//! use crossguard_core::buffer::HistoryBuffer;
//!
//! let mut window = HistoryBuffer::new(2);
//! window.push(1.0);
//! window.push(2.0);
//! window.push(3.0);
//!
//! let kept: Vec<f64> = window.iter().copied().collect();
//! assert_eq!(kept, vec![2.0, 3.0]);
//! ```

use alloc::vec::Vec;

/// Fixed-capacity ring buffer with overwrite-oldest semantics
///
/// ## Internal Invariants
///
/// - `write_pos < capacity` (next write position is always valid)
/// - `len <= capacity`
/// - Iteration yields entries in insertion order
///
/// A capacity of zero is raised to one: the monitor always needs the
/// current tick.
#[derive(Debug, Clone)]
pub struct HistoryBuffer<T> {
    /// Slots; `None` until first written
    data: Vec<Option<T>>,

    /// Index where the next write will occur
    write_pos: usize,

    /// Number of valid entries
    len: usize,
}

impl<T> HistoryBuffer<T> {
    /// Creates an empty buffer holding at most `capacity` entries
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        let mut data = Vec::with_capacity(capacity);
        data.resize_with(capacity, || None);

        Self {
            data,
            write_pos: 0,
            len: 0,
        }
    }

    /// Adds an entry, overwriting the oldest one when full
    pub fn push(&mut self, entry: T) {
        let capacity = self.capacity();
        self.data[self.write_pos] = Some(entry);
        self.write_pos = (self.write_pos + 1) % capacity;

        if self.len < capacity {
            self.len += 1;
        }
    }

    /// Maximum number of entries
    pub fn capacity(&self) -> usize {
        self.data.len()
    }

    /// Get number of stored entries
    pub fn len(&self) -> usize {
        self.len
    }

    /// Check if buffer is empty
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Check if buffer is full
    pub fn is_full(&self) -> bool {
        self.len == self.capacity()
    }

    /// Get the most recent entry
    pub fn last(&self) -> Option<&T> {
        if self.is_empty() {
            return None;
        }

        let capacity = self.capacity();
        let idx = (self.write_pos + capacity - 1) % capacity;
        self.data[idx].as_ref()
    }

    /// Iterate over entries from oldest to newest
    pub fn iter(&self) -> HistoryIter<'_, T> {
        HistoryIter {
            buffer: self,
            index: 0,
        }
    }

    /// Drop all entries, keeping the capacity
    pub fn clear(&mut self) {
        for slot in self.data.iter_mut() {
            *slot = None;
        }
        self.write_pos = 0;
        self.len = 0;
    }

    /// Drop all entries and change the capacity
    pub fn resize(&mut self, capacity: usize) {
        *self = Self::new(capacity);
    }

    /// Gets an entry by its logical index (0 = oldest, len-1 = newest)
    ///
    /// ```text
    /// Physical:  [D, E, A, B, C]  (write_pos = 2, full)
    /// Logical:   [A, B, C, D, E]
    /// logical[i] = physical[(write_pos + i) % capacity]
    /// ```
    pub fn get(&self, index: usize) -> Option<&T> {
        if index >= self.len {
            return None;
        }

        let actual_index = if self.len < self.capacity() {
            index
        } else {
            (self.write_pos + index) % self.capacity()
        };

        self.data[actual_index].as_ref()
    }
}

/// Iterator over buffer contents, oldest first
pub struct HistoryIter<'a, T> {
    buffer: &'a HistoryBuffer<T>,
    index: usize,
}

impl<'a, T> Iterator for HistoryIter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let item = self.buffer.get(self.index)?;
        self.index += 1;
        Some(item)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.buffer.len().saturating_sub(self.index);
        (remaining, Some(remaining))
    }
}

impl<T> Default for HistoryBuffer<T> {
    fn default() -> Self {
        Self::new(crate::constants::monitor::DEFAULT_BUFFER_SIZE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec;

    #[test]
    fn empty_buffer() {
        let buffer: HistoryBuffer<u32> = HistoryBuffer::new(5);
        assert!(buffer.is_empty());
        assert_eq!(buffer.len(), 0);
        assert_eq!(buffer.capacity(), 5);
        assert!(buffer.last().is_none());
    }

    #[test]
    fn zero_capacity_holds_current_entry() {
        let mut buffer = HistoryBuffer::new(0);
        buffer.push(7);
        assert_eq!(buffer.capacity(), 1);
        assert_eq!(buffer.last(), Some(&7));
    }

    #[test]
    fn circular_overwrite() {
        let mut buffer = HistoryBuffer::new(3);

        for i in 0..5 {
            buffer.push(i);
        }

        assert_eq!(buffer.len(), 3);
        assert!(buffer.is_full());

        // 0 and 1 were overwritten
        let values: Vec<i32> = buffer.iter().copied().collect();
        assert_eq!(values, vec![2, 3, 4]);
        assert_eq!(buffer.last(), Some(&4));
    }

    #[test]
    fn iterator_order_before_wrap() {
        let mut buffer = HistoryBuffer::new(4);
        buffer.push(10);
        buffer.push(11);

        let values: Vec<i32> = buffer.iter().copied().collect();
        assert_eq!(values, vec![10, 11]);
        assert_eq!(buffer.iter().size_hint(), (2, Some(2)));
    }

    #[test]
    fn resize_drops_history() {
        let mut buffer = HistoryBuffer::new(2);
        buffer.push(1);
        buffer.push(2);

        buffer.resize(4);
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 4);

        buffer.push(3);
        buffer.clear();
        assert!(buffer.is_empty());
        assert_eq!(buffer.capacity(), 4);
    }
}
