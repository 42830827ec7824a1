//! # Double Buffer
//!
//! Frame-delayed publication for single-threaded frame loops.
//!
//! ## Architecture
//!
//! ```text
//!                    ┌─────────────────────────────┐
//!                    │        DoubleBuffer<T>      │
//!                    │                             │
//!                    │  ┌─────────┐  ┌─────────┐  │
//!                    │  │ Buffer A│  │ Buffer B│  │
//!                    │  └────┬────┘  └────┬────┘  │
//!                    │       │            │       │
//!                    │  ┌────┴────────────┴────┐  │
//!                    │  │   Write Index (0/1)  │  │
//!                    │  └──────────────────────┘  │
//!                    └─────────────────────────────┘
//!                              │
//!              ┌───────────────┼───────────────┐
//!              ▼               ▼               ▼
//!      ┌──────────────┐ ┌────────────┐ ┌────────────┐
//!      │   back_mut   │ │   front    │ │    swap    │
//!      │ (this frame) │ │(last frame)│ │ (frame end)│
//!      └──────────────┘ └────────────┘ └────────────┘
//! ```
//!
//! A reader never observes a write made in the same frame. This breaks
//! feedback cycles such as an overlay's blocking region blocking the very
//! widgets that declare it.

/// Two copies of a per-frame table.
///
/// ## Usage
///
/// ```rust
/// use quill_core::{DoubleBuffer, FixedStack};
///
/// let (mut a, mut b) = ([0u32; 4], [0u32; 4]);
/// let mut regions = DoubleBuffer::new(FixedStack::from_slice(&mut a), FixedStack::from_slice(&mut b));
///
/// regions.back_mut().push(1);
/// assert!(regions.front().is_empty()); // not visible yet
///
/// regions.swap_and_reset(FixedStack::clear);
/// assert_eq!(regions.front().as_slice(), &[1]);
/// assert!(regions.back().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct DoubleBuffer<T> {
    /// The two buffers.
    buffers: [T; 2],
    /// Index of the current write buffer (0 or 1).
    /// Read buffer is always (`write_index` ^ 1).
    write_index: usize,
    /// Number of swaps performed.
    swap_count: u64,
}

impl<T> DoubleBuffer<T> {
    /// Creates a double buffer from two pre-allocated tables.
    #[must_use]
    pub fn new(a: T, b: T) -> Self {
        Self {
            buffers: [a, b],
            write_index: 0,
            swap_count: 0,
        }
    }

    /// Returns the number of swaps performed.
    #[inline]
    #[must_use]
    pub const fn swap_count(&self) -> u64 {
        self.swap_count
    }

    /// Returns the buffer published by the last swap.
    #[inline]
    #[must_use]
    pub fn front(&self) -> &T {
        &self.buffers[self.write_index ^ 1]
    }

    /// Returns the buffer being written this frame.
    #[inline]
    #[must_use]
    pub fn back(&self) -> &T {
        &self.buffers[self.write_index]
    }

    /// Returns the buffer being written this frame, mutably.
    #[inline]
    pub fn back_mut(&mut self) -> &mut T {
        &mut self.buffers[self.write_index]
    }

    /// Publishes the back buffer. The old front becomes the new back as-is.
    #[inline]
    pub fn swap(&mut self) {
        self.write_index ^= 1;
        self.swap_count += 1;
    }

    /// Publishes the back buffer and resets the new back buffer with `reset`.
    ///
    /// This is the usual end-of-frame call: stale data from two frames ago
    /// must not leak into the frame about to be written.
    #[inline]
    pub fn swap_and_reset(&mut self, reset: impl FnOnce(&mut T)) {
        self.swap();
        reset(self.back_mut());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_double_buffer_creation() {
        let db = DoubleBuffer::new(1u32, 2u32);
        assert_eq!(db.swap_count(), 0);
        assert_eq!(*db.back(), 1);
        assert_eq!(*db.front(), 2);
    }

    #[test]
    fn test_write_visible_after_swap() {
        let mut db = DoubleBuffer::new(0u32, 0u32);
        *db.back_mut() = 9;
        assert_eq!(*db.front(), 0);

        db.swap();
        assert_eq!(*db.front(), 9);
        assert_eq!(db.swap_count(), 1);
    }

    #[test]
    fn test_swap_and_reset_clears_stale_back() {
        let mut db = DoubleBuffer::new(vec![1], vec![2]);
        db.swap_and_reset(Vec::clear);
        assert_eq!(db.front(), &vec![1]);
        assert!(db.back().is_empty());
    }
}
