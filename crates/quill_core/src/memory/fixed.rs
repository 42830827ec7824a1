//! # Fixed-Capacity Stack
//!
//! Bounded storage for per-frame engine tables (ID stack, clip stack, box
//! stack, layer stack, blocking regions, focus registry).

use bytemuck::Pod;

use super::Arena;

/// A stack over borrowed slots whose capacity is fixed at creation.
///
/// Pushing past capacity is a defined failure: [`FixedStack::push`] returns
/// `false` and the contents are left untouched. Popping never frees memory.
///
/// # Example
///
/// ```rust
/// use quill_core::FixedStack;
///
/// let mut slots = [0u8; 2];
/// let mut stack = FixedStack::from_slice(&mut slots);
/// assert!(stack.push(1));
/// assert!(stack.push(2));
/// assert!(!stack.push(3));
/// assert_eq!(stack.as_slice(), &[1, 2]);
/// ```
#[derive(Debug)]
pub struct FixedStack<'a, T> {
    /// Slot storage, always `capacity` long.
    storage: &'a mut [T],
    /// Number of occupied slots.
    len: usize,
}

impl<'a, T: Pod> FixedStack<'a, T> {
    /// Creates a stack whose slots are carved from `arena`.
    ///
    /// Returns `None` if the arena cannot hold `capacity` elements.
    #[must_use]
    pub fn from_arena(arena: &mut Arena<'a>, capacity: usize) -> Option<Self> {
        Some(Self::from_slice(arena.alloc_slice(capacity)?))
    }
}

impl<'a, T: Copy> FixedStack<'a, T> {
    /// Creates an empty stack over `slots`.
    #[must_use]
    pub fn from_slice(slots: &'a mut [T]) -> Self {
        Self {
            storage: slots,
            len: 0,
        }
    }

    /// Bytes [`FixedStack::from_arena`] reserves, starting at `offset`.
    #[inline]
    #[must_use]
    pub const fn arena_end(offset: usize, capacity: usize) -> usize {
        Arena::aligned_end::<T>(offset, capacity)
    }

    /// Pushes a value.
    ///
    /// This is a **O(1)** operation with **zero heap allocations**.
    ///
    /// # Returns
    ///
    /// `false` if the stack is full; the value is dropped.
    #[inline]
    pub fn push(&mut self, value: T) -> bool {
        if self.len >= self.storage.len() {
            return false;
        }
        self.storage[self.len] = value;
        self.len += 1;
        true
    }

    /// Pops the top value.
    #[inline]
    pub fn pop(&mut self) -> Option<T> {
        if self.len == 0 {
            return None;
        }
        self.len -= 1;
        Some(self.storage[self.len])
    }
}

impl<T> FixedStack<'_, T> {
    /// Returns the total capacity.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.storage.len()
    }

    /// Returns the number of stored values.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if nothing is stored.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Returns true if another push would fail.
    #[inline]
    #[must_use]
    pub fn is_full(&self) -> bool {
        self.len >= self.storage.len()
    }

    /// Returns the top value.
    #[inline]
    #[must_use]
    pub fn top(&self) -> Option<&T> {
        self.as_slice().last()
    }

    /// Returns the top value mutably.
    #[inline]
    pub fn top_mut(&mut self) -> Option<&mut T> {
        self.as_mut_slice().last_mut()
    }

    /// Returns the value at `index` (0 = bottom).
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&T> {
        self.as_slice().get(index)
    }

    /// Returns the stored values, bottom first.
    #[inline]
    #[must_use]
    pub fn as_slice(&self) -> &[T] {
        &self.storage[..self.len]
    }

    /// Returns the stored values mutably, bottom first.
    #[inline]
    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.storage[..self.len]
    }

    /// Iterates the stored values, bottom first.
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.as_slice().iter()
    }

    /// Drops every value above `len`.
    #[inline]
    pub fn truncate(&mut self, len: usize) {
        self.len = self.len.min(len);
    }

    /// Removes all values. Memory is kept.
    #[inline]
    pub fn clear(&mut self) {
        self.len = 0;
    }
}

impl<'a, T> IntoIterator for &'a FixedStack<'_, T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.as_slice().iter()
    }
}
