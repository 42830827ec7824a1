//! # State Registry
//!
//! Fixed-slot storage for per-widget state that the *caller* owns across
//! frames (edit state, scroll state, table state). Entries are keyed by a
//! 32-bit widget identity and stamped with the frame that last touched them,
//! so state of widgets that stopped being declared can be expired.

/// One occupied slot.
#[derive(Debug, Clone)]
struct Entry<T> {
    /// Widget identity.
    id: u32,
    /// Frame number of the last touch.
    last_seen: u64,
    /// Caller state.
    value: T,
}

/// A fixed-capacity map from widget identity to caller state.
///
/// All slots are reserved upfront. Inserting into a full registry fails
/// without evicting anything.
///
/// # Example
///
/// ```rust
/// use quill_core::StateRegistry;
///
/// let mut scroll: StateRegistry<f32> = StateRegistry::new(8);
/// *scroll.get_or_insert_with(42, 1, || 0.0).unwrap() += 10.0;
/// assert_eq!(scroll.get(42), Some(&10.0));
///
/// // Frame 2 never declared widget 42.
/// assert_eq!(scroll.expire(2), 1);
/// assert!(scroll.get(42).is_none());
/// ```
#[derive(Debug, Clone)]
pub struct StateRegistry<T> {
    /// The storage array.
    slots: Box<[Option<Entry<T>>]>,
    /// Free list - indices of available slots.
    free_list: Vec<usize>,
    /// Number of occupied slots.
    len: usize,
}

impl<T> StateRegistry<T> {
    /// Creates a registry with the specified capacity.
    ///
    /// All memory is pre-allocated upfront.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        let slots: Vec<Option<Entry<T>>> = (0..capacity).map(|_| None).collect();
        let free_list: Vec<usize> = (0..capacity).rev().collect();

        Self {
            slots: slots.into_boxed_slice(),
            free_list,
            len: 0,
        }
    }

    /// Returns the total capacity.
    #[inline]
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Returns the number of stored entries.
    #[inline]
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true if the registry holds nothing.
    #[inline]
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    fn slot_of(&self, id: u32) -> Option<usize> {
        self.slots
            .iter()
            .position(|slot| slot.as_ref().is_some_and(|e| e.id == id))
    }

    /// Gets the state for `id` without touching it.
    #[must_use]
    pub fn get(&self, id: u32) -> Option<&T> {
        let index = self.slot_of(id)?;
        self.slots[index].as_ref().map(|e| &e.value)
    }

    /// Gets the state for `id`, marking it seen in `frame`.
    pub fn touch(&mut self, id: u32, frame: u64) -> Option<&mut T> {
        let index = self.slot_of(id)?;
        self.slots[index].as_mut().map(|e| {
            e.last_seen = frame;
            &mut e.value
        })
    }

    /// Gets the state for `id`, creating it with `init` if absent, and marks
    /// it seen in `frame`.
    ///
    /// This is a **zero-heap-allocation** operation.
    ///
    /// # Returns
    ///
    /// `None` if `id` is absent and every slot is taken.
    pub fn get_or_insert_with(
        &mut self,
        id: u32,
        frame: u64,
        init: impl FnOnce() -> T,
    ) -> Option<&mut T> {
        let index = match self.slot_of(id) {
            Some(index) => index,
            None => {
                let Some(index) = self.free_list.pop() else {
                    tracing::warn!(id, capacity = self.capacity(), "state registry full");
                    return None;
                };
                self.slots[index] = Some(Entry {
                    id,
                    last_seen: frame,
                    value: init(),
                });
                self.len += 1;
                index
            }
        };

        self.slots[index].as_mut().map(|e| {
            e.last_seen = frame;
            &mut e.value
        })
    }

    /// Removes the state for `id`.
    pub fn remove(&mut self, id: u32) -> Option<T> {
        let index = self.slot_of(id)?;
        let entry = self.slots[index].take()?;
        self.free_list.push(index);
        self.len -= 1;
        Some(entry.value)
    }

    /// Drops every entry not touched during `frame`.
    ///
    /// # Returns
    ///
    /// Number of entries expired.
    pub fn expire(&mut self, frame: u64) -> usize {
        let mut expired = 0;
        for (index, slot) in self.slots.iter_mut().enumerate() {
            if slot.as_ref().is_some_and(|e| e.last_seen < frame) {
                *slot = None;
                self.free_list.push(index);
                expired += 1;
            }
        }
        self.len -= expired;
        expired
    }

    /// Clears all entries. Memory is kept.
    pub fn clear(&mut self) {
        for slot in self.slots.iter_mut() {
            *slot = None;
        }
        self.free_list.clear();
        self.free_list.extend((0..self.slots.len()).rev());
        self.len = 0;
    }

    /// Iterates `(id, state)` pairs in slot order.
    pub fn iter(&self) -> impl Iterator<Item = (u32, &T)> {
        self.slots
            .iter()
            .filter_map(|slot| slot.as_ref().map(|e| (e.id, &e.value)))
    }
}
