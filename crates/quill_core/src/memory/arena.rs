//! # Arena Allocator
//!
//! The single memory block a host hands to the engine at startup. Every
//! fixed-capacity table is carved from it once; nothing is reserved later.

use bytemuck::Pod;

/// Alignment of every table the engine carves. A block starting on this
/// boundary needs no padding beyond what [`Arena::aligned_end`] predicts.
pub const BLOCK_ALIGN: usize = 8;

/// A bump-pointer arena over a caller-supplied block.
///
/// Each reservation splits the front off the unused part of the block and
/// hands it out as a typed slice, so tables borrow the host's memory for as
/// long as the block lives. Reservations are never returned individually.
///
/// # Thread Safety
///
/// This arena is NOT thread-safe. Use one arena per context.
///
/// # Example
///
/// ```rust
/// use quill_core::{AlignedBlock, Arena};
///
/// let mut block = AlignedBlock::new(1024);
/// let mut arena = Arena::new(block.bytes_mut());
/// let ids = arena.alloc_slice::<u32>(16).unwrap();
/// assert_eq!(ids.len(), 16);
/// assert_eq!(arena.used(), 64);
/// ```
#[derive(Debug)]
pub struct Arena<'a> {
    /// Unreserved tail of the block.
    rest: &'a mut [u8],
    /// Bytes reserved so far, padding included.
    used: usize,
    /// Total capacity.
    capacity: usize,
}

impl<'a> Arena<'a> {
    /// Creates an arena over `block`.
    #[must_use]
    pub fn new(block: &'a mut [u8]) -> Self {
        let capacity = block.len();
        Self {
            rest: block,
            used: 0,
            capacity,
        }
    }

    /// Returns the total capacity in bytes.
    #[inline]
    #[must_use]
    pub const fn capacity(&self) -> usize {
        self.capacity
    }

    /// Returns the current used space in bytes.
    #[inline]
    #[must_use]
    pub const fn used(&self) -> usize {
        self.used
    }

    /// Returns the remaining free space in bytes.
    #[inline]
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.rest.len()
    }

    /// Returns the offset just past `count` values of `T` placed at `offset`,
    /// or `usize::MAX` if that does not fit in the address space.
    ///
    /// For a block aligned to [`BLOCK_ALIGN`] this is exactly the arithmetic
    /// [`Arena::alloc_slice`] performs, so a caller can size a block before
    /// creating it.
    #[inline]
    #[must_use]
    pub const fn aligned_end<T>(offset: usize, count: usize) -> usize {
        let align = std::mem::align_of::<T>();
        let Some(padded) = offset.checked_add(align - 1) else {
            return usize::MAX;
        };
        let aligned = padded & !(align - 1);
        match std::mem::size_of::<T>().checked_mul(count) {
            Some(bytes) => aligned.saturating_add(bytes),
            None => usize::MAX,
        }
    }

    /// Reserves a zeroed slice of `count` elements.
    ///
    /// # Returns
    ///
    /// The slice, or `None` if the block is exhausted. A failed reservation
    /// leaves the arena unchanged.
    pub fn alloc_slice<T: Pod>(&mut self, count: usize) -> Option<&'a mut [T]> {
        let pad = self.rest.as_ptr().align_offset(std::mem::align_of::<T>());
        let bytes = std::mem::size_of::<T>()
            .checked_mul(count)
            .and_then(|len| len.checked_add(pad));
        let Some(bytes) = bytes.filter(|&bytes| bytes <= self.rest.len()) else {
            tracing::warn!(
                count,
                element_size = std::mem::size_of::<T>(),
                remaining = self.remaining(),
                "arena exhausted"
            );
            return None;
        };

        let rest = std::mem::take(&mut self.rest);
        let (head, tail) = rest.split_at_mut(bytes);
        self.rest = tail;
        self.used += bytes;
        // `head[pad..]` starts aligned for `T` and holds exactly `count` of them.
        let slice: &'a mut [T] = bytemuck::cast_slice_mut(&mut head[pad..]);
        slice.fill(T::zeroed());
        Some(slice)
    }
}

/// Heap block aligned to [`BLOCK_ALIGN`], for hosts without their own.
///
/// # Example
///
/// ```rust
/// use quill_core::AlignedBlock;
///
/// let mut block = AlignedBlock::new(100);
/// assert_eq!(block.len(), 100);
/// assert_eq!(block.arena().capacity(), 100);
/// ```
#[derive(Debug, Clone)]
pub struct AlignedBlock {
    words: Box<[u64]>,
    len: usize,
}

impl AlignedBlock {
    /// Allocates a zeroed block of `len` bytes.
    #[must_use]
    pub fn new(len: usize) -> Self {
        Self {
            words: vec![0u64; len.div_ceil(8)].into_boxed_slice(),
            len,
        }
    }

    /// Length in bytes.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.len
    }

    /// Returns true for a zero-length block.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// The block as bytes.
    #[must_use]
    pub fn bytes_mut(&mut self) -> &mut [u8] {
        let bytes: &mut [u8] = bytemuck::cast_slice_mut(&mut self.words);
        &mut bytes[..self.len]
    }

    /// An arena over the whole block.
    #[must_use]
    pub fn arena(&mut self) -> Arena<'_> {
        Arena::new(self.bytes_mut())
    }
}
