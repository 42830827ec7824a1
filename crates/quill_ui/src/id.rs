//! Widget identity and per-frame liveness.
//!
//! A widget's identity is a 32-bit FNV-1a hash of its label, seeded with the
//! hash of everything on the ID stack. Identities are not objects; they only
//! key state records that live elsewhere.

use quill_core::{Arena, DoubleBuffer, FixedStack};

/// FNV-1a 32-bit offset basis.
pub const FNV_OFFSET_BASIS: u32 = 0x811C_9DC5;
/// FNV-1a 32-bit prime.
pub const FNV_PRIME: u32 = 0x0100_0193;

/// Continues an FNV-1a hash from `seed` over `bytes`.
#[must_use]
pub const fn fnv1a32(seed: u32, bytes: &[u8]) -> u32 {
    let mut hash = seed;
    let mut i = 0;
    while i < bytes.len() {
        hash ^= bytes[i] as u32;
        hash = hash.wrapping_mul(FNV_PRIME);
        i += 1;
    }
    hash
}

/// Stable widget identity. 0 means "no widget".
#[repr(transparent)]
#[derive(
    Debug,
    Clone,
    Copy,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    bytemuck::Pod,
    bytemuck::Zeroable,
)]
pub struct WidgetId(pub u32);

impl WidgetId {
    /// The absent widget.
    pub const NONE: Self = Self(0);

    /// Wraps a hash, remapping 0 to 1 so it never reads as "none".
    #[must_use]
    pub const fn from_hash(hash: u32) -> Self {
        if hash == 0 {
            Self(1)
        } else {
            Self(hash)
        }
    }

    /// Hashes a label with no ID stack.
    #[must_use]
    pub const fn from_label(label: &str) -> Self {
        Self::from_hash(fnv1a32(FNV_OFFSET_BASIS, label.as_bytes()))
    }

    /// Returns the raw value.
    #[inline]
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }

    /// Returns true for [`WidgetId::NONE`].
    #[inline]
    #[must_use]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

/// Stack of salts disambiguating repeated labels.
#[derive(Debug)]
pub struct IdStack<'a> {
    /// Rolling hash after each push.
    hashes: FixedStack<'a, u32>,
}

impl<'a> IdStack<'a> {
    /// Creates an ID stack carved from `arena`.
    #[must_use]
    pub fn from_arena(arena: &mut Arena<'a>, max_depth: usize) -> Option<Self> {
        Some(Self {
            hashes: FixedStack::from_arena(arena, max_depth)?,
        })
    }

    /// Arena bytes [`IdStack::from_arena`] reserves, starting at `offset`.
    #[must_use]
    pub const fn arena_end(offset: usize, max_depth: usize) -> usize {
        FixedStack::<u32>::arena_end(offset, max_depth)
    }

    /// Hash every new identity starts from.
    #[inline]
    #[must_use]
    pub fn seed(&self) -> u32 {
        self.hashes.top().copied().unwrap_or(FNV_OFFSET_BASIS)
    }

    /// Folds `data` into the rolling hash and pushes it.
    ///
    /// Returns `false` and leaves the stack unchanged when full.
    pub fn push(&mut self, data: &[u8]) -> bool {
        let hash = fnv1a32(self.seed(), data);
        let pushed = self.hashes.push(hash);
        if !pushed {
            tracing::warn!(max_depth = self.hashes.capacity(), "ID stack overflow");
        }
        pushed
    }

    /// Pushes a string salt.
    pub fn push_str(&mut self, salt: &str) -> bool {
        self.push(salt.as_bytes())
    }

    /// Pushes a loop index salt.
    pub fn push_index(&mut self, index: usize) -> bool {
        self.push(&(index as u64).to_le_bytes())
    }

    /// Reverts the last push. Returns `false` if the stack was empty.
    pub fn pop(&mut self) -> bool {
        let popped = self.hashes.pop().is_some();
        if !popped {
            tracing::warn!("pop_id on empty ID stack");
        }
        popped
    }

    /// Number of pushed salts.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.hashes.len()
    }

    /// Clears every salt.
    pub fn clear(&mut self) {
        self.hashes.clear();
    }

    /// Identity of `label` under the current stack.
    #[must_use]
    pub fn make_id(&self, label: &str) -> WidgetId {
        self.make_id_bytes(label.as_bytes())
    }

    /// Identity of raw `data` under the current stack.
    #[must_use]
    pub fn make_id_bytes(&self, data: &[u8]) -> WidgetId {
        WidgetId::from_hash(fnv1a32(self.seed(), data))
    }
}

/// Which identities were declared this frame and last frame.
#[derive(Debug)]
pub struct LivenessTracker<'a> {
    /// Back: this frame. Front: last frame.
    seen: DoubleBuffer<FixedStack<'a, WidgetId>>,
    /// More identities were declared this frame than fit.
    overflowed: bool,
}

impl<'a> LivenessTracker<'a> {
    /// Creates a tracker carved from `arena`.
    #[must_use]
    pub fn from_arena(arena: &mut Arena<'a>, max_live: usize) -> Option<Self> {
        Some(Self {
            seen: DoubleBuffer::new(
                FixedStack::from_arena(arena, max_live)?,
                FixedStack::from_arena(arena, max_live)?,
            ),
            overflowed: false,
        })
    }

    /// Arena bytes [`LivenessTracker::from_arena`] reserves, starting at `offset`.
    #[must_use]
    pub const fn arena_end(offset: usize, max_live: usize) -> usize {
        let offset = FixedStack::<WidgetId>::arena_end(offset, max_live);
        FixedStack::<WidgetId>::arena_end(offset, max_live)
    }

    /// Marks `id` as declared this frame. Returns `false` on overflow.
    pub fn mark_seen(&mut self, id: WidgetId) -> bool {
        if id.is_none() {
            return true;
        }
        let back = self.seen.back_mut();
        if back.iter().any(|&seen| seen == id) {
            return true;
        }
        if back.push(id) {
            return true;
        }
        if !self.overflowed {
            tracing::warn!(max_live_ids = back.capacity(), "live ID table overflow");
        }
        self.overflowed = true;
        false
    }

    /// Returns true if `id` was declared so far this frame.
    ///
    /// After an overflow every identity counts as seen, so nothing is expired
    /// on a frame whose record is incomplete.
    #[must_use]
    pub fn seen_this_frame(&self, id: WidgetId) -> bool {
        self.overflowed || self.seen.back().iter().any(|&seen| seen == id)
    }

    /// Returns true if `id` was declared last frame.
    #[must_use]
    pub fn seen_last_frame(&self, id: WidgetId) -> bool {
        self.seen.front().iter().any(|&seen| seen == id)
    }

    /// Identities declared so far this frame.
    #[must_use]
    pub fn live_count(&self) -> usize {
        self.seen.back().len()
    }

    /// Returns true if this frame's table overflowed.
    #[must_use]
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// Publishes this frame's record and starts an empty one.
    pub fn end_frame(&mut self) {
        self.seen.swap_and_reset(FixedStack::clear);
        self.overflowed = false;
    }
}
