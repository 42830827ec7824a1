//! Nested clip regions.

use quill_core::{Arena, FixedStack};

use crate::layout::Rect;

/// How a rect relates to the current clip.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Entirely inside the clip.
    Visible,
    /// Partly inside the clip.
    Partial,
    /// No overlap with the clip.
    Hidden,
}

/// Stack of clip rects. Every entry is contained in the one below it, up to
/// the current root.
///
/// The root is the active window's content rect, index 0 after a reset. An
/// overlay opens a new root above the window's entries so it can draw outside
/// them; closing it returns to the window's root. A root is never popped by
/// [`ClipStack::pop`].
#[derive(Debug)]
pub struct ClipStack<'a> {
    rects: FixedStack<'a, Rect>,
    /// Index of the current root.
    root: usize,
}

impl<'a> ClipStack<'a> {
    /// Creates a clip stack carved from `arena`.
    #[must_use]
    pub fn from_arena(arena: &mut Arena<'a>, max_depth: usize) -> Option<Self> {
        Some(Self {
            rects: FixedStack::from_arena(arena, max_depth)?,
            root: 0,
        })
    }

    /// Arena bytes [`ClipStack::from_arena`] reserves, starting at `offset`.
    #[must_use]
    pub const fn arena_end(offset: usize, max_depth: usize) -> usize {
        FixedStack::<Rect>::arena_end(offset, max_depth)
    }

    /// Clears the stack and installs `base` at index 0.
    pub fn reset(&mut self, base: Rect) {
        self.rects.clear();
        self.rects.push(base);
        self.root = 0;
    }

    /// Opens a new root at `rect` without intersecting it with the current
    /// top. Returns the previous root for [`ClipStack::pop_root`], or `None`
    /// when the stack is full.
    pub fn push_root(&mut self, rect: Rect) -> Option<usize> {
        if !self.rects.push(rect) {
            tracing::warn!(max_depth = self.rects.capacity(), "clip stack overflow");
            return None;
        }
        let previous = self.root;
        self.root = self.rects.len() - 1;
        Some(previous)
    }

    /// Drops the current root and everything above it, restoring `previous`.
    pub fn pop_root(&mut self, previous: usize) {
        self.rects.truncate(self.root);
        self.root = previous.min(self.rects.len().saturating_sub(1));
    }

    /// Pushes `rect` intersected with the current top.
    ///
    /// Returns `false` and leaves the stack unchanged when full.
    pub fn push(&mut self, rect: Rect) -> bool {
        let clipped = match self.rects.top() {
            Some(top) => top.clip_to(&rect),
            None => rect,
        };
        let pushed = self.rects.push(clipped);
        if !pushed {
            tracing::warn!(max_depth = self.rects.capacity(), "clip stack overflow");
        }
        pushed
    }

    /// Pops the top rect. The root stays; returns `false` if only it remains.
    pub fn pop(&mut self) -> bool {
        if self.rects.len() <= self.root + 1 {
            tracing::warn!("pop_clip with no pushed clip");
            return false;
        }
        self.rects.pop().is_some()
    }

    /// Current clip rect, or `None` before the first reset.
    #[must_use]
    pub fn top(&self) -> Option<Rect> {
        self.rects.top().copied()
    }

    /// The root: the content rect of the active window or overlay.
    #[must_use]
    pub fn base(&self) -> Option<Rect> {
        self.rects.get(self.root).copied()
    }

    /// Number of entries, base included.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.rects.len()
    }

    /// Returns true if `rect` has no overlap with the current clip.
    #[must_use]
    pub fn is_clipped(&self, rect: &Rect) -> bool {
        self.visibility(rect) == Visibility::Hidden
    }

    /// Classifies `rect` against the current clip. With no clip every rect is
    /// visible.
    #[must_use]
    pub fn visibility(&self, rect: &Rect) -> Visibility {
        let Some(top) = self.rects.top() else {
            return Visibility::Visible;
        };
        if !top.intersects(rect) {
            Visibility::Hidden
        } else if rect.x >= top.x
            && rect.y >= top.y
            && rect.right() <= top.right()
            && rect.bottom() <= top.bottom()
        {
            Visibility::Visible
        } else {
            Visibility::Partial
        }
    }
}
