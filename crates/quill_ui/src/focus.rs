//! Keyboard focus.
//!
//! Focusable widgets register every frame. Registration is double-buffered
//! like blocking regions: navigation walks the list completed last frame, so
//! Tab order never depends on how far through the current frame the caller
//! has got.

use quill_core::{Arena, DoubleBuffer, FixedStack};

use crate::id::WidgetId;
use crate::layer::{LayerId, BASE_LAYER};
use crate::layout::Rect;

/// One focusable widget.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Focusable {
    /// Widget identity.
    pub id: WidgetId,
    /// Widget bounds.
    pub rect: Rect,
    /// Layer active when the widget registered.
    pub layer: LayerId,
}

/// Tab direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FocusDirection {
    /// Tab.
    Next,
    /// Shift+Tab.
    Prev,
}

/// Single focused identity plus the focusable registry and focus trap.
///
/// A trap stays in force across frames until [`FocusManager::trap_end`].
#[derive(Debug)]
pub struct FocusManager<'a> {
    /// Focused widget, [`WidgetId::NONE`] if nothing.
    focused: WidgetId,
    /// Focus at the start of this frame.
    previous: WidgetId,
    /// Back: registered this frame. Front: last frame.
    registry: DoubleBuffer<FixedStack<'a, Focusable>>,
    /// Active trap, [`BASE_LAYER`] if none.
    trap: LayerId,
    /// Last trap begun this frame.
    frame_trap: LayerId,
    /// Trap in force at the end of last frame, or the last one begun in it.
    last_frame_trap: LayerId,
}

impl<'a> FocusManager<'a> {
    /// Creates a focus manager carved from `arena`.
    #[must_use]
    pub fn from_arena(arena: &mut Arena<'a>, max_focusable: usize) -> Option<Self> {
        Some(Self::with_registry(DoubleBuffer::new(
            FixedStack::from_arena(arena, max_focusable)?,
            FixedStack::from_arena(arena, max_focusable)?,
        )))
    }

    /// Arena bytes [`FocusManager::from_arena`] reserves, starting at `offset`.
    #[must_use]
    pub const fn arena_end(offset: usize, max_focusable: usize) -> usize {
        let offset = FixedStack::<Focusable>::arena_end(offset, max_focusable);
        FixedStack::<Focusable>::arena_end(offset, max_focusable)
    }

    fn with_registry(registry: DoubleBuffer<FixedStack<'a, Focusable>>) -> Self {
        Self {
            focused: WidgetId::NONE,
            previous: WidgetId::NONE,
            registry,
            trap: BASE_LAYER,
            frame_trap: BASE_LAYER,
            last_frame_trap: BASE_LAYER,
        }
    }

    /// The focused widget.
    #[must_use]
    pub fn focused(&self) -> WidgetId {
        self.focused
    }

    /// Focuses `id`.
    pub fn set_focus(&mut self, id: WidgetId) {
        if self.focused != id {
            tracing::debug!(from = self.focused.raw(), to = id.raw(), "focus changed");
            self.focused = id;
        }
    }

    /// Clears focus.
    pub fn clear_focus(&mut self) {
        self.set_focus(WidgetId::NONE);
    }

    /// Returns true if `id` has focus.
    #[must_use]
    pub fn has_focus(&self, id: WidgetId) -> bool {
        !id.is_none() && self.focused == id
    }

    /// Returns true if `id` has focus and did not at the start of the frame.
    #[must_use]
    pub fn gained_focus(&self, id: WidgetId) -> bool {
        self.has_focus(id) && self.previous != id
    }

    /// Adds a widget to this frame's registry. Returns `false` when full.
    pub fn register(&mut self, id: WidgetId, rect: Rect, layer: LayerId) -> bool {
        let back = self.registry.back_mut();
        let registered = back.push(Focusable { id, rect, layer });
        if !registered {
            tracing::warn!(max_focusable = back.capacity(), "focusable registry full");
        }
        registered
    }

    /// Registry completed last frame.
    #[must_use]
    pub fn registered(&self) -> &[Focusable] {
        self.registry.front().as_slice()
    }

    /// Restricts navigation to widgets registered under `layer`, in this and
    /// later frames, until [`FocusManager::trap_end`].
    pub fn trap_begin(&mut self, layer: LayerId) {
        self.trap = layer;
        if layer != BASE_LAYER {
            self.frame_trap = layer;
        }
    }

    /// Removes the restriction.
    pub fn trap_end(&mut self) {
        self.trap = BASE_LAYER;
    }

    /// Active trap.
    #[must_use]
    pub fn trap(&self) -> LayerId {
        self.trap
    }

    /// Trap that was in force during the last completed frame.
    #[must_use]
    pub fn last_frame_trap(&self) -> LayerId {
        self.last_frame_trap
    }

    /// Moves focus forward in registration order, wrapping.
    pub fn focus_next(&mut self) -> WidgetId {
        self.step(FocusDirection::Next, self.trap)
    }

    /// Moves focus backward in registration order, wrapping.
    pub fn focus_prev(&mut self) -> WidgetId {
        self.step(FocusDirection::Prev, self.trap)
    }

    /// Moves focus among last frame's widgets, honoring `trap`.
    ///
    /// If the focused widget is not a candidate, Next picks the first
    /// candidate and Prev the last. With no candidates focus is unchanged.
    pub fn step(&mut self, direction: FocusDirection, trap: LayerId) -> WidgetId {
        let entries = self.registry.front().as_slice();
        let in_trap = |entry: &&Focusable| trap == BASE_LAYER || entry.layer == trap;

        let count = entries.iter().filter(in_trap).count();
        if count == 0 {
            return self.focused;
        }
        let current = entries
            .iter()
            .filter(in_trap)
            .position(|entry| entry.id == self.focused);
        let target = match (direction, current) {
            (FocusDirection::Next, Some(i)) => (i + 1) % count,
            (FocusDirection::Prev, Some(i)) => (i + count - 1) % count,
            (FocusDirection::Next, None) => 0,
            (FocusDirection::Prev, None) => count - 1,
        };
        let next = entries.iter().filter(in_trap).nth(target).map(|entry| entry.id);
        if let Some(id) = next {
            self.set_focus(id);
        }
        self.focused
    }

    /// Records the start-of-frame focus.
    pub fn begin_frame(&mut self) {
        self.previous = self.focused;
    }

    /// Publishes this frame's registry and trap record. The active trap is
    /// kept.
    pub fn end_frame(&mut self) {
        self.registry.swap_and_reset(FixedStack::clear);
        self.last_frame_trap = if self.frame_trap == BASE_LAYER {
            self.trap
        } else {
            self.frame_trap
        };
        self.frame_trap = BASE_LAYER;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::AlignedBlock;

    fn manager(block: &mut AlignedBlock, max_focusable: usize) -> FocusManager<'_> {
        FocusManager::from_arena(&mut block.arena(), max_focusable).unwrap()
    }

    fn id(n: u32) -> WidgetId {
        WidgetId(n)
    }

    fn frame_with(focus: &mut FocusManager<'_>, entries: &[(u32, LayerId)]) {
        for &(n, layer) in entries {
            focus.register(id(n), Rect::ZERO, layer);
        }
        focus.end_frame();
    }

    #[test]
    fn test_next_prev_wrap() {
        let mut block = AlignedBlock::new(512);
        let mut focus = manager(&mut block, 8);
        frame_with(&mut focus, &[(1, 0), (2, 0), (3, 0)]);

        assert_eq!(focus.focus_next(), id(1));
        assert_eq!(focus.focus_next(), id(2));
        assert_eq!(focus.focus_next(), id(3));
        assert_eq!(focus.focus_next(), id(1));
        assert_eq!(focus.focus_prev(), id(3));
    }

    #[test]
    fn test_prev_from_nothing_picks_last() {
        let mut block = AlignedBlock::new(512);
        let mut focus = manager(&mut block, 8);
        frame_with(&mut focus, &[(1, 0), (2, 0)]);
        assert_eq!(focus.focus_prev(), id(2));
    }

    #[test]
    fn test_registration_visible_next_frame() {
        let mut block = AlignedBlock::new(512);
        let mut focus = manager(&mut block, 8);
        focus.register(id(1), Rect::ZERO, 0);
        assert_eq!(focus.focus_next(), WidgetId::NONE);
        focus.end_frame();
        assert_eq!(focus.focus_next(), id(1));
    }

    #[test]
    fn test_trap_restricts_navigation() {
        let mut block = AlignedBlock::new(512);
        let mut focus = manager(&mut block, 8);
        frame_with(&mut focus, &[(1, 0), (2, 3), (3, 0), (4, 3)]);

        focus.trap_begin(3);
        assert_eq!(focus.focus_next(), id(2));
        assert_eq!(focus.focus_next(), id(4));
        assert_eq!(focus.focus_next(), id(2));
        focus.trap_end();
        assert_eq!(focus.focus_next(), id(3));
    }

    #[test]
    fn test_trap_recorded_for_next_frame() {
        let mut block = AlignedBlock::new(512);
        let mut focus = manager(&mut block, 8);
        focus.trap_begin(2);
        focus.trap_end();
        focus.end_frame();
        assert_eq!(focus.last_frame_trap(), 2);
        focus.end_frame();
        assert_eq!(focus.last_frame_trap(), BASE_LAYER);
    }

    #[test]
    fn test_registry_overflow() {
        let mut block = AlignedBlock::new(512);
        let mut focus = manager(&mut block, 1);
        assert!(focus.register(id(1), Rect::ZERO, 0));
        assert!(!focus.register(id(2), Rect::ZERO, 0));
    }

    #[test]
    fn test_gained_focus() {
        let mut block = AlignedBlock::new(512);
        let mut focus = manager(&mut block, 2);
        focus.begin_frame();
        focus.set_focus(id(7));
        assert!(focus.gained_focus(id(7)));
        focus.begin_frame();
        assert!(!focus.gained_focus(id(7)));
        assert!(focus.has_focus(id(7)));
        assert!(!focus.has_focus(WidgetId::NONE));
    }

    #[test]
    fn test_trap_outlives_the_frame_it_began_in() {
        let mut block = AlignedBlock::new(512);
        let mut focus = manager(&mut block, 8);
        focus.trap_begin(3);
        frame_with(&mut focus, &[(1, 0), (2, 3), (3, 3)]);
        assert_eq!(focus.trap(), 3);
        assert_eq!(focus.last_frame_trap(), 3);

        let mut visited = Vec::new();
        for _ in 0..3 {
            visited.push(focus.step(FocusDirection::Next, focus.last_frame_trap()));
            frame_with(&mut focus, &[(1, 0), (2, 3), (3, 3)]);
        }
        assert_eq!(visited, [id(2), id(3), id(2)]);

        focus.trap_end();
        focus.end_frame();
        assert_eq!(focus.last_frame_trap(), BASE_LAYER);
    }
}
