//! Hover tooltips.
//!
//! A tooltip shows once the pointer has rested on the same widget for
//! `timing.tooltip_delay` seconds. The hover clock lives in the context and
//! restarts whenever the hot widget changes.

use crate::context::Context;
use crate::id::WidgetId;
use crate::layout::{snap4, Rect};
use crate::render::Renderer;

/// Offset from the pointer to the tooltip corner.
pub const CURSOR_OFFSET: f32 = 12.0;

/// Hover clock for the widget under the pointer.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct HoverTimer {
    owner: WidgetId,
    elapsed: f32,
    announced: bool,
}

impl HoverTimer {
    /// Widget being timed.
    #[must_use]
    pub fn owner(&self) -> WidgetId {
        self.owner
    }

    /// Seconds the owner has been hovered, not counting the current frame.
    #[must_use]
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Returns true once `id` has been hovered for `delay` seconds.
    #[must_use]
    pub fn is_ready(&self, id: WidgetId, delay: f32) -> bool {
        !id.is_none() && self.owner == id && self.elapsed >= delay
    }

    /// Advances the clock for this frame's hot widget. A different or absent
    /// hot widget restarts it.
    pub fn end_frame(&mut self, dt: f32, hot: WidgetId) {
        if hot.is_none() || hot != self.owner {
            *self = Self {
                owner: hot,
                ..Self::default()
            };
        } else {
            self.elapsed += dt;
        }
    }
}

/// Places a tooltip of `size` near `pointer`, flipping to the other side of
/// the pointer on each axis that would overflow `screen`.
#[must_use]
pub fn tooltip_rect(pointer: (f32, f32), size: (f32, f32), screen: Rect) -> Rect {
    let (width, height) = size;
    let mut x = pointer.0 + CURSOR_OFFSET;
    let mut y = pointer.1 + CURSOR_OFFSET;

    if x + width > screen.right() {
        x = pointer.0 - width - CURSOR_OFFSET;
    }
    if y + height > screen.bottom() {
        y = pointer.1 - height - CURSOR_OFFSET;
    }

    Rect::new(x.max(screen.x), y.max(screen.y), width, height)
}

impl<R: Renderer> Context<'_, R> {
    /// Shows `text` next to the pointer once `id` has been hovered long
    /// enough. Call right after the widget. Returns true while shown.
    pub fn tooltip(&mut self, id: WidgetId, text: &str) -> bool {
        if self.hot != id || !self.tooltip.is_ready(id, self.config.timing.tooltip_delay) {
            return false;
        }
        let pad = snap4(self.style.padding);
        let size = (
            self.text_width(text) + pad * 2.0,
            self.style.font_size + pad * 2.0,
        );
        let rect = tooltip_rect(self.input.mouse_pos(), size, self.screen);

        self.renderer.clear_clip();
        let (radius, fill, color) = (self.style.corner_radius, self.style.surface, self.style.text);
        self.renderer.draw_rounded_rect(rect, radius, fill);
        self.draw_text_unclipped(text, rect.x + pad, rect.y + pad, color);
        let clip = self.clip_rect();
        self.renderer.set_clip(clip);

        if !self.tooltip.announced {
            self.tooltip.announced = true;
            self.announce(text);
        }
        true
    }
}
