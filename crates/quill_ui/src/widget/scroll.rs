//! Vertical scroll areas.

use crate::context::{scope_deref, Context, SavedArea};
use crate::layout::Rect;
use crate::render::Renderer;

/// Scrollbar thumb width.
pub const SCROLLBAR_WIDTH: f32 = 8.0;

/// Shortest scrollbar thumb.
const MIN_THUMB: f32 = 16.0;

/// Caller-owned scroll position.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ScrollState {
    /// Pixels scrolled from the top.
    pub offset: f32,
    /// Content height measured last frame.
    pub content_height: f32,
}

impl ScrollState {
    /// Largest offset for a view of `view_height`.
    #[must_use]
    pub fn max_offset(&self, view_height: f32) -> f32 {
        (self.content_height - view_height).max(0.0)
    }

    fn clamp(&mut self, view_height: f32) {
        self.offset = self.offset.clamp(0.0, self.max_offset(view_height));
    }
}

impl<'a, R: Renderer> Context<'a, R> {
    /// Opens a scroll area over `rect`.
    ///
    /// The wheel delta (pixels, positive scrolls up) applies only when the
    /// pointer is over the area and input may reach it. Content declared
    /// inside is laid out from the area's layout cursor; its height is
    /// measured when the scope closes.
    pub fn scroll_begin<'c>(
        &'c mut self,
        label: &str,
        rect: Rect,
        state: &'c mut ScrollState,
    ) -> ScrollScope<'c, 'a, R> {
        let id = self.make_id(label);
        self.mark_seen(id);

        let (mx, my) = self.input.mouse_pos();
        let over = rect.contains(mx, my) && self.clip_rect().contains(mx, my);
        let (_, dy) = self.input.scroll_delta;
        if over && dy != 0.0 && self.should_process_input(&rect) {
            state.offset -= dy;
        }
        state.clamp(rect.height);

        let pushed = self.push_clip(rect);
        let content_top = rect.y - state.offset;
        let content = Rect::new(
            rect.x,
            content_top,
            (rect.width - SCROLLBAR_WIDTH).max(0.0),
            state.content_height.max(rect.height),
        );
        let saved = self.enter_area(content);
        ScrollScope {
            ctx: self,
            state,
            rect,
            content_top,
            pushed,
            saved,
        }
    }
}

/// An open scroll area. Measures its content and closes on drop.
pub struct ScrollScope<'c, 'a, R: Renderer> {
    ctx: &'c mut Context<'a, R>,
    state: &'c mut ScrollState,
    rect: Rect,
    content_top: f32,
    pushed: bool,
    saved: SavedArea,
}

impl<R: Renderer> ScrollScope<'_, '_, R> {
    /// Visible rect.
    #[must_use]
    pub fn view(&self) -> Rect {
        self.rect
    }

    /// Current offset.
    #[must_use]
    pub fn offset(&self) -> f32 {
        self.state.offset
    }
}

impl<R: Renderer> Drop for ScrollScope<'_, '_, R> {
    fn drop(&mut self) {
        self.state.content_height = (self.ctx.cursor_y - self.content_top).max(0.0);
        self.state.clamp(self.rect.height);
        let saved = self.saved;
        self.ctx.leave_area(saved);
        if self.pushed {
            self.ctx.pop_clip();
        }

        let view = self.rect.height;
        if self.state.content_height > view && view > 0.0 {
            let thumb = (view * view / self.state.content_height).max(MIN_THUMB).min(view);
            let max = self.state.max_offset(view);
            let t = if max > 0.0 { self.state.offset / max } else { 0.0 };
            let bar = Rect::new(
                self.rect.right() - SCROLLBAR_WIDTH,
                self.rect.y + t * (view - thumb),
                SCROLLBAR_WIDTH,
                thumb,
            );
            let color = self.ctx.style.active;
            self.ctx.draw_rounded_rect(bar, SCROLLBAR_WIDTH * 0.5, color);
        }
    }
}

scope_deref!(ScrollScope);

#[cfg(test)]
mod tests {
    use quill_core::AlignedBlock;

    use super::*;
    use crate::config::ContextConfig;
    use crate::context::Backends;
    use crate::input::InputState;
    use crate::render::CommandBuffer;

    fn block() -> AlignedBlock {
        AlignedBlock::new(Context::<CommandBuffer>::memory_footprint(
            &ContextConfig::default().limits,
        ))
    }

    fn context(block: &mut AlignedBlock) -> Context<'_, CommandBuffer> {
        let config = ContextConfig::default();
        Context::new(config, &mut block.arena(), CommandBuffer::new(), Backends::none()).unwrap()
    }

    fn screen() -> Rect {
        Rect::new(0.0, 0.0, 800.0, 600.0)
    }

    fn declare(ctx: &mut Context<'_, CommandBuffer>, input: &InputState, state: &mut ScrollState) {
        ctx.begin_frame(input, 0.016, screen());
        {
            let mut area = ctx.scroll_begin("list", Rect::new(0.0, 0.0, 200.0, 100.0), state);
            for _ in 0..10 {
                area.layout_row(30.0);
            }
        }
        ctx.end_frame();
    }

    #[test]
    fn test_measures_content() {
        let mut block = block();
        let mut ctx = context(&mut block);
        let mut state = ScrollState::default();
        declare(&mut ctx, &InputState::default(), &mut state);
        assert_eq!(state.content_height, 300.0);
        assert_eq!(state.max_offset(100.0), 200.0);
    }

    #[test]
    fn test_wheel_scrolls_and_clamps() {
        let mut block = block();
        let mut ctx = context(&mut block);
        let mut state = ScrollState::default();
        declare(&mut ctx, &InputState::default(), &mut state);

        let mut input = InputState::default();
        input.set_mouse_pos(50.0, 50.0);
        input.scroll(0.0, -150.0);
        declare(&mut ctx, &input, &mut state);
        assert_eq!(state.offset, 150.0);

        declare(&mut ctx, &input, &mut state);
        assert_eq!(state.offset, 200.0);
    }

    #[test]
    fn test_wheel_outside_ignored() {
        let mut block = block();
        let mut ctx = context(&mut block);
        let mut state = ScrollState::default();
        declare(&mut ctx, &InputState::default(), &mut state);

        let mut input = InputState::default();
        input.set_mouse_pos(500.0, 50.0);
        input.scroll(0.0, -50.0);
        declare(&mut ctx, &input, &mut state);
        assert_eq!(state.offset, 0.0);
    }

    #[test]
    fn test_rows_start_above_view_when_scrolled() {
        let mut block = block();
        let mut ctx = context(&mut block);
        let mut state = ScrollState {
            offset: 40.0,
            content_height: 300.0,
        };
        ctx.begin_frame(&InputState::default(), 0.016, screen());
        let mut area = ctx.scroll_begin("list", Rect::new(0.0, 0.0, 200.0, 100.0), &mut state);
        let first = area.layout_row(30.0);
        assert_eq!(first.y, -40.0);
        assert_eq!(first.width, 200.0 - SCROLLBAR_WIDTH);
    }
}
