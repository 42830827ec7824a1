//! # Overlays
//!
//! Modal dialogs, menus and sheets. Each overlay is a caller-owned
//! [`OverlayState`] re-entered once per frame through
//! [`Context::overlay_begin`]:
//!
//! ```text
//! Closed ──show/open──► Opening ──settle frames──► Open
//!    ▲                     │                        │
//!    └──── close / Escape ─┴── outside click ───────┘
//! ```
//!
//! While `Opening`, outside clicks are ignored so the click that opened the
//! overlay cannot also dismiss it.

use crate::context::{scope_deref, Context, SavedArea};
use crate::input::MouseButton;
use crate::layer::{LayerId, BASE_LAYER};
use crate::layout::{snap4, Rect};
use crate::render::Renderer;

/// How an overlay opens and closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OverlayKind {
    /// Confirmations and dialogs: `show`, then closed by a choice or dismissal.
    /// Blocks the whole screen and traps focus.
    Transient,
    /// Menus and sheets: `open`/`close`/`toggle`. Blocks only its own rect.
    Persistent,
}

/// Overlay lifecycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OverlayPhase {
    /// Not shown.
    #[default]
    Closed,
    /// Shown, not yet settled.
    Opening,
    /// Settled. Outside clicks dismiss.
    Open,
}

/// Why an overlay closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseReason {
    /// Accepted by the user.
    Confirmed,
    /// Declined by the user.
    Cancelled,
    /// Escape while the overlay held the focus trap.
    Escape,
    /// Click outside the overlay rect.
    OutsideClick,
    /// Toggled closed.
    Toggled,
    /// Closed by application code.
    Programmatic,
}

/// Caller-owned overlay state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OverlayState {
    kind: OverlayKind,
    phase: OverlayPhase,
    frames_since_open: u32,
    dismiss_on_outside_click: bool,
    last_close: Option<CloseReason>,
}

impl OverlayState {
    /// A closed dialog.
    #[must_use]
    pub const fn transient() -> Self {
        Self::with_kind(OverlayKind::Transient, true)
    }

    /// A closed menu or sheet.
    #[must_use]
    pub const fn persistent() -> Self {
        Self::with_kind(OverlayKind::Persistent, false)
    }

    const fn with_kind(kind: OverlayKind, dismiss_on_outside_click: bool) -> Self {
        Self {
            kind,
            phase: OverlayPhase::Closed,
            frames_since_open: 0,
            dismiss_on_outside_click,
            last_close: None,
        }
    }

    /// Sets whether a settled overlay closes on outside clicks.
    #[must_use]
    pub const fn dismiss_on_outside_click(mut self, dismiss: bool) -> Self {
        self.dismiss_on_outside_click = dismiss;
        self
    }

    /// Overlay kind.
    #[must_use]
    pub const fn kind(&self) -> OverlayKind {
        self.kind
    }

    /// Current phase.
    #[must_use]
    pub const fn phase(&self) -> OverlayPhase {
        self.phase
    }

    /// Frames declared since the overlay opened.
    #[must_use]
    pub const fn frames_since_open(&self) -> u32 {
        self.frames_since_open
    }

    /// Returns true unless closed.
    #[must_use]
    pub const fn is_open(&self) -> bool {
        !matches!(self.phase, OverlayPhase::Closed)
    }

    /// Shows a dialog. No-op if already shown.
    pub fn show(&mut self) {
        if self.phase == OverlayPhase::Closed {
            tracing::debug!(kind = ?self.kind, "overlay opening");
            self.phase = OverlayPhase::Opening;
            self.frames_since_open = 0;
            self.last_close = None;
        }
    }

    /// Opens a menu or sheet. No-op if already open.
    pub fn open(&mut self) {
        self.show();
    }

    /// Closes the overlay.
    pub fn close(&mut self, reason: CloseReason) {
        if self.phase != OverlayPhase::Closed {
            tracing::debug!(kind = ?self.kind, ?reason, "overlay closed");
            self.phase = OverlayPhase::Closed;
            self.frames_since_open = 0;
            self.last_close = Some(reason);
        }
    }

    /// Opens when closed, closes when open.
    pub fn toggle(&mut self) {
        if self.is_open() {
            self.close(CloseReason::Toggled);
        } else {
            self.open();
        }
    }

    /// Counts a declared frame. `Opening` becomes `Open` once `settle_frames`
    /// frames have passed.
    pub fn advance_frame(&mut self, settle_frames: u32) {
        if self.phase == OverlayPhase::Closed {
            return;
        }
        self.frames_since_open = self.frames_since_open.saturating_add(1);
        if self.phase == OverlayPhase::Opening && self.frames_since_open >= settle_frames {
            tracing::debug!(kind = ?self.kind, frames = self.frames_since_open, "overlay open");
            self.phase = OverlayPhase::Open;
        }
    }

    /// Returns the reason of the last close once.
    pub fn take_close_reason(&mut self) -> Option<CloseReason> {
        self.last_close.take()
    }
}

impl<'a, R: Renderer> Context<'a, R> {
    /// Declares an open overlay for this frame.
    ///
    /// Pushes an input layer at `z_order`, registers its blocking region,
    /// traps focus for transient overlays, and handles Escape and outside
    /// clicks. Returns `None` when the overlay is closed (including closed
    /// by this call) or the layer limit is reached. The overlay draws above
    /// any enclosing clip and lays out inside its own content rect.
    pub fn overlay_begin<'c>(
        &'c mut self,
        label: &str,
        state: &'c mut OverlayState,
        rect: Rect,
        z_order: i32,
    ) -> Option<OverlayScope<'c, 'a, R>> {
        if !state.is_open() {
            return None;
        }
        let id = self.ids.make_id(label);
        let layer = self.layers.push(z_order, id);
        if layer == BASE_LAYER {
            return None;
        }

        if self.escape_requested(layer) {
            state.close(CloseReason::Escape);
            self.layers.pop();
            return None;
        }
        let (mx, my) = self.input.mouse_pos();
        if state.phase == OverlayPhase::Open
            && state.dismiss_on_outside_click
            && self.input.mouse_clicked(MouseButton::Left)
            && !rect.contains(mx, my)
            && self.layers.should_process_input(&rect)
        {
            state.close(CloseReason::OutsideClick);
            self.layers.pop();
            return None;
        }

        self.live.mark_seen(id);
        let id_pushed = self.ids.push(&id.raw().to_le_bytes());

        self.renderer.clear_clip();
        match state.kind {
            OverlayKind::Transient => {
                self.layers.register_blocking_region(self.screen);
                self.focus.trap_begin(layer);
                self.renderer.draw_rect(self.screen, self.style.scrim);
            }
            OverlayKind::Persistent => {
                self.layers.register_blocking_region(rect);
            }
        }
        self.renderer
            .draw_rounded_rect(rect, self.style.corner_radius, self.style.surface);

        let content = rect.shrink(snap4(self.style.padding));
        let saved_root = self.clip.push_root(self.screen.clip_to(&content));
        let clip = self.clip_rect();
        self.renderer.set_clip(clip);
        let saved_area = self.enter_area(content);

        Some(OverlayScope {
            ctx: self,
            state,
            layer,
            content,
            id_pushed,
            saved_root,
            saved_area,
        })
    }
}

/// An overlay declared this frame. Closes its layer on drop.
pub struct OverlayScope<'c, 'a, R: Renderer> {
    ctx: &'c mut Context<'a, R>,
    state: &'c mut OverlayState,
    layer: LayerId,
    content: Rect,
    id_pushed: bool,
    saved_root: Option<usize>,
    saved_area: SavedArea,
}

impl<R: Renderer> OverlayScope<'_, '_, R> {
    /// Input layer of the overlay.
    #[must_use]
    pub fn layer(&self) -> LayerId {
        self.layer
    }

    /// Content rect (overlay rect minus padding).
    #[must_use]
    pub fn content(&self) -> Rect {
        self.content
    }

    /// Phase at the time of the call.
    #[must_use]
    pub fn phase(&self) -> OverlayPhase {
        self.state.phase()
    }

    /// Closes the overlay. Widgets declared after this still draw this frame.
    pub fn close(&mut self, reason: CloseReason) {
        self.state.close(reason);
    }
}

impl<R: Renderer> Drop for OverlayScope<'_, '_, R> {
    fn drop(&mut self) {
        let settle = self.ctx.config.timing.overlay_settle_frames;
        self.state.advance_frame(settle);
        if self.state.kind == OverlayKind::Transient {
            self.ctx.focus.trap_end();
        }
        let saved = self.saved_area;
        self.ctx.leave_area(saved);
        if self.id_pushed {
            self.ctx.ids.pop();
        }
        self.ctx.layers.pop();
        if let Some(previous) = self.saved_root {
            self.ctx.clip.pop_root(previous);
        }
        let clip = self.ctx.clip_rect();
        self.ctx.renderer.set_clip(clip);
    }
}

scope_deref!(OverlayScope);
