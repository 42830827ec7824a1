//! # Context and Frame Controller
//!
//! ```text
//! begin_frame ─► windows / boxes / widgets ─► end_frame
//!     │               │                          │
//!     │  clear clicks' focus,          swap blocking regions
//!     │  resolve Escape                swap focus registry, apply Tab
//!     │                                expire unseen engine state
//! ```
//!
//! Every fixed table is carved from the host's [`Arena`] in [`Context::new`];
//! nothing is allocated afterwards. Nesting is expressed with scope guards
//! that deref to the context and close their scope when dropped.

use quill_core::{Arena, StateRegistry};

use crate::clip::ClipStack;
use crate::config::{ContextConfig, Limits, Timing};
use crate::error::{InitError, InitResult};
use crate::focus::{FocusDirection, FocusManager};
use crate::id::{IdStack, LivenessTracker, WidgetId};
use crate::input::{InputState, Key, MouseButton};
use crate::layer::{InputLayerStack, LayerId, BASE_LAYER};
use crate::layout::{snap4, BoxConfig, BoxStack, Rect};
use crate::platform::{Accessibility, Clipboard, SemanticHint};
use crate::render::{
    Capabilities, MonospaceMeasure, Renderer, RendererPaths, TextMeasure, VectorFont,
};
use crate::style::{Color, Style};
use crate::widget::HoverTimer;

/// Optional host services.
#[derive(Default)]
pub struct Backends {
    /// Glyph-outline text. Excludes renderer-side text.
    pub font: Option<Box<dyn VectorFont>>,
    /// System clipboard.
    pub clipboard: Option<Box<dyn Clipboard>>,
    /// Assistive technology bridge.
    pub accessibility: Option<Box<dyn Accessibility>>,
}

impl Backends {
    /// No optional services.
    #[must_use]
    pub fn none() -> Self {
        Self::default()
    }

    /// Adds a vector font.
    #[must_use]
    pub fn with_font(mut self, font: impl VectorFont + 'static) -> Self {
        self.font = Some(Box::new(font));
        self
    }

    /// Adds a clipboard.
    #[must_use]
    pub fn with_clipboard(mut self, clipboard: impl Clipboard + 'static) -> Self {
        self.clipboard = Some(Box::new(clipboard));
        self
    }

    /// Adds an accessibility bridge.
    #[must_use]
    pub fn with_accessibility(mut self, accessibility: impl Accessibility + 'static) -> Self {
        self.accessibility = Some(Box::new(accessibility));
        self
    }
}

/// Pointer interaction of one widget this frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Interaction {
    /// Widget identity.
    pub id: WidgetId,
    /// Pointer is over the widget and input reaches it.
    pub hovered: bool,
    /// Left button went down on the widget this frame.
    pub pressed: bool,
    /// Widget owns the pointer (pressed earlier, not yet released).
    pub held: bool,
    /// Left button was released over the widget it went down on.
    pub clicked: bool,
    /// Widget has keyboard focus.
    pub focused: bool,
    /// Input reaches the widget's bounds.
    pub enabled: bool,
}

/// Layout area replaced by a scroll area or overlay.
#[derive(Debug, Clone, Copy)]
pub(crate) struct SavedArea {
    area: Rect,
    cursor_y: f32,
    box_floor: usize,
}

/// Text width through whichever backend draws text.
pub struct TextMetrics<'a, R: Renderer> {
    font: Option<&'a dyn VectorFont>,
    renderer: &'a R,
    size: f32,
}

impl<R: Renderer> TextMeasure for TextMetrics<'_, R> {
    fn text_width(&self, text: &str) -> f32 {
        if let Some(font) = self.font {
            font.measure(text, self.size)
        } else if self.renderer.capabilities().contains(Capabilities::MEASURE) {
            self.renderer.measure_text(text, self.size)
        } else {
            MonospaceMeasure::for_size(self.size).text_width(text)
        }
    }
}

/// The engine. One per UI surface.
///
/// `'a` is the lifetime of the host block every engine table lives in.
pub struct Context<'a, R: Renderer> {
    /// Widget colors and metrics.
    pub style: Style,
    pub(crate) config: ContextConfig,
    pub(crate) renderer: R,
    pub(crate) font: Option<Box<dyn VectorFont>>,
    pub(crate) clipboard: Option<Box<dyn Clipboard>>,
    pub(crate) accessibility: Option<Box<dyn Accessibility>>,

    pub(crate) ids: IdStack<'a>,
    pub(crate) live: LivenessTracker<'a>,
    pub(crate) clip: ClipStack<'a>,
    pub(crate) boxes: BoxStack<'a>,
    pub(crate) layers: InputLayerStack<'a>,
    pub(crate) focus: FocusManager<'a>,

    pub(crate) input: InputState,
    pub(crate) screen: Rect,
    pub(crate) frame: u64,
    pub(crate) time: f64,
    pub(crate) dt: f32,

    /// Widget under the pointer this frame.
    pub(crate) hot: WidgetId,
    /// Widget owning the pointer.
    pub(crate) active: WidgetId,
    pub(crate) tooltip: HoverTimer,
    /// Focused widget already reported to accessibility.
    pub(crate) announced_focus: WidgetId,
    /// Overlay layer asked to close by Escape this frame.
    pub(crate) escape_target: LayerId,
    /// Caret of the focused text field, for IME placement.
    pub(crate) ime_caret: Option<Rect>,

    /// Content area of the current window, overlay or scroll area.
    pub(crate) area: Rect,
    /// Layout cursor inside `area`.
    pub(crate) cursor_y: f32,
    /// Box depth that counts as top level inside `area`.
    pub(crate) box_floor: usize,
    pub(crate) windows: usize,
}

impl<'a, R: Renderer> Context<'a, R> {
    /// Arena bytes [`Context::new`] needs for `limits`, for a block aligned to
    /// [`quill_core::BLOCK_ALIGN`]. Saturates at `usize::MAX` when the limits
    /// cannot fit in the address space; no arena satisfies that value.
    #[must_use]
    pub const fn memory_footprint(limits: &Limits) -> usize {
        Self::footprint_from(0, limits)
    }

    /// Carving order must match [`Context::new`].
    const fn footprint_from(offset: usize, limits: &Limits) -> usize {
        let offset = IdStack::arena_end(offset, limits.max_id_depth);
        let offset = LivenessTracker::arena_end(offset, limits.max_live_ids);
        let offset = ClipStack::arena_end(offset, limits.max_clip_depth);
        let offset = BoxStack::arena_end(offset, limits.max_box_depth, limits.max_box_children);
        let offset =
            InputLayerStack::arena_end(offset, limits.max_layers, limits.max_blocking_regions);
        FocusManager::arena_end(offset, limits.max_focusable)
    }

    /// Checks a configuration before creating a context.
    ///
    /// `available` is the number of free arena bytes.
    ///
    /// # Errors
    ///
    /// Any [`InitError`] [`Context::new`] would return for the same inputs.
    pub fn validate(
        config: &ContextConfig,
        available: usize,
        capabilities: Capabilities,
        has_vector_font: bool,
    ) -> InitResult<()> {
        Self::check(config, capabilities, has_vector_font)?;
        let required = Self::memory_footprint(&config.limits);
        if required == usize::MAX || required > available {
            return Err(InitError::InsufficientMemory {
                required,
                available,
            });
        }
        Ok(())
    }

    fn check(
        config: &ContextConfig,
        capabilities: Capabilities,
        has_vector_font: bool,
    ) -> InitResult<()> {
        config.limits.validate()?;
        config.timing.validate()?;
        if has_vector_font {
            if capabilities.intersects(Capabilities::TEXT | Capabilities::MEASURE) {
                return Err(InitError::ConflictingTextBackends);
            }
            if !capabilities.contains(Capabilities::PATHS) {
                return Err(InitError::MissingPathSupport);
            }
        }
        Ok(())
    }

    /// Creates a context, carving every table from `arena`. The tables stay
    /// in the arena's block for the life of the context.
    ///
    /// # Errors
    ///
    /// [`InitError`] if the limits are invalid, the text backends conflict, or
    /// the arena is too small.
    pub fn new(
        config: ContextConfig,
        arena: &mut Arena<'a>,
        renderer: R,
        backends: Backends,
    ) -> InitResult<Self> {
        Self::check(&config, renderer.capabilities(), backends.font.is_some())?;
        let used = arena.used();
        let end = Self::footprint_from(used, &config.limits);
        let required = end - used;
        let available = arena.remaining();
        if end == usize::MAX || required > available {
            return Err(InitError::InsufficientMemory {
                required,
                available,
            });
        }

        let limits = config.limits;
        // Only a block not aligned to BLOCK_ALIGN can run short here.
        let exhausted = move || InitError::InsufficientMemory {
            required,
            available,
        };
        let ids = IdStack::from_arena(arena, limits.max_id_depth).ok_or_else(exhausted)?;
        let live = LivenessTracker::from_arena(arena, limits.max_live_ids).ok_or_else(exhausted)?;
        let clip = ClipStack::from_arena(arena, limits.max_clip_depth).ok_or_else(exhausted)?;
        let boxes = BoxStack::from_arena(arena, limits.max_box_depth, limits.max_box_children)
            .ok_or_else(exhausted)?;
        let layers =
            InputLayerStack::from_arena(arena, limits.max_layers, limits.max_blocking_regions)
                .ok_or_else(exhausted)?;
        let focus = FocusManager::from_arena(arena, limits.max_focusable).ok_or_else(exhausted)?;

        tracing::info!(
            footprint = required,
            arena_used = arena.used(),
            vector_font = backends.font.is_some(),
            "context initialized"
        );

        Ok(Self {
            style: Style::default(),
            config,
            renderer,
            font: backends.font,
            clipboard: backends.clipboard,
            accessibility: backends.accessibility,
            ids,
            live,
            clip,
            boxes,
            layers,
            focus,
            input: InputState::default(),
            screen: Rect::ZERO,
            frame: 0,
            time: 0.0,
            dt: 0.0,
            hot: WidgetId::NONE,
            active: WidgetId::NONE,
            tooltip: HoverTimer::default(),
            announced_focus: WidgetId::NONE,
            escape_target: BASE_LAYER,
            ime_caret: None,
            area: Rect::ZERO,
            cursor_y: 0.0,
            box_floor: 0,
            windows: 0,
        })
    }

    // =========================================================================
    // Frame control
    // =========================================================================

    /// Starts a frame with this frame's input, elapsed seconds and screen.
    pub fn begin_frame(&mut self, input: &InputState, dt: f32, screen: Rect) {
        self.frame += 1;
        self.dt = dt.max(0.0);
        self.time += f64::from(self.dt);
        self.input = *input;
        self.screen = screen;
        self.hot = WidgetId::NONE;
        self.ime_caret = None;
        self.escape_target = BASE_LAYER;
        self.windows = 0;

        self.renderer.begin_frame(screen);
        self.focus.begin_frame();

        if input.any_clicked() {
            self.focus.clear_focus();
        }
        if input.key_pressed(Key::Escape) {
            let trap = self.focus.last_frame_trap();
            if trap == BASE_LAYER {
                self.focus.clear_focus();
            } else {
                self.escape_target = trap;
            }
        }

        self.clip.reset(screen);
        self.area = screen;
        self.cursor_y = screen.y;
        self.box_floor = 0;
    }

    /// Ends the frame: publishes double buffers, applies Tab, and drops engine
    /// state owned by widgets that were not declared.
    pub fn end_frame(&mut self) {
        if self.boxes.depth() > 0 || self.ids.depth() > 0 || self.layers.depth() > 0 {
            tracing::warn!(
                boxes = self.boxes.depth(),
                ids = self.ids.depth(),
                layers = self.layers.depth(),
                "unbalanced scopes at end of frame"
            );
            self.boxes.clear();
            self.ids.clear();
        }

        let mut expired = 0usize;
        let focused = self.focus.focused();
        if !focused.is_none() && !self.live.seen_this_frame(focused) {
            self.focus.clear_focus();
            expired += 1;
        }
        if !self.active.is_none()
            && (!self.live.seen_this_frame(self.active) || !self.input.mouse_down(MouseButton::Left))
        {
            if !self.live.seen_this_frame(self.active) {
                expired += 1;
            }
            self.active = WidgetId::NONE;
        }
        self.tooltip.end_frame(self.dt, self.hot);

        if self.focus.focused() != self.announced_focus {
            self.announced_focus = WidgetId::NONE;
        }
        self.layers.end_frame();
        self.focus.end_frame();
        if self.input.key_pressed(Key::Tab) {
            let direction = if self.input.modifiers.shift() {
                FocusDirection::Prev
            } else {
                FocusDirection::Next
            };
            let trap = self.focus.last_frame_trap();
            self.focus.step(direction, trap);
        }

        tracing::debug!(
            frame = self.frame,
            live_ids = self.live.live_count(),
            expired,
            blocking_regions = self.layers.active_regions().len(),
            "frame ended"
        );
        self.live.end_frame();
        self.renderer.end_frame();
    }

    /// Drops every entry of a caller registry not touched during the frame
    /// just ended. Touch entries with [`Context::frame`] as the frame number.
    pub fn expire_unseen<T>(&self, registry: &mut StateRegistry<T>) -> usize {
        registry.expire(self.frame)
    }

    // =========================================================================
    // Accessors
    // =========================================================================

    /// Current frame number, starting at 1.
    #[must_use]
    pub fn frame(&self) -> u64 {
        self.frame
    }

    /// Seconds accumulated from frame deltas.
    #[must_use]
    pub fn time(&self) -> f64 {
        self.time
    }

    /// This frame's delta in seconds.
    #[must_use]
    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// This frame's input.
    #[must_use]
    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Screen rect.
    #[must_use]
    pub fn screen(&self) -> Rect {
        self.screen
    }

    /// Configuration in use.
    #[must_use]
    pub fn config(&self) -> &ContextConfig {
        &self.config
    }

    /// Timing thresholds.
    #[must_use]
    pub fn timing(&self) -> &Timing {
        &self.config.timing
    }

    /// The renderer.
    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    /// The renderer, mutably.
    pub fn renderer_mut(&mut self) -> &mut R {
        &mut self.renderer
    }

    /// Widget under the pointer so far this frame.
    #[must_use]
    pub fn hot(&self) -> WidgetId {
        self.hot
    }

    /// Widget owning the pointer.
    #[must_use]
    pub fn active(&self) -> WidgetId {
        self.active
    }

    /// Caret phase for blinking. Always visible when blinking is disabled.
    #[must_use]
    pub fn caret_visible(&self) -> bool {
        let period = f64::from(self.config.timing.caret_blink);
        if period <= 0.0 {
            return true;
        }
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let phase = (self.time / period) as u64;
        phase % 2 == 0
    }

    /// Caret rect of the focused text field this frame, for IME candidate
    /// window placement.
    #[must_use]
    pub fn ime_caret_rect(&self) -> Option<Rect> {
        self.ime_caret
    }

    // =========================================================================
    // Identity
    // =========================================================================

    /// Pushes a salt for the identities that follow.
    pub fn push_id(&mut self, data: &[u8]) -> bool {
        self.ids.push(data)
    }

    /// Pushes a loop index salt.
    pub fn push_id_index(&mut self, index: usize) -> bool {
        self.ids.push_index(index)
    }

    /// Reverts the last [`Context::push_id`].
    pub fn pop_id(&mut self) -> bool {
        self.ids.pop()
    }

    /// Identity of `label` under the current ID stack.
    #[must_use]
    pub fn make_id(&self, label: &str) -> WidgetId {
        self.ids.make_id(label)
    }

    /// Marks `id` as declared this frame.
    pub fn mark_seen(&mut self, id: WidgetId) -> bool {
        self.live.mark_seen(id)
    }

    /// Returns true if `id` was declared during the last completed frame.
    #[must_use]
    pub fn was_seen_last_frame(&self, id: WidgetId) -> bool {
        self.live.seen_last_frame(id)
    }

    // =========================================================================
    // Clipping
    // =========================================================================

    /// Pushes a clip rect intersected with the current one.
    pub fn push_clip(&mut self, rect: Rect) -> bool {
        let pushed = self.clip.push(rect);
        if let Some(top) = self.clip.top().filter(|_| pushed) {
            self.renderer.set_clip(top);
        }
        pushed
    }

    /// Restores the previous clip rect.
    pub fn pop_clip(&mut self) -> bool {
        let popped = self.clip.pop();
        if let Some(top) = self.clip.top().filter(|_| popped) {
            self.renderer.set_clip(top);
        }
        popped
    }

    /// Returns true if `rect` is entirely outside the current clip.
    #[must_use]
    pub fn is_clipped(&self, rect: &Rect) -> bool {
        self.clip.is_clipped(rect)
    }

    /// Current clip rect.
    #[must_use]
    pub fn clip_rect(&self) -> Rect {
        self.clip.top().unwrap_or(self.screen)
    }

    /// Opens a clip scope closed when the guard drops.
    pub fn clip_scope(&mut self, rect: Rect) -> ClipScope<'_, 'a, R> {
        let pushed = self.push_clip(rect);
        ClipScope { ctx: self, pushed }
    }

    // =========================================================================
    // Layout
    // =========================================================================

    /// Space from the layout cursor to the bottom of the active window's
    /// content rect (the clip root), or of the overlay being declared.
    #[must_use]
    pub fn remaining_height(&self) -> f32 {
        let bottom = self.clip.base().unwrap_or(self.screen).bottom();
        (bottom - self.cursor_y).max(0.0)
    }

    /// Takes a full-width row of `height` from the layout cursor.
    pub fn layout_row(&mut self, height: f32) -> Rect {
        let rect = Rect::new(self.area.x, self.cursor_y, self.area.width, height.max(0.0));
        self.cursor_y += rect.height;
        rect
    }

    /// Moves the layout cursor down by `amount`.
    pub fn layout_space(&mut self, amount: f32) {
        self.cursor_y += amount.max(0.0);
    }

    /// Starts a nested layout area with its own cursor and top-level boxes.
    pub(crate) fn enter_area(&mut self, area: Rect) -> SavedArea {
        let saved = SavedArea {
            area: self.area,
            cursor_y: self.cursor_y,
            box_floor: self.box_floor,
        };
        self.area = area;
        self.cursor_y = area.y;
        self.box_floor = self.boxes.depth();
        saved
    }

    pub(crate) fn leave_area(&mut self, saved: SavedArea) {
        self.area = saved.area;
        self.cursor_y = saved.cursor_y;
        self.box_floor = saved.box_floor;
    }

    /// Rect a top-level box would fill.
    fn top_level_area(&self) -> Rect {
        Rect::new(
            self.area.x,
            self.cursor_y,
            self.area.width,
            (self.area.bottom() - self.cursor_y).max(0.0),
        )
    }

    /// Opens a box and returns its first child rect, or a zero rect when a
    /// box limit is reached (the box is then not opened).
    pub fn box_begin_raw(&mut self, config: &BoxConfig<'_>) -> Rect {
        let parent = if self.boxes.depth() <= self.box_floor {
            self.top_level_area()
        } else {
            self.boxes.current_rect()
        };
        let container = config.container_in(parent);
        self.boxes.begin(container, config).unwrap_or(Rect::ZERO)
    }

    /// Advances the innermost box to its next child rect.
    pub fn box_next(&mut self) -> Rect {
        self.boxes.next()
    }

    /// Current child rect of the innermost box.
    #[must_use]
    pub fn box_rect(&self) -> Rect {
        self.boxes.current_rect()
    }

    /// Closes the innermost box. A top-level box advances the layout cursor
    /// by its height.
    pub fn box_end(&mut self) -> bool {
        let Some(node) = self.boxes.end() else {
            tracing::warn!("box_end with no open box");
            return false;
        };
        if self.boxes.depth() <= self.box_floor {
            self.cursor_y += node.rect.height;
        }
        true
    }

    /// Number of open boxes.
    #[must_use]
    pub fn box_depth(&self) -> usize {
        self.boxes.depth()
    }

    /// Opens a box closed when the guard drops.
    pub fn box_begin(&mut self, config: &BoxConfig<'_>) -> BoxScope<'_, 'a, R> {
        let depth = self.boxes.depth();
        let first = self.box_begin_raw(config);
        let open = self.boxes.depth() > depth;
        BoxScope {
            ctx: self,
            open,
            first,
        }
    }

    /// Opens a window: resets the clip stack to its content rect and starts
    /// the layout cursor at the top.
    pub fn window_begin(&mut self, label: &str, rect: Rect) -> WindowScope<'_, 'a, R> {
        if self.windows >= self.config.limits.max_windows {
            tracing::warn!(max_windows = self.config.limits.max_windows, "window limit reached");
            return WindowScope {
                ctx: self,
                open: false,
                id_pushed: false,
                content: Rect::ZERO,
            };
        }
        self.windows += 1;
        let id = self.ids.make_id(label);
        self.live.mark_seen(id);

        self.renderer.clear_clip();
        self.draw_rounded_rect(rect, self.style.corner_radius, self.style.background);

        let content = rect.shrink(snap4(self.style.padding));
        self.clip.reset(content);
        self.renderer.set_clip(content);
        self.area = content;
        self.cursor_y = content.y;
        let id_pushed = self.ids.push(&id.raw().to_le_bytes());
        WindowScope {
            ctx: self,
            open: true,
            id_pushed,
            content,
        }
    }

    fn window_end(&mut self, id_pushed: bool) {
        if id_pushed {
            self.ids.pop();
        }
        self.clip.reset(self.screen);
        self.renderer.clear_clip();
        self.area = self.screen;
        self.cursor_y = self.screen.y;
    }

    // =========================================================================
    // Input layers and focus
    // =========================================================================

    /// Opens an input layer. Its id comes from the ID stack and `z_order`, so
    /// the same declaration gets the same id every frame. Returns 0 on
    /// overflow.
    pub fn push_layer(&mut self, z_order: i32) -> LayerId {
        let owner = self.ids.make_id_bytes(&z_order.to_le_bytes());
        self.layers.push(z_order, owner)
    }

    /// Closes the active input layer.
    pub fn pop_layer(&mut self) -> bool {
        self.layers.pop()
    }

    /// Opens an input layer closed when the guard drops.
    pub fn layer_scope(&mut self, z_order: i32) -> LayerScope<'_, 'a, R> {
        let id = self.push_layer(z_order);
        LayerScope { ctx: self, id }
    }

    /// Active input layer id.
    #[must_use]
    pub fn active_layer(&self) -> LayerId {
        self.layers.active().id
    }

    /// Shields `rect` from lower layers, starting next frame.
    pub fn register_blocking_region(&mut self, rect: Rect) -> bool {
        self.layers.register_blocking_region(rect)
    }

    /// Returns true if input may reach `bounds` this frame.
    #[must_use]
    pub fn should_process_input(&self, bounds: &Rect) -> bool {
        self.layers.should_process_input(bounds)
    }

    /// Focuses `id`.
    pub fn set_focus(&mut self, id: WidgetId) {
        self.focus.set_focus(id);
    }

    /// Clears focus.
    pub fn clear_focus(&mut self) {
        self.focus.clear_focus();
    }

    /// Returns true if `id` has focus.
    #[must_use]
    pub fn has_focus(&self, id: WidgetId) -> bool {
        self.focus.has_focus(id)
    }

    /// Focused widget.
    #[must_use]
    pub fn focused(&self) -> WidgetId {
        self.focus.focused()
    }

    /// Moves focus to the next registered widget.
    pub fn focus_next(&mut self) -> WidgetId {
        self.focus.focus_next()
    }

    /// Moves focus to the previous registered widget.
    pub fn focus_prev(&mut self) -> WidgetId {
        self.focus.focus_prev()
    }

    /// Restricts focus navigation to widgets of `layer`.
    pub fn focus_trap_begin(&mut self, layer: LayerId) {
        self.focus.trap_begin(layer);
    }

    /// Lifts the focus restriction.
    pub fn focus_trap_end(&mut self) {
        self.focus.trap_end();
    }

    /// Returns true if Escape this frame asks the overlay on `layer` to close.
    #[must_use]
    pub fn escape_requested(&self, layer: LayerId) -> bool {
        layer != BASE_LAYER && self.escape_target == layer
    }

    // =========================================================================
    // Interaction
    // =========================================================================

    /// Resolves pointer ownership for a widget covering `rect`.
    ///
    /// Marks `id` seen and, when `focusable`, registers it for Tab
    /// navigation and focuses it on press.
    pub fn interact(&mut self, id: WidgetId, rect: Rect, focusable: bool) -> Interaction {
        self.live.mark_seen(id);
        if focusable {
            self.focus.register(id, rect, self.layers.active().id);
        }

        let enabled = self.layers.should_process_input(&rect);
        let (mx, my) = self.input.mouse_pos();
        let over = enabled && rect.contains(mx, my) && self.clip_rect().contains(mx, my);
        let hovered = over && (self.active.is_none() || self.active == id);
        if hovered {
            self.hot = id;
        }

        let pressed = hovered && self.input.mouse_clicked(MouseButton::Left);
        if pressed {
            self.active = id;
            if focusable {
                self.focus.set_focus(id);
            }
        }
        let owns = self.active == id;
        Interaction {
            id,
            hovered,
            pressed,
            held: owns && self.input.mouse_down(MouseButton::Left),
            clicked: owns && over && self.input.mouse_released(MouseButton::Left),
            focused: self.focus.has_focus(id),
            enabled,
        }
    }

    // =========================================================================
    // Drawing
    // =========================================================================

    /// Text width at the style's font size.
    #[must_use]
    pub fn text_width(&self, text: &str) -> f32 {
        self.metrics().text_width(text)
    }

    /// Text metrics at the style's font size.
    #[must_use]
    pub fn metrics(&self) -> TextMetrics<'_, R> {
        TextMetrics {
            font: self.font.as_deref(),
            renderer: &self.renderer,
            size: self.style.font_size,
        }
    }

    /// Fills `rect` unless it is clipped away.
    pub fn draw_rect(&mut self, rect: Rect, color: Color) {
        if !self.clip.is_clipped(&rect) {
            self.renderer.draw_rect(rect, color);
        }
    }

    /// Fills a rounded `rect` unless it is clipped away.
    pub fn draw_rounded_rect(&mut self, rect: Rect, radius: f32, color: Color) {
        if !self.clip.is_clipped(&rect) {
            self.renderer.draw_rounded_rect(rect, radius, color);
        }
    }

    /// Draws text through the vector font or the renderer.
    pub fn draw_text(&mut self, text: &str, x: f32, y: f32, color: Color) {
        let size = self.style.font_size;
        let bounds = Rect::new(x, y, self.text_width(text), size);
        if text.is_empty() || self.clip.is_clipped(&bounds) {
            return;
        }
        self.draw_text_unclipped(text, x, y, color);
    }

    /// Draws text without testing it against the clip stack.
    pub(crate) fn draw_text_unclipped(&mut self, text: &str, x: f32, y: f32, color: Color) {
        let size = self.style.font_size;
        if let Some(font) = self.font.as_deref() {
            font.draw_text(&mut RendererPaths(&mut self.renderer), text, x, y, size, color);
        } else if self.renderer.capabilities().contains(Capabilities::TEXT) {
            self.renderer.draw_text(text, x, y, size, color);
        }
    }

    /// Draws a line if the renderer supports lines.
    pub fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Color) {
        if self.renderer.capabilities().contains(Capabilities::LINES) {
            self.renderer.draw_line(from, to, width, color);
        }
    }

    /// Draws a focus outline around `rect` as four thin rects.
    pub fn draw_focus_ring(&mut self, rect: Rect) {
        let color = self.style.focus_ring;
        let ring = rect.expand(2.0);
        self.draw_rect(Rect::new(ring.x, ring.y, ring.width, 2.0), color);
        self.draw_rect(Rect::new(ring.x, ring.bottom() - 2.0, ring.width, 2.0), color);
        self.draw_rect(Rect::new(ring.x, ring.y, 2.0, ring.height), color);
        self.draw_rect(Rect::new(ring.right() - 2.0, ring.y, 2.0, ring.height), color);
    }

    // =========================================================================
    // Accessibility
    // =========================================================================

    /// Speaks `text` through the accessibility bridge, if any.
    pub fn announce(&mut self, text: &str) {
        if let Some(access) = self.accessibility.as_deref_mut() {
            access.announce(text);
        }
    }

    pub(crate) fn emit_focus(&mut self, hint: &SemanticHint<'_>) {
        if let Some(access) = self.accessibility.as_deref_mut() {
            access.on_focus(hint);
        }
    }

    pub(crate) fn emit_state(&mut self, hint: &SemanticHint<'_>) {
        if let Some(access) = self.accessibility.as_deref_mut() {
            access.on_state(hint);
        }
    }

    pub(crate) fn emit_value(&mut self, hint: &SemanticHint<'_>) {
        if let Some(access) = self.accessibility.as_deref_mut() {
            access.on_value(hint);
        }
    }
}

macro_rules! scope_deref {
    ($scope:ident) => {
        impl<'a, R: $crate::render::Renderer> ::std::ops::Deref for $scope<'_, 'a, R> {
            type Target = $crate::context::Context<'a, R>;

            fn deref(&self) -> &Self::Target {
                self.ctx
            }
        }

        impl<R: $crate::render::Renderer> ::std::ops::DerefMut for $scope<'_, '_, R> {
            fn deref_mut(&mut self) -> &mut Self::Target {
                self.ctx
            }
        }
    };
}
pub(crate) use scope_deref;

/// An open box. Closes on drop.
pub struct BoxScope<'c, 'a, R: Renderer> {
    ctx: &'c mut Context<'a, R>,
    open: bool,
    first: Rect,
}

impl<R: Renderer> BoxScope<'_, '_, R> {
    /// Returns true if the box opened. A box past a limit hands out zero
    /// rects.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// First child rect.
    #[must_use]
    pub fn first(&self) -> Rect {
        self.first
    }

    /// Current child rect.
    #[must_use]
    pub fn rect(&self) -> Rect {
        if self.open {
            self.ctx.boxes.current_rect()
        } else {
            Rect::ZERO
        }
    }

    /// Advances to the next child rect.
    pub fn next(&mut self) -> Rect {
        if self.open {
            self.ctx.boxes.next()
        } else {
            Rect::ZERO
        }
    }
}

impl<R: Renderer> Drop for BoxScope<'_, '_, R> {
    fn drop(&mut self) {
        if self.open {
            self.ctx.box_end();
        }
    }
}

scope_deref!(BoxScope);

/// A pushed clip rect. Pops on drop.
pub struct ClipScope<'c, 'a, R: Renderer> {
    ctx: &'c mut Context<'a, R>,
    pushed: bool,
}

impl<R: Renderer> ClipScope<'_, '_, R> {
    /// Returns true if the clip was pushed.
    #[must_use]
    pub fn is_pushed(&self) -> bool {
        self.pushed
    }
}

impl<R: Renderer> Drop for ClipScope<'_, '_, R> {
    fn drop(&mut self) {
        if self.pushed {
            self.ctx.pop_clip();
        }
    }
}

scope_deref!(ClipScope);

/// An open input layer. Pops on drop.
pub struct LayerScope<'c, 'a, R: Renderer> {
    ctx: &'c mut Context<'a, R>,
    id: LayerId,
}

impl<R: Renderer> LayerScope<'_, '_, R> {
    /// Layer id, 0 if the layer could not be opened.
    #[must_use]
    pub fn id(&self) -> LayerId {
        self.id
    }
}

impl<R: Renderer> Drop for LayerScope<'_, '_, R> {
    fn drop(&mut self) {
        if self.id != BASE_LAYER {
            self.ctx.pop_layer();
        }
    }
}

scope_deref!(LayerScope);

/// An open window. Closes on drop.
pub struct WindowScope<'c, 'a, R: Renderer> {
    ctx: &'c mut Context<'a, R>,
    open: bool,
    id_pushed: bool,
    content: Rect,
}

impl<R: Renderer> WindowScope<'_, '_, R> {
    /// Returns true if the window opened.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Content rect (window rect minus padding).
    #[must_use]
    pub fn content(&self) -> Rect {
        self.content
    }
}

impl<R: Renderer> Drop for WindowScope<'_, '_, R> {
    fn drop(&mut self) {
        if self.open {
            self.ctx.window_end(self.id_pushed);
        }
    }
}

scope_deref!(WindowScope);

#[cfg(test)]
mod tests {
    use quill_core::AlignedBlock;

    use super::*;
    use crate::layout::SizeSpec;
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

    #[test]
    fn test_footprint_is_exact() {
        let config = ContextConfig::default();
        let footprint = Context::<CommandBuffer>::memory_footprint(&config.limits);
        let mut block = AlignedBlock::new(footprint);
        let mut arena = block.arena();
        assert!(Context::new(config, &mut arena, CommandBuffer::new(), Backends::none()).is_ok());
        assert_eq!(arena.used(), footprint);
        assert_eq!(arena.remaining(), 0);

        let mut small = AlignedBlock::new(footprint - 1);
        let err = Context::new(config, &mut small.arena(), CommandBuffer::new(), Backends::none())
            .err()
            .unwrap();
        assert!(matches!(err, InitError::InsufficientMemory { .. }));
    }

    #[test]
    fn test_unaddressable_limits_need_more_than_any_block() {
        let mut config = ContextConfig::default();
        config.limits.max_live_ids = usize::MAX / 2;
        assert_eq!(Context::<CommandBuffer>::memory_footprint(&config.limits), usize::MAX);
        assert!(matches!(
            Context::<CommandBuffer>::validate(&config, usize::MAX, Capabilities::NONE, false),
            Err(InitError::InsufficientMemory { required: usize::MAX, .. })
        ));

        let mut block = block();
        let mut arena = block.arena();
        let err = Context::new(config, &mut arena, CommandBuffer::new(), Backends::none())
            .err()
            .unwrap();
        assert!(matches!(err, InitError::InsufficientMemory { .. }));
        assert_eq!(arena.used(), 0);
    }

    #[test]
    fn test_validate_rejects_zero_limit() {
        let mut config = ContextConfig::default();
        config.limits.max_layers = 0;
        let err =
            Context::<CommandBuffer>::validate(&config, usize::MAX, CommandBuffer::FULL, false)
                .unwrap_err();
        assert_eq!(err, InitError::InvalidLimits { field: "max_layers" });
    }

    #[test]
    fn test_validate_text_backend_conflict() {
        let config = ContextConfig::default();
        assert_eq!(
            Context::<CommandBuffer>::validate(&config, usize::MAX, CommandBuffer::FULL, true),
            Err(InitError::ConflictingTextBackends)
        );
        assert_eq!(
            Context::<CommandBuffer>::validate(&config, usize::MAX, Capabilities::NONE, true),
            Err(InitError::MissingPathSupport)
        );
        assert!(Context::<CommandBuffer>::validate(
            &config,
            usize::MAX,
            Capabilities::PATHS,
            true
        )
        .is_ok());
    }

    #[test]
    fn test_top_level_box_advances_cursor() {
        let mut block = block();
        let mut ctx = context(&mut block);
        ctx.begin_frame(&InputState::default(), 0.016, screen());
        {
            let mut window = ctx.window_begin("Main", Rect::new(0.0, 0.0, 400.0, 300.0));
            let content = window.content();
            let start = window.remaining_height();
            {
                let row = window.box_begin(&BoxConfig::row(2).cross_size(40.0));
                assert_eq!(row.first().y, content.y);
            }
            assert_eq!(window.remaining_height(), start - 40.0);
            let row = window.box_begin(&BoxConfig::row(1).cross_size(40.0));
            assert_eq!(row.first().y, content.y + 40.0);
        }
        ctx.end_frame();
        assert_eq!(ctx.box_depth(), 0);
    }

    #[test]
    fn test_nested_box_uses_parent_child_rect() {
        let mut block = block();
        let mut ctx = context(&mut block);
        ctx.begin_frame(&InputState::default(), 0.016, screen());
        let specs = [SizeSpec::fixed(200.0), SizeSpec::grow(1.0)];
        let mut outer = ctx.box_begin(&BoxConfig::row(2).sizes(&specs).cross_size(100.0));
        outer.next();
        let inner = outer.box_begin(&BoxConfig::column(2));
        assert_eq!(inner.first(), Rect::new(200.0, 0.0, 600.0, 50.0));
    }

    #[test]
    fn test_box_past_depth_is_noop() {
        let mut config = ContextConfig::default();
        config.limits.max_box_depth = 1;
        let footprint = Context::<CommandBuffer>::memory_footprint(&config.limits);
        let mut block = AlignedBlock::new(footprint);
        let mut ctx =
            Context::new(config, &mut block.arena(), CommandBuffer::new(), Backends::none())
                .unwrap();
        ctx.begin_frame(&InputState::default(), 0.016, screen());

        let mut outer = ctx.box_begin(&BoxConfig::row(1));
        let inner = outer.box_begin(&BoxConfig::row(1));
        assert!(!inner.is_open());
        assert_eq!(inner.first(), Rect::ZERO);
        drop(inner);
        assert_eq!(outer.box_depth(), 1);
    }

    #[test]
    fn test_clip_scope_restores() {
        let mut block = block();
        let mut ctx = context(&mut block);
        ctx.begin_frame(&InputState::default(), 0.016, screen());
        let before = ctx.clip_rect();
        {
            let clip = ctx.clip_scope(Rect::new(10.0, 10.0, 20.0, 20.0));
            assert!(clip.is_pushed());
            assert!(clip.is_clipped(&Rect::new(100.0, 100.0, 5.0, 5.0)));
        }
        assert_eq!(ctx.clip_rect(), before);
    }

    #[test]
    fn test_unseen_focus_expires() {
        let mut block = block();
        let mut ctx = context(&mut block);
        let id = WidgetId::from_label("field");
        ctx.begin_frame(&InputState::default(), 0.016, screen());
        ctx.interact(id, Rect::new(0.0, 0.0, 10.0, 10.0), true);
        ctx.set_focus(id);
        ctx.end_frame();
        assert!(ctx.has_focus(id));

        ctx.begin_frame(&InputState::default(), 0.016, screen());
        ctx.end_frame();
        assert!(!ctx.has_focus(id));
    }

    #[test]
    fn test_expire_unseen_caller_state() {
        let mut block = block();
        let mut ctx = context(&mut block);
        let mut registry: StateRegistry<u32> = StateRegistry::new(4);
        ctx.begin_frame(&InputState::default(), 0.016, screen());
        registry.get_or_insert_with(1, ctx.frame(), || 0);
        registry.get_or_insert_with(2, ctx.frame(), || 0);
        ctx.end_frame();
        assert_eq!(ctx.expire_unseen(&mut registry), 0);

        ctx.begin_frame(&InputState::default(), 0.016, screen());
        registry.touch(1, ctx.frame());
        ctx.end_frame();
        assert_eq!(ctx.expire_unseen(&mut registry), 1);
        assert!(registry.get(2).is_none());
    }

    #[test]
    fn test_drag_keeps_owner_outside_rect() {
        let mut block = block();
        let mut ctx = context(&mut block);
        let id = WidgetId::from_label("thumb");
        let rect = Rect::new(0.0, 0.0, 20.0, 20.0);

        let mut input = InputState::default();
        input.set_mouse_pos(5.0, 5.0);
        input.mouse_button_down(MouseButton::Left);
        ctx.begin_frame(&input, 0.016, screen());
        assert!(ctx.interact(id, rect, false).pressed);
        ctx.end_frame();

        input.begin_frame();
        input.set_mouse_pos(300.0, 5.0);
        ctx.begin_frame(&input, 0.016, screen());
        let interaction = ctx.interact(id, rect, false);
        assert!(interaction.held);
        assert!(!interaction.hovered);
        ctx.end_frame();
        assert_eq!(ctx.active(), id);

        input.begin_frame();
        input.mouse_button_up(MouseButton::Left);
        ctx.begin_frame(&input, 0.016, screen());
        assert!(!ctx.interact(id, rect, false).clicked);
        ctx.end_frame();
        assert_eq!(ctx.active(), WidgetId::NONE);
    }

    #[test]
    fn test_caret_blink_phase() {
        let mut block = block();
        let mut ctx = context(&mut block);
        ctx.begin_frame(&InputState::default(), 0.1, screen());
        assert!(ctx.caret_visible());
        ctx.end_frame();
        ctx.begin_frame(&InputState::default(), 0.5, screen());
        assert!(!ctx.caret_visible());
        ctx.end_frame();
    }
}
