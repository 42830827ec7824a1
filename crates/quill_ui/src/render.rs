//! Drawing capabilities the engine consumes.
//!
//! The engine never rasterizes. It issues primitives through [`Renderer`],
//! and glyph outlines through an optional [`VectorFont`] that feeds a
//! [`PathSink`]. [`CommandBuffer`] is a headless recording backend.

use bitflags::bitflags;

use crate::layout::Rect;
use crate::style::Color;

bitflags! {
    /// Optional renderer features.
    #[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
    pub struct Capabilities: u8 {
        /// [`Renderer::draw_text`].
        const TEXT = 1 << 0;
        /// [`Renderer::measure_text`].
        const MEASURE = 1 << 1;
        /// [`Renderer::draw_line`].
        const LINES = 1 << 2;
        /// [`Renderer::draw_circle`].
        const CIRCLES = 1 << 3;
        /// [`Renderer::draw_arc`].
        const ARCS = 1 << 4;
        /// Path operations used by vector fonts.
        const PATHS = 1 << 5;
    }
}

impl Capabilities {
    /// Only the required rect and clip operations.
    pub const NONE: Self = Self::empty();
}

/// A drawing backend.
///
/// Rects and clipping are required. Everything else is advertised through
/// [`Renderer::capabilities`]; the default bodies do nothing.
pub trait Renderer {
    /// Optional features this backend implements.
    fn capabilities(&self) -> Capabilities;

    /// Called from [`crate::Context::begin_frame`].
    fn begin_frame(&mut self, _screen: Rect) {}

    /// Called from [`crate::Context::end_frame`].
    fn end_frame(&mut self) {}

    /// Fills a rectangle.
    fn draw_rect(&mut self, rect: Rect, color: Color);

    /// Fills a rectangle with rounded corners.
    fn draw_rounded_rect(&mut self, rect: Rect, radius: f32, color: Color);

    /// Restricts subsequent drawing to `rect`.
    fn set_clip(&mut self, rect: Rect);

    /// Removes the clip.
    fn clear_clip(&mut self);

    /// Draws text with its top-left corner at (`x`, `y`).
    fn draw_text(&mut self, _text: &str, _x: f32, _y: f32, _size: f32, _color: Color) {}

    /// Width of `text` at `size`.
    fn measure_text(&self, _text: &str, _size: f32) -> f32 {
        0.0
    }

    /// Draws a line segment.
    fn draw_line(&mut self, _from: (f32, f32), _to: (f32, f32), _width: f32, _color: Color) {}

    /// Fills a circle.
    fn draw_circle(&mut self, _center: (f32, f32), _radius: f32, _color: Color) {}

    /// Strokes an arc between two angles in radians.
    fn draw_arc(
        &mut self,
        _center: (f32, f32),
        _radius: f32,
        _angles: (f32, f32),
        _width: f32,
        _color: Color,
    ) {
    }

    /// Starts a new subpath.
    fn path_move_to(&mut self, _x: f32, _y: f32) {}

    /// Adds a straight segment.
    fn path_line_to(&mut self, _x: f32, _y: f32) {}

    /// Adds a cubic Bezier segment.
    fn path_cubic_to(&mut self, _c1: (f32, f32), _c2: (f32, f32), _to: (f32, f32)) {}

    /// Fills the current path and starts a new one.
    fn path_fill(&mut self, _color: Color) {}
}

/// Receiver of glyph outlines.
pub trait PathSink {
    /// Starts a new subpath.
    fn move_to(&mut self, x: f32, y: f32);
    /// Adds a straight segment.
    fn line_to(&mut self, x: f32, y: f32);
    /// Adds a cubic Bezier segment.
    fn cubic_to(&mut self, c1: (f32, f32), c2: (f32, f32), to: (f32, f32));
    /// Fills the path built so far.
    fn fill(&mut self, color: Color);
}

/// Forwards path callbacks to a [`Renderer`].
pub struct RendererPaths<'a, R: Renderer + ?Sized>(pub &'a mut R);

impl<R: Renderer + ?Sized> PathSink for RendererPaths<'_, R> {
    fn move_to(&mut self, x: f32, y: f32) {
        self.0.path_move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.0.path_line_to(x, y);
    }

    fn cubic_to(&mut self, c1: (f32, f32), c2: (f32, f32), to: (f32, f32)) {
        self.0.path_cubic_to(c1, c2, to);
    }

    fn fill(&mut self, color: Color) {
        self.0.path_fill(color);
    }
}

/// A glyph-outline text backend.
///
/// Mutually exclusive with renderer-side text: a context configured with a
/// vector font never calls [`Renderer::draw_text`] or
/// [`Renderer::measure_text`].
pub trait VectorFont {
    /// Emits the outlines of `text` at (`x`, `y`) into `sink`.
    fn draw_text(&self, sink: &mut dyn PathSink, text: &str, x: f32, y: f32, size: f32, color: Color);

    /// Advance width of `text` at `size`.
    fn measure(&self, text: &str, size: f32) -> f32;
}

/// Text width query used by text editing.
pub trait TextMeasure {
    /// Width of `text`.
    fn text_width(&self, text: &str) -> f32;
}

/// Fixed advance per character. Used when no backend can measure text.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceMeasure {
    /// Advance per character.
    pub advance: f32,
}

impl MonospaceMeasure {
    /// Advance derived from a font size.
    #[must_use]
    pub fn for_size(size: f32) -> Self {
        Self { advance: size * 0.5 }
    }
}

impl TextMeasure for MonospaceMeasure {
    #[allow(clippy::cast_precision_loss)]
    fn text_width(&self, text: &str) -> f32 {
        text.chars().count() as f32 * self.advance
    }
}

/// A recorded draw call.
#[derive(Debug, Clone, PartialEq)]
pub enum RenderCommand {
    /// Filled rectangle.
    Rect {
        /// Bounds.
        bounds: Rect,
        /// Fill color.
        color: Color,
        /// Corner radius.
        corner_radius: f32,
    },
    /// Text.
    Text {
        /// Text content.
        text: String,
        /// X position.
        x: f32,
        /// Y position.
        y: f32,
        /// Font size.
        size: f32,
        /// Text color.
        color: Color,
    },
    /// Line segment.
    Line {
        /// Start point.
        from: (f32, f32),
        /// End point.
        to: (f32, f32),
        /// Stroke width.
        width: f32,
        /// Stroke color.
        color: Color,
    },
    /// Filled circle.
    Circle {
        /// Center.
        center: (f32, f32),
        /// Radius.
        radius: f32,
        /// Fill color.
        color: Color,
    },
    /// Filled path with the given number of path operations.
    Path {
        /// Move, line and curve operations in the path.
        ops: usize,
        /// Fill color.
        color: Color,
    },
    /// Scissor rect.
    SetClip {
        /// Clip bounds.
        bounds: Rect,
    },
    /// Scissor removed.
    ClearClip,
}

/// GPU-ready rect instance.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct RectInstance {
    /// Bounds.
    pub rect: Rect,
    /// Fill color.
    pub color: Color,
    /// Corner radius.
    pub corner_radius: f32,
    /// Pads the instance to 16-byte alignment.
    pub _padding: [f32; 3],
}

/// Headless backend that records every call.
#[derive(Debug, Clone)]
pub struct CommandBuffer {
    /// Commands recorded this frame.
    commands: Vec<RenderCommand>,
    /// Filled rects recorded this frame, in draw order.
    instances: Vec<RectInstance>,
    /// Advertised capabilities.
    capabilities: Capabilities,
    /// Path operations since the last fill.
    path_ops: usize,
    /// Frames completed.
    frames: u64,
}

impl CommandBuffer {
    /// Every capability except paths.
    pub const FULL: Capabilities = Capabilities::all().difference(Capabilities::PATHS);

    /// Creates a recorder advertising [`CommandBuffer::FULL`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_capabilities(Self::FULL)
    }

    /// Creates a recorder advertising `capabilities`.
    #[must_use]
    pub fn with_capabilities(capabilities: Capabilities) -> Self {
        Self {
            commands: Vec::with_capacity(1024),
            instances: Vec::with_capacity(512),
            capabilities,
            path_ops: 0,
            frames: 0,
        }
    }

    /// Commands recorded since the last frame began.
    #[must_use]
    pub fn commands(&self) -> &[RenderCommand] {
        &self.commands
    }

    /// Filled rect instances as raw bytes for upload.
    #[must_use]
    pub fn rect_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.instances)
    }

    /// Filled rect instances.
    #[must_use]
    pub fn instances(&self) -> &[RectInstance] {
        &self.instances
    }

    /// Frames completed.
    #[must_use]
    pub fn frames(&self) -> u64 {
        self.frames
    }

    /// Recorded text strings, in draw order.
    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.commands.iter().filter_map(|command| match command {
            RenderCommand::Text { text, .. } => Some(text.as_str()),
            _ => None,
        })
    }

    fn push_rect(&mut self, bounds: Rect, color: Color, corner_radius: f32) {
        self.commands.push(RenderCommand::Rect {
            bounds,
            color,
            corner_radius,
        });
        self.instances.push(RectInstance {
            rect: bounds,
            color,
            corner_radius,
            _padding: [0.0; 3],
        });
    }
}

impl Default for CommandBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Renderer for CommandBuffer {
    fn capabilities(&self) -> Capabilities {
        self.capabilities
    }

    fn begin_frame(&mut self, _screen: Rect) {
        self.commands.clear();
        self.instances.clear();
        self.path_ops = 0;
    }

    fn end_frame(&mut self) {
        self.frames += 1;
    }

    fn draw_rect(&mut self, rect: Rect, color: Color) {
        self.push_rect(rect, color, 0.0);
    }

    fn draw_rounded_rect(&mut self, rect: Rect, radius: f32, color: Color) {
        self.push_rect(rect, color, radius);
    }

    fn set_clip(&mut self, rect: Rect) {
        self.commands.push(RenderCommand::SetClip { bounds: rect });
    }

    fn clear_clip(&mut self) {
        self.commands.push(RenderCommand::ClearClip);
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32, size: f32, color: Color) {
        self.commands.push(RenderCommand::Text {
            text: text.to_owned(),
            x,
            y,
            size,
            color,
        });
    }

    fn measure_text(&self, text: &str, size: f32) -> f32 {
        MonospaceMeasure::for_size(size).text_width(text)
    }

    fn draw_line(&mut self, from: (f32, f32), to: (f32, f32), width: f32, color: Color) {
        self.commands.push(RenderCommand::Line {
            from,
            to,
            width,
            color,
        });
    }

    fn draw_circle(&mut self, center: (f32, f32), radius: f32, color: Color) {
        self.commands.push(RenderCommand::Circle {
            center,
            radius,
            color,
        });
    }

    fn path_move_to(&mut self, _x: f32, _y: f32) {
        self.path_ops += 1;
    }

    fn path_line_to(&mut self, _x: f32, _y: f32) {
        self.path_ops += 1;
    }

    fn path_cubic_to(&mut self, _c1: (f32, f32), _c2: (f32, f32), _to: (f32, f32)) {
        self.path_ops += 1;
    }

    fn path_fill(&mut self, color: Color) {
        self.commands.push(RenderCommand::Path {
            ops: self.path_ops,
            color,
        });
        self.path_ops = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recorder_frame() {
        let mut buffer = CommandBuffer::new();
        buffer.begin_frame(Rect::new(0.0, 0.0, 800.0, 600.0));
        buffer.draw_rect(Rect::new(0.0, 0.0, 100.0, 50.0), Color::WHITE);
        buffer.draw_text("hi", 0.0, 0.0, 16.0, Color::BLACK);
        buffer.end_frame();

        assert_eq!(buffer.commands().len(), 2);
        assert_eq!(buffer.texts().collect::<Vec<_>>(), vec!["hi"]);
        assert_eq!(buffer.frames(), 1);
    }

    #[test]
    fn test_rect_bytes_layout() {
        let mut buffer = CommandBuffer::new();
        buffer.draw_rect(Rect::new(1.0, 2.0, 3.0, 4.0), Color::WHITE);
        buffer.draw_rounded_rect(Rect::new(0.0, 0.0, 1.0, 1.0), 4.0, Color::BLACK);
        assert_eq!(buffer.rect_bytes().len(), 2 * std::mem::size_of::<RectInstance>());
        assert_eq!(std::mem::size_of::<RectInstance>(), 48);
    }

    #[test]
    fn test_paths_through_sink() {
        let mut buffer = CommandBuffer::with_capabilities(Capabilities::PATHS);
        {
            let mut sink = RendererPaths(&mut buffer);
            sink.move_to(0.0, 0.0);
            sink.line_to(1.0, 0.0);
            sink.cubic_to((1.0, 1.0), (0.0, 1.0), (0.0, 0.0));
            sink.fill(Color::WHITE);
        }
        assert_eq!(
            buffer.commands(),
            &[RenderCommand::Path {
                ops: 3,
                color: Color::WHITE
            }]
        );
    }

    #[test]
    fn test_capability_mask() {
        let caps = CommandBuffer::FULL;
        assert!(caps.contains(Capabilities::TEXT | Capabilities::MEASURE));
        assert!(!caps.intersects(Capabilities::PATHS));
    }

    #[test]
    fn test_monospace_measure_counts_chars() {
        let measure = MonospaceMeasure { advance: 8.0 };
        assert_eq!(measure.text_width("héllo"), 40.0);
    }
}
