//! # Quill UI
//!
//! Frame-coherent immediate-mode UI engine. The application re-declares its
//! whole widget tree every frame; the engine rebuilds layout, interaction
//! ownership, focus and overlay arbitration from that declaration plus
//! caller-owned state keyed by widget identity.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                         ONE FRAME                            │
//! ├──────────────────────────────────────────────────────────────┤
//! │ begin_frame → windows / boxes → widgets → overlays → end_frame│
//! │      ↓              ↓              ↓          ↓          ↓   │
//! │ focus reset    box solver     layer check  regions    swap   │
//! │ Escape         clip stack     focus reg.   trap       expire │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Rules
//!
//! - Every table is carved from one [`quill_core::Arena`] at
//!   [`Context::new`]; nothing grows afterwards.
//! - Capacity overflow is a return value plus a `tracing` warning, never a
//!   panic.
//! - Blocking regions and the focus registry are double-buffered: what a
//!   frame registers takes effect the next frame.
//!
//! ## Example
//!
//! ```rust
//! use quill_core::AlignedBlock;
//! use quill_ui::{Backends, BoxConfig, CommandBuffer, Context, ContextConfig, InputState, Rect};
//!
//! let config = ContextConfig::default();
//! let mut block = AlignedBlock::new(Context::<CommandBuffer>::memory_footprint(&config.limits));
//! let mut ctx =
//!     Context::new(config, &mut block.arena(), CommandBuffer::new(), Backends::none()).unwrap();
//!
//! ctx.begin_frame(&InputState::default(), 1.0 / 60.0, Rect::new(0.0, 0.0, 800.0, 600.0));
//! {
//!     let mut window = ctx.window_begin("Main", Rect::new(20.0, 20.0, 300.0, 200.0));
//!     let mut row = window.box_begin(&BoxConfig::row(2).cross_size(32.0).gap(8.0));
//!     let ok = row.first();
//!     let cancel = row.next();
//!     row.button("OK", ok);
//!     row.button("Cancel", cancel);
//! }
//! ctx.end_frame();
//! assert!(ctx.renderer().texts().any(|t| t == "Cancel"));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod clip;
pub mod config;
pub mod context;
pub mod error;
pub mod focus;
pub mod id;
pub mod input;
pub mod layer;
pub mod layout;
pub mod overlay;
pub mod platform;
pub mod render;
pub mod style;
pub mod text_edit;
pub mod widget;

pub use clip::{ClipStack, Visibility};
pub use config::{ContextConfig, Limits, Timing};
pub use context::{
    Backends, BoxScope, ClipScope, Context, Interaction, LayerScope, TextMetrics, WindowScope,
};
pub use error::{ConfigError, ConfigResult, InitError, InitResult};
pub use focus::{FocusDirection, FocusManager, Focusable};
pub use id::{IdStack, LivenessTracker, WidgetId};
pub use input::{InputState, Key, Modifiers, MouseButton};
pub use layer::{BlockingRegion, InputLayerStack, Layer, LayerId, BASE_LAYER};
pub use layout::{
    distribute, snap4, BoxConfig, BoxNode, BoxStack, CrossAlign, Direction, Rect, SizeKind,
    SizeSpec,
};
pub use overlay::{CloseReason, OverlayKind, OverlayPhase, OverlayScope, OverlayState};
pub use platform::{
    AccessEvent, AccessEventKind, Accessibility, AccessibilityLog, Clipboard, MemoryClipboard,
    Role, SemanticHint, SemanticState,
};
pub use render::{
    Capabilities, CommandBuffer, MonospaceMeasure, PathSink, RectInstance, RenderCommand,
    Renderer, TextMeasure, VectorFont,
};
pub use style::{Color, Style};
pub use text_edit::{ClickKind, EditState, TextBuffer, TextEdit};
pub use widget::{ScrollScope, ScrollState, WidgetResponse};
