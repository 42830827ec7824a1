//! Reference widgets.
//!
//! Each widget is a method on [`crate::Context`] taking its label, its rect
//! and any caller-owned state. Nothing is retained between calls except what
//! the caller passes back in next frame.

mod basic;
mod core;
mod scroll;
mod text_field;
mod tooltip;

pub use core::WidgetResponse;
pub use scroll::{ScrollScope, ScrollState, SCROLLBAR_WIDTH};
pub use tooltip::{tooltip_rect, HoverTimer, CURSOR_OFFSET};
