//! Styling for the reference widgets.
//!
//! Colors and metrics only; no design-token tables live here.

use serde::{Deserialize, Serialize};

/// RGBA color.
#[repr(C)]
#[derive(
    Debug, Clone, Copy, PartialEq, Default, bytemuck::Pod, bytemuck::Zeroable, Serialize, Deserialize,
)]
pub struct Color {
    /// Red component (0-1).
    pub r: f32,
    /// Green component (0-1).
    pub g: f32,
    /// Blue component (0-1).
    pub b: f32,
    /// Alpha component (0-1).
    pub a: f32,
}

impl Color {
    /// Transparent black.
    pub const TRANSPARENT: Self = Self::rgba(0.0, 0.0, 0.0, 0.0);
    /// Solid black.
    pub const BLACK: Self = Self::rgba(0.0, 0.0, 0.0, 1.0);
    /// Solid white.
    pub const WHITE: Self = Self::rgba(1.0, 1.0, 1.0, 1.0);

    /// Creates a color from RGBA values (0-1).
    #[must_use]
    pub const fn rgba(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Creates a color from RGB values (0-1) with full alpha.
    #[must_use]
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self::rgba(r, g, b, 1.0)
    }

    /// Creates a color from hex value (0xRRGGBBAA).
    #[must_use]
    pub const fn hex(hex: u32) -> Self {
        let r = ((hex >> 24) & 0xFF) as f32 / 255.0;
        let g = ((hex >> 16) & 0xFF) as f32 / 255.0;
        let b = ((hex >> 8) & 0xFF) as f32 / 255.0;
        let a = (hex & 0xFF) as f32 / 255.0;
        Self::rgba(r, g, b, a)
    }

    /// Returns a new color with different alpha.
    #[must_use]
    pub const fn with_alpha(self, a: f32) -> Self {
        Self::rgba(self.r, self.g, self.b, a)
    }

    /// Linearly interpolates between two colors.
    #[must_use]
    pub fn lerp(self, other: Self, t: f32) -> Self {
        Self::rgba(
            self.r + (other.r - self.r) * t,
            self.g + (other.g - self.g) * t,
            self.b + (other.b - self.b) * t,
            self.a + (other.a - self.a) * t,
        )
    }
}

/// Colors and metrics shared by every reference widget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Style {
    /// Window and panel background.
    pub background: Color,
    /// Widget fill at rest.
    pub surface: Color,
    /// Widget fill under the pointer.
    pub hover: Color,
    /// Widget fill while pressed.
    pub active: Color,
    /// Outline of the focused widget.
    pub focus_ring: Color,
    /// Text color.
    pub text: Color,
    /// Check marks, slider thumbs, carets.
    pub accent: Color,
    /// Text selection highlight.
    pub selection: Color,
    /// Dimming behind modal overlays.
    pub scrim: Color,
    /// Corner radius.
    pub corner_radius: f32,
    /// Inner padding (snapped to the 4-unit grid when used).
    pub padding: f32,
    /// Font size.
    pub font_size: f32,
}

impl Default for Style {
    fn default() -> Self {
        Self {
            background: Color::hex(0x1C_1B_1F_FF),
            surface: Color::hex(0x2B_29_30_FF),
            hover: Color::hex(0x36_34_3B_FF),
            active: Color::hex(0x49_45_4F_FF),
            focus_ring: Color::hex(0xD0_BC_FF_FF),
            text: Color::hex(0xE6_E1_E5_FF),
            accent: Color::hex(0xD0_BC_FF_FF),
            selection: Color::hex(0x4F_37_8B_FF),
            scrim: Color::rgba(0.0, 0.0, 0.0, 0.5),
            corner_radius: 4.0,
            padding: 8.0,
            font_size: 16.0,
        }
    }
}
