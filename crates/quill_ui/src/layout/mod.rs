//! Layout system: rectangles, size specs, and the single-pass box solver.
//!
//! A box distributes its main axis among a fixed number of children. Sizes are
//! solved once, when the box opens; children then consume their rects in
//! order. Gap and padding are snapped to a 4-unit grid so every generated edge
//! lands on the same spacing grid.

mod solver;
mod stack;

pub use solver::distribute;
pub use stack::{BoxConfig, BoxNode, BoxStack};

/// A rectangle in screen coordinates.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Rect {
    /// X position (left edge).
    pub x: f32,
    /// Y position (top edge).
    pub y: f32,
    /// Width.
    pub width: f32,
    /// Height.
    pub height: f32,
}

impl Rect {
    /// A zero-sized rect at the origin.
    pub const ZERO: Self = Self {
        x: 0.0,
        y: 0.0,
        width: 0.0,
        height: 0.0,
    };

    /// Creates a new rectangle.
    #[must_use]
    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    /// Returns the right edge.
    #[must_use]
    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    /// Returns the bottom edge.
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }

    /// Returns the center point.
    #[must_use]
    pub fn center(&self) -> (f32, f32) {
        (self.x + self.width * 0.5, self.y + self.height * 0.5)
    }

    /// Returns true if the rect has no area.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Returns true if the point is inside the rectangle.
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.x && x < self.right() && y >= self.y && y < self.bottom()
    }

    /// Returns true if two rectangles share a non-empty area.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        self.x < other.right()
            && self.right() > other.x
            && self.y < other.bottom()
            && self.bottom() > other.y
    }

    /// Returns the intersection of two rectangles, or None if they don't intersect.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        if !self.intersects(other) {
            return None;
        }

        let x = self.x.max(other.x);
        let y = self.y.max(other.y);
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        Some(Self::new(x, y, right - x, bottom - y))
    }

    /// Returns the intersection, or an empty rect pinned inside `self` when
    /// the two do not overlap.
    #[must_use]
    pub fn clip_to(&self, other: &Self) -> Self {
        self.intersection(other).unwrap_or_else(|| {
            let x = other.x.clamp(self.x, self.right());
            let y = other.y.clamp(self.y, self.bottom());
            Self::new(x, y, 0.0, 0.0)
        })
    }

    /// Expands the rectangle by the given amount on all sides.
    #[must_use]
    pub fn expand(&self, amount: f32) -> Self {
        Self::new(
            self.x - amount,
            self.y - amount,
            self.width + amount * 2.0,
            self.height + amount * 2.0,
        )
    }

    /// Shrinks the rectangle by the given amount on all sides, never below
    /// zero size.
    #[must_use]
    pub fn shrink(&self, amount: f32) -> Self {
        let width = (self.width - amount * 2.0).max(0.0);
        let height = (self.height - amount * 2.0).max(0.0);
        Self::new(self.x + amount, self.y + amount, width, height)
    }
}

/// Layout direction (main axis).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Direction {
    /// Horizontal (left to right).
    #[default]
    Row,
    /// Vertical (top to bottom).
    Column,
}

/// Cross-axis alignment of children.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrossAlign {
    /// Align to start (left/top).
    Start,
    /// Align to center.
    Center,
    /// Align to end (right/bottom).
    End,
    /// Fill the parent's cross extent.
    #[default]
    Stretch,
}

/// How a child claims main-axis extent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SizeKind {
    /// Share of the extent left after FIXED and PERCENT children, by weight.
    #[default]
    Grow,
    /// Exact extent.
    Fixed,
    /// Fraction (0-1) of the container's full main extent.
    Percent,
}

/// Size spec for one child along the main axis.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SizeSpec {
    /// Sizing rule.
    pub kind: SizeKind,
    /// Weight (GROW), extent (FIXED) or fraction (PERCENT).
    pub value: f32,
    /// Lower clamp.
    pub min: f32,
    /// Upper clamp.
    pub max: f32,
}

impl Default for SizeSpec {
    fn default() -> Self {
        Self::grow(1.0)
    }
}

impl SizeSpec {
    /// A growing child with the given weight.
    #[must_use]
    pub const fn grow(weight: f32) -> Self {
        Self {
            kind: SizeKind::Grow,
            value: weight,
            min: 0.0,
            max: f32::INFINITY,
        }
    }

    /// A fixed-size child.
    #[must_use]
    pub const fn fixed(extent: f32) -> Self {
        Self {
            kind: SizeKind::Fixed,
            value: extent,
            min: 0.0,
            max: f32::INFINITY,
        }
    }

    /// A child sized as a fraction of the container.
    #[must_use]
    pub const fn percent(fraction: f32) -> Self {
        Self {
            kind: SizeKind::Percent,
            value: fraction,
            min: 0.0,
            max: f32::INFINITY,
        }
    }

    /// Sets the lower clamp.
    #[must_use]
    pub const fn with_min(mut self, min: f32) -> Self {
        self.min = min;
        self
    }

    /// Sets the upper clamp.
    #[must_use]
    pub const fn with_max(mut self, max: f32) -> Self {
        self.max = max;
        self
    }

    /// Clamps `extent` to this spec's bounds. `min` wins over `max`.
    #[must_use]
    pub fn clamp(&self, extent: f32) -> f32 {
        extent.min(self.max).max(self.min)
    }
}

/// Snaps a spacing value to the nearest multiple of 4. Negative values snap to 0.
#[must_use]
pub fn snap4(value: f32) -> f32 {
    ((value / 4.0).round() * 4.0).max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_contains() {
        let rect = Rect::new(10.0, 20.0, 100.0, 50.0);

        assert!(rect.contains(50.0, 30.0));
        assert!(!rect.contains(5.0, 30.0));
        assert!(!rect.contains(50.0, 80.0));
    }

    #[test]
    fn test_rect_intersection() {
        let a = Rect::new(0.0, 0.0, 100.0, 100.0);
        let b = Rect::new(50.0, 50.0, 100.0, 100.0);
        assert_eq!(a.intersection(&b), Some(Rect::new(50.0, 50.0, 50.0, 50.0)));

        let far = Rect::new(200.0, 200.0, 10.0, 10.0);
        assert_eq!(a.intersection(&far), None);
        assert!(a.clip_to(&far).is_empty());
    }

    #[test]
    fn test_snap4() {
        assert_eq!(snap4(8.0), 8.0);
        assert_eq!(snap4(5.0), 4.0);
        assert_eq!(snap4(6.0), 8.0);
        assert_eq!(snap4(1.0), 0.0);
        assert_eq!(snap4(-12.0), 0.0);
    }

    #[test]
    fn test_size_spec_clamp() {
        let spec = SizeSpec::grow(1.0).with_min(50.0).with_max(100.0);
        assert_eq!(spec.clamp(10.0), 50.0);
        assert_eq!(spec.clamp(500.0), 100.0);
        assert_eq!(spec.clamp(75.0), 75.0);
    }
}
