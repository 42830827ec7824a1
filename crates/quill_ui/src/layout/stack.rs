//! Open-container stack.

use quill_core::{Arena, FixedStack};

use super::solver::distribute_by;
use super::{snap4, CrossAlign, Direction, Rect, SizeSpec};

/// Caller configuration for one box.
#[derive(Debug, Clone, Copy, Default)]
pub struct BoxConfig<'a> {
    /// Main axis.
    pub direction: Direction,
    /// Number of children the box will hand out rects for.
    pub child_count: usize,
    /// Per-child size specs. `None`, or a short slice, means GROW weight 1
    /// for the missing entries.
    pub sizes: Option<&'a [SizeSpec]>,
    /// Container cross extent. 0 takes the parent's cross extent.
    pub cross_size: f32,
    /// Gap between children (snapped to 4).
    pub gap: f32,
    /// Padding on every side (snapped to 4).
    pub padding: f32,
    /// Cross-axis alignment of children.
    pub align: CrossAlign,
    /// Child cross extent for START/CENTER/END. 0 uses the full cross extent.
    pub item_cross: f32,
}

impl<'a> BoxConfig<'a> {
    /// A horizontal box with `child_count` children.
    #[must_use]
    pub fn row(child_count: usize) -> Self {
        Self {
            direction: Direction::Row,
            child_count,
            ..Default::default()
        }
    }

    /// A vertical box with `child_count` children.
    #[must_use]
    pub fn column(child_count: usize) -> Self {
        Self {
            direction: Direction::Column,
            child_count,
            ..Default::default()
        }
    }

    /// Sets per-child size specs.
    #[must_use]
    pub const fn sizes(mut self, sizes: &'a [SizeSpec]) -> Self {
        self.sizes = Some(sizes);
        self
    }

    /// Sets the gap between children.
    #[must_use]
    pub const fn gap(mut self, gap: f32) -> Self {
        self.gap = gap;
        self
    }

    /// Sets padding around content.
    #[must_use]
    pub const fn padding(mut self, padding: f32) -> Self {
        self.padding = padding;
        self
    }

    /// Sets the container cross extent.
    #[must_use]
    pub const fn cross_size(mut self, cross_size: f32) -> Self {
        self.cross_size = cross_size;
        self
    }

    /// Sets cross-axis alignment and the child cross extent it uses.
    #[must_use]
    pub const fn align(mut self, align: CrossAlign, item_cross: f32) -> Self {
        self.align = align;
        self.item_cross = item_cross;
        self
    }

    /// Resolves the container rect inside `parent`.
    #[must_use]
    pub fn container_in(&self, parent: Rect) -> Rect {
        match self.direction {
            Direction::Row => {
                let height = if self.cross_size > 0.0 { self.cross_size } else { parent.height };
                Rect::new(parent.x, parent.y, parent.width, height)
            }
            Direction::Column => {
                let width = if self.cross_size > 0.0 { self.cross_size } else { parent.width };
                Rect::new(parent.x, parent.y, width, parent.height)
            }
        }
    }
}

/// One open container. Lives only between begin and end.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BoxNode {
    /// Container rect.
    pub rect: Rect,
    /// Number of children.
    pub child_count: usize,
    /// Index of the child whose rect is current.
    pub child_index: usize,
    /// First slot of this node's sizes in the shared size pool.
    sizes_start: usize,
    /// Main-axis position of the current child.
    cursor: f32,
    /// Snapped gap.
    gap: f32,
    /// Cross-axis start after padding.
    cross_start: f32,
    /// Cross-axis extent after padding.
    cross_extent: f32,
    /// Child cross extent for non-stretch alignment.
    item_cross: f32,
    /// Main axis code.
    direction: u8,
    /// Cross alignment code.
    align: u8,
    _padding: [u8; 2],
}

impl BoxNode {
    /// Main axis.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        match self.direction {
            1 => Direction::Column,
            _ => Direction::Row,
        }
    }

    /// Cross alignment of children.
    #[must_use]
    pub const fn align(&self) -> CrossAlign {
        match self.align {
            0 => CrossAlign::Start,
            1 => CrossAlign::Center,
            2 => CrossAlign::End,
            _ => CrossAlign::Stretch,
        }
    }
}

const fn direction_code(direction: Direction) -> u8 {
    match direction {
        Direction::Row => 0,
        Direction::Column => 1,
    }
}

const fn align_code(align: CrossAlign) -> u8 {
    match align {
        CrossAlign::Start => 0,
        CrossAlign::Center => 1,
        CrossAlign::End => 2,
        CrossAlign::Stretch => 3,
    }
}

/// Stack of open boxes with a bounded depth and child count.
///
/// Per-child extents are stored in one shared pool sized
/// `max_depth * max_children`, so opening a box never allocates.
#[derive(Debug)]
pub struct BoxStack<'a> {
    /// Open boxes, outermost first.
    nodes: FixedStack<'a, BoxNode>,
    /// Solved child extents of every open box.
    sizes: FixedStack<'a, f32>,
    /// Upper bound on `child_count`.
    max_children: usize,
}

impl<'a> BoxStack<'a> {
    /// Creates a box stack carved from `arena`.
    #[must_use]
    pub fn from_arena(
        arena: &mut Arena<'a>,
        max_depth: usize,
        max_children: usize,
    ) -> Option<Self> {
        Some(Self {
            nodes: FixedStack::from_arena(arena, max_depth)?,
            sizes: FixedStack::from_arena(arena, max_depth.saturating_mul(max_children))?,
            max_children,
        })
    }

    /// Arena bytes [`BoxStack::from_arena`] reserves, starting at `offset`.
    #[must_use]
    pub const fn arena_end(offset: usize, max_depth: usize, max_children: usize) -> usize {
        let offset = FixedStack::<BoxNode>::arena_end(offset, max_depth);
        FixedStack::<f32>::arena_end(offset, max_depth.saturating_mul(max_children))
    }

    /// Number of open boxes.
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.nodes.len()
    }

    /// Maximum number of open boxes.
    #[inline]
    #[must_use]
    pub fn max_depth(&self) -> usize {
        self.nodes.capacity()
    }

    /// The innermost open box.
    #[must_use]
    pub fn top(&self) -> Option<&BoxNode> {
        self.nodes.top()
    }

    /// Opens a box filling `container` and returns its first child rect.
    ///
    /// Returns `None` without changing anything when the depth limit is
    /// reached or `child_count` exceeds the per-box child limit.
    pub fn begin(&mut self, container: Rect, config: &BoxConfig<'_>) -> Option<Rect> {
        if self.nodes.is_full() {
            tracing::warn!(max_depth = self.nodes.capacity(), "box depth limit reached");
            return None;
        }
        if config.child_count > self.max_children {
            tracing::warn!(
                child_count = config.child_count,
                max_children = self.max_children,
                "box child limit exceeded"
            );
            return None;
        }

        let gap = snap4(config.gap);
        let padding = snap4(config.padding);
        let (main_start, main_extent, cross_start, cross_extent) = match config.direction {
            Direction::Row => (container.x, container.width, container.y, container.height),
            Direction::Column => (container.y, container.height, container.x, container.width),
        };

        let sizes_start = self.sizes.len();
        for _ in 0..config.child_count {
            // Pool capacity is max_depth * max_children; both are checked above.
            self.sizes.push(0.0);
        }
        let out = &mut self.sizes.as_mut_slice()[sizes_start..];
        distribute_by(
            main_extent,
            config.child_count,
            |i| config.sizes.and_then(|sizes| sizes.get(i).copied()).unwrap_or_default(),
            gap,
            padding,
            out,
        );

        let node = BoxNode {
            rect: container,
            child_count: config.child_count,
            child_index: 0,
            sizes_start,
            cursor: main_start + padding,
            gap,
            cross_start: cross_start + padding,
            cross_extent: (cross_extent - padding * 2.0).max(0.0),
            item_cross: config.item_cross,
            direction: direction_code(config.direction),
            align: align_code(config.align),
            _padding: [0; 2],
        };
        self.nodes.push(node);
        Some(self.current_rect())
    }

    /// Rect of the current child of the innermost box, or a zero rect when no
    /// box is open or every child has been handed out.
    #[must_use]
    pub fn current_rect(&self) -> Rect {
        let Some(node) = self.nodes.top() else {
            return Rect::ZERO;
        };
        if node.child_index >= node.child_count {
            return Rect::ZERO;
        }
        let main = self
            .sizes
            .get(node.sizes_start + node.child_index)
            .copied()
            .unwrap_or(0.0);

        let (cross_pos, cross) = match node.align() {
            CrossAlign::Stretch => (node.cross_start, node.cross_extent),
            align => {
                let item = if node.item_cross > 0.0 {
                    node.item_cross.min(node.cross_extent)
                } else {
                    node.cross_extent
                };
                let offset = match align {
                    CrossAlign::Center => (node.cross_extent - item) * 0.5,
                    CrossAlign::End => node.cross_extent - item,
                    _ => 0.0,
                };
                (node.cross_start + offset, item)
            }
        };

        match node.direction() {
            Direction::Row => Rect::new(node.cursor, cross_pos, main, cross),
            Direction::Column => Rect::new(cross_pos, node.cursor, cross, main),
        }
    }

    /// Advances the innermost box to its next child and returns that rect.
    ///
    /// Past the last child this returns a zero rect.
    pub fn next(&mut self) -> Rect {
        let Some(node) = self.nodes.top() else {
            tracing::warn!("box_next with no open box");
            return Rect::ZERO;
        };
        let (start, index, count, gap) =
            (node.sizes_start, node.child_index, node.child_count, node.gap);
        if index + 1 >= count {
            if let Some(node) = self.nodes.top_mut() {
                node.child_index = count;
            }
            tracing::warn!(child_count = count, "box_next past last child");
            return Rect::ZERO;
        }

        let advance = self.sizes.get(start + index).copied().unwrap_or(0.0) + gap;
        if let Some(node) = self.nodes.top_mut() {
            node.cursor += advance;
            node.child_index += 1;
        }
        self.current_rect()
    }

    /// Closes the innermost box and returns it.
    pub fn end(&mut self) -> Option<BoxNode> {
        let node = self.nodes.pop()?;
        self.sizes.truncate(node.sizes_start);
        Some(node)
    }

    /// Closes every open box.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.sizes.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quill_core::AlignedBlock;

    fn box_stack(block: &mut AlignedBlock, max_depth: usize, max_children: usize) -> BoxStack<'_> {
        BoxStack::from_arena(&mut block.arena(), max_depth, max_children).unwrap()
    }

    #[test]
    fn test_two_children_fixed_and_grow() {
        let mut block = AlignedBlock::new(1024);
        let mut boxes = box_stack(&mut block, 4, 8);
        let specs = [SizeSpec::fixed(200.0), SizeSpec::grow(1.0)];
        let config = BoxConfig::row(2).sizes(&specs).gap(8.0);

        let first = boxes.begin(Rect::new(0.0, 0.0, 500.0, 40.0), &config).unwrap();
        assert_eq!(first, Rect::new(0.0, 0.0, 200.0, 40.0));

        let second = boxes.next();
        assert_eq!(second, Rect::new(208.0, 0.0, 292.0, 40.0));
        assert!(boxes.end().is_some());
        assert_eq!(boxes.depth(), 0);
    }

    #[test]
    fn test_default_sizes_are_equal_grow() {
        let mut block = AlignedBlock::new(1024);
        let mut boxes = box_stack(&mut block, 4, 8);
        let config = BoxConfig::column(4).padding(8.0);
        let first = boxes.begin(Rect::new(0.0, 0.0, 100.0, 416.0), &config).unwrap();
        assert_eq!(first, Rect::new(8.0, 8.0, 84.0, 100.0));
        let second = boxes.next();
        assert_eq!(second.y, 108.0);
    }

    #[test]
    fn test_short_size_slice_pads_with_grow() {
        let mut block = AlignedBlock::new(1024);
        let mut boxes = box_stack(&mut block, 4, 8);
        let specs = [SizeSpec::fixed(100.0)];
        let config = BoxConfig::row(3).sizes(&specs);
        let first = boxes.begin(Rect::new(0.0, 0.0, 300.0, 10.0), &config).unwrap();
        assert_eq!(first.width, 100.0);
        assert_eq!(boxes.next().width, 100.0);
        assert_eq!(boxes.next().width, 100.0);
    }

    #[test]
    fn test_depth_limit_is_noop() {
        let mut block = AlignedBlock::new(1024);
        let mut boxes = box_stack(&mut block, 1, 4);
        let config = BoxConfig::row(1);
        assert!(boxes.begin(Rect::new(0.0, 0.0, 10.0, 10.0), &config).is_some());
        assert!(boxes.begin(Rect::new(0.0, 0.0, 10.0, 10.0), &config).is_none());
        assert_eq!(boxes.depth(), 1);
    }

    #[test]
    fn test_child_limit_is_noop() {
        let mut block = AlignedBlock::new(1024);
        let mut boxes = box_stack(&mut block, 2, 2);
        assert!(boxes.begin(Rect::new(0.0, 0.0, 10.0, 10.0), &BoxConfig::row(3)).is_none());
        assert_eq!(boxes.depth(), 0);
    }

    #[test]
    fn test_next_past_last_child_is_zero() {
        let mut block = AlignedBlock::new(1024);
        let mut boxes = box_stack(&mut block, 2, 2);
        boxes.begin(Rect::new(0.0, 0.0, 10.0, 10.0), &BoxConfig::row(1));
        assert_eq!(boxes.next(), Rect::ZERO);
        assert_eq!(boxes.current_rect(), Rect::ZERO);
    }

    #[test]
    fn test_cross_alignment() {
        let mut block = AlignedBlock::new(1024);
        let mut boxes = box_stack(&mut block, 2, 2);
        let config = BoxConfig::row(1).align(CrossAlign::Center, 20.0);
        let rect = boxes.begin(Rect::new(0.0, 0.0, 100.0, 60.0), &config).unwrap();
        assert_eq!(rect, Rect::new(0.0, 20.0, 100.0, 20.0));

        boxes.end();
        let config = BoxConfig::column(1).align(CrossAlign::End, 30.0);
        let rect = boxes.begin(Rect::new(0.0, 0.0, 100.0, 60.0), &config).unwrap();
        assert_eq!(rect, Rect::new(70.0, 0.0, 30.0, 60.0));
    }

    #[test]
    fn test_nested_pool_is_released() {
        let mut block = AlignedBlock::new(1024);
        let mut boxes = box_stack(&mut block, 2, 4);
        boxes.begin(Rect::new(0.0, 0.0, 100.0, 100.0), &BoxConfig::row(4));
        let inner = boxes.current_rect();
        boxes.begin(inner, &BoxConfig::column(4));
        boxes.end();
        // The outer box still hands out its own sizes.
        assert_eq!(boxes.next().x, 25.0);
    }

    #[test]
    fn test_node_keeps_direction_and_alignment() {
        let mut block = AlignedBlock::new(1024);
        let mut boxes = box_stack(&mut block, 2, 2);
        let config = BoxConfig::column(1).align(CrossAlign::End, 10.0);
        boxes.begin(Rect::new(0.0, 0.0, 40.0, 40.0), &config);
        let node = boxes.end().unwrap();
        assert_eq!(node.direction(), Direction::Column);
        assert_eq!(node.align(), CrossAlign::End);
    }
}
