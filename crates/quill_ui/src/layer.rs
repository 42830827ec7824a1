//! Input layers and blocking regions.
//!
//! Overlays push a layer while they declare their widgets and register the
//! rects that should shield everything beneath them. Registrations go to the
//! back buffer and are only read after the end-of-frame swap, so an overlay
//! never blocks its own widgets on the frame that opens it, and always
//! blocks the background from the next frame on.
//!
//! A layer's id is the identity of whatever pushed it, so a region published
//! last frame is matched to the same overlay this frame even when other
//! overlays appear or disappear in between.

use quill_core::{Arena, DoubleBuffer, FixedStack};

use crate::id::WidgetId;
use crate::layout::Rect;

/// Layer identifier. 0 is the base layer.
pub type LayerId = u32;

/// The layer in effect when no overlay is open.
pub const BASE_LAYER: LayerId = 0;

/// An open layer.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Layer {
    /// Identifier, stable across frames for the same owner.
    pub id: LayerId,
    /// Stacking order. Higher sits on top.
    pub z_order: i32,
}

/// A rect shielding lower layers from input.
#[repr(C)]
#[derive(Debug, Clone, Copy, Default, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct BlockingRegion {
    /// Shielded area.
    pub rect: Rect,
    /// Owning layer.
    pub layer: LayerId,
    /// Owning layer's stacking order.
    pub z_order: i32,
}

/// Stack of open layers plus double-buffered blocking regions.
#[derive(Debug)]
pub struct InputLayerStack<'a> {
    /// Layers open right now, innermost last.
    open: FixedStack<'a, Layer>,
    /// Back: registered this frame. Front: last frame's, in effect now.
    regions: DoubleBuffer<FixedStack<'a, BlockingRegion>>,
    /// Layers pushed so far this frame.
    pushed: u32,
    /// Upper bound on `pushed`.
    max_layers: u32,
}

impl<'a> InputLayerStack<'a> {
    /// Creates a layer stack carved from `arena`.
    #[must_use]
    pub fn from_arena(
        arena: &mut Arena<'a>,
        max_layers: usize,
        max_regions: usize,
    ) -> Option<Self> {
        Some(Self {
            open: FixedStack::from_arena(arena, max_layers)?,
            regions: DoubleBuffer::new(
                FixedStack::from_arena(arena, max_regions)?,
                FixedStack::from_arena(arena, max_regions)?,
            ),
            pushed: 0,
            max_layers: u32::try_from(max_layers).unwrap_or(u32::MAX),
        })
    }

    /// Arena bytes [`InputLayerStack::from_arena`] reserves, starting at `offset`.
    #[must_use]
    pub const fn arena_end(offset: usize, max_layers: usize, max_regions: usize) -> usize {
        let offset = FixedStack::<Layer>::arena_end(offset, max_layers);
        let offset = FixedStack::<BlockingRegion>::arena_end(offset, max_regions);
        FixedStack::<BlockingRegion>::arena_end(offset, max_regions)
    }

    /// Opens a layer owned by `owner` and makes it active.
    ///
    /// Returns its id, the owner's raw identity, or 0 when the owner is
    /// [`WidgetId::NONE`] or the per-frame layer limit is reached.
    pub fn push(&mut self, z_order: i32, owner: WidgetId) -> LayerId {
        if owner.is_none() {
            tracing::warn!(z_order, "input layer pushed without an owner");
            return BASE_LAYER;
        }
        if self.pushed >= self.max_layers || self.open.is_full() {
            tracing::warn!(max_layers = self.max_layers, z_order, "input layer overflow");
            return BASE_LAYER;
        }
        self.pushed += 1;
        let layer = Layer {
            id: owner.raw(),
            z_order,
        };
        self.open.push(layer);
        layer.id
    }

    /// Closes the active layer, restoring the one below.
    pub fn pop(&mut self) -> bool {
        let popped = self.open.pop().is_some();
        if !popped {
            tracing::warn!("pop_layer with no open layer");
        }
        popped
    }

    /// The active layer, or the base layer when none is open.
    #[must_use]
    pub fn active(&self) -> Layer {
        self.open.top().copied().unwrap_or_default()
    }

    /// Number of open layers.
    #[must_use]
    pub fn depth(&self) -> usize {
        self.open.len()
    }

    /// Registers `rect` as blocking for the active layer, from next frame.
    ///
    /// Returns `false` when the region table is full.
    pub fn register_blocking_region(&mut self, rect: Rect) -> bool {
        let active = self.active();
        let back = self.regions.back_mut();
        let registered = back.push(BlockingRegion {
            rect,
            layer: active.id,
            z_order: active.z_order,
        });
        if !registered {
            tracing::warn!(max_regions = back.capacity(), "blocking region table full");
        }
        registered
    }

    /// Returns true unless a region in effect covers `bounds` from a layer
    /// above the active one. A region belongs to the active layer only when
    /// both its id and its stacking order match.
    #[must_use]
    pub fn should_process_input(&self, bounds: &Rect) -> bool {
        let active = self.active();
        !self.regions.front().iter().any(|region| {
            let own = region.layer == active.id && region.z_order == active.z_order;
            !own && region.z_order > active.z_order && region.rect.intersects(bounds)
        })
    }

    /// Regions in effect this frame.
    #[must_use]
    pub fn active_regions(&self) -> &[BlockingRegion] {
        self.regions.front().as_slice()
    }

    /// Regions registered so far this frame.
    #[must_use]
    pub fn pending_regions(&self) -> &[BlockingRegion] {
        self.regions.back().as_slice()
    }

    /// Publishes this frame's regions and resets per-frame layer numbering.
    pub fn end_frame(&mut self) {
        if !self.open.is_empty() {
            tracing::warn!(open = self.open.len(), "layers left open at end of frame");
            self.open.clear();
        }
        self.regions.swap_and_reset(FixedStack::clear);
        self.pushed = 0;
    }
}
