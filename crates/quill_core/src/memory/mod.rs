//! # Memory Management
//!
//! Pre-allocated tables for zero-allocation frames.
//!
//! ## Design Philosophy
//!
//! All memory is carved once from the host's block, when the UI context is
//! created. During frames:
//! - No heap allocations
//! - No table growth
//! - Overflow drops the newest item and reports it

mod arena;
mod fixed;
mod registry;

pub use arena::{AlignedBlock, Arena, BLOCK_ALIGN};
pub use fixed::FixedStack;
pub use registry::StateRegistry;
