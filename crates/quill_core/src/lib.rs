//! # Quill Core
//!
//! Allocation-free containers backing the quill immediate-mode UI engine:
//! - One memory block handed over by the host at startup
//! - Fixed-capacity stacks that report overflow instead of growing
//! - Per-identity state that expires when its widget stops being declared
//! - Front/back buffers that publish writes one frame late
//!
//! ## Architecture Rules
//!
//! 1. **No heap allocations after init** - every table is carved from the [`Arena`]
//! 2. **Overflow is a value, not a panic** - pushes return `false`, lookups `None`
//! 3. **Single writer per frame** - nothing here is shared across threads
//!
//! ## Example
//!
//! ```rust
//! use quill_core::{AlignedBlock, FixedStack};
//!
//! let mut block = AlignedBlock::new(4096);
//! let mut arena = block.arena();
//! let mut stack: FixedStack<u32> = FixedStack::from_arena(&mut arena, 4).unwrap();
//! assert!(stack.push(7));
//! assert_eq!(stack.top(), Some(&7));
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![deny(clippy::perf)]

pub mod memory;
pub mod sync;

pub use memory::{AlignedBlock, Arena, FixedStack, StateRegistry, BLOCK_ALIGN};
pub use sync::DoubleBuffer;
