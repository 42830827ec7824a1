//! # Frame Synchronization
//!
//! Front/back buffering of per-frame tables. Writes made during frame N only
//! become visible to readers in frame N+1.

mod double_buffer;

pub use double_buffer::DoubleBuffer;
