//! Shared utilities for the warden anticheat core.
//!
//! Leaf crate with no dependency on the engine: vector/AABB math, the
//! engine-accurate trigonometry tables, and the fixed-capacity ring buffer
//! that backs click statistics and position history.

pub mod collections;
pub mod math;

/// Server tick rate in ticks per second.
pub const TICKS_PER_SECOND: u32 = 20;

/// A block position in world coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BlockPos {
    /// Block X coordinate.
    pub x: i32,
    /// Block Y coordinate.
    pub y: i32,
    /// Block Z coordinate.
    pub z: i32,
}

impl BlockPos {
    /// Creates a new block position.
    #[must_use]
    pub const fn new(x: i32, y: i32, z: i32) -> Self {
        Self { x, y, z }
    }

    /// The block position containing the given world-space point.
    #[must_use]
    pub fn containing(x: f64, y: f64, z: f64) -> Self {
        Self {
            x: x.floor() as i32,
            y: y.floor() as i32,
            z: z.floor() as i32,
        }
    }
}
