//! In-memory world used by unit tests: an infinite flat floor plus
//! explicitly placed blocks.

use rustc_hash::FxHashMap;
use warden_utils::BlockPos;
use warden_utils::math::{Aabb, Vector3};

use crate::interface::{BlockInfo, WorldQuery};

/// Flat test world. Every block at or below `ground_y` is solid; anything
/// else comes from the override map.
pub struct FlatWorld {
    ground_y: i32,
    blocks: FxHashMap<BlockPos, BlockInfo>,
    custom_boxes: FxHashMap<BlockPos, Vec<Aabb>>,
    unloaded_chunks: Vec<(i32, i32)>,
}

impl FlatWorld {
    /// Flat world with the top solid layer at `ground_y`.
    pub fn new(ground_y: i32) -> Self {
        Self {
            ground_y,
            blocks: FxHashMap::default(),
            custom_boxes: FxHashMap::default(),
            unloaded_chunks: Vec::new(),
        }
    }

    /// Places a block override.
    pub fn set_block(&mut self, x: i32, y: i32, z: i32, info: BlockInfo) {
        self.blocks.insert(BlockPos::new(x, y, z), info);
    }

    /// Places a bottom half-slab (collision height 0.5).
    pub fn set_slab(&mut self, x: i32, y: i32, z: i32) {
        let pos = BlockPos::new(x, y, z);
        self.blocks.insert(pos, BlockInfo::SOLID);
        self.custom_boxes.insert(
            pos,
            vec![Aabb::new(
                Vector3::new(f64::from(x), f64::from(y), f64::from(z)),
                Vector3::new(f64::from(x) + 1.0, f64::from(y) + 0.5, f64::from(z) + 1.0),
            )],
        );
    }

    /// Fills a vertical column of blocks, inclusive.
    pub fn set_column(&mut self, x: i32, y0: i32, y1: i32, z: i32, info: BlockInfo) {
        for y in y0..=y1 {
            self.set_block(x, y, z, info);
        }
    }

    /// Marks a chunk as unloaded.
    pub fn unload_chunk(&mut self, chunk_x: i32, chunk_z: i32) {
        self.unloaded_chunks.push((chunk_x, chunk_z));
    }
}

impl WorldQuery for FlatWorld {
    fn is_chunk_loaded(&self, x: i32, z: i32) -> bool {
        !self.unloaded_chunks.contains(&(x >> 4, z >> 4))
    }

    fn block_at(&self, pos: BlockPos) -> BlockInfo {
        if let Some(info) = self.blocks.get(&pos) {
            return *info;
        }
        if pos.y <= self.ground_y {
            BlockInfo::SOLID
        } else {
            BlockInfo::AIR
        }
    }

    fn collision_boxes(&self, pos: BlockPos) -> Vec<Aabb> {
        if let Some(boxes) = self.custom_boxes.get(&pos) {
            return boxes.clone();
        }
        if self.block_at(pos).solid {
            vec![Aabb::unit_block(pos.x, pos.y, pos.z)]
        } else {
            Vec::new()
        }
    }
}
