//! The chunk grid: the world collaborator the simulators read and write.

use crate::chunk::{Chunk, ChunkPos, Voxel};
use crate::redstone::BlockPos;
use embercraft_core::GridError;
use std::collections::HashMap;
use tracing::debug;

/// Owns the loaded chunks. Every cross-chunk access resolves through a fresh
/// lookup here; callers never retain a chunk reference across operations.
#[derive(Default)]
pub struct ChunkGrid {
    chunks: HashMap<ChunkPos, Chunk>,
}

impl ChunkGrid {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a freshly loaded chunk.
    pub fn insert_chunk(&mut self, chunk: Chunk) -> Result<(), GridError> {
        let pos = chunk.position();
        if self.chunks.contains_key(&pos) {
            return Err(GridError::ChunkAlreadyLoaded { x: pos.x, z: pos.z });
        }
        debug!(chunk = %pos, "chunk loaded");
        self.chunks.insert(pos, chunk);
        Ok(())
    }

    /// Remove a chunk that is being unloaded, returning it.
    pub fn remove_chunk(&mut self, pos: ChunkPos) -> Result<Chunk, GridError> {
        debug!(chunk = %pos, "chunk unloaded");
        self.chunks
            .remove(&pos)
            .ok_or(GridError::ChunkNotLoaded { x: pos.x, z: pos.z })
    }

    #[inline]
    pub fn is_loaded(&self, pos: ChunkPos) -> bool {
        self.chunks.contains_key(&pos)
    }

    pub fn chunk(&self, pos: ChunkPos) -> Option<&Chunk> {
        self.chunks.get(&pos)
    }

    pub fn chunk_mut(&mut self, pos: ChunkPos) -> Option<&mut Chunk> {
        self.chunks.get_mut(&pos)
    }

    /// Cross-chunk-safe block lookup. Fails softly (None) when the position
    /// is outside the world height or the owning chunk is not loaded.
    pub fn block_at(&self, pos: BlockPos) -> Option<Voxel> {
        let (chunk_pos, local) = pos.split()?;
        self.chunks.get(&chunk_pos).map(|chunk| chunk.voxel(local))
    }

    /// General block edit. Returns false when the target is unavailable.
    pub fn set_block(&mut self, pos: BlockPos, voxel: Voxel) -> bool {
        let Some((chunk_pos, local)) = pos.split() else {
            return false;
        };
        match self.chunks.get_mut(&chunk_pos) {
            Some(chunk) => {
                chunk.set_voxel(local, voxel);
                true
            }
            None => false,
        }
    }

    /// Block write that bypasses the general block-update machinery, used by
    /// the simulators for power/visual rewrites. Returns whether the stored
    /// value actually changed.
    pub fn fast_set_block(&mut self, pos: BlockPos, voxel: Voxel) -> bool {
        let Some((chunk_pos, local)) = pos.split() else {
            return false;
        };
        match self.chunks.get_mut(&chunk_pos) {
            Some(chunk) => chunk.fast_set_voxel(local, voxel),
            None => false,
        }
    }
}
