//! Source discovery: visit every position that can feed power into a
//! component and reduce to the single maximum level observed. Redstone power
//! never sums; two sources yield the stronger of the two.

use super::chunk_data::RedstoneStore;
use super::handlers::handler_for;
use super::position::{BlockPos, FACE_OFFSETS};
use crate::block_properties::is_solid_opaque;
use crate::chunk::Voxel;
use crate::grid::ChunkGrid;
use embercraft_core::PowerLevel;
use tracing::trace;

/// How much power `source_pos` hands over toward `query_pos`, as decided by
/// the source's own handler. Non-component blocks deliver nothing.
pub(crate) fn delivered_power(
    grid: &ChunkGrid,
    store: &RedstoneStore,
    source_pos: BlockPos,
    source_block: Voxel,
    query_pos: BlockPos,
    query_block: Voxel,
    is_linked: bool,
) -> PowerLevel {
    match handler_for(source_block.id) {
        Some(handler) => handler.power_delivered_to(
            grid,
            store,
            source_pos,
            source_block,
            query_pos,
            query_block,
            is_linked,
        ),
        None => 0,
    }
}

/// A read-only scan over a position's potential power sources.
pub(crate) struct SourceScan<'a> {
    grid: &'a ChunkGrid,
    store: &'a RedstoneStore,
    position: BlockPos,
    current_block: Voxel,
    power: PowerLevel,
}

impl<'a> SourceScan<'a> {
    pub fn new(
        grid: &'a ChunkGrid,
        store: &'a RedstoneStore,
        position: BlockPos,
        current_block: Voxel,
    ) -> Self {
        Self {
            grid,
            store,
            position,
            current_block,
            power: 0,
        }
    }

    pub fn grid(&self) -> &ChunkGrid {
        self.grid
    }

    pub fn store(&self) -> &RedstoneStore {
        self.store
    }

    /// The maximum power level found so far.
    pub fn power(&self) -> PowerLevel {
        self.power
    }

    /// Visit one candidate source position. Unloaded or out-of-world
    /// positions contribute nothing.
    pub fn visit(&mut self, source: BlockPos) {
        let Some(source_block) = self.grid.block_at(source) else {
            return;
        };
        let delivered = delivered_power(
            self.grid,
            self.store,
            source,
            source_block,
            self.position,
            self.current_block,
            false,
        );
        if delivered > self.power {
            trace!(
                x = source.x,
                y = source.y,
                z = source.z,
                delivered,
                "stronger source found"
            );
            self.power = delivered;
        }
    }

    /// Quasiconnectivity: accept power arriving through any adjacent opaque
    /// solid block, from sources mounted on that block rather than touching
    /// the component itself.
    pub fn check_indirect_power(&mut self) {
        for offset in FACE_OFFSETS {
            let solid_pos = self.position.offset(offset);
            let Some(solid) = self.grid.block_at(solid_pos) else {
                continue;
            };
            if is_solid_opaque(solid.id) {
                self.check_linked(solid_pos);
            }
        }
    }

    /// Accept linked power conducted through one specific solid position:
    /// every handler adjacent to the solid block is asked how much it will
    /// deliver to us via that block.
    pub fn check_linked(&mut self, solid_pos: BlockPos) {
        let Some(solid_block) = self.grid.block_at(solid_pos) else {
            return;
        };
        for offset in FACE_OFFSETS {
            let source = solid_pos.offset(offset);
            if source == self.position {
                continue;
            }
            let Some(source_block) = self.grid.block_at(source) else {
                continue;
            };
            let delivered = delivered_power(
                self.grid,
                self.store,
                source,
                source_block,
                solid_pos,
                solid_block,
                true,
            );
            if delivered > self.power {
                self.power = delivered;
            }
        }
    }
}
