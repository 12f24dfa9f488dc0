//! Static power sources: levers, buttons, and redstone blocks. They have no
//! inputs; levers toggle through the simulator's entry point, buttons
//! release through the delay ledger, and redstone blocks are always on.

use super::super::chunk_data::RedstoneStore;
use super::super::position::{BlockPos, Offset, FACE_OFFSETS};
use super::super::sources::SourceScan;
use super::super::{is_active, redstone_blocks, set_active, UpdateContext};
use super::ComponentHandler;
use crate::chunk::Voxel;
use crate::grid::ChunkGrid;
use embercraft_core::{PowerLevel, MAX_POWER};
use tracing::trace;

fn is_button(block: Voxel) -> bool {
    matches!(
        block.id,
        redstone_blocks::STONE_BUTTON | redstone_blocks::OAK_BUTTON
    )
}

pub(crate) struct SourceHandler;

impl ComponentHandler for SourceHandler {
    fn for_valid_source_positions(&self, _pos: BlockPos, _block: Voxel, _scan: &mut SourceScan<'_>) {
        // Sources have no inputs.
    }

    fn power_delivered_to(
        &self,
        _grid: &ChunkGrid,
        _store: &RedstoneStore,
        _pos: BlockPos,
        block: Voxel,
        _query_pos: BlockPos,
        _query_block: Voxel,
        is_linked: bool,
    ) -> PowerLevel {
        match block.id {
            redstone_blocks::REDSTONE_BLOCK => {
                // Constant source, but it does not conduct through solids.
                if is_linked {
                    0
                } else {
                    MAX_POWER
                }
            }
            _ => {
                if is_active(block.state) {
                    MAX_POWER
                } else {
                    0
                }
            }
        }
    }

    fn is_directly_connecting(&self, _block: Voxel, _offset: Offset) -> bool {
        true
    }

    fn update(&self, ctx: &mut UpdateContext<'_>, pos: BlockPos, block: Voxel, _power: PowerLevel) {
        // The only driven change is a pending button release.
        if !is_button(block) {
            return;
        }
        let Some(delay) = ctx.delay_info(pos) else {
            return;
        };
        if delay.ticks_left > 0 {
            return;
        }
        ctx.clear_delay(pos);

        if is_active(block.state) {
            trace!(x = pos.x, y = pos.y, z = pos.z, "button released");
            let new_state = set_active(block.state, false);
            ctx.set_block(pos, Voxel { id: block.id, state: new_state });
            for offset in FACE_OFFSETS {
                ctx.wake_powered(pos.offset(offset), pos);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::BLOCK_STONE;

    #[test]
    fn lever_power_follows_active_bit() {
        let grid = ChunkGrid::new();
        let store = RedstoneStore::default();
        let handler = SourceHandler;
        let pos = BlockPos::new(0, 5, 0);
        let query = BlockPos::new(1, 5, 0);
        let air = Voxel::default();

        let on = Voxel {
            id: redstone_blocks::LEVER,
            state: set_active(0, true),
        };
        let off = Voxel {
            id: redstone_blocks::LEVER,
            state: 0,
        };
        assert_eq!(
            handler.power_delivered_to(&grid, &store, pos, on, query, air, false),
            MAX_POWER
        );
        assert_eq!(
            handler.power_delivered_to(&grid, &store, pos, off, query, air, false),
            0
        );
    }

    #[test]
    fn redstone_block_is_always_on_but_never_linked() {
        let grid = ChunkGrid::new();
        let store = RedstoneStore::default();
        let handler = SourceHandler;
        let pos = BlockPos::new(0, 5, 0);
        let query = BlockPos::new(0, 5, 1);
        let solid = Voxel {
            id: BLOCK_STONE,
            state: 0,
        };

        let block = Voxel {
            id: redstone_blocks::REDSTONE_BLOCK,
            state: 0,
        };
        assert_eq!(
            handler.power_delivered_to(&grid, &store, pos, block, query, solid, false),
            MAX_POWER
        );
        assert_eq!(
            handler.power_delivered_to(&grid, &store, pos, block, query, solid, true),
            0
        );
    }
}
