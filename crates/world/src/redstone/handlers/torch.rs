//! Redstone torch: a source that inverts its support block. It emits full
//! power in every direction except into its support, strongly powers the
//! block directly above it, and flips with a 1-tick delay.

use super::super::chunk_data::RedstoneStore;
use super::super::position::{BlockPos, Offset, FACE_OFFSETS, OFFSET_DOWN};
use super::super::sources::SourceScan;
use super::super::{is_active, set_active, UpdateContext};
use super::ComponentHandler;
use crate::block_properties::is_solid_opaque;
use crate::chunk::Voxel;
use crate::grid::ChunkGrid;
use embercraft_core::{PowerLevel, MAX_POWER};
use tracing::trace;

pub(crate) struct TorchHandler;

impl ComponentHandler for TorchHandler {
    fn for_valid_source_positions(&self, pos: BlockPos, _block: Voxel, scan: &mut SourceScan<'_>) {
        // The only input is the support block below: the torch is lit
        // exactly while that block carries no power into it.
        let support = pos.offset(OFFSET_DOWN);
        if scan
            .grid()
            .block_at(support)
            .is_some_and(|v| is_solid_opaque(v.id))
        {
            scan.check_linked(support);
        }
    }

    fn power_delivered_to(
        &self,
        _grid: &ChunkGrid,
        _store: &RedstoneStore,
        pos: BlockPos,
        block: Voxel,
        query_pos: BlockPos,
        _query_block: Voxel,
        is_linked: bool,
    ) -> PowerLevel {
        if !is_active(block.state) {
            return 0;
        }
        if is_linked {
            // Only the block directly above is strongly powered.
            return if query_pos == pos.up() { MAX_POWER } else { 0 };
        }
        if pos.direction_to(query_pos) == OFFSET_DOWN {
            // Never back into the support.
            return 0;
        }
        MAX_POWER
    }

    fn is_directly_connecting(&self, _block: Voxel, _offset: Offset) -> bool {
        true
    }

    fn update(&self, ctx: &mut UpdateContext<'_>, pos: BlockPos, block: Voxel, power: PowerLevel) {
        // Torch is ON when NOT powered from the supporting block (inversion).
        let should_be_on = power == 0;

        let Some(delay) = ctx.delay_info(pos) else {
            if should_be_on != is_active(block.state) {
                trace!(x = pos.x, y = pos.y, z = pos.z, should_be_on, "torch flip scheduled");
                ctx.schedule_delay(pos, 1, should_be_on);
            }
            return;
        };

        if delay.ticks_left > 0 {
            return;
        }
        ctx.clear_delay(pos);

        if delay.power_on != is_active(block.state) {
            let new_state = set_active(block.state, delay.power_on);
            ctx.set_block(pos, Voxel { id: block.id, state: new_state });

            for offset in FACE_OFFSETS {
                ctx.wake(pos.offset(offset));
            }
            // The block above is strongly powered; dependents behind it care.
            ctx.wake_powered(pos.up(), pos);
        }

        if should_be_on != delay.power_on {
            ctx.schedule_delay(pos, 1, should_be_on);
        }
    }
}
