//! Redstone repeater: accepts power only through its rear face, emits full
//! power only out its front face, and flips its output after a configurable
//! 1-4 tick delay held in the per-chunk delay ledger.

use super::super::chunk_data::RedstoneStore;
use super::super::position::{BlockPos, Offset};
use super::super::sources::SourceScan;
use super::super::{is_active, set_active, UpdateContext};
use super::ComponentHandler;
use crate::block_properties::is_solid_opaque;
use crate::chunk::{BlockState, Voxel};
use crate::facing::Facing;
use crate::grid::ChunkGrid;
use embercraft_core::{PowerLevel, MAX_POWER};
use tracing::trace;

const DELAY_SHIFT: u32 = 2;
const DELAY_MASK: BlockState = 0x03u16 << DELAY_SHIFT;

/// Get the repeater delay in ticks (1-4) from block state.
pub fn repeater_delay_ticks(state: BlockState) -> u8 {
    (((state & DELAY_MASK) >> DELAY_SHIFT) as u8) + 1
}

/// Set the repeater delay in ticks (1-4) in block state.
pub fn set_repeater_delay_ticks(state: BlockState, delay_ticks: u8) -> BlockState {
    let delay = delay_ticks.clamp(1, 4) - 1;
    (state & !DELAY_MASK) | ((delay as BlockState) << DELAY_SHIFT)
}

/// Get the repeater facing from block state.
pub fn repeater_facing(state: BlockState) -> Facing {
    Facing::from_state(state)
}

/// Set the repeater facing in block state.
pub fn set_repeater_facing(state: BlockState, facing: Facing) -> BlockState {
    (state & !0x03) | facing.to_state()
}

fn front_offset(state: BlockState) -> Offset {
    let (dx, dz) = repeater_facing(state).offset();
    (dx, 0, dz)
}

fn rear_offset(state: BlockState) -> Offset {
    let (dx, dz) = repeater_facing(state).opposite().offset();
    (dx, 0, dz)
}

pub(crate) struct RepeaterHandler;

impl ComponentHandler for RepeaterHandler {
    fn for_valid_source_positions(&self, pos: BlockPos, block: Voxel, scan: &mut SourceScan<'_>) {
        let rear = pos.offset(rear_offset(block.state));
        scan.visit(rear);

        // A strongly powered solid block behind the repeater drives it too.
        if scan
            .grid()
            .block_at(rear)
            .is_some_and(|v| is_solid_opaque(v.id))
        {
            scan.check_linked(rear);
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
        _is_linked: bool,
    ) -> PowerLevel {
        if !is_active(block.state) {
            return 0;
        }
        // Full power, front face only (linked queries included: a repeater
        // drives the block it faces).
        if pos.direction_to(query_pos) == front_offset(block.state) {
            MAX_POWER
        } else {
            0
        }
    }

    fn is_directly_connecting(&self, block: Voxel, offset: Offset) -> bool {
        // Wire connects to a repeater only along the repeater's own axis.
        match repeater_facing(block.state) {
            Facing::East | Facing::West => offset.0 != 0,
            Facing::North | Facing::South => offset.2 != 0,
        }
    }

    fn update(&self, ctx: &mut UpdateContext<'_>, pos: BlockPos, block: Voxel, power: PowerLevel) {
        let should_be_on = power > 0;

        let Some(delay) = ctx.delay_info(pos) else {
            if should_be_on != is_active(block.state) {
                trace!(
                    x = pos.x,
                    y = pos.y,
                    z = pos.z,
                    should_be_on,
                    "repeater flip scheduled"
                );
                ctx.schedule_delay(pos, repeater_delay_ticks(block.state) as u32, should_be_on);
            }
            return;
        };

        if delay.ticks_left > 0 {
            // Locked in: a pending flip ignores input changes until it lands.
            return;
        }

        ctx.clear_delay(pos);
        if delay.power_on != is_active(block.state) {
            let new_state = set_active(block.state, delay.power_on);
            ctx.set_block(pos, Voxel { id: block.id, state: new_state });

            let front = pos.offset(front_offset(block.state));
            ctx.wake_powered(front, pos);
        }

        // Input moved again while the flip was pending; chase it.
        if should_be_on != delay.power_on {
            ctx.schedule_delay(pos, repeater_delay_ticks(block.state) as u32, should_be_on);
        }
    }
}
