//! Redstone comparator: directional element with compare and subtract
//! modes. The rear input is measured against the stronger of the two side
//! inputs; output changes land through a 1-tick delay entry.

use super::super::chunk_data::RedstoneStore;
use super::super::position::{BlockPos, Offset};
use super::super::sources::SourceScan;
use super::super::UpdateContext;
use super::ComponentHandler;
use crate::block_properties::is_solid_opaque;
use crate::chunk::{BlockState, Voxel};
use crate::facing::Facing;
use crate::grid::ChunkGrid;
use embercraft_core::{PowerLevel, MAX_POWER};
use tracing::trace;

const MODE_MASK: BlockState = 0x04;
const OUTPUT_SHIFT: u32 = 5;
const OUTPUT_MASK: BlockState = 0x0Fu16 << OUTPUT_SHIFT;

/// Check if a comparator is in subtract mode.
pub fn is_comparator_subtract_mode(state: BlockState) -> bool {
    (state & MODE_MASK) != 0
}

/// Set whether a comparator is in subtract mode.
pub fn set_comparator_subtract_mode(state: BlockState, subtract: bool) -> BlockState {
    if subtract {
        state | MODE_MASK
    } else {
        state & !MODE_MASK
    }
}

/// Get the comparator output power (0-15) from block state.
pub fn comparator_output_power(state: BlockState) -> u8 {
    ((state & OUTPUT_MASK) >> OUTPUT_SHIFT) as u8
}

/// Set the comparator output power (0-15) in block state.
pub fn set_comparator_output_power(state: BlockState, power: u8) -> BlockState {
    let clamped = power.min(MAX_POWER) as BlockState;
    (state & !OUTPUT_MASK) | (clamped << OUTPUT_SHIFT)
}

/// Get the comparator facing from block state.
pub fn comparator_facing(state: BlockState) -> Facing {
    Facing::from_state(state)
}

/// Set the comparator facing in block state.
pub fn set_comparator_facing(state: BlockState, facing: Facing) -> BlockState {
    (state & !0x03) | facing.to_state()
}

fn front_offset(state: BlockState) -> Offset {
    let (dx, dz) = comparator_facing(state).offset();
    (dx, 0, dz)
}

fn rear_offset(state: BlockState) -> Offset {
    let (dx, dz) = comparator_facing(state).opposite().offset();
    (dx, 0, dz)
}

/// Measure the comparator's inputs: rear (including linked power through a
/// solid block behind it) and the stronger side.
fn measure_inputs(ctx: &UpdateContext<'_>, pos: BlockPos, state: BlockState) -> (PowerLevel, PowerLevel) {
    let rear_pos = pos.offset(rear_offset(state));
    let mut rear = ctx.delivered_from(rear_pos, pos);
    if ctx
        .grid
        .block_at(rear_pos)
        .is_some_and(|v| is_solid_opaque(v.id))
    {
        rear = rear.max(ctx.linked_through(rear_pos, pos));
    }

    let mut side = 0;
    for facing in comparator_facing(state).sides() {
        let (dx, dz) = facing.offset();
        side = side.max(ctx.delivered_from(pos.offset((dx, 0, dz)), pos));
    }
    (rear, side)
}

fn desired_output(state: BlockState, rear: PowerLevel, side: PowerLevel) -> PowerLevel {
    if is_comparator_subtract_mode(state) {
        rear.saturating_sub(side)
    } else if rear >= side {
        rear
    } else {
        0
    }
}

pub(crate) struct ComparatorHandler;

impl ComponentHandler for ComparatorHandler {
    fn for_valid_source_positions(&self, pos: BlockPos, block: Voxel, scan: &mut SourceScan<'_>) {
        let rear = pos.offset(rear_offset(block.state));
        scan.visit(rear);
        if scan
            .grid()
            .block_at(rear)
            .is_some_and(|v| is_solid_opaque(v.id))
        {
            scan.check_linked(rear);
        }
        for facing in comparator_facing(block.state).sides() {
            let (dx, dz) = facing.offset();
            scan.visit(pos.offset((dx, 0, dz)));
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
        let output = comparator_output_power(block.state);
        if output == 0 {
            return 0;
        }
        if pos.direction_to(query_pos) == front_offset(block.state) {
            output
        } else {
            0
        }
    }

    fn is_directly_connecting(&self, block: Voxel, _offset: Offset) -> bool {
        comparator_output_power(block.state) > 0
    }

    fn update(&self, ctx: &mut UpdateContext<'_>, pos: BlockPos, block: Voxel, _power: PowerLevel) {
        let (rear, side) = measure_inputs(ctx, pos, block.state);
        let desired = desired_output(block.state, rear, side);
        let current = comparator_output_power(block.state);

        let Some(delay) = ctx.delay_info(pos) else {
            if desired != current {
                trace!(x = pos.x, y = pos.y, z = pos.z, desired, "comparator change scheduled");
                ctx.schedule_delay(pos, 1, desired > 0);
            }
            return;
        };

        if delay.ticks_left > 0 {
            return;
        }
        ctx.clear_delay(pos);

        // Re-measure at apply time; the inputs are fresher than the ledger.
        if desired != current {
            let new_state = set_comparator_output_power(block.state, desired);
            ctx.set_block(pos, Voxel { id: block.id, state: new_state });

            let front = pos.offset(front_offset(block.state));
            ctx.wake_powered(front, pos);
        }
    }
}
