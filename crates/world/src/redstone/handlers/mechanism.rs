//! Power consumers: pistons, dispensers, droppers, and lamps. This handler
//! implements only the power-delivery contract; what a mechanism *does* with
//! its powered bit (extending, firing, lighting) belongs to external
//! collaborators that read it back.

use super::super::position::BlockPos;
use super::super::sources::SourceScan;
use super::super::{is_active, redstone_blocks, set_active, UpdateContext};
use super::{ComponentHandler, RedstoneVariant};
use crate::chunk::{BlockState, Voxel};
use crate::facing::Facing;
use embercraft_core::PowerLevel;
use tracing::trace;

/// Get piston facing from block state.
pub fn piston_facing(state: BlockState) -> Facing {
    Facing::from_state(state)
}

/// Set piston facing in block state.
pub fn set_piston_facing(state: BlockState, facing: Facing) -> BlockState {
    (state & !0x03) | facing.to_state()
}

pub(crate) struct MechanismHandler;

impl ComponentHandler for MechanismHandler {
    fn for_valid_source_positions(&self, pos: BlockPos, block: Voxel, scan: &mut SourceScan<'_>) {
        for offset in super::super::position::FACE_OFFSETS {
            scan.visit(pos.offset(offset));
        }
        // Pistons and droppers/dispensers also accept power through an
        // adjacent solid block (quasiconnectivity).
        if RedstoneVariant::from_block_id(block.id).is_some_and(|v| v.is_quasi_powerable()) {
            scan.check_indirect_power();
        }
    }

    fn update(&self, ctx: &mut UpdateContext<'_>, pos: BlockPos, block: Voxel, power: PowerLevel) {
        let powered = power > 0;

        if matches!(
            block.id,
            redstone_blocks::REDSTONE_LAMP | redstone_blocks::REDSTONE_LAMP_LIT
        ) {
            let lit = block.id == redstone_blocks::REDSTONE_LAMP_LIT;
            if powered != lit {
                let new_id = if powered {
                    redstone_blocks::REDSTONE_LAMP_LIT
                } else {
                    redstone_blocks::REDSTONE_LAMP
                };
                trace!(x = pos.x, y = pos.y, z = pos.z, powered, "lamp toggled");
                ctx.set_block(pos, Voxel { id: new_id, state: block.state });
            }
            return;
        }

        if powered != is_active(block.state) {
            trace!(
                x = pos.x,
                y = pos.y,
                z = pos.z,
                id = block.id,
                powered,
                "mechanism powered bit changed"
            );
            let new_state = set_active(block.state, powered);
            ctx.set_block(pos, Voxel { id: block.id, state: new_state });
        }
    }
}
