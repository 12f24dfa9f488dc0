//! The component handler registry: one handler per redstone-capable block
//! family. Each handler knows how its kind emits power and how it reacts to
//! its neighbors; missing capabilities fall back to the trait defaults
//! (deliver nothing, connect nothing, no-op update), so new components plug
//! in without touching the propagation core.

mod comparator;
mod mechanism;
mod repeater;
mod source;
mod torch;
mod wire;

use super::chunk_data::RedstoneStore;
use super::position::{BlockPos, Offset, FACE_OFFSETS};
use super::sources::SourceScan;
use super::{mechanical_blocks, redstone_blocks, UpdateContext};
use crate::chunk::{BlockId, Voxel};
use crate::grid::ChunkGrid;
use embercraft_core::PowerLevel;

pub use repeater::{repeater_delay_ticks, repeater_facing, set_repeater_delay_ticks, set_repeater_facing};
pub use comparator::{
    comparator_facing, comparator_output_power, is_comparator_subtract_mode,
    set_comparator_facing, set_comparator_output_power, set_comparator_subtract_mode,
};
pub use mechanism::{piston_facing, set_piston_facing};

/// The closed set of redstone-capable block families.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RedstoneVariant {
    /// Redstone wire - transmits power with decay
    Wire,
    /// Redstone repeater - directional delay element
    Repeater,
    /// Redstone comparator - directional compare/subtract element
    Comparator,
    /// Redstone torch - provides power, inverts its support
    Torch,
    /// Lever - toggles on/off, provides power
    Lever,
    /// Button - momentary power
    Button,
    /// Redstone block - constant power source
    RedstoneBlock,
    /// Redstone lamp - lights up when powered
    Lamp,
    /// Piston - powered mechanism (effects external)
    Piston,
    /// Dispenser - powered mechanism (effects external)
    Dispenser,
    /// Dropper - powered mechanism (effects external)
    Dropper,
}

impl RedstoneVariant {
    /// Get the variant for a block ID.
    pub fn from_block_id(id: BlockId) -> Option<Self> {
        match id {
            redstone_blocks::REDSTONE_WIRE => Some(RedstoneVariant::Wire),
            redstone_blocks::REDSTONE_REPEATER => Some(RedstoneVariant::Repeater),
            redstone_blocks::REDSTONE_COMPARATOR => Some(RedstoneVariant::Comparator),
            redstone_blocks::REDSTONE_TORCH => Some(RedstoneVariant::Torch),
            redstone_blocks::LEVER => Some(RedstoneVariant::Lever),
            redstone_blocks::STONE_BUTTON | redstone_blocks::OAK_BUTTON => {
                Some(RedstoneVariant::Button)
            }
            redstone_blocks::REDSTONE_BLOCK => Some(RedstoneVariant::RedstoneBlock),
            redstone_blocks::REDSTONE_LAMP | redstone_blocks::REDSTONE_LAMP_LIT => {
                Some(RedstoneVariant::Lamp)
            }
            mechanical_blocks::PISTON => Some(RedstoneVariant::Piston),
            mechanical_blocks::DISPENSER => Some(RedstoneVariant::Dispenser),
            mechanical_blocks::DROPPER => Some(RedstoneVariant::Dropper),
            _ => None,
        }
    }

    /// Whether this family can be powered through a solid block it does not
    /// touch (quasiconnectivity).
    pub fn is_quasi_powerable(self) -> bool {
        matches!(
            self,
            RedstoneVariant::Piston | RedstoneVariant::Dispenser | RedstoneVariant::Dropper
        )
    }
}

/// Capability set each component family implements. Defaults are the "not
/// connecting / delivers nothing / no-op update" behaviors.
pub(crate) trait ComponentHandler: Sync {
    /// Visit every position that can feed power into `pos`.
    fn for_valid_source_positions(&self, pos: BlockPos, block: Voxel, scan: &mut SourceScan<'_>) {
        let _ = block;
        for offset in FACE_OFFSETS {
            scan.visit(pos.offset(offset));
        }
    }

    /// How much power this component hands over toward `query_pos`.
    #[allow(clippy::too_many_arguments)]
    fn power_delivered_to(
        &self,
        grid: &ChunkGrid,
        store: &RedstoneStore,
        pos: BlockPos,
        block: Voxel,
        query_pos: BlockPos,
        query_block: Voxel,
        is_linked: bool,
    ) -> PowerLevel {
        let _ = (grid, store, pos, block, query_pos, query_block, is_linked);
        0
    }

    /// Whether an adjacent wire always forms a direct link with this block
    /// along the given offset.
    fn is_directly_connecting(&self, block: Voxel, offset: Offset) -> bool {
        let _ = (block, offset);
        false
    }

    /// Commit this component's reaction to its freshly discovered input
    /// power: rewrite the block if something changed and enqueue dependents.
    fn update(&self, ctx: &mut UpdateContext<'_>, pos: BlockPos, block: Voxel, power: PowerLevel) {
        let _ = (ctx, pos, block, power);
    }
}

static WIRE: wire::WireHandler = wire::WireHandler;
static REPEATER: repeater::RepeaterHandler = repeater::RepeaterHandler;
static COMPARATOR: comparator::ComparatorHandler = comparator::ComparatorHandler;
static TORCH: torch::TorchHandler = torch::TorchHandler;
static SOURCE: source::SourceHandler = source::SourceHandler;
static MECHANISM: mechanism::MechanismHandler = mechanism::MechanismHandler;

/// Resolve the handler for a block kind. Blocks outside the closed variant
/// set take no part in the simulation.
pub(crate) fn handler_for(id: BlockId) -> Option<&'static dyn ComponentHandler> {
    Some(match RedstoneVariant::from_block_id(id)? {
        RedstoneVariant::Wire => &WIRE,
        RedstoneVariant::Repeater => &REPEATER,
        RedstoneVariant::Comparator => &COMPARATOR,
        RedstoneVariant::Torch => &TORCH,
        RedstoneVariant::Lever | RedstoneVariant::Button | RedstoneVariant::RedstoneBlock => {
            &SOURCE
        }
        RedstoneVariant::Lamp
        | RedstoneVariant::Piston
        | RedstoneVariant::Dispenser
        | RedstoneVariant::Dropper => &MECHANISM,
    })
}

/// Whether `block` forms a direct power link with an adjacent wire along
/// `offset`.
pub(crate) fn is_directly_connecting(block: Voxel, offset: Offset) -> bool {
    handler_for(block.id).is_some_and(|handler| handler.is_directly_connecting(block, offset))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chunk::BLOCK_STONE;

    #[test]
    fn variant_detection() {
        assert_eq!(
            RedstoneVariant::from_block_id(redstone_blocks::REDSTONE_WIRE),
            Some(RedstoneVariant::Wire)
        );
        assert_eq!(
            RedstoneVariant::from_block_id(redstone_blocks::LEVER),
            Some(RedstoneVariant::Lever)
        );
        assert_eq!(
            RedstoneVariant::from_block_id(redstone_blocks::OAK_BUTTON),
            Some(RedstoneVariant::Button)
        );
        assert_eq!(
            RedstoneVariant::from_block_id(mechanical_blocks::PISTON),
            Some(RedstoneVariant::Piston)
        );
        assert_eq!(RedstoneVariant::from_block_id(BLOCK_STONE), None);
        assert_eq!(RedstoneVariant::from_block_id(0), None); // Air
    }

    #[test]
    fn quasi_powerable_families() {
        assert!(RedstoneVariant::Piston.is_quasi_powerable());
        assert!(RedstoneVariant::Dispenser.is_quasi_powerable());
        assert!(!RedstoneVariant::Wire.is_quasi_powerable());
        assert!(!RedstoneVariant::Lamp.is_quasi_powerable());
    }

    #[test]
    fn non_components_have_no_handler() {
        assert!(handler_for(BLOCK_STONE).is_none());
        assert!(handler_for(redstone_blocks::REDSTONE_WIRE).is_some());
    }
}
