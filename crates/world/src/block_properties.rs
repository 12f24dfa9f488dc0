//! Block properties - solidity and transparency as seen by the simulators.

use crate::chunk::{BlockId, BLOCK_AIR, BLOCK_GLASS, BLOCK_STONE};
use crate::redstone::{mechanical_blocks, redstone_blocks};

/// Properties of a block type
#[derive(Debug, Clone, Copy)]
pub struct BlockProperties {
    /// Whether this block is solid (affects collision and quasiconnectivity).
    pub is_solid: bool,

    /// Whether light and wire terracing pass through this block.
    pub is_transparent: bool,
}

impl Default for BlockProperties {
    fn default() -> Self {
        Self {
            is_solid: true,
            is_transparent: false,
        }
    }
}

impl BlockProperties {
    /// Properties for air (not solid, fully transparent).
    pub fn air() -> Self {
        Self {
            is_solid: false,
            is_transparent: true,
        }
    }

    /// Properties for non-solid attachments (wires, torches, levers).
    fn attachment() -> Self {
        Self {
            is_solid: false,
            is_transparent: true,
        }
    }
}

/// Look up the properties for a block ID.
pub fn block_properties(id: BlockId) -> BlockProperties {
    match id {
        BLOCK_AIR => BlockProperties::air(),
        BLOCK_GLASS => BlockProperties {
            is_solid: true,
            is_transparent: true,
        },
        redstone_blocks::REDSTONE_WIRE
        | redstone_blocks::REDSTONE_TORCH
        | redstone_blocks::LEVER
        | redstone_blocks::STONE_BUTTON
        | redstone_blocks::OAK_BUTTON
        | redstone_blocks::REDSTONE_REPEATER
        | redstone_blocks::REDSTONE_COMPARATOR => BlockProperties::attachment(),
        BLOCK_STONE
        | redstone_blocks::REDSTONE_BLOCK
        | redstone_blocks::REDSTONE_LAMP
        | redstone_blocks::REDSTONE_LAMP_LIT
        | mechanical_blocks::PISTON
        | mechanical_blocks::DISPENSER
        | mechanical_blocks::DROPPER => BlockProperties::default(),
        _ => BlockProperties::default(),
    }
}

/// Whether the block occupies its cell solidly.
#[inline]
pub fn is_solid(id: BlockId) -> bool {
    block_properties(id).is_solid
}

/// Whether wire terracing and linked power pass through the block.
#[inline]
pub fn is_transparent(id: BlockId) -> bool {
    block_properties(id).is_transparent
}

/// Solid and opaque: the conduit test used by quasiconnectivity and
/// terracing obstruction.
#[inline]
pub fn is_solid_opaque(id: BlockId) -> bool {
    let props = block_properties(id);
    props.is_solid && !props.is_transparent
}
