//! Wire connectivity: the per-wire directional record describing how a wire
//! attaches to its lateral neighbors, including terracing one block up or
//! down. The record depends on up to 12 neighboring blocks across up to 4
//! chunks, so it is derived here and cached in the per-chunk store rather
//! than recovered from the wire's own block state.

use super::chunk_data::RedstoneStore;
use super::handlers;
use super::position::{opposite, BlockPos, Offset, LATERAL_OFFSETS};
use super::redstone_blocks;
use crate::block_properties::{is_solid, is_solid_opaque, is_transparent};
use crate::chunk::BlockState;
use crate::grid::ChunkGrid;
use tracing::trace;

/// How a wire attaches in one lateral direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WireConnection {
    /// No connection.
    #[default]
    None,
    /// Connects at the same elevation (or terraces downward).
    Side,
    /// Terraces one block upward to another wire.
    Up,
}

impl WireConnection {
    fn to_bits(self) -> BlockState {
        match self {
            WireConnection::None => 0,
            WireConnection::Side => 1,
            WireConnection::Up => 2,
        }
    }

    fn from_bits(bits: BlockState) -> Self {
        match bits & 0x03 {
            1 => WireConnection::Side,
            2 => WireConnection::Up,
            _ => WireConnection::None,
        }
    }
}

const CONN_EAST_SHIFT: u32 = 4;
const CONN_NORTH_SHIFT: u32 = 6;
const CONN_SOUTH_SHIFT: u32 = 8;
const CONN_WEST_SHIFT: u32 = 10;

/// Per-wire directional connectivity record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WireConnectivity {
    pub east: WireConnection,
    pub north: WireConnection,
    pub south: WireConnection,
    pub west: WireConnection,
}

impl WireConnectivity {
    /// The connection state for a lateral offset. Vertical offsets have no
    /// lateral connection and read as None.
    pub fn get(self, offset: Offset) -> WireConnection {
        match offset {
            (1, _, _) => self.east,
            (-1, _, _) => self.west,
            (_, _, 1) => self.south,
            (_, _, -1) => self.north,
            _ => WireConnection::None,
        }
    }

    pub fn set(&mut self, offset: Offset, connection: WireConnection) {
        match offset {
            (1, _, _) => self.east = connection,
            (-1, _, _) => self.west = connection,
            (_, _, 1) => self.south = connection,
            (_, _, -1) => self.north = connection,
            _ => {}
        }
    }

    /// The (left, front, right) states seen when facing along `offset`.
    pub fn sides_for(self, offset: Offset) -> (WireConnection, WireConnection, WireConnection) {
        match offset {
            (1, _, _) => (self.north, self.east, self.south),
            (-1, _, _) => (self.south, self.west, self.north),
            (_, _, 1) => (self.east, self.south, self.west),
            (_, _, -1) => (self.west, self.north, self.east),
            _ => (
                WireConnection::None,
                WireConnection::None,
                WireConnection::None,
            ),
        }
    }

    /// Visual-only correction mirroring client rendering: a wire with no
    /// connection on one axis but a connection on the other renders as a
    /// straight line along the connected axis.
    pub fn straightened(self) -> WireConnectivity {
        let mut out = self;
        if out.east == WireConnection::None && out.west == WireConnection::None {
            if out.north != WireConnection::Up && out.south != WireConnection::None {
                out.north = WireConnection::Side;
            }
            if out.south != WireConnection::Up && out.north != WireConnection::None {
                out.south = WireConnection::Side;
            }
        }
        if out.north == WireConnection::None && out.south == WireConnection::None {
            if out.west != WireConnection::Up && out.east != WireConnection::None {
                out.west = WireConnection::Side;
            }
            if out.east != WireConnection::Up && out.west != WireConnection::None {
                out.east = WireConnection::Side;
            }
        }
        out
    }

    /// Pack into the wire block's visual state bits.
    pub fn to_state_bits(self) -> BlockState {
        (self.east.to_bits() << CONN_EAST_SHIFT)
            | (self.north.to_bits() << CONN_NORTH_SHIFT)
            | (self.south.to_bits() << CONN_SOUTH_SHIFT)
            | (self.west.to_bits() << CONN_WEST_SHIFT)
    }

    /// Unpack from the wire block's visual state bits.
    pub fn from_state(state: BlockState) -> Self {
        Self {
            east: WireConnection::from_bits(state >> CONN_EAST_SHIFT),
            north: WireConnection::from_bits(state >> CONN_NORTH_SHIFT),
            south: WireConnection::from_bits(state >> CONN_SOUTH_SHIFT),
            west: WireConnection::from_bits(state >> CONN_WEST_SHIFT),
        }
    }
}

/// Terracing upward is blocked when an opaque solid block sits directly
/// above the wire (or the wire is at the top of the world).
fn is_yp_terracing_blocked(grid: &ChunkGrid, pos: BlockPos) -> bool {
    match grid.block_at(pos.up()) {
        Some(above) => is_solid_opaque(above.id),
        None => true,
    }
}

fn is_wire(grid: &ChunkGrid, pos: BlockPos) -> bool {
    grid.block_at(pos)
        .is_some_and(|v| v.id == redstone_blocks::REDSTONE_WIRE)
}

/// Derive the connectivity record for the wire at `pos` and cache it,
/// propagating reciprocal direction states into neighboring chunks' records
/// where a connection crosses a chunk boundary. Returns the fresh record.
///
/// Any lookup that lands in an unloaded chunk treats that direction as
/// absent; the affected wires re-resolve when the chunk becomes valid.
pub(crate) fn resolve(grid: &ChunkGrid, store: &mut RedstoneStore, pos: BlockPos) -> WireConnectivity {
    let mut record = WireConnectivity::default();
    let yp_blocked = is_yp_terracing_blocked(grid, pos);
    let own_chunk = pos.split().map(|(chunk, _)| chunk);

    for offset in LATERAL_OFFSETS {
        let adjacent = pos.offset(offset);
        let Some(lateral) = grid.block_at(adjacent) else {
            continue;
        };
        let crosses_chunks = adjacent.split().map(|(chunk, _)| chunk) != own_chunk;

        if handlers::is_directly_connecting(lateral, offset) {
            // Any direct connection on a lateral means a side connection.
            record.set(offset, WireConnection::Side);

            // A wire in a neighboring chunk may have resolved before this
            // chunk existed; push our side of the link into its record.
            if crosses_chunks && lateral.id == redstone_blocks::REDSTONE_WIRE {
                reciprocate(store, adjacent, opposite(offset), WireConnection::Side);
            }
            continue;
        }

        if !yp_blocked && is_wire(grid, adjacent.up()) {
            // Terrace upward; through a transparent lateral the wire still
            // renders flat.
            let connection = if is_transparent(lateral.id) {
                WireConnection::Side
            } else {
                WireConnection::Up
            };
            record.set(offset, connection);

            if crosses_chunks {
                reciprocate(store, adjacent.up(), opposite(offset), WireConnection::Side);
            }
            continue;
        }

        if (!is_solid(lateral.id) || is_transparent(lateral.id)) && is_wire(grid, adjacent.down())
        {
            // Terrace downward: the lower wire sees us as an Up connection.
            record.set(offset, WireConnection::Side);

            if crosses_chunks {
                reciprocate(store, adjacent.down(), opposite(offset), WireConnection::Up);
            }
        }
    }

    if store.set_wire_connectivity(pos, record) {
        trace!(x = pos.x, y = pos.y, z = pos.z, "wire connectivity changed");
        // A wire that changed connection shape needs its neighbors (and its
        // own visuals) re-evaluated.
        store.enqueue(pos);
        for offset in LATERAL_OFFSETS {
            store.enqueue(pos.offset(offset));
        }
    }
    record
}

fn reciprocate(
    store: &mut RedstoneStore,
    pos: BlockPos,
    offset: Offset,
    connection: WireConnection,
) {
    if store.update_wire_direction(pos, offset, connection) {
        store.enqueue(pos);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn state_bits_round_trip() {
        let mut record = WireConnectivity::default();
        record.east = WireConnection::Side;
        record.north = WireConnection::Up;
        record.west = WireConnection::Side;

        let bits = record.to_state_bits();
        assert_eq!(WireConnectivity::from_state(bits), record);
    }

    #[test]
    fn get_set_by_offset() {
        let mut record = WireConnectivity::default();
        record.set((0, 0, -1), WireConnection::Up);
        assert_eq!(record.north, WireConnection::Up);
        assert_eq!(record.get((0, 0, -1)), WireConnection::Up);
        assert_eq!(record.get((0, 1, 0)), WireConnection::None);
    }

    #[test]
    fn terrace_offsets_read_their_lateral_axis() {
        let mut record = WireConnectivity::default();
        record.east = WireConnection::Up;
        // A diagonal up-and-east query still reads the east state.
        assert_eq!(record.get((1, 1, 0)), WireConnection::Up);
    }

    #[test]
    fn sides_for_maps_left_front_right() {
        let record = WireConnectivity {
            east: WireConnection::Side,
            north: WireConnection::Up,
            south: WireConnection::None,
            west: WireConnection::None,
        };
        // Facing east: left = north, front = east, right = south.
        let (left, front, right) = record.sides_for((1, 0, 0));
        assert_eq!(left, WireConnection::Up);
        assert_eq!(front, WireConnection::Side);
        assert_eq!(right, WireConnection::None);
    }

    #[test]
    fn straighten_forces_line_on_connected_axis() {
        let record = WireConnectivity {
            east: WireConnection::None,
            west: WireConnection::None,
            north: WireConnection::Side,
            south: WireConnection::None,
        };
        let out = record.straightened();
        assert_eq!(out.north, WireConnection::Side);
        assert_eq!(out.south, WireConnection::Side);
        assert_eq!(out.east, WireConnection::None);
        assert_eq!(out.west, WireConnection::None);
    }

    #[test]
    fn straighten_preserves_up_connections() {
        let record = WireConnectivity {
            east: WireConnection::None,
            west: WireConnection::None,
            north: WireConnection::Up,
            south: WireConnection::None,
        };
        let out = record.straightened();
        assert_eq!(out.north, WireConnection::Up);
        assert_eq!(out.south, WireConnection::Side);
    }

    #[test]
    fn straighten_leaves_crosses_alone() {
        let record = WireConnectivity {
            east: WireConnection::Side,
            west: WireConnection::None,
            north: WireConnection::Side,
            south: WireConnection::None,
        };
        assert_eq!(record.straightened(), record);
    }
}
