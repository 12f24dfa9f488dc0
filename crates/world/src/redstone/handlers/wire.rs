//! Redstone wire: transmits power laterally with one level of decay per
//! wire-to-wire hop, always powers the block beneath it, and never powers
//! the block above it. Its lateral reach is governed by the cached
//! connectivity record (see `connectivity`).

use super::super::chunk_data::RedstoneStore;
use super::super::connectivity::{self, WireConnection};
use super::super::position::{BlockPos, Offset, LATERAL_OFFSETS, OFFSET_DOWN, OFFSET_UP};
use super::super::sources::SourceScan;
use super::super::{power_level, redstone_blocks, set_power_level, UpdateContext};
use super::ComponentHandler;
use crate::chunk::Voxel;
use crate::grid::ChunkGrid;
use embercraft_core::PowerLevel;
use tracing::trace;

fn is_wire(grid: &ChunkGrid, pos: BlockPos) -> bool {
    grid.block_at(pos)
        .is_some_and(|v| v.id == redstone_blocks::REDSTONE_WIRE)
}

pub(crate) struct WireHandler;

impl ComponentHandler for WireHandler {
    fn for_valid_source_positions(&self, pos: BlockPos, _block: Voxel, scan: &mut SourceScan<'_>) {
        scan.visit(pos.offset(OFFSET_UP));
        scan.visit(pos.offset(OFFSET_DOWN));

        // Figure out, based on our cached record, where we connect to:
        let Some(record) = scan.store().wire_connectivity(pos) else {
            // Not resolved yet; the laterals alone are still valid sources.
            for offset in LATERAL_OFFSETS {
                scan.visit(pos.offset(offset));
            }
            return;
        };

        for offset in LATERAL_OFFSETS {
            let relative = pos.offset(offset);
            scan.visit(relative);

            match record.get(offset) {
                WireConnection::Up => scan.visit(relative.up()),
                WireConnection::Side => {
                    // Side cannot distinguish a flat lateral from a downward
                    // terrace; only accept the diagonal when a wire is there.
                    let diagonal = relative.down();
                    if is_wire(scan.grid(), diagonal) {
                        scan.visit(diagonal);
                    }
                }
                WireConnection::None => {}
            }
        }
    }

    fn power_delivered_to(
        &self,
        _grid: &ChunkGrid,
        store: &RedstoneStore,
        pos: BlockPos,
        block: Voxel,
        query_pos: BlockPos,
        query_block: Voxel,
        is_linked: bool,
    ) -> PowerLevel {
        let mut power = power_level(block.state);
        let query_offset = pos.direction_to(query_pos);

        if query_offset == OFFSET_UP {
            // Wires do not power things above them.
            return 0;
        }
        if is_linked && query_block.id == redstone_blocks::REDSTONE_WIRE {
            // Nor do they link-power other wires.
            return 0;
        }
        if query_offset == OFFSET_DOWN {
            // Wires always deliver power to the block underneath.
            return power;
        }

        // A record is only missing before the wire's first evaluation; the
        // default all-None record delivers like an unconnected wire.
        let record = store.wire_connectivity(pos).unwrap_or_default();
        let (left, front, right) = record.sides_for(query_offset);

        if front != WireConnection::None {
            // Direct connection. Mechanisms take the wire's full level, but
            // wire-to-wire hops decay by one:
            if query_block.id == redstone_blocks::REDSTONE_WIRE && power != 0 {
                power -= 1;
            }
            return power;
        }

        // No direct connection toward the querier. With no connections to
        // either side, the wire is a dead end (or points straight at us) and
        // powers its laterals. With one side connected the wire runs
        // straight past; with both, it bends away. Either way a side
        // connection means no power for us:
        if left == WireConnection::None && right == WireConnection::None {
            return power;
        }
        0
    }

    fn is_directly_connecting(&self, _block: Voxel, _offset: Offset) -> bool {
        true
    }

    fn update(&self, ctx: &mut UpdateContext<'_>, pos: BlockPos, block: Voxel, power: PowerLevel) {
        // Refresh the terracing record first; it decides both our visuals
        // and who we notify.
        let record = connectivity::resolve(ctx.grid, ctx.store, pos);

        let new_state = set_power_level(record.straightened().to_state_bits(), power);
        if new_state == block.state {
            // Converged: no write, no further enqueue.
            return;
        }

        trace!(x = pos.x, y = pos.y, z = pos.z, power, "wire state changed");
        ctx.set_block(pos, Voxel { id: block.id, state: new_state });

        // Notify every position fed by this wire, sans the one above:
        ctx.wake_powered(pos.down(), pos);
        for offset in LATERAL_OFFSETS {
            let relative = pos.offset(offset);
            ctx.wake_powered(relative, pos);
            match record.get(offset) {
                WireConnection::Up => ctx.wake(relative.up()),
                WireConnection::Side => {
                    let diagonal = relative.down();
                    if is_wire(ctx.grid, diagonal) {
                        ctx.wake(diagonal);
                    }
                }
                WireConnection::None => {}
            }
        }
    }
}
