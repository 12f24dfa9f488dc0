//! Incremental redstone simulator.
//!
//! Per world tick, each loaded chunk drains a dirty-set of positions whose
//! inputs may have changed. Evaluating a position asks its component handler
//! for every supplier position, reduces the offers to a single maximum power
//! level, and rewrites the block only when something actually changed,
//! enqueueing the positions fed by it. A converged circuit therefore
//! produces zero further writes.

pub mod connectivity;
pub mod position;

mod chunk_data;
mod handlers;
mod sources;

use chunk_data::RedstoneStore;
use position::FACE_OFFSETS;
use sources::SourceScan;

use crate::block_properties::is_solid_opaque;
use crate::chunk::{BlockState, ChunkPos, LocalPos, Voxel, CHUNK_SIZE_X, CHUNK_SIZE_Y, CHUNK_SIZE_Z};
use crate::grid::ChunkGrid;
use embercraft_core::{PowerLevel, SimTick, MAX_POWER};
use tracing::debug;

pub use connectivity::{WireConnection, WireConnectivity};
pub use handlers::{
    comparator_facing, comparator_output_power, is_comparator_subtract_mode, piston_facing,
    repeater_delay_ticks, repeater_facing, set_comparator_facing, set_comparator_output_power,
    set_comparator_subtract_mode, set_piston_facing, set_repeater_delay_ticks,
    set_repeater_facing, RedstoneVariant,
};
pub use position::{opposite, BlockPos, Offset, LATERAL_OFFSETS, OFFSET_DOWN, OFFSET_UP};

/// Block IDs for redstone components
pub mod redstone_blocks {
    use crate::chunk::BlockId;

    pub const LEVER: BlockId = 38;
    pub const STONE_BUTTON: BlockId = 39;
    pub const OAK_BUTTON: BlockId = 40;
    pub const REDSTONE_WIRE: BlockId = 43;
    pub const REDSTONE_TORCH: BlockId = 44;
    pub const REDSTONE_LAMP: BlockId = 45;
    pub const REDSTONE_LAMP_LIT: BlockId = 46;
    // Appended to preserve stable block IDs.
    pub const REDSTONE_REPEATER: BlockId = 123;
    pub const REDSTONE_COMPARATOR: BlockId = 124;
    pub const REDSTONE_BLOCK: BlockId = 125;
}

/// Block IDs for powered mechanisms (effects live outside the simulator).
pub mod mechanical_blocks {
    use crate::chunk::BlockId;

    pub const PISTON: BlockId = 127;
    pub const DISPENSER: BlockId = 129;
    pub const DROPPER: BlockId = 130;
}

/// Ticks a pressed button stays active before releasing.
pub const BUTTON_RELEASE_TICKS: u32 = 20;

/// Default cap on dirty-set drains per chunk per tick; the remainder defers
/// to the next tick.
pub const DEFAULT_DRAIN_BUDGET: usize = 512;

/// Get power level from block state (stored in lower 4 bits)
pub fn power_level(state: BlockState) -> PowerLevel {
    (state & 0x0F) as PowerLevel
}

/// Set power level in block state
pub fn set_power_level(state: BlockState, power: PowerLevel) -> BlockState {
    (state & 0xFFF0) | (power.min(MAX_POWER) as BlockState)
}

/// Check if a redstone component is active (powered/on)
pub fn is_active(state: BlockState) -> bool {
    (state & 0x10) != 0
}

/// Set the active flag in block state
pub fn set_active(state: BlockState, active: bool) -> BlockState {
    if active {
        state | 0x10
    } else {
        state & !0x10
    }
}

/// Mutable world access handed to component handlers during the update step.
pub(crate) struct UpdateContext<'a> {
    pub grid: &'a mut ChunkGrid,
    pub store: &'a mut RedstoneStore,
}

impl UpdateContext<'_> {
    /// Rewrite a block through the fast path (no placement machinery).
    pub fn set_block(&mut self, pos: BlockPos, voxel: Voxel) -> bool {
        self.grid.fast_set_block(pos, voxel)
    }

    /// Enqueue one position for re-evaluation.
    pub fn wake(&mut self, pos: BlockPos) {
        self.store.enqueue(pos);
    }

    /// Enqueue all face neighbors of a position, optionally sparing one.
    pub fn wake_adjacent(&mut self, pos: BlockPos, except: Option<BlockPos>) {
        for offset in FACE_OFFSETS {
            let neighbor = pos.offset(offset);
            if Some(neighbor) != except {
                self.store.enqueue(neighbor);
            }
        }
    }

    /// Enqueue a position this component powers. An opaque solid target is a
    /// conduit: whatever sits behind it takes linked power from us, so its
    /// other neighbors re-evaluate too.
    pub fn wake_powered(&mut self, pos: BlockPos, from: BlockPos) {
        self.store.enqueue(pos);
        if self
            .grid
            .block_at(pos)
            .is_some_and(|v| is_solid_opaque(v.id))
        {
            self.wake_adjacent(pos, Some(from));
        }
    }

    /// Power one specific source offers toward `target`.
    pub fn delivered_from(&self, source: BlockPos, target: BlockPos) -> PowerLevel {
        let Some(target_block) = self.grid.block_at(target) else {
            return 0;
        };
        let Some(source_block) = self.grid.block_at(source) else {
            return 0;
        };
        sources::delivered_power(
            self.grid,
            self.store,
            source,
            source_block,
            target,
            target_block,
            false,
        )
    }

    /// Maximum linked power conducted through the solid block at
    /// `solid_pos`, excluding `target` itself as a source.
    pub fn linked_through(&self, solid_pos: BlockPos, target: BlockPos) -> PowerLevel {
        let Some(solid_block) = self.grid.block_at(solid_pos) else {
            return 0;
        };
        let mut max = 0;
        for offset in FACE_OFFSETS {
            let source = solid_pos.offset(offset);
            if source == target {
                continue;
            }
            let Some(source_block) = self.grid.block_at(source) else {
                continue;
            };
            max = max.max(sources::delivered_power(
                self.grid,
                self.store,
                source,
                source_block,
                solid_pos,
                solid_block,
                true,
            ));
        }
        max
    }

    pub fn delay_info(&self, pos: BlockPos) -> Option<chunk_data::MechanismDelay> {
        self.store.delay_info(pos)
    }

    pub fn schedule_delay(&mut self, pos: BlockPos, ticks: u32, power_on: bool) {
        self.store.schedule_delay(pos, ticks, power_on);
    }

    pub fn clear_delay(&mut self, pos: BlockPos) {
        self.store.clear_delay(pos);
    }
}

/// The per-world simulator driver. Owns all per-chunk redstone metadata;
/// exactly one tick-owning thread drives it.
pub struct RedstoneSimulator {
    store: RedstoneStore,
    drain_budget: usize,
    current_tick: SimTick,
}

impl Default for RedstoneSimulator {
    fn default() -> Self {
        Self::new()
    }
}

impl RedstoneSimulator {
    /// Create a simulator with the default per-chunk drain budget.
    pub fn new() -> Self {
        Self::with_drain_budget(DEFAULT_DRAIN_BUDGET)
    }

    /// Create a simulator with an explicit per-chunk drain budget.
    pub fn with_drain_budget(drain_budget: usize) -> Self {
        Self {
            store: RedstoneStore::default(),
            drain_budget: drain_budget.max(1),
            current_tick: SimTick::ZERO,
        }
    }

    pub fn current_tick(&self) -> SimTick {
        self.current_tick
    }

    /// Positions still queued for the given chunk.
    pub fn pending_count(&self, chunk: ChunkPos) -> usize {
        self.store.dirty_len(chunk)
    }

    /// The sole external write API into the dirty-set: a position's
    /// dependencies may have changed. Wakes the position, its face
    /// neighbors, and the linked positions behind any adjacent opaque solid
    /// (their quasi power may route through it).
    pub fn wake_up(&mut self, grid: &ChunkGrid, pos: BlockPos) {
        self.store.enqueue(pos);
        for offset in FACE_OFFSETS {
            let neighbor = pos.offset(offset);
            self.store.enqueue(neighbor);
            if grid
                .block_at(neighbor)
                .is_some_and(|v| is_solid_opaque(v.id))
            {
                for linked_offset in FACE_OFFSETS {
                    let linked = neighbor.offset(linked_offset);
                    if linked != pos {
                        self.store.enqueue(linked);
                    }
                }
            }
        }
    }

    /// A chunk became valid: create its redstone data lazily and schedule
    /// every redstone-capable position in it, plus the border positions of
    /// already-valid neighbor chunks whose connectivity can now resolve.
    pub fn chunk_became_valid(&mut self, grid: &ChunkGrid, chunk: ChunkPos) {
        self.store.create_chunk_data(chunk);
        debug!(chunk = %chunk, "redstone data created");

        let Some(loaded) = grid.chunk(chunk) else {
            return;
        };
        for y in 0..CHUNK_SIZE_Y {
            for z in 0..CHUNK_SIZE_Z {
                for x in 0..CHUNK_SIZE_X {
                    let local = LocalPos::new(x, y, z);
                    if handlers::handler_for(loaded.voxel(local).id).is_some() {
                        self.store.enqueue(BlockPos::join(chunk, local));
                    }
                }
            }
        }

        // Wires at the facing border of each valid neighbor re-resolve now
        // that their missing dependencies exist.
        for (dx, dz) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            let neighbor_pos = ChunkPos::new(chunk.x + dx, chunk.z + dz);
            if !self.store.is_valid(neighbor_pos) {
                continue;
            }
            let Some(neighbor) = grid.chunk(neighbor_pos) else {
                continue;
            };
            let (xs, zs): (Vec<usize>, Vec<usize>) = match (dx, dz) {
                (1, 0) => (vec![0], (0..CHUNK_SIZE_Z).collect()),
                (-1, 0) => (vec![CHUNK_SIZE_X - 1], (0..CHUNK_SIZE_Z).collect()),
                (0, 1) => ((0..CHUNK_SIZE_X).collect(), vec![0]),
                _ => ((0..CHUNK_SIZE_X).collect(), vec![CHUNK_SIZE_Z - 1]),
            };
            for y in 0..CHUNK_SIZE_Y {
                for &z in &zs {
                    for &x in &xs {
                        let local = LocalPos::new(x, y, z);
                        if handlers::handler_for(neighbor.voxel(local).id).is_some() {
                            self.store.enqueue(BlockPos::join(neighbor_pos, local));
                        }
                    }
                }
            }
        }
    }

    /// A chunk is going away; drop its simulator data wholesale.
    pub fn chunk_invalidated(&mut self, chunk: ChunkPos) {
        debug!(chunk = %chunk, "redstone data dropped");
        self.store.drop_chunk_data(chunk);
    }

    /// Advance the whole world one tick, draining each valid chunk in
    /// deterministic chunk order.
    pub fn tick(&mut self, grid: &mut ChunkGrid) {
        self.current_tick = self.current_tick.advance(1);
        for chunk in self.store.chunk_positions() {
            self.simulate_chunk(grid, chunk);
        }
    }

    /// Drain one chunk's dirty-set, up to the per-tick budget; the
    /// remainder is deferred (never dropped).
    pub fn simulate_chunk(&mut self, grid: &mut ChunkGrid, chunk: ChunkPos) {
        if !self.store.is_valid(chunk) {
            return;
        }

        for local in self.store.advance_delays(chunk) {
            self.store.enqueue(BlockPos::join(chunk, local));
        }

        let mut drained = 0;
        while drained < self.drain_budget {
            let Some(local) = self.store.pop_dirty(chunk) else {
                break;
            };
            drained += 1;
            self.evaluate(grid, BlockPos::join(chunk, local));
        }

        let remaining = self.store.dirty_len(chunk);
        if remaining > 0 {
            debug!(chunk = %chunk, remaining, "drain budget exhausted, deferring");
        }
    }

    /// Evaluate one position to a local fixed point: discover input power,
    /// then let the component commit whatever changed.
    fn evaluate(&mut self, grid: &mut ChunkGrid, pos: BlockPos) {
        let Some(block) = grid.block_at(pos) else {
            return;
        };

        if block.id != redstone_blocks::REDSTONE_WIRE {
            // A cached record whose wire is gone is stale; drop it before
            // anything dereferences it as wire data.
            self.store.remove_wire_state(pos);
        }

        let Some(handler) = handlers::handler_for(block.id) else {
            // Likewise a pending flip for a component that no longer exists.
            self.store.clear_delay(pos);
            return;
        };

        let power = {
            let mut scan = SourceScan::new(grid, &self.store, pos, block);
            handler.for_valid_source_positions(pos, block, &mut scan);
            scan.power()
        };

        let mut ctx = UpdateContext {
            grid,
            store: &mut self.store,
        };
        handler.update(&mut ctx, pos, block, power);
    }

    /// Current power arriving at a position, computed by source discovery.
    /// Mechanism blocks use this for their own (external) effect logic.
    pub fn power_level_at(&self, grid: &ChunkGrid, pos: BlockPos) -> PowerLevel {
        let Some(block) = grid.block_at(pos) else {
            return 0;
        };
        let mut scan = SourceScan::new(grid, &self.store, pos, block);
        match handlers::handler_for(block.id) {
            Some(handler) => handler.for_valid_source_positions(pos, block, &mut scan),
            None => {
                for offset in FACE_OFFSETS {
                    scan.visit(pos.offset(offset));
                }
            }
        }
        scan.power()
    }

    /// Cached wire connectivity for a position, if any (primarily for
    /// inspection and tests).
    pub fn wire_connectivity(&self, pos: BlockPos) -> Option<WireConnectivity> {
        self.store.wire_connectivity(pos)
    }

    /// Toggle a lever at the given position
    pub fn toggle_lever(&mut self, grid: &mut ChunkGrid, pos: BlockPos) {
        let Some(block) = grid.block_at(pos) else {
            return;
        };
        if block.id != redstone_blocks::LEVER {
            return;
        }
        let new_state = set_active(block.state, !is_active(block.state));
        grid.set_block(pos, Voxel { id: block.id, state: new_state });
        self.wake_up(grid, pos);
    }

    /// Activate a button at the given position; it releases by itself after
    /// `BUTTON_RELEASE_TICKS`.
    pub fn activate_button(&mut self, grid: &mut ChunkGrid, pos: BlockPos) {
        let Some(block) = grid.block_at(pos) else {
            return;
        };
        if !matches!(
            block.id,
            redstone_blocks::STONE_BUTTON | redstone_blocks::OAK_BUTTON
        ) {
            return;
        }
        if is_active(block.state) {
            return;
        }
        let new_state = set_active(block.state, true);
        grid.set_block(pos, Voxel { id: block.id, state: new_state });
        self.store
            .schedule_delay(pos, BUTTON_RELEASE_TICKS, false);
        self.wake_up(grid, pos);
    }
}
