//! Straight-run decay, max-not-sum reduction, and fixed-point idempotence.

use embercraft_world::redstone::{
    power_level, redstone_blocks, set_active, BlockPos, RedstoneSimulator,
};
use embercraft_world::{Chunk, ChunkGrid, ChunkPos, DirtyFlags, Voxel};

fn world(chunks: &[ChunkPos]) -> (ChunkGrid, RedstoneSimulator) {
    let mut grid = ChunkGrid::new();
    let mut sim = RedstoneSimulator::new();
    for &pos in chunks {
        grid.insert_chunk(Chunk::new(pos)).unwrap();
        sim.chunk_became_valid(&grid, pos);
    }
    (grid, sim)
}

fn place(grid: &mut ChunkGrid, sim: &mut RedstoneSimulator, pos: BlockPos, id: u16, state: u16) {
    grid.set_block(pos, Voxel { id, state });
    sim.wake_up(grid, pos);
}

fn power_at(grid: &ChunkGrid, pos: BlockPos) -> u8 {
    power_level(grid.block_at(pos).unwrap().state)
}

#[test]
fn straight_run_decays_one_per_hop() {
    let (mut grid, mut sim) = world(&[ChunkPos::new(0, 0), ChunkPos::new(1, 0)]);

    let length = 20;
    place(
        &mut grid,
        &mut sim,
        BlockPos::new(0, 5, 8),
        redstone_blocks::LEVER,
        set_active(0, true),
    );
    for k in 0..length {
        place(
            &mut grid,
            &mut sim,
            BlockPos::new(1 + k, 5, 8),
            redstone_blocks::REDSTONE_WIRE,
            0,
        );
    }
    for _ in 0..8 {
        sim.tick(&mut grid);
    }

    for k in 0..length {
        let expected = 15u8.saturating_sub(k as u8);
        assert_eq!(
            power_at(&grid, BlockPos::new(1 + k, 5, 8)),
            expected,
            "hop {k}"
        );
    }
}

#[test]
fn scenario_wire_run_settles_and_stays_settled() {
    // Wire at (0,0,0)..(0,0,4) fed by a full-power source at (0,0,-1).
    let (mut grid, mut sim) = world(&[ChunkPos::new(0, 0), ChunkPos::new(0, -1)]);

    place(
        &mut grid,
        &mut sim,
        BlockPos::new(0, 0, -1),
        redstone_blocks::LEVER,
        set_active(0, true),
    );
    for z in 0..5 {
        place(
            &mut grid,
            &mut sim,
            BlockPos::new(0, 0, z),
            redstone_blocks::REDSTONE_WIRE,
            0,
        );
    }

    for _ in 0..8 {
        sim.tick(&mut grid);
    }

    for (z, expected) in [(0, 15u8), (1, 14), (2, 13), (3, 12), (4, 11)] {
        assert_eq!(power_at(&grid, BlockPos::new(0, 0, z)), expected, "z={z}");
    }

    // Idempotence: a converged circuit produces zero further writes and an
    // empty dirty-set.
    assert_eq!(sim.pending_count(ChunkPos::new(0, 0)), 0);
    assert_eq!(sim.pending_count(ChunkPos::new(0, -1)), 0);

    grid.chunk_mut(ChunkPos::new(0, 0)).unwrap().take_dirty_flags();
    grid.chunk_mut(ChunkPos::new(0, -1)).unwrap().take_dirty_flags();

    sim.tick(&mut grid);

    assert_eq!(
        grid.chunk_mut(ChunkPos::new(0, 0)).unwrap().take_dirty_flags(),
        DirtyFlags::empty()
    );
    assert_eq!(
        grid.chunk_mut(ChunkPos::new(0, -1)).unwrap().take_dirty_flags(),
        DirtyFlags::empty()
    );
    assert_eq!(sim.pending_count(ChunkPos::new(0, 0)), 0);
    assert_eq!(sim.pending_count(ChunkPos::new(0, -1)), 0);
}

#[test]
fn exhausted_budget_defers_instead_of_dropping() {
    // A budget of one evaluation per chunk per tick still converges; the
    // queued remainder just carries over to later ticks.
    let mut grid = ChunkGrid::new();
    let mut sim = RedstoneSimulator::with_drain_budget(1);
    grid.insert_chunk(Chunk::new(ChunkPos::new(0, 0))).unwrap();
    sim.chunk_became_valid(&grid, ChunkPos::new(0, 0));

    place(
        &mut grid,
        &mut sim,
        BlockPos::new(4, 5, 8),
        redstone_blocks::LEVER,
        set_active(0, true),
    );
    for k in 0..4 {
        place(
            &mut grid,
            &mut sim,
            BlockPos::new(5 + k, 5, 8),
            redstone_blocks::REDSTONE_WIRE,
            0,
        );
    }

    sim.tick(&mut grid);
    assert!(sim.pending_count(ChunkPos::new(0, 0)) > 0, "work should defer");

    for _ in 0..400 {
        sim.tick(&mut grid);
    }
    assert_eq!(sim.pending_count(ChunkPos::new(0, 0)), 0);
    for (k, expected) in [(0, 15u8), (1, 14), (2, 13), (3, 12)] {
        assert_eq!(power_at(&grid, BlockPos::new(5 + k, 5, 8)), expected);
    }
}

#[test]
fn two_sources_take_the_maximum_not_the_sum() {
    let (mut grid, mut sim) = world(&[ChunkPos::new(0, 0), ChunkPos::new(1, 0)]);

    // A long run decays a first source to 3 by the time it reaches the
    // junction wire; a second full source sits right next to it.
    place(
        &mut grid,
        &mut sim,
        BlockPos::new(0, 5, 8),
        redstone_blocks::LEVER,
        set_active(0, true),
    );
    for k in 1..=13 {
        place(
            &mut grid,
            &mut sim,
            BlockPos::new(k, 5, 8),
            redstone_blocks::REDSTONE_WIRE,
            0,
        );
    }
    // Junction wire at x=14: fed by the decayed run (hop 13 carries 3, so it
    // would offer 2) and by a fresh lever to its south.
    place(
        &mut grid,
        &mut sim,
        BlockPos::new(14, 5, 8),
        redstone_blocks::REDSTONE_WIRE,
        0,
    );
    place(
        &mut grid,
        &mut sim,
        BlockPos::new(14, 5, 9),
        redstone_blocks::LEVER,
        set_active(0, true),
    );

    for _ in 0..8 {
        sim.tick(&mut grid);
    }

    assert_eq!(power_at(&grid, BlockPos::new(13, 5, 8)), 3);
    assert_eq!(power_at(&grid, BlockPos::new(14, 5, 8)), 15);
}
