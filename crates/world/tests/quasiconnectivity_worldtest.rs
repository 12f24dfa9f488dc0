//! Quasiconnectivity: mechanisms powered through an adjacent solid block by
//! sources that never touch the mechanism itself.

use embercraft_world::redstone::{
    is_active, mechanical_blocks, redstone_blocks, set_active, BlockPos, RedstoneSimulator,
};
use embercraft_world::{Chunk, ChunkGrid, ChunkPos, Voxel, BLOCK_STONE};

fn world() -> (ChunkGrid, RedstoneSimulator) {
    let mut grid = ChunkGrid::new();
    let mut sim = RedstoneSimulator::new();
    let pos = ChunkPos::new(0, 0);
    grid.insert_chunk(Chunk::new(pos)).unwrap();
    sim.chunk_became_valid(&grid, pos);
    (grid, sim)
}

fn place(grid: &mut ChunkGrid, sim: &mut RedstoneSimulator, pos: BlockPos, id: u16, state: u16) {
    grid.set_block(pos, Voxel { id, state });
    sim.wake_up(grid, pos);
}

fn settle(grid: &mut ChunkGrid, sim: &mut RedstoneSimulator) {
    for _ in 0..8 {
        sim.tick(grid);
    }
}

#[test]
fn source_on_solid_powers_adjacent_piston() {
    let (mut grid, mut sim) = world();

    // Lever on top of a stone block; piston beside the stone. Lever and
    // piston never touch.
    let stone = BlockPos::new(5, 5, 5);
    let lever = BlockPos::new(5, 6, 5);
    let piston = BlockPos::new(6, 5, 5);
    place(&mut grid, &mut sim, stone, BLOCK_STONE, 0);
    place(&mut grid, &mut sim, piston, mechanical_blocks::PISTON, 0);
    place(
        &mut grid,
        &mut sim,
        lever,
        redstone_blocks::LEVER,
        set_active(0, true),
    );
    settle(&mut grid, &mut sim);

    assert!(is_active(grid.block_at(piston).unwrap().state));
    assert_eq!(sim.power_level_at(&grid, piston), 15);

    // Flipping the lever depowers the piston through the same link.
    sim.toggle_lever(&mut grid, lever);
    settle(&mut grid, &mut sim);
    assert!(!is_active(grid.block_at(piston).unwrap().state));
}

#[test]
fn wire_on_solid_powers_adjacent_dispenser() {
    let (mut grid, mut sim) = world();

    // A powered wire resting on a solid block quasi-powers the dispenser
    // behind that block.
    let stone = BlockPos::new(5, 5, 5);
    let wire = BlockPos::new(5, 6, 5);
    let dispenser = BlockPos::new(4, 5, 5);
    let lever = BlockPos::new(5, 6, 6);
    place(&mut grid, &mut sim, stone, BLOCK_STONE, 0);
    place(&mut grid, &mut sim, dispenser, mechanical_blocks::DISPENSER, 0);
    place(&mut grid, &mut sim, wire, redstone_blocks::REDSTONE_WIRE, 0);
    place(
        &mut grid,
        &mut sim,
        lever,
        redstone_blocks::LEVER,
        set_active(0, true),
    );
    settle(&mut grid, &mut sim);

    assert!(is_active(grid.block_at(dispenser).unwrap().state));
}

#[test]
fn lamp_needs_direct_power() {
    let (mut grid, mut sim) = world();

    // Lamps are not quasiconnectable: a source on an adjacent solid block
    // does nothing, a directly adjacent source lights it.
    let stone = BlockPos::new(5, 5, 5);
    let lever = BlockPos::new(5, 6, 5);
    let lamp = BlockPos::new(6, 5, 5);
    place(&mut grid, &mut sim, stone, BLOCK_STONE, 0);
    place(&mut grid, &mut sim, lamp, redstone_blocks::REDSTONE_LAMP, 0);
    place(
        &mut grid,
        &mut sim,
        lever,
        redstone_blocks::LEVER,
        set_active(0, true),
    );
    settle(&mut grid, &mut sim);
    assert_eq!(
        grid.block_at(lamp).unwrap().id,
        redstone_blocks::REDSTONE_LAMP
    );

    let direct_lever = BlockPos::new(7, 5, 5);
    place(
        &mut grid,
        &mut sim,
        direct_lever,
        redstone_blocks::LEVER,
        set_active(0, true),
    );
    settle(&mut grid, &mut sim);
    assert_eq!(
        grid.block_at(lamp).unwrap().id,
        redstone_blocks::REDSTONE_LAMP_LIT
    );
}

#[test]
fn repeater_reads_through_a_powered_block() {
    use embercraft_world::redstone::set_repeater_facing;
    use embercraft_world::Facing;

    let (mut grid, mut sim) = world();

    // Wire on top of stone strongly powers it; a repeater whose rear faces
    // the stone picks that power up.
    let stone = BlockPos::new(5, 5, 5);
    let wire = BlockPos::new(5, 6, 5);
    let lever = BlockPos::new(5, 6, 6);
    let repeater = BlockPos::new(6, 5, 5);
    place(&mut grid, &mut sim, stone, BLOCK_STONE, 0);
    place(
        &mut grid,
        &mut sim,
        repeater,
        redstone_blocks::REDSTONE_REPEATER,
        set_repeater_facing(0, Facing::East),
    );
    place(&mut grid, &mut sim, wire, redstone_blocks::REDSTONE_WIRE, 0);
    place(
        &mut grid,
        &mut sim,
        lever,
        redstone_blocks::LEVER,
        set_active(0, true),
    );
    settle(&mut grid, &mut sim);

    assert!(is_active(grid.block_at(repeater).unwrap().state));
}
