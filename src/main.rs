//! embercraft - headless driver for the incremental redstone simulator.
//!
//! Loads a small chunked world, lays out a demonstration circuit, and runs
//! the per-tick simulation loop, logging what the circuit settles to.

mod config;

use anyhow::Result;
use config::SimulatorConfig;
use embercraft_world::redstone::{
    power_level, redstone_blocks, set_active, BlockPos, RedstoneSimulator,
};
use embercraft_world::{Chunk, ChunkGrid, ChunkPos, Voxel, BLOCK_STONE};
use std::{env, path::PathBuf};
use tracing::info;

#[derive(Debug, Default)]
struct CliOptions {
    config_path: Option<PathBuf>,
    ticks: Option<u64>,
}

impl CliOptions {
    fn parse<I: Iterator<Item = String>>(mut args: I) -> Self {
        let mut options = CliOptions::default();
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--config" => options.config_path = args.next().map(PathBuf::from),
                "--ticks" => options.ticks = args.next().and_then(|v| v.parse().ok()),
                other => tracing::warn!("Ignoring unknown argument {other}"),
            }
        }
        options
    }
}

fn main() -> Result<()> {
    // Initialize tracing with INFO level by default (can be overridden via RUST_LOG env var)
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    info!("Starting embercraft v{}", env!("CARGO_PKG_VERSION"));

    let cli = CliOptions::parse(env::args().skip(1));
    let mut cfg = match cli.config_path {
        Some(path) => SimulatorConfig::load_from_path(&path),
        None => SimulatorConfig::load(),
    };
    if let Some(ticks) = cli.ticks {
        cfg.ticks = ticks;
    }

    let mut grid = ChunkGrid::new();
    let mut sim = RedstoneSimulator::with_drain_budget(cfg.drain_budget);
    for x in -cfg.area_radius..=cfg.area_radius {
        for z in -cfg.area_radius..=cfg.area_radius {
            let pos = ChunkPos::new(x, z);
            grid.insert_chunk(Chunk::new(pos))?;
            sim.chunk_became_valid(&grid, pos);
        }
    }
    info!(
        chunks = (2 * cfg.area_radius + 1).pow(2),
        ticks = cfg.ticks,
        "world ready"
    );

    // Demo circuit: a lever feeding a straight wire run along +Z, with a
    // floor of stone so the run reads like a real build.
    let y = 10;
    let length = cfg.demo_wire_length.max(1);
    for z in -1..=length {
        set(&mut grid, &mut sim, BlockPos::new(0, y - 1, z), BLOCK_STONE, 0);
    }
    set(
        &mut grid,
        &mut sim,
        BlockPos::new(0, y, -1),
        redstone_blocks::LEVER,
        set_active(0, true),
    );
    for z in 0..length {
        set(
            &mut grid,
            &mut sim,
            BlockPos::new(0, y, z),
            redstone_blocks::REDSTONE_WIRE,
            0,
        );
    }

    for _ in 0..cfg.ticks {
        sim.tick(&mut grid);
    }

    for z in 0..length {
        let pos = BlockPos::new(0, y, z);
        let power = grid.block_at(pos).map_or(0, |v| power_level(v.state));
        info!(z, power, "wire settled");
    }
    info!(tick = sim.current_tick().0, "simulation finished");

    Ok(())
}

fn set(grid: &mut ChunkGrid, sim: &mut RedstoneSimulator, pos: BlockPos, id: u16, state: u16) {
    grid.set_block(pos, Voxel { id, state });
    sim.wake_up(grid, pos);
}
