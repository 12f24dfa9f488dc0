use serde::{Deserialize, Serialize};
use std::{fs, path::Path};
use tracing::warn;

const DEFAULT_CONFIG_PATH: &str = "config/simulator.toml";

/// Headless simulator settings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct SimulatorConfig {
    /// Chunk radius loaded around the origin.
    pub area_radius: i32,
    /// Number of world ticks to run.
    pub ticks: u64,
    /// Cap on dirty-set drains per chunk per tick.
    pub drain_budget: usize,
    /// Length of the demo wire run placed at startup.
    pub demo_wire_length: i32,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            area_radius: 1,
            ticks: 40,
            drain_budget: embercraft_world::redstone::DEFAULT_DRAIN_BUDGET,
            demo_wire_length: 12,
        }
    }
}

impl SimulatorConfig {
    /// Load configuration from the default path.
    pub fn load() -> Self {
        Self::load_from_path(Path::new(DEFAULT_CONFIG_PATH))
    }

    /// Load configuration from an explicit path, falling back to defaults on errors.
    pub fn load_from_path(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match toml::from_str::<SimulatorConfig>(&contents) {
                Ok(cfg) => cfg,
                Err(err) => {
                    warn!("Failed to parse {}: {err}. Using defaults", path.display());
                    SimulatorConfig::default()
                }
            },
            Err(_) => SimulatorConfig::default(),
        }
    }
}
