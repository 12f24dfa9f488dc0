#![warn(missing_docs)]
//! Core primitives shared across the workspace.

use serde::{Deserialize, Serialize};

/// Fixed tick type (20 TPS => 50 ms per tick).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct SimTick(pub u64);

impl SimTick {
    /// First tick in any deterministic timeline.
    pub const ZERO: Self = Self(0);

    /// Advance by `delta` ticks.
    pub fn advance(self, delta: u64) -> Self {
        Self(self.0 + delta)
    }
}

/// Redstone signal strength. Valid values are `0..=MAX_POWER`; arithmetic on
/// power levels saturates at the bounds rather than wrapping.
pub type PowerLevel = u8;

/// Maximum redstone power level.
pub const MAX_POWER: PowerLevel = 15;

/// Errors surfaced at the chunk-grid collaborator boundary.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum GridError {
    /// A chunk was inserted at a coordinate that is already loaded.
    #[error("chunk ({x}, {z}) is already loaded")]
    ChunkAlreadyLoaded {
        /// Chunk X coordinate.
        x: i32,
        /// Chunk Z coordinate.
        z: i32,
    },
    /// A chunk was removed at a coordinate that is not loaded.
    #[error("chunk ({x}, {z}) is not loaded")]
    ChunkNotLoaded {
        /// Chunk X coordinate.
        x: i32,
        /// Chunk Z coordinate.
        z: i32,
    },
}
