mod block_properties;
mod chunk;
mod facing;
mod grid;

pub mod redstone;

pub use block_properties::*;
pub use chunk::*;
pub use facing::*;
pub use grid::*;
