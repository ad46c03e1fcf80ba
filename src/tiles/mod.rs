pub mod constants;
pub mod tiling;
pub mod types;

// Re-export commonly used items
pub use constants::*;
pub use tiling::{Tiling, TilingError, TilingTable};
pub use types::{Cardinal, CardinalDirection, GridIndex, Region, SsTileIndex, TilePos};
