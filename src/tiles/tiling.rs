//! Autotiling codec.
//!
//! A tile's look depends on which of its four cardinal neighbors are painted.
//! That presence layout packs into a 4-bit [`Tiling`], and a [`TilingTable`]
//! maps each tiling onto the spritesheet tile that draws it.

use super::constants::{STANDARD_TILING_TABLE, TILING_COUNT};
use super::types::{Cardinal, CardinalDirection, SsTileIndex};
use std::collections::HashMap;
use std::fmt;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TilingError {
    #[error("tiling {0} outside [0, 16)")]
    OutOfRange(i32),
    #[error("no spritesheet tile registered for tiling {0}")]
    UnmappedConfiguration(Tiling),
    #[error("duplicate tiling rule {tiling}: claimed by tiles {first} and {second}")]
    DuplicateMapping {
        tiling: Tiling,
        first: SsTileIndex,
        second: SsTileIndex,
    },
    #[error("spritesheet tile {0} has no tiling")]
    UnknownTileIndex(SsTileIndex),
}

/// Neighbor presence bitmask: bit0 left, bit1 up, bit2 right, bit3 down
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, PartialOrd, Ord)]
pub struct Tiling(u8);

impl Tiling {
    /// Isolated tile, no neighbors
    pub const NONE: Self = Tiling(0);

    /// Surrounded on all four sides
    pub const ALL: Self = Tiling(0b1111);

    /// Checked construction from a raw bitmask
    pub fn from_bits(bits: i32) -> Result<Self, TilingError> {
        if (0..TILING_COUNT as i32).contains(&bits) {
            Ok(Tiling(bits as u8))
        } else {
            Err(TilingError::OutOfRange(bits))
        }
    }

    pub fn bits(self) -> u8 {
        self.0
    }

    /// OR together the bits of every present neighbor
    pub fn encode(neighbors: Cardinal<bool>) -> Self {
        let bits = neighbors
            .iter()
            .filter(|(_, present)| **present)
            .fold(0, |acc, (dir, _)| acc | dir.bit());
        Tiling(bits)
    }

    /// Presence layout this tiling describes
    pub fn neighbors(self) -> Cardinal<bool> {
        Cardinal::from_fn(|dir| self.has(dir))
    }

    pub fn has(self, dir: CardinalDirection) -> bool {
        self.0 & dir.bit() == dir.bit()
    }
}

impl fmt::Display for Tiling {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04b}", self.0)
    }
}

impl TryFrom<i32> for Tiling {
    type Error = TilingError;

    fn try_from(bits: i32) -> Result<Self, Self::Error> {
        Tiling::from_bits(bits)
    }
}

/// Encode a presence layout into a tiling. Total.
pub fn encode(neighbors: Cardinal<bool>) -> Tiling {
    Tiling::encode(neighbors)
}

/// Decode a raw bitmask into a presence layout
pub fn decode(config: i32) -> Result<Cardinal<bool>, TilingError> {
    Tiling::from_bits(config).map(Tiling::neighbors)
}

/// Bijection between spritesheet tiles and tilings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TilingTable {
    /// Indexed by tiling bits
    tile_for_tiling: [Option<SsTileIndex>; TILING_COUNT],
    tiling_for_tile: HashMap<SsTileIndex, Tiling>,
}

impl TilingTable {
    /// Build from (spritesheet index, raw tiling) pairs.
    /// Fails if a tiling is out of range or claimed by two tiles.
    pub fn from_index_map<I>(entries: I) -> Result<Self, TilingError>
    where
        I: IntoIterator<Item = (SsTileIndex, i32)>,
    {
        let mut tile_for_tiling = [None; TILING_COUNT];
        let mut tiling_for_tile = HashMap::new();

        for (index, bits) in entries {
            let tiling = Tiling::from_bits(bits)?;
            let slot = &mut tile_for_tiling[tiling.bits() as usize];
            if let Some(first) = *slot {
                return Err(TilingError::DuplicateMapping {
                    tiling,
                    first,
                    second: index,
                });
            }
            *slot = Some(index);
            tiling_for_tile.insert(index, tiling);
        }

        Ok(Self {
            tile_for_tiling,
            tiling_for_tile,
        })
    }

    /// The fixed 4x4 sheet layout every bundled spritesheet follows
    pub fn standard() -> Result<Self, TilingError> {
        Self::from_index_map(
            STANDARD_TILING_TABLE
                .iter()
                .enumerate()
                .map(|(index, &bits)| (index as SsTileIndex, bits as i32)),
        )
    }

    pub fn tile_index(&self, tiling: Tiling) -> Result<SsTileIndex, TilingError> {
        self.tile_for_tiling[tiling.bits() as usize]
            .ok_or(TilingError::UnmappedConfiguration(tiling))
    }

    pub fn tiling(&self, index: SsTileIndex) -> Result<Tiling, TilingError> {
        self.tiling_for_tile
            .get(&index)
            .copied()
            .ok_or(TilingError::UnknownTileIndex(index))
    }

    /// Number of spritesheet tiles registered
    pub fn len(&self) -> usize {
        self.tiling_for_tile.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiling_for_tile.is_empty()
    }

    /// True when every tiling has a tile
    pub fn is_complete(&self) -> bool {
        self.tile_for_tiling.iter().all(Option::is_some)
    }

    /// Largest registered spritesheet index
    pub fn max_tile_index(&self) -> Option<SsTileIndex> {
        self.tiling_for_tile.keys().max().copied()
    }
}
