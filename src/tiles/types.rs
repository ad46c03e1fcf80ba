use bevy::prelude::*;
use serde::{Deserialize, Serialize};

/// Tile index within a spritesheet (row-major)
pub type SsTileIndex = u32;

/// Row-major cell index within a grid
pub type GridIndex = usize;

/// Tile position in tile coordinates (not pixels). May lie outside a grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct TilePos {
    pub x: i32,
    pub y: i32,
}

impl TilePos {
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Position one step in the given direction
    pub fn step(self, dir: CardinalDirection) -> Self {
        self.offset_by(dir.offset())
    }

    pub fn offset_by(self, offset: IVec2) -> Self {
        Self::new(self.x + offset.x, self.y + offset.y)
    }
}

impl From<(i32, i32)> for TilePos {
    fn from((x, y): (i32, i32)) -> Self {
        Self::new(x, y)
    }
}

impl From<IVec2> for TilePos {
    fn from(v: IVec2) -> Self {
        Self::new(v.x, v.y)
    }
}

impl From<TilePos> for IVec2 {
    fn from(pos: TilePos) -> Self {
        IVec2::new(pos.x, pos.y)
    }
}

/// One of the four orthogonal neighbor directions.
/// Discriminant is the bit index used in tiling bitmasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum CardinalDirection {
    Left = 0,
    Up = 1,
    Right = 2,
    Down = 3,
}

impl CardinalDirection {
    /// All directions in bit order
    pub const ALL: [Self; 4] = [Self::Left, Self::Up, Self::Right, Self::Down];

    /// Grid offset, y grows downward
    pub const fn offset(self) -> IVec2 {
        match self {
            Self::Left => IVec2::new(-1, 0),
            Self::Up => IVec2::new(0, -1),
            Self::Right => IVec2::new(1, 0),
            Self::Down => IVec2::new(0, 1),
        }
    }

    pub const fn opposite(self) -> Self {
        match self {
            Self::Left => Self::Right,
            Self::Up => Self::Down,
            Self::Right => Self::Left,
            Self::Down => Self::Up,
        }
    }

    /// Bit value of this direction in a tiling bitmask
    pub const fn bit(self) -> u8 {
        1 << (self as u8)
    }
}

/// A value for each cardinal direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Cardinal<T> {
    pub left: T,
    pub up: T,
    pub right: T,
    pub down: T,
}

impl<T> Cardinal<T> {
    pub fn get(&self, dir: CardinalDirection) -> &T {
        match dir {
            CardinalDirection::Left => &self.left,
            CardinalDirection::Up => &self.up,
            CardinalDirection::Right => &self.right,
            CardinalDirection::Down => &self.down,
        }
    }

    pub fn get_mut(&mut self, dir: CardinalDirection) -> &mut T {
        match dir {
            CardinalDirection::Left => &mut self.left,
            CardinalDirection::Up => &mut self.up,
            CardinalDirection::Right => &mut self.right,
            CardinalDirection::Down => &mut self.down,
        }
    }

    /// Build from a function of direction
    pub fn from_fn(mut f: impl FnMut(CardinalDirection) -> T) -> Self {
        Self {
            left: f(CardinalDirection::Left),
            up: f(CardinalDirection::Up),
            right: f(CardinalDirection::Right),
            down: f(CardinalDirection::Down),
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(&T) -> U) -> Cardinal<U> {
        Cardinal::from_fn(|dir| f(self.get(dir)))
    }

    /// Iterate (direction, value) pairs in bit order
    pub fn iter(&self) -> impl Iterator<Item = (CardinalDirection, &T)> {
        CardinalDirection::ALL.into_iter().map(move |dir| (dir, self.get(dir)))
    }
}

impl<T> Cardinal<Option<T>> {
    /// Presence layout: which directions hold a value
    pub fn presence(&self) -> Cardinal<bool> {
        self.map(Option::is_some)
    }
}

/// Pixel rectangle within a spritesheet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Region {
    pub x: u32,
    pub y: u32,
    pub w: u32,
    pub h: u32,
}

impl Region {
    pub const fn new(x: u32, y: u32, w: u32, h: u32) -> Self {
        Self { x, y, w, h }
    }

    /// Convert to a Bevy rect for `Sprite::rect`
    pub fn to_rect(self) -> Rect {
        Rect::new(
            self.x as f32,
            self.y as f32,
            (self.x + self.w) as f32,
            (self.y + self.h) as f32,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offset_and_opposite_cancel() {
        let positions = [
            TilePos::new(0, 0),
            TilePos::new(3, -7),
            TilePos::new(-12, 40),
        ];

        for pos in positions {
            for dir in CardinalDirection::ALL {
                assert_eq!(pos.step(dir).step(dir.opposite()), pos);
            }
        }
    }

    #[test]
    fn test_direction_bits() {
        assert_eq!(CardinalDirection::Left.bit(), 1);
        assert_eq!(CardinalDirection::Up.bit(), 2);
        assert_eq!(CardinalDirection::Right.bit(), 4);
        assert_eq!(CardinalDirection::Down.bit(), 8);
    }

    #[test]
    fn test_opposite_is_involution() {
        for dir in CardinalDirection::ALL {
            assert_ne!(dir.opposite(), dir);
            assert_eq!(dir.opposite().opposite(), dir);
        }
    }

    #[test]
    fn test_cardinal_presence() {
        let neighbors = Cardinal {
            left: Some(1),
            up: None,
            right: None,
            down: Some(4),
        };

        let presence = neighbors.presence();
        assert!(presence.left);
        assert!(!presence.up);
        assert!(!presence.right);
        assert!(presence.down);
    }

    #[test]
    fn test_region_to_rect() {
        let rect = Region::new(16, 32, 16, 16).to_rect();
        assert_eq!(rect.min, Vec2::new(16.0, 32.0));
        assert_eq!(rect.max, Vec2::new(32.0, 48.0));
    }
}
