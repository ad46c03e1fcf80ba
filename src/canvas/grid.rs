use crate::sheets::SheetId;
use crate::tiles::{Cardinal, CardinalDirection, GridIndex, TilePos, Tiling, CLEAR_DURATION};
use bevy::prelude::*;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// A painted cell: which sheet it is drawn from and how it tiles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TileCell {
    pub sheet: SheetId,
    pub tiling: Tiling,
}

impl TileCell {
    pub const fn new(sheet: SheetId, tiling: Tiling) -> Self {
        Self { sheet, tiling }
    }
}

/// How a grid operation addressed a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CellRef {
    Position(TilePos),
    Index(GridIndex),
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellRef::Position(pos) => write!(f, "tile position ({}, {})", pos.x, pos.y),
            CellRef::Index(index) => write!(f, "grid index {}", index),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum GridError {
    #[error("{cell} outside {width}x{height} grid")]
    OutOfBounds {
        cell: CellRef,
        width: u32,
        height: u32,
    },
}

/// Sparse grid of painted tiles.
///
/// Cells live in a row-major index space over `width * height`; empty cells
/// have no entry. The size is fixed, a resized canvas needs a new grid.
#[derive(Resource, Debug, Clone)]
pub struct Grid {
    size_tiles: UVec2,
    tile_size: u32,
    cells: HashMap<GridIndex, TileCell>,
    clear_duration: Duration,
    pending_clear: Option<Timer>,
}

impl Grid {
    pub fn new(size_tiles: UVec2, tile_size: u32) -> Self {
        Self {
            size_tiles,
            tile_size,
            cells: HashMap::new(),
            clear_duration: CLEAR_DURATION,
            pending_clear: None,
        }
    }

    /// Fit as many whole tiles as possible into a drawing surface
    pub fn from_surface(surface_px: Vec2, tile_size: u32) -> Self {
        let tiles = (surface_px.max(Vec2::ZERO) / tile_size as f32).floor();
        Self::new(UVec2::new(tiles.x as u32, tiles.y as u32), tile_size)
    }

    pub fn with_clear_duration(mut self, duration: Duration) -> Self {
        self.clear_duration = duration;
        self
    }

    pub fn size_tiles(&self) -> UVec2 {
        self.size_tiles
    }

    /// Grid size in pixels, always a whole number of tiles
    pub fn size_pixels(&self) -> UVec2 {
        self.size_tiles * self.tile_size
    }

    pub fn tile_size(&self) -> u32 {
        self.tile_size
    }

    pub fn width(&self) -> u32 {
        self.size_tiles.x
    }

    pub fn height(&self) -> u32 {
        self.size_tiles.y
    }

    /// Number of painted cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn contains(&self, pos: TilePos) -> bool {
        (0..self.width() as i32).contains(&pos.x) && (0..self.height() as i32).contains(&pos.y)
    }

    pub fn contains_index(&self, index: GridIndex) -> bool {
        index < (self.width() as usize) * (self.height() as usize)
    }

    pub fn pos_to_index(&self, pos: TilePos) -> Result<GridIndex, GridError> {
        if !self.contains(pos) {
            return Err(self.out_of_bounds(CellRef::Position(pos)));
        }
        Ok(pos.y as usize * self.width() as usize + pos.x as usize)
    }

    pub fn index_to_pos(&self, index: GridIndex) -> Result<TilePos, GridError> {
        if !self.contains_index(index) {
            return Err(self.out_of_bounds(CellRef::Index(index)));
        }
        let width = self.width() as usize;
        Ok(TilePos::new((index % width) as i32, (index / width) as i32))
    }

    /// Tile under a pixel position relative to the grid's top-left corner.
    /// The result may lie outside the grid.
    pub fn pixel_to_tile(&self, px: Vec2) -> TilePos {
        let tile = (px / self.tile_size as f32).floor();
        TilePos::new(tile.x as i32, tile.y as i32)
    }

    /// Top-left pixel of a tile
    pub fn tile_to_pixel(&self, pos: TilePos) -> IVec2 {
        IVec2::from(pos) * self.tile_size as i32
    }

    pub fn get(&self, pos: TilePos) -> Result<Option<&TileCell>, GridError> {
        let index = self.pos_to_index(pos)?;
        Ok(self.cells.get(&index))
    }

    pub fn get_at_index(&self, index: GridIndex) -> Result<Option<&TileCell>, GridError> {
        self.check_index(index)?;
        Ok(self.cells.get(&index))
    }

    /// Insert or overwrite a cell; `None` removes it
    pub fn set(&mut self, pos: TilePos, cell: Option<TileCell>) -> Result<(), GridError> {
        let index = self.pos_to_index(pos)?;
        self.write(index, cell);
        Ok(())
    }

    pub fn set_at_index(
        &mut self,
        index: GridIndex,
        cell: Option<TileCell>,
    ) -> Result<(), GridError> {
        self.check_index(index)?;
        self.write(index, cell);
        Ok(())
    }

    pub fn has_at(&self, pos: TilePos) -> Result<bool, GridError> {
        Ok(self.get(pos)?.is_some())
    }

    pub fn has_at_index(&self, index: GridIndex) -> Result<bool, GridError> {
        Ok(self.get_at_index(index)?.is_some())
    }

    /// Cells next to `pos`. Neighbors past the grid edge are empty.
    pub fn cardinal_neighbors(&self, pos: TilePos) -> Cardinal<Option<TileCell>> {
        Cardinal::from_fn(|dir| self.neighbor(pos, dir))
    }

    fn neighbor(&self, pos: TilePos, dir: CardinalDirection) -> Option<TileCell> {
        self.get(pos.step(dir)).ok().flatten().copied()
    }

    /// Tiling a cell at `pos` should have given the current neighbors
    pub fn tiling_at(&self, pos: TilePos) -> Tiling {
        Tiling::encode(self.cardinal_neighbors(pos).presence())
    }

    /// Painted cells in no particular order
    pub fn cells(&self) -> impl Iterator<Item = (TilePos, &TileCell)> + '_ {
        let width = self.width() as usize;
        self.cells.iter().map(move |(&index, cell)| {
            (
                TilePos::new((index % width) as i32, (index / width) as i32),
                cell,
            )
        })
    }

    /// Schedule a wipe of every cell after the clear duration.
    /// Does nothing if a wipe is already scheduled.
    pub fn clear(&mut self) {
        if self.pending_clear.is_some() {
            return;
        }
        self.pending_clear = Some(Timer::new(self.clear_duration, TimerMode::Once));
    }

    pub fn is_clear_scheduled(&self) -> bool {
        self.pending_clear.is_some()
    }

    /// Progress of the scheduled clear from 0 to 1, 0 when none is scheduled
    pub fn clear_progress(&self) -> f32 {
        self.pending_clear.as_ref().map_or(0.0, Timer::fraction)
    }

    /// Advance a scheduled clear. Returns true if the grid was wiped.
    pub fn tick(&mut self, delta: Duration) -> bool {
        let Some(timer) = self.pending_clear.as_mut() else {
            return false;
        };

        timer.tick(delta);
        if !timer.just_finished() {
            return false;
        }

        self.cells.clear();
        self.pending_clear = None;
        true
    }

    fn write(&mut self, index: GridIndex, cell: Option<TileCell>) {
        match cell {
            Some(cell) => {
                self.cells.insert(index, cell);
            }
            None => {
                self.cells.remove(&index);
            }
        }
    }

    fn check_index(&self, index: GridIndex) -> Result<(), GridError> {
        if self.contains_index(index) {
            Ok(())
        } else {
            Err(self.out_of_bounds(CellRef::Index(index)))
        }
    }

    fn out_of_bounds(&self, cell: CellRef) -> GridError {
        GridError::OutOfBounds {
            cell,
            width: self.width(),
            height: self.height(),
        }
    }
}
