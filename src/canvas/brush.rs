use super::grid::{Grid, GridError, TileCell};
use crate::sheets::{SheetId, SheetLibrary};
use crate::tiles::TilePos;
use bevy::prelude::*;

/// What applying the brush does to a cell
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BrushMode {
    #[default]
    Paint,
    Erase,
}

/// Editing policy for the grid.
///
/// Holds the active mode and tileset only; the grid is passed in on every
/// application.
#[derive(Resource, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Brush {
    mode: BrushMode,
    sheet: Option<SheetId>,
}

impl Brush {
    pub fn new(mode: BrushMode, sheet: Option<SheetId>) -> Self {
        Self { mode, sheet }
    }

    pub fn mode(&self) -> BrushMode {
        self.mode
    }

    pub fn set_mode(&mut self, mode: BrushMode) {
        self.mode = mode;
    }

    pub fn sheet(&self) -> Option<SheetId> {
        self.sheet
    }

    pub fn set_sheet(&mut self, sheet: SheetId) {
        self.sheet = Some(sheet);
    }

    /// Apply the brush at `pos`, then retile every neighbor that was there
    /// before. Returns true if the grid changed.
    ///
    /// Positions outside the grid are ignored. Painting an occupied cell and
    /// painting with an unloaded tileset are no-ops.
    pub fn try_apply_at(&self, grid: &mut Grid, sheets: &SheetLibrary, pos: TilePos) -> bool {
        if !grid.contains(pos) {
            return false;
        }

        self.apply(grid, sheets, pos)
            .unwrap_or_else(|e| panic!("brush stroke at {:?} left the grid: {}", pos, e))
    }

    fn apply(&self, grid: &mut Grid, sheets: &SheetLibrary, pos: TilePos) -> Result<bool, GridError> {
        // Snapshot before mutating so the new cell is not its own neighbor
        let neighbors = grid.cardinal_neighbors(pos);

        let changed = match self.mode {
            BrushMode::Paint => self.paint(grid, sheets, pos)?,
            BrushMode::Erase => Self::erase(grid, pos)?,
        };
        if !changed {
            return Ok(false);
        }

        for (dir, neighbor) in neighbors.iter() {
            let Some(neighbor) = neighbor else {
                continue;
            };
            let neighbor_pos = pos.step(dir);
            let tiling = grid.tiling_at(neighbor_pos);
            grid.set(neighbor_pos, Some(TileCell::new(neighbor.sheet, tiling)))?;
        }

        Ok(true)
    }

    fn paint(&self, grid: &mut Grid, sheets: &SheetLibrary, pos: TilePos) -> Result<bool, GridError> {
        // First paint wins
        if grid.has_at(pos)? {
            return Ok(false);
        }

        let Some(sheet) = self.sheet.filter(|&id| sheets.is_loaded(id)) else {
            return Ok(false);
        };

        let tiling = grid.tiling_at(pos);
        grid.set(pos, Some(TileCell::new(sheet, tiling)))?;
        Ok(true)
    }

    fn erase(grid: &mut Grid, pos: TilePos) -> Result<bool, GridError> {
        if !grid.has_at(pos)? {
            return Ok(false);
        }

        grid.set(pos, None)?;
        Ok(true)
    }
}
