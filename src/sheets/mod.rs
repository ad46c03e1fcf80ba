pub mod catalog;
pub mod library;
pub mod loader;
pub mod source;
pub mod spritesheet;

// Re-export commonly used items
pub use library::{SheetId, SheetLibrary};
pub use loader::{SheetAssets, SheetLoaded};
pub use source::{FileSheetSource, SheetSource};
pub use spritesheet::{SheetError, SheetGeometry, SheetImage, Spritesheet};

use crate::tiles::TilingTable;
use bevy::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;

/// Plugin owning the spritesheet library and its background loads
pub struct SheetPlugin {
    table: Arc<TilingTable>,
    geometry: SheetGeometry,
    root: PathBuf,
}

impl SheetPlugin {
    /// `table` must already be validated against `geometry`
    pub fn new(table: Arc<TilingTable>, geometry: SheetGeometry, root: impl Into<PathBuf>) -> Self {
        Self {
            table,
            geometry,
            root: root.into(),
        }
    }
}

impl Plugin for SheetPlugin {
    fn build(&self, app: &mut App) {
        app.insert_resource(SheetLibrary::new(self.table.clone(), self.geometry))
            .insert_resource(SheetAssets(Arc::new(FileSheetSource::new(self.root.clone()))))
            .add_message::<SheetLoaded>()
            .add_systems(Startup, loader::setup_library)
            .add_systems(
                Update,
                (loader::start_sheet_loads, loader::poll_sheet_loads).chain(),
            );
    }
}
