use super::catalog::{self, CatalogEntry};
use super::library::{SheetId, SheetLibrary};
use super::source::FileSheetSource;
use super::spritesheet::{SheetError, SheetImage, Spritesheet};
use crate::tiles::SPRITESHEET_METADATA;
use bevy::prelude::*;
use bevy::tasks::{block_on, futures_lite::future, IoTaskPool, Task};
use std::sync::Arc;

/// Source the app loads spritesheets from
#[derive(Resource, Clone)]
pub struct SheetAssets(pub Arc<FileSheetSource>);

/// Sent once a spritesheet finished loading
#[derive(Message, Debug, Clone)]
pub struct SheetLoaded {
    pub id: SheetId,
    pub locator: String,
    pub image: SheetImage,
}

/// In-flight spritesheet load
#[derive(Component)]
pub struct LoadSheetTask {
    id: SheetId,
    task: Task<(Spritesheet, Result<SheetImage, SheetError>)>,
}

/// Read the catalog (or scan the sheet directory) and register every sheet
pub fn setup_library(mut library: ResMut<SheetLibrary>, assets: Res<SheetAssets>) {
    let root = assets.0.root();
    let entries = read_catalog_entries(root);

    for entry in &entries {
        library.register_entry(entry);
    }

    if library.is_empty() {
        warn!("No spritesheets found under {}", root.display());
    } else {
        info!("Registered {} spritesheets from {}", library.len(), root.display());
    }
}

fn read_catalog_entries(root: &std::path::Path) -> Vec<CatalogEntry> {
    let metadata_path = root.join(SPRITESHEET_METADATA);
    match catalog::load_catalog(&metadata_path) {
        Ok(entries) => entries,
        Err(e) => {
            warn!("{}, scanning {} instead", e, root.display());
            catalog::scan_directory(root).unwrap_or_else(|e| {
                error!("Failed to discover spritesheets: {}", e);
                Vec::new()
            })
        }
    }
}

/// Start a background load for every sheet that has none yet
pub fn start_sheet_loads(
    mut commands: Commands,
    mut library: ResMut<SheetLibrary>,
    assets: Res<SheetAssets>,
) {
    let idle = library.idle();
    if idle.is_empty() {
        return;
    }

    let pool = IoTaskPool::get();
    for id in idle {
        let Some(mut sheet) = library.begin_load(id) else {
            continue;
        };

        debug!("Loading spritesheet {} ({})", sheet.locator(), id);
        let source = assets.0.clone();
        let task = pool.spawn(async move {
            let result = sheet.load(source.as_ref()).await;
            (sheet, result)
        });

        commands.spawn(LoadSheetTask { id, task });
    }
}

/// Move finished loads back into the library
pub fn poll_sheet_loads(
    mut commands: Commands,
    mut library: ResMut<SheetLibrary>,
    mut tasks: Query<(Entity, &mut LoadSheetTask)>,
    mut loaded: MessageWriter<SheetLoaded>,
) {
    for (entity, mut load) in tasks.iter_mut() {
        let Some((sheet, result)) = block_on(future::poll_once(&mut load.task)) else {
            continue;
        };

        let id = load.id;
        match result {
            Ok(image) => {
                info!("Loaded spritesheet {} ({})", sheet.locator(), id);
                loaded.write(SheetLoaded {
                    id,
                    locator: sheet.locator().to_string(),
                    image,
                });
                library.complete_load(id, sheet);
            }
            Err(e) => {
                error!("Error while loading spritesheets: {}", e);
                library.fail_load(id);
            }
        }

        commands.entity(entity).despawn();
    }
}
