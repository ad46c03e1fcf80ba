use bevy::prelude::*;
use std::path::PathBuf;
use std::sync::Arc;

mod canvas;
mod sheets;
mod tiles;

use canvas::CanvasPlugin;
use sheets::{SheetError, SheetGeometry, SheetPlugin};
use tiles::{TilingTable, ASSET_ROOT, SPRITESHEET_DIR};

fn main() -> AppExit {
    // Refuse to start with a tiling table that cannot address the sheets
    let (table, geometry) = match standard_tiling() {
        Ok(tiling) => tiling,
        Err(e) => {
            eprintln!("Invalid tiling configuration: {}", e);
            return AppExit::error();
        }
    };

    App::new()
        .add_plugins(DefaultPlugins.set(ImagePlugin::default_nearest()).set(WindowPlugin {
            primary_window: Some(Window {
                title: "Tilebrush".to_string(),
                ..default()
            }),
            ..default()
        }))
        .insert_resource(ClearColor(Color::srgb(0.05, 0.05, 0.06)))
        .add_plugins((
            SheetPlugin::new(
                Arc::new(table),
                geometry,
                PathBuf::from(ASSET_ROOT).join(SPRITESHEET_DIR),
            ),
            CanvasPlugin,
        ))
        .add_systems(Startup, setup_camera)
        .run()
}

fn standard_tiling() -> Result<(TilingTable, SheetGeometry), SheetError> {
    let table = TilingTable::standard()?;
    let geometry = SheetGeometry::standard();
    geometry.validate(&table)?;
    Ok((table, geometry))
}

fn setup_camera(mut commands: Commands) {
    commands.spawn((Camera2d, Transform::from_xyz(0.0, 0.0, 999.0)));
    info!("Camera ready");
}
