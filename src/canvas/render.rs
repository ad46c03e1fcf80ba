use super::grid::Grid;
use super::CanvasConfig;
use crate::sheets::{SheetError, SheetId, SheetLibrary, SheetLoaded};
use crate::tiles::{Region, CANVAS_Z, TILE_Z};
use bevy::asset::RenderAssetUsages;
use bevy::math::curve::{Curve, EaseFunction};
use bevy::prelude::*;
use image::DynamicImage;
use std::collections::HashMap;

/// One tile to draw: a sheet region stretched over a square on the canvas
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DrawCommand {
    pub sheet: SheetId,
    pub source: Region,
    /// Top-left corner in canvas pixels
    pub dest: UVec2,
    pub dest_size: u32,
}

/// Draw list for every painted cell whose sheet is loaded, top row first
pub fn draw_commands(grid: &Grid, library: &SheetLibrary) -> Result<Vec<DrawCommand>, SheetError> {
    let mut commands = Vec::with_capacity(grid.len());

    for (pos, cell) in grid.cells() {
        let Some(sheet) = library.get(cell.sheet).filter(|sheet| sheet.is_loaded()) else {
            continue;
        };

        let dest = grid.tile_to_pixel(pos);
        commands.push(DrawCommand {
            sheet: cell.sheet,
            source: sheet.calculate_tile_region(cell.tiling)?,
            dest: UVec2::new(dest.x as u32, dest.y as u32),
            dest_size: grid.tile_size(),
        });
    }

    commands.sort_by_key(|command| (command.dest.y, command.dest.x));
    Ok(commands)
}

/// Canvas pixel (origin top-left, y down) to world position.
/// The canvas is centered on the world origin.
pub fn canvas_to_world(grid: &Grid, px: Vec2) -> Vec2 {
    let half = grid.size_pixels().as_vec2() / 2.0;
    Vec2::new(px.x - half.x, half.y - px.y)
}

/// World position to canvas pixel; inverse of [`canvas_to_world`]
pub fn world_to_canvas(grid: &Grid, world: Vec2) -> Vec2 {
    let half = grid.size_pixels().as_vec2() / 2.0;
    Vec2::new(world.x + half.x, half.y - world.y)
}

/// GPU textures for loaded sheets
#[derive(Resource, Default)]
pub struct SheetTextures {
    handles: HashMap<SheetId, Handle<Image>>,
}

impl SheetTextures {
    pub fn get(&self, id: SheetId) -> Option<&Handle<Image>> {
        self.handles.get(&id)
    }
}

/// Marker for sprites spawned from the grid
#[derive(Component)]
pub struct TileSprite;

/// Marker for the canvas backdrop
#[derive(Component)]
pub struct CanvasBackground;

/// Turn freshly loaded sheets into textures
pub fn upload_sheet_textures(
    mut loaded: MessageReader<SheetLoaded>,
    mut textures: ResMut<SheetTextures>,
    mut images: ResMut<Assets<Image>>,
) {
    for message in loaded.read() {
        let image = Image::from_dynamic(
            DynamicImage::ImageRgba8((*message.image).clone()),
            true,
            RenderAssetUsages::default(),
        );
        textures.handles.insert(message.id, images.add(image));
        debug!("Uploaded texture for {} ({})", message.locator, message.id);
    }
}

/// Rebuild tile sprites whenever the grid or the set of textures changes
pub fn sync_tile_sprites(
    mut commands: Commands,
    grid: Res<Grid>,
    library: Res<SheetLibrary>,
    textures: Res<SheetTextures>,
    existing_tiles: Query<Entity, With<TileSprite>>,
) {
    if !grid.is_changed() && !textures.is_changed() {
        return;
    }

    // Clear existing tile sprites
    for entity in existing_tiles.iter() {
        commands.entity(entity).despawn();
    }

    let draw_list = match draw_commands(&grid, &library) {
        Ok(draw_list) => draw_list,
        Err(e) => {
            error!("Failed to build draw list: {}", e);
            return;
        }
    };

    for command in draw_list {
        let Some(texture) = textures.get(command.sheet) else {
            continue;
        };

        let size = command.dest_size as f32;
        let center = canvas_to_world(&grid, command.dest.as_vec2() + Vec2::splat(size / 2.0));

        commands.spawn((
            TileSprite,
            Sprite {
                image: texture.clone(),
                rect: Some(command.source.to_rect()),
                custom_size: Some(Vec2::splat(size)),
                ..default()
            },
            Transform::from_xyz(center.x, center.y, TILE_Z),
        ));
    }
}

/// Shrink tiles toward their centers while a clear is pending
pub fn animate_clear(grid: Res<Grid>, mut tiles: Query<&mut Transform, With<TileSprite>>) {
    if !grid.is_clear_scheduled() {
        return;
    }

    let scale = clear_scale(grid.clear_progress());
    for mut transform in tiles.iter_mut() {
        transform.scale = Vec3::new(scale, scale, 1.0);
    }
}

/// Tile scale for a clear progress between 0 and 1
pub fn clear_scale(progress: f32) -> f32 {
    1.0 - EaseFunction::CubicIn.sample_clamped(progress)
}

/// Spawn the canvas backdrop
pub fn spawn_canvas_background(mut commands: Commands, grid: Res<Grid>, config: Res<CanvasConfig>) {
    commands.spawn((
        CanvasBackground,
        Sprite::from_color(config.background, grid.size_pixels().as_vec2()),
        Transform::from_xyz(0.0, 0.0, CANVAS_Z),
    ));
}

/// Keep the backdrop the same size as the grid
pub fn resize_canvas_background(grid: Res<Grid>, mut backgrounds: Query<&mut Sprite, With<CanvasBackground>>) {
    if !grid.is_changed() {
        return;
    }

    let size = grid.size_pixels().as_vec2();
    for mut sprite in backgrounds.iter_mut() {
        if sprite.custom_size != Some(size) {
            sprite.custom_size = Some(size);
        }
    }
}

/// Tile boundaries over the canvas
pub fn draw_grid_lines(mut gizmos: Gizmos, grid: Res<Grid>, config: Res<CanvasConfig>) {
    if !config.show_grid_lines {
        return;
    }

    let size = grid.size_pixels();
    let tile = grid.tile_size();

    for x in 0..=grid.width() {
        let px = (x * tile) as f32;
        gizmos.line_2d(
            canvas_to_world(&grid, Vec2::new(px, 0.0)),
            canvas_to_world(&grid, Vec2::new(px, size.y as f32)),
            config.grid_line,
        );
    }
    for y in 0..=grid.height() {
        let py = (y * tile) as f32;
        gizmos.line_2d(
            canvas_to_world(&grid, Vec2::new(0.0, py)),
            canvas_to_world(&grid, Vec2::new(size.x as f32, py)),
            config.grid_line,
        );
    }
}
