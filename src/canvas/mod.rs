pub mod brush;
pub mod grid;
pub mod input;
pub mod render;

pub use brush::{Brush, BrushMode};
pub use grid::Grid;
pub use render::SheetTextures;

use crate::sheets::loader::setup_library;
use crate::tiles::{CANVAS_PADDING, CLEAR_DURATION, TILE_DISPLAY_SIZE};
use bevy::prelude::*;
use std::time::Duration;

/// Plugin for the paintable canvas: grid, brush, pointer input and tile sprites
pub struct CanvasPlugin;

impl Plugin for CanvasPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<CanvasConfig>()
            .init_resource::<Brush>()
            .init_resource::<SheetTextures>()
            .add_systems(
                Startup,
                (
                    (input::setup_canvas, render::spawn_canvas_background).chain(),
                    input::select_initial_sheet.after(setup_library),
                ),
            )
            .add_systems(
                Update,
                (
                    input::rebuild_grid_on_resize,
                    input::handle_hotkeys,
                    input::paint_with_pointer,
                    input::tick_scheduled_clear,
                    render::upload_sheet_textures,
                    render::sync_tile_sprites,
                    render::animate_clear,
                    render::resize_canvas_background,
                    render::draw_grid_lines,
                    input::update_window_title,
                )
                    .chain(),
            );
    }
}

/// Configuration for the canvas
#[derive(Resource, Debug, Clone)]
pub struct CanvasConfig {
    /// Edge length of a tile on screen, in pixels
    pub tile_display_size: u32,
    /// Delay between a clear request and the wipe
    pub clear_duration: Duration,
    /// Space kept free around the canvas inside the window
    pub padding: f32,
    pub background: Color,
    pub grid_line: Color,
    pub show_grid_lines: bool,
}

impl Default for CanvasConfig {
    fn default() -> Self {
        Self {
            tile_display_size: TILE_DISPLAY_SIZE,
            clear_duration: CLEAR_DURATION,
            padding: CANVAS_PADDING,
            background: Color::srgb(0.12, 0.12, 0.14),
            grid_line: Color::srgba(1.0, 1.0, 1.0, 0.06),
            show_grid_lines: true,
        }
    }
}
