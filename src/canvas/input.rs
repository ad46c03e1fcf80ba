use super::brush::{Brush, BrushMode};
use super::grid::Grid;
use super::render::world_to_canvas;
use super::CanvasConfig;
use crate::sheets::{SheetId, SheetLibrary};
use bevy::input::keyboard::KeyCode;
use bevy::prelude::*;
use bevy::window::{PrimaryWindow, WindowResized};

/// Window size used when no primary window exists yet
const FALLBACK_SURFACE: Vec2 = Vec2::new(1280.0, 720.0);

/// Build the grid that fits the primary window
pub fn setup_canvas(
    mut commands: Commands,
    config: Res<CanvasConfig>,
    windows: Query<&Window, With<PrimaryWindow>>,
) {
    let surface = windows
        .single()
        .map(|window| window.size())
        .unwrap_or(FALLBACK_SURFACE);

    let grid = build_grid(&config, surface);
    info!(
        "Canvas ready: {}x{} tiles of {}px",
        grid.width(),
        grid.height(),
        grid.tile_size()
    );
    commands.insert_resource(grid);
}

fn build_grid(config: &CanvasConfig, surface: Vec2) -> Grid {
    Grid::from_surface(surface - Vec2::splat(config.padding * 2.0), config.tile_display_size)
        .with_clear_duration(config.clear_duration)
}

/// Replace the grid when the window changes how many tiles fit.
/// Painted cells do not survive a resize.
pub fn rebuild_grid_on_resize(
    mut resized: MessageReader<WindowResized>,
    config: Res<CanvasConfig>,
    mut grid: ResMut<Grid>,
) {
    let Some(event) = resized.read().last() else {
        return;
    };

    let rebuilt = build_grid(&config, Vec2::new(event.width, event.height));
    if rebuilt.size_tiles() == grid.size_tiles() {
        return;
    }

    info!(
        "Window resized, canvas is now {}x{} tiles ({} painted cells dropped)",
        rebuilt.width(),
        rebuilt.height(),
        grid.len()
    );
    *grid = rebuilt;
}

/// Pick a random tileset to start with
pub fn select_initial_sheet(library: Res<SheetLibrary>, mut brush: ResMut<Brush>) {
    if library.is_empty() {
        warn!("No tilesets registered, painting is disabled");
        return;
    }

    let id = SheetId(fastrand::usize(..library.len()));
    brush.set_sheet(id);
    if let Some(sheet) = library.get(id) {
        info!("Starting with tileset {}", sheet.name());
    }
}

/// Apply the brush under the cursor while a mouse button is held.
/// Right button erases regardless of the brush mode.
pub fn paint_with_pointer(
    mouse: Res<ButtonInput<MouseButton>>,
    windows: Query<&Window, With<PrimaryWindow>>,
    cameras: Query<(&Camera, &GlobalTransform), With<Camera2d>>,
    brush: Res<Brush>,
    library: Res<SheetLibrary>,
    mut grid: ResMut<Grid>,
) {
    let stroke = if mouse.pressed(MouseButton::Right) {
        Brush::new(BrushMode::Erase, brush.sheet())
    } else if mouse.pressed(MouseButton::Left) {
        *brush
    } else {
        return;
    };

    let Ok(window) = windows.single() else {
        return;
    };
    let Some(cursor) = window.cursor_position() else {
        return;
    };
    let Ok((camera, camera_transform)) = cameras.single() else {
        return;
    };
    let Ok(world) = camera.viewport_to_world_2d(camera_transform, cursor) else {
        return;
    };

    let px = world_to_canvas(&grid, world);
    if !on_canvas(&grid, px) {
        return;
    }

    let pos = grid.pixel_to_tile(px);
    // Only flag the grid as changed when the stroke did something
    if stroke.try_apply_at(grid.bypass_change_detection(), &library, pos) {
        debug!("{:?} at ({}, {})", stroke.mode(), pos.x, pos.y);
        grid.set_changed();
    }
}

fn on_canvas(grid: &Grid, px: Vec2) -> bool {
    let size = grid.size_pixels().as_vec2();
    px.x >= 0.0 && px.y >= 0.0 && px.x < size.x && px.y < size.y
}

/// B paint, E erase, C clear, Tab next tileset
pub fn handle_hotkeys(
    keyboard: Res<ButtonInput<KeyCode>>,
    library: Res<SheetLibrary>,
    mut brush: ResMut<Brush>,
    mut grid: ResMut<Grid>,
) {
    if keyboard.just_pressed(KeyCode::KeyB) {
        brush.set_mode(BrushMode::Paint);
        info!("Brush: paint");
    }
    if keyboard.just_pressed(KeyCode::KeyE) {
        brush.set_mode(BrushMode::Erase);
        info!("Brush: erase");
    }
    if keyboard.just_pressed(KeyCode::KeyC) && !grid.is_clear_scheduled() {
        grid.clear();
        info!("Clearing canvas");
    }
    if keyboard.just_pressed(KeyCode::Tab) {
        if let Some(id) = next_loaded_sheet(&library, brush.sheet()) {
            brush.set_sheet(id);
            if let Some(sheet) = library.get(id) {
                info!("Tileset: {}", sheet.name());
            }
        }
    }
}

/// Next tileset after `current` that can be painted with, wrapping around
fn next_loaded_sheet(library: &SheetLibrary, current: Option<SheetId>) -> Option<SheetId> {
    let mut candidate = current;
    for _ in 0..library.len() {
        candidate = library.next_after(candidate);
        match candidate {
            Some(id) if library.is_loaded(id) => return Some(id),
            Some(_) => continue,
            None => return None,
        }
    }
    None
}

/// Advance a pending clear; the grid only reports a change when it is wiped
pub fn tick_scheduled_clear(time: Res<Time>, mut grid: ResMut<Grid>) {
    if !grid.is_clear_scheduled() {
        return;
    }

    if grid.bypass_change_detection().tick(time.delta()) {
        grid.set_changed();
        info!("Canvas cleared");
    }
}

/// Mirror the brush state in the window title
pub fn update_window_title(
    brush: Res<Brush>,
    library: Res<SheetLibrary>,
    mut windows: Query<&mut Window, With<PrimaryWindow>>,
) {
    if !brush.is_changed() && !library.is_changed() {
        return;
    }
    let Ok(mut window) = windows.single_mut() else {
        return;
    };

    let title = window_title(&brush, &library);
    if window.title != title {
        window.title = title;
    }
}

fn window_title(brush: &Brush, library: &SheetLibrary) -> String {
    let mode = match brush.mode() {
        BrushMode::Paint => "Paint",
        BrushMode::Erase => "Erase",
    };
    let sheet = brush
        .sheet()
        .and_then(|id| library.get(id).map(|sheet| (id, sheet)))
        .map(|(id, sheet)| {
            if library.is_loaded(id) {
                sheet.name().to_string()
            } else {
                format!("{} (loading)", sheet.name())
            }
        })
        .unwrap_or_else(|| "no tileset".to_string());

    format!("Tilebrush - {} - {}", mode, sheet)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::grid::TileCell;
    use crate::sheets::source::MemorySheetSource;
    use crate::sheets::spritesheet::tests::png_bytes;
    use crate::sheets::SheetGeometry;
    use crate::tiles::{TilePos, Tiling, TilingTable};
    use bevy::tasks::block_on;
    use std::sync::Arc;
    use std::time::Duration;

    /// Three sheets; only the first and last are loaded
    fn library() -> SheetLibrary {
        let source = MemorySheetSource::default()
            .with_file("a.png", png_bytes(64, 64))
            .with_file("c.png", png_bytes(64, 64));
        let mut library = SheetLibrary::new(
            Arc::new(TilingTable::standard().unwrap()),
            SheetGeometry::standard(),
        );
        for (name, locator) in [("Core_A", "a.png"), ("Core_B", "b.png"), ("Core_C", "c.png")] {
            library.register(name, locator);
        }
        for id in [SheetId(0), SheetId(2)] {
            let mut sheet = library.begin_load(id).unwrap();
            block_on(sheet.load(&source)).unwrap();
            library.complete_load(id, sheet);
        }
        library
    }

    #[test]
    fn test_next_loaded_sheet_skips_unloaded() {
        let library = library();
        assert_eq!(next_loaded_sheet(&library, None), Some(SheetId(0)));
        assert_eq!(next_loaded_sheet(&library, Some(SheetId(0))), Some(SheetId(2)));
        assert_eq!(next_loaded_sheet(&library, Some(SheetId(2))), Some(SheetId(0)));
    }

    #[test]
    fn test_next_loaded_sheet_none_loaded() {
        let mut library = SheetLibrary::new(
            Arc::new(TilingTable::standard().unwrap()),
            SheetGeometry::standard(),
        );
        assert_eq!(next_loaded_sheet(&library, None), None);

        library.register("Core_B", "b.png");
        assert_eq!(next_loaded_sheet(&library, None), None);
    }

    #[test]
    fn test_build_grid_leaves_padding() {
        let config = CanvasConfig::default();
        let grid = build_grid(&config, Vec2::new(1280.0, 720.0));

        // (1280 - 32) / 48 = 26, (720 - 32) / 48 = 14.33
        assert_eq!(grid.size_tiles(), UVec2::new(26, 14));
        assert_eq!(grid.tile_size(), 48);
    }

    #[test]
    fn test_build_grid_tiny_window() {
        let config = CanvasConfig::default();
        let grid = build_grid(&config, Vec2::new(20.0, 20.0));
        assert_eq!(grid.size_tiles(), UVec2::ZERO);
        assert!(!grid.contains(TilePos::new(0, 0)));
    }

    #[test]
    fn test_on_canvas() {
        let grid = Grid::new(UVec2::new(2, 2), 48);
        assert!(on_canvas(&grid, Vec2::ZERO));
        assert!(on_canvas(&grid, Vec2::new(95.9, 95.9)));
        assert!(!on_canvas(&grid, Vec2::new(96.0, 10.0)));
        assert!(!on_canvas(&grid, Vec2::new(-0.5, 10.0)));
    }

    #[test]
    fn test_window_title() {
        let library = library();
        let mut brush = Brush::new(BrushMode::Paint, Some(SheetId(0)));
        assert_eq!(window_title(&brush, &library), "Tilebrush - Paint - Core_A");

        brush.set_mode(BrushMode::Erase);
        brush.set_sheet(SheetId(1));
        assert_eq!(window_title(&brush, &library), "Tilebrush - Erase - Core_B (loading)");

        assert_eq!(
            window_title(&Brush::default(), &library),
            "Tilebrush - Paint - no tileset"
        );
    }

    #[test]
    fn test_scheduled_clear_through_app() {
        let mut app = App::new();
        app.insert_resource(Time::<()>::default())
            .insert_resource(Grid::new(UVec2::new(3, 3), 48))
            .add_systems(Update, tick_scheduled_clear);

        {
            let mut grid = app.world_mut().resource_mut::<Grid>();
            grid.set(TilePos::new(1, 1), Some(TileCell::new(SheetId(0), Tiling::NONE)))
                .unwrap();
            grid.clear();
        }

        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_millis(100));
        app.update();
        assert_eq!(app.world().resource::<Grid>().len(), 1);

        app.world_mut()
            .resource_mut::<Time>()
            .advance_by(Duration::from_millis(60));
        app.update();
        let grid = app.world().resource::<Grid>();
        assert!(grid.is_empty());
        assert!(!grid.is_clear_scheduled());
    }
}
