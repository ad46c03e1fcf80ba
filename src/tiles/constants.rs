use std::time::Duration;

/// Pixel size of one tile in a source spritesheet
pub const BASE_TILE_SIZE: u32 = 16;

/// Factor applied to source tiles when drawn on the canvas
pub const TILE_SCALE: u32 = 3;

/// Display size for tiles on the canvas (16x16 scaled to 48x48)
pub const TILE_DISPLAY_SIZE: u32 = BASE_TILE_SIZE * TILE_SCALE;

/// Tiles per row in a spritesheet
pub const SHEET_COLS: u32 = 4;

/// Tile rows in a spritesheet
pub const SHEET_ROWS: u32 = 4;

/// Total number of tiles in a spritesheet
pub const SHEET_AREA: u32 = SHEET_COLS * SHEET_ROWS; // 16 tiles, one per tiling

/// Number of distinct tiling configurations (4 neighbor bits)
pub const TILING_COUNT: usize = 16;

/// Spritesheet index -> tiling bitmask (bit0 left, bit1 up, bit2 right, bit3 down).
/// Position in the array is the spritesheet index.
pub const STANDARD_TILING_TABLE: [u8; TILING_COUNT] = [
    12, // 0: right | down
    13, // 1: left | right | down
    9,  // 2: left | down
    2,  // 3: up
    14, // 4: up | right | down
    15, // 5: all four
    11, // 6: left | up | down
    4,  // 7: right
    6,  // 8: up | right
    7,  // 9: left | up | right
    3,  // 10: left | up
    1,  // 11: left
    5,  // 12: left | right
    0,  // 13: isolated
    10, // 14: up | down
    8,  // 15: down
];

/// How long a scheduled grid clear takes before the wipe happens
pub const CLEAR_DURATION: Duration = Duration::from_millis(150);

/// Padding around the canvas inside the window, in pixels
pub const CANVAS_PADDING: f32 = 16.0;

/// Z-position of painted tiles in world space
pub const TILE_Z: f32 = 1.0;

/// Z-position of the canvas background
pub const CANVAS_Z: f32 = 0.0;

/// Spritesheet directory, relative to the asset root
pub const SPRITESHEET_DIR: &str = "spritesheets";

/// Catalog file listing the available spritesheets, relative to SPRITESHEET_DIR
pub const SPRITESHEET_METADATA: &str = "metadata.json";

/// Asset root on disk
pub const ASSET_ROOT: &str = "assets";
