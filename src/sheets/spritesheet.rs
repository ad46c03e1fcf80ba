use super::source::SheetSource;
use crate::tiles::{
    Region, SsTileIndex, Tiling, TilingError, TilingTable, BASE_TILE_SIZE, SHEET_COLS, SHEET_ROWS,
    TILING_COUNT,
};
use bevy::prelude::*;
use image::RgbaImage;
use std::io;
use std::sync::Arc;
use thiserror::Error;

/// Decoded spritesheet pixels, shared with whoever draws them
pub type SheetImage = Arc<RgbaImage>;

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("failed to fetch spritesheet {locator}: {source}")]
    ResourceLoad {
        locator: String,
        #[source]
        source: io::Error,
    },
    #[error("failed to decode spritesheet {locator}: {source}")]
    Decode {
        locator: String,
        #[source]
        source: image::ImageError,
    },
    #[error("spritesheet {locator} is {actual}, expected at least {expected}")]
    TooSmall {
        locator: String,
        actual: UVec2,
        expected: UVec2,
    },
    #[error("tile {index} lies outside a sheet of {total} tiles")]
    IndexOutOfSheet { index: SsTileIndex, total: u32 },
    #[error("sheet holds {tiles} tiles but the tiling table maps {mapped}")]
    GeometryMismatch { tiles: u32, mapped: usize },
    #[error(transparent)]
    Tiling(#[from] TilingError),
}

/// Layout of tiles within a sheet
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SheetGeometry {
    /// Tiles per row
    pub cols: u32,
    pub rows: u32,
    /// Tile edge in source pixels
    pub tile_size: u32,
}

impl SheetGeometry {
    pub const fn new(cols: u32, rows: u32, tile_size: u32) -> Self {
        Self {
            cols,
            rows,
            tile_size,
        }
    }

    /// 4x4 sheet of 16px tiles
    pub const fn standard() -> Self {
        Self::new(SHEET_COLS, SHEET_ROWS, BASE_TILE_SIZE)
    }

    pub fn total_tiles(&self) -> u32 {
        self.cols * self.rows
    }

    /// Sheet size in pixels
    pub fn size_pixels(&self) -> UVec2 {
        UVec2::new(self.cols, self.rows) * self.tile_size
    }

    /// Tile position (not pixel position) of a tile index
    pub fn tile_position(&self, index: SsTileIndex) -> Result<UVec2, SheetError> {
        if index >= self.total_tiles() {
            return Err(SheetError::IndexOutOfSheet {
                index,
                total: self.total_tiles(),
            });
        }
        Ok(UVec2::new(index % self.cols, index / self.cols))
    }

    /// Pixel region of a tile index
    pub fn tile_region(&self, index: SsTileIndex) -> Result<Region, SheetError> {
        let pos = self.tile_position(index)? * self.tile_size;
        Ok(Region::new(pos.x, pos.y, self.tile_size, self.tile_size))
    }

    /// Check that every tiling lands on a tile of this sheet and that the
    /// table covers the whole sheet.
    pub fn validate(&self, table: &TilingTable) -> Result<(), SheetError> {
        if table.len() != self.total_tiles() as usize {
            return Err(SheetError::GeometryMismatch {
                tiles: self.total_tiles(),
                mapped: table.len(),
            });
        }

        for bits in 0..TILING_COUNT as i32 {
            let index = table.tile_index(Tiling::from_bits(bits)?)?;
            self.tile_position(index)?;
        }

        Ok(())
    }
}

impl Default for SheetGeometry {
    fn default() -> Self {
        Self::standard()
    }
}

/// One loadable tile-image resource.
///
/// Two sheets are the same tileset when they share a locator, regardless of
/// load state.
#[derive(Debug, Clone)]
pub struct Spritesheet {
    name: String,
    locator: String,
    image: Option<SheetImage>,
    geometry: SheetGeometry,
    table: Arc<TilingTable>,
}

impl Spritesheet {
    pub fn new(
        name: impl Into<String>,
        locator: impl Into<String>,
        geometry: SheetGeometry,
        table: Arc<TilingTable>,
    ) -> Self {
        Self {
            name: name.into(),
            locator: locator.into(),
            image: None,
            geometry,
            table,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn locator(&self) -> &str {
        &self.locator
    }

    pub fn geometry(&self) -> SheetGeometry {
        self.geometry
    }

    pub fn image(&self) -> Option<&SheetImage> {
        self.image.as_ref()
    }

    pub fn is_loaded(&self) -> bool {
        self.image.is_some()
    }

    /// Fetch and decode the sheet image.
    ///
    /// On an already loaded sheet this only warns and hands back the existing
    /// image. On failure the sheet stays unloaded.
    pub async fn load<S: SheetSource>(&mut self, source: &S) -> Result<SheetImage, SheetError> {
        if let Some(image) = &self.image {
            warn!("Spritesheet {} already loaded, ignoring load", self.locator);
            return Ok(image.clone());
        }

        let bytes = source
            .fetch(&self.locator)
            .await
            .map_err(|source| SheetError::ResourceLoad {
                locator: self.locator.clone(),
                source,
            })?;

        let image = image::load_from_memory(&bytes)
            .map_err(|source| SheetError::Decode {
                locator: self.locator.clone(),
                source,
            })?
            .into_rgba8();

        let actual = UVec2::new(image.width(), image.height());
        let expected = self.geometry.size_pixels();
        if actual.x < expected.x || actual.y < expected.y {
            return Err(SheetError::TooSmall {
                locator: self.locator.clone(),
                actual,
                expected,
            });
        }

        let image = Arc::new(image);
        self.image = Some(image.clone());
        Ok(image)
    }

    /// Source rectangle for a tile with the given tiling
    pub fn calculate_tile_region(&self, tiling: Tiling) -> Result<Region, SheetError> {
        let index = self.table.tile_index(tiling)?;
        self.geometry.tile_region(index)
    }
}

impl PartialEq for Spritesheet {
    fn eq(&self, other: &Self) -> bool {
        self.locator == other.locator
    }
}

impl Eq for Spritesheet {}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::sheets::source::MemorySheetSource;
    use bevy::tasks::block_on;
    use image::{DynamicImage, ImageFormat};
    use std::io::Cursor;

    /// PNG bytes of a blank sheet
    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let mut bytes = Vec::new();
        DynamicImage::ImageRgba8(RgbaImage::new(width, height))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    pub(crate) fn standard_sheet(locator: &str) -> Spritesheet {
        let table = Arc::new(TilingTable::standard().unwrap());
        Spritesheet::new("Core_test", locator, SheetGeometry::standard(), table)
    }

    #[test]
    fn test_load_marks_loaded() {
        let source = MemorySheetSource::default().with_file("walls.png", png_bytes(64, 64));
        let mut sheet = standard_sheet("walls.png");
        assert!(!sheet.is_loaded());

        let image = block_on(sheet.load(&source)).unwrap();
        assert!(sheet.is_loaded());
        assert_eq!(image.dimensions(), (64, 64));
    }

    #[test]
    fn test_second_load_is_noop() {
        let source = MemorySheetSource::default().with_file("walls.png", png_bytes(64, 64));
        let mut sheet = standard_sheet("walls.png");

        let first = block_on(sheet.load(&source)).unwrap();
        let second = block_on(sheet.load(&source)).unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert!(Arc::ptr_eq(&first, sheet.image().unwrap()));
        assert_eq!(source.fetch_count(), 1);
    }

    #[test]
    fn test_load_failure_leaves_sheet_unloaded() {
        let source = MemorySheetSource::default();
        let mut sheet = standard_sheet("missing.png");

        let err = block_on(sheet.load(&source)).unwrap_err();
        assert!(matches!(err, SheetError::ResourceLoad { .. }));
        assert!(!sheet.is_loaded());
    }

    #[test]
    fn test_load_rejects_garbage_and_small_images() {
        let source = MemorySheetSource::default()
            .with_file("garbage.png", b"definitely not a png".to_vec())
            .with_file("tiny.png", png_bytes(32, 32));

        let mut garbage = standard_sheet("garbage.png");
        let err = block_on(garbage.load(&source)).unwrap_err();
        assert!(matches!(err, SheetError::Decode { .. }));
        assert!(!garbage.is_loaded());

        let mut tiny = standard_sheet("tiny.png");
        let err = block_on(tiny.load(&source)).unwrap_err();
        assert!(matches!(err, SheetError::TooSmall { .. }));
        assert!(!tiny.is_loaded());
    }

    #[test]
    fn test_calculate_tile_region() {
        let sheet = standard_sheet("walls.png");

        // Isolated tile is index 13: column 1, row 3
        assert_eq!(
            sheet.calculate_tile_region(Tiling::NONE).unwrap(),
            Region::new(16, 48, 16, 16)
        );

        // Fully surrounded tile is index 5: column 1, row 1
        assert_eq!(
            sheet.calculate_tile_region(Tiling::ALL).unwrap(),
            Region::new(16, 16, 16, 16)
        );

        // right | down is index 0
        let corner = Tiling::from_bits(12).unwrap();
        assert_eq!(
            sheet.calculate_tile_region(corner).unwrap(),
            Region::new(0, 0, 16, 16)
        );
    }

    #[test]
    fn test_unmapped_tiling_region_fails() {
        let table = Arc::new(TilingTable::from_index_map([(0, 0)]).unwrap());
        let sheet = Spritesheet::new("partial", "partial.png", SheetGeometry::standard(), table);

        let err = sheet.calculate_tile_region(Tiling::ALL).unwrap_err();
        assert!(matches!(
            err,
            SheetError::Tiling(TilingError::UnmappedConfiguration(_))
        ));
    }

    #[test]
    fn test_geometry_index_bounds() {
        let geometry = SheetGeometry::standard();
        assert_eq!(geometry.tile_position(7).unwrap(), UVec2::new(3, 1));
        assert!(matches!(
            geometry.tile_position(16),
            Err(SheetError::IndexOutOfSheet { index: 16, total: 16 })
        ));
    }

    #[test]
    fn test_geometry_validate() {
        let table = TilingTable::standard().unwrap();
        assert!(SheetGeometry::standard().validate(&table).is_ok());

        // A 3x3 sheet cannot hold 16 tilings
        assert!(matches!(
            SheetGeometry::new(3, 3, 16).validate(&table),
            Err(SheetError::GeometryMismatch { tiles: 9, mapped: 16 })
        ));
    }

    #[test]
    fn test_equality_by_locator() {
        let a = standard_sheet("walls/yellow.png");
        let b = Spritesheet::new(
            "another name",
            "walls/yellow.png",
            SheetGeometry::standard(),
            Arc::new(TilingTable::standard().unwrap()),
        );
        let c = standard_sheet("walls/blue.png");

        assert_eq!(a, b);
        assert_ne!(a, c);
    }
}
