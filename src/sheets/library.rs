use super::catalog::CatalogEntry;
use super::spritesheet::{SheetGeometry, Spritesheet};
use crate::tiles::TilingTable;
use bevy::prelude::*;
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// Handle to a spritesheet registered in a [`SheetLibrary`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SheetId(pub usize);

impl fmt::Display for SheetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sheet#{}", self.0)
    }
}

/// Every spritesheet known to the session, plus load bookkeeping.
///
/// Sheets are deduplicated by locator. A sheet is loaded at most once: it is
/// either idle, pending, loaded, or failed for good.
#[derive(Resource, Debug)]
pub struct SheetLibrary {
    sheets: Vec<Spritesheet>,
    pending: HashSet<SheetId>,
    failed: HashSet<SheetId>,
    geometry: SheetGeometry,
    table: Arc<TilingTable>,
}

impl SheetLibrary {
    pub fn new(table: Arc<TilingTable>, geometry: SheetGeometry) -> Self {
        Self {
            sheets: Vec::new(),
            pending: HashSet::new(),
            failed: HashSet::new(),
            geometry,
            table,
        }
    }

    /// Register a sheet, or return the id of the one already using this locator
    pub fn register(&mut self, name: &str, locator: &str) -> SheetId {
        if let Some(id) = self.find_by_locator(locator) {
            debug!("Spritesheet {} already registered as {}", locator, id);
            return id;
        }

        let id = SheetId(self.sheets.len());
        self.sheets.push(Spritesheet::new(
            name,
            locator,
            self.geometry,
            self.table.clone(),
        ));
        id
    }

    pub fn register_entry(&mut self, entry: &CatalogEntry) -> SheetId {
        self.register(&entry.name, &entry.path)
    }

    pub fn find_by_locator(&self, locator: &str) -> Option<SheetId> {
        self.sheets
            .iter()
            .position(|sheet| sheet.locator() == locator)
            .map(SheetId)
    }

    pub fn get(&self, id: SheetId) -> Option<&Spritesheet> {
        self.sheets.get(id.0)
    }

    pub fn is_loaded(&self, id: SheetId) -> bool {
        self.get(id).is_some_and(Spritesheet::is_loaded)
    }

    pub fn is_pending(&self, id: SheetId) -> bool {
        self.pending.contains(&id)
    }

    pub fn has_failed(&self, id: SheetId) -> bool {
        self.failed.contains(&id)
    }

    pub fn ids(&self) -> impl Iterator<Item = SheetId> + '_ {
        (0..self.sheets.len()).map(SheetId)
    }

    pub fn len(&self) -> usize {
        self.sheets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sheets.is_empty()
    }

    /// Next sheet after `id`, wrapping around
    pub fn next_after(&self, id: Option<SheetId>) -> Option<SheetId> {
        if self.sheets.is_empty() {
            return None;
        }
        let next = id.map_or(0, |id| (id.0 + 1) % self.sheets.len());
        Some(SheetId(next))
    }

    /// Sheets that still need a load started
    pub fn idle(&self) -> Vec<SheetId> {
        self.ids()
            .filter(|&id| !self.is_loaded(id) && !self.is_pending(id) && !self.has_failed(id))
            .collect()
    }

    /// Mark a sheet as loading and hand out a copy to load.
    /// Returns `None` if the sheet is loaded, already loading, or failed before.
    pub fn begin_load(&mut self, id: SheetId) -> Option<Spritesheet> {
        let sheet = self.get(id)?;
        if sheet.is_loaded() {
            warn!("Spritesheet {} already loaded", sheet.locator());
            return None;
        }
        if self.is_pending(id) || self.has_failed(id) {
            return None;
        }

        let sheet = sheet.clone();
        self.pending.insert(id);
        Some(sheet)
    }

    /// Store a sheet whose load finished
    pub fn complete_load(&mut self, id: SheetId, sheet: Spritesheet) {
        self.pending.remove(&id);
        match self.sheets.get_mut(id.0) {
            Some(slot) if *slot == sheet && !slot.is_loaded() => *slot = sheet,
            Some(slot) => warn!(
                "Discarding load of {} for {}, slot holds {}",
                sheet.locator(),
                id,
                slot.locator()
            ),
            None => warn!("Discarding load of {} for unknown {}", sheet.locator(), id),
        }
    }

    /// Record a failed load. The sheet is never retried.
    pub fn fail_load(&mut self, id: SheetId) {
        self.pending.remove(&id);
        self.failed.insert(id);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sheets::source::MemorySheetSource;
    use crate::sheets::spritesheet::tests::png_bytes;
    use bevy::tasks::block_on;

    fn library() -> SheetLibrary {
        SheetLibrary::new(
            Arc::new(TilingTable::standard().unwrap()),
            SheetGeometry::standard(),
        )
    }

    #[test]
    fn test_register_dedups_by_locator() {
        let mut library = library();
        let a = library.register("Core_Yellow", "walls/yellow.png");
        let b = library.register("Core_Blue", "walls/blue.png");
        let again = library.register("Yellow again", "walls/yellow.png");

        assert_ne!(a, b);
        assert_eq!(a, again);
        assert_eq!(library.len(), 2);
        assert_eq!(library.get(a).unwrap().name(), "Core_Yellow");
    }

    #[test]
    fn test_load_lifecycle() {
        let source = MemorySheetSource::default().with_file("walls.png", png_bytes(64, 64));
        let mut library = library();
        let id = library.register("Core_Walls", "walls.png");
        assert_eq!(library.idle(), vec![id]);

        let mut sheet = library.begin_load(id).unwrap();
        assert!(library.is_pending(id));
        assert!(library.idle().is_empty());

        // Second request while pending is refused
        assert!(library.begin_load(id).is_none());

        block_on(sheet.load(&source)).unwrap();
        library.complete_load(id, sheet);

        assert!(library.is_loaded(id));
        assert!(!library.is_pending(id));
        assert!(library.begin_load(id).is_none());
    }

    #[test]
    fn test_failed_load_is_not_retried() {
        let mut library = library();
        let id = library.register("Core_Missing", "missing.png");

        assert!(library.begin_load(id).is_some());
        library.fail_load(id);

        assert!(library.has_failed(id));
        assert!(!library.is_loaded(id));
        assert!(library.begin_load(id).is_none());
        assert!(library.idle().is_empty());
    }

    #[test]
    fn test_next_after_wraps() {
        let mut library = library();
        assert_eq!(library.next_after(None), None);

        let a = library.register("a", "a.png");
        let b = library.register("b", "b.png");

        assert_eq!(library.next_after(None), Some(a));
        assert_eq!(library.next_after(Some(a)), Some(b));
        assert_eq!(library.next_after(Some(b)), Some(a));
    }
}
