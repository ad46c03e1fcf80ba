use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};

/// Where spritesheet bytes come from. `locator` is the sheet's path
/// relative to the source root.
pub trait SheetSource: Send + Sync + 'static {
    fn fetch(&self, locator: &str) -> impl Future<Output = io::Result<Vec<u8>>> + Send;
}

/// Reads spritesheets from a directory on disk
#[derive(Debug, Clone)]
pub struct FileSheetSource {
    root: PathBuf,
}

impl FileSheetSource {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn resolve(&self, locator: &str) -> PathBuf {
        self.root.join(locator)
    }
}

impl SheetSource for FileSheetSource {
    fn fetch(&self, locator: &str) -> impl Future<Output = io::Result<Vec<u8>>> + Send {
        let path = self.resolve(locator);
        async move { std::fs::read(path) }
    }
}

/// In-memory source for tests
#[cfg(test)]
#[derive(Debug, Default)]
pub struct MemorySheetSource {
    files: std::collections::HashMap<String, Vec<u8>>,
    fetches: std::sync::atomic::AtomicUsize,
}

#[cfg(test)]
impl MemorySheetSource {
    pub fn with_file(mut self, locator: &str, bytes: Vec<u8>) -> Self {
        self.files.insert(locator.to_string(), bytes);
        self
    }

    /// How many times `fetch` was called
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(std::sync::atomic::Ordering::SeqCst)
    }
}

#[cfg(test)]
impl SheetSource for MemorySheetSource {
    fn fetch(&self, locator: &str) -> impl Future<Output = io::Result<Vec<u8>>> + Send {
        self.fetches
            .fetch_add(1, std::sync::atomic::Ordering::SeqCst);
        let result = self.files.get(locator).cloned().ok_or_else(|| {
            io::Error::new(io::ErrorKind::NotFound, format!("no such sheet: {locator}"))
        });
        async move { result }
    }
}
