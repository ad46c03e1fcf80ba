use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Prefix given to names of sheets discovered on disk
const SCANNED_NAME_PREFIX: &str = "Core_";

/// File extensions accepted as spritesheets (lowercase, no dot)
const SHEET_EXTENSIONS: [&str; 1] = ["png"];

/// One entry of the spritesheet catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub name: String,
    /// Path relative to the spritesheet directory, `/`-separated
    pub path: String,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read catalog {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to parse catalog {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("failed to scan {path}: {source}")]
    Scan {
        path: PathBuf,
        #[source]
        source: walkdir::Error,
    },
}

pub fn parse_catalog(json: &str) -> Result<Vec<CatalogEntry>, serde_json::Error> {
    serde_json::from_str(json)
}

/// Read a JSON catalog file
pub fn load_catalog<P: AsRef<Path>>(path: P) -> Result<Vec<CatalogEntry>, CatalogError> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|source| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_catalog(&json).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Build a catalog from the image files found under `dir`, sorted by path
pub fn scan_directory<P: AsRef<Path>>(dir: P) -> Result<Vec<CatalogEntry>, CatalogError> {
    let dir = dir.as_ref();
    let mut entries = Vec::new();

    for entry in WalkDir::new(dir) {
        let entry = entry.map_err(|source| CatalogError::Scan {
            path: dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() || !has_sheet_extension(entry.path()) {
            continue;
        }

        let Ok(relative) = entry.path().strip_prefix(dir) else {
            continue;
        };
        let Some(stem) = relative.file_stem() else {
            continue;
        };

        let path = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        entries.push(CatalogEntry {
            name: format!("{}{}", SCANNED_NAME_PREFIX, stem.to_string_lossy()),
            path,
        });
    }

    entries.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(entries)
}

fn has_sheet_extension(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext.to_string_lossy().to_lowercase())
        .is_some_and(|ext| SHEET_EXTENSIONS.contains(&ext.as_str()))
}
