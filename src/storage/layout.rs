use std::path::{Path, PathBuf};
use std::fs;
use crate::core::error::Result;
use crate::storage::table::TableId;

/// Directory structure for a store
#[derive(Debug, Clone)]
pub struct StorageLayout {
    pub base_dir: PathBuf,      // Root directory
    pub tables_dir: PathBuf,    // Row data (.tbl files)
    pub meta_dir: PathBuf,      // Node catalog
}

impl StorageLayout {
    /// Create the directory tree if it is missing.
    pub fn create(base_dir: PathBuf) -> Result<Self> {
        let layout = Self::at(base_dir);

        fs::create_dir_all(&layout.tables_dir)?;
        fs::create_dir_all(&layout.meta_dir)?;

        Ok(layout)
    }

    /// Describe an existing tree without touching the filesystem.
    pub fn at(base_dir: PathBuf) -> Self {
        StorageLayout {
            tables_dir: base_dir.join("tables"),
            meta_dir: base_dir.join("meta"),
            base_dir,
        }
    }

    pub fn table_path(&self, id: &TableId) -> PathBuf {
        self.tables_dir.join(format!("{}.tbl", id.0))
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.meta_dir.join("catalog.bin")
    }

    pub fn lock_path(&self) -> PathBuf {
        self.base_dir.join(".lock")
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }
}
