//! A centralized module for the small JSON blobs the application persists.
//!
//! Each blob lives under a fixed key and is stored as `<key>.json` in the
//! data directory. Writes replace the whole file.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};

/// Environment variable that overrides the data directory.
pub const DATA_DIR_ENV: &str = "NUCLEO_DATA_DIR";

/// A trait for types that are persisted under a fixed storage key.
pub trait Storable: Serialize + DeserializeOwned {
    /// The storage key, used as the file stem.
    const KEY: &'static str;
}

/// Loads and saves `Storable` values inside one directory.
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    /// Opens (and creates if needed) the store at `root`.
    pub fn open<P: AsRef<Path>>(root: P) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        std::fs::create_dir_all(&root)
            .with_context(|| format!("Failed to create data directory {}", root.display()))?;
        Ok(Self { root })
    }

    /// Resolves the data directory: `$NUCLEO_DATA_DIR`, then the explicit
    /// override, then the platform data dir.
    pub fn resolve_root(explicit: Option<&Path>) -> PathBuf {
        if let Some(dir) = std::env::var_os(DATA_DIR_ENV).filter(|v| !v.is_empty()) {
            return PathBuf::from(dir);
        }
        if let Some(dir) = explicit {
            return dir.to_path_buf();
        }
        dirs::data_dir()
            .unwrap_or_else(std::env::temp_dir)
            .join("nucleo")
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Gets the full path for a given key.
    pub fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    /// Saves a `Storable` item to its corresponding file.
    pub fn save<T: Storable>(&self, item: &T) -> Result<()> {
        let path = self.path_for(T::KEY);
        let content = serde_json::to_string_pretty(item)?;
        std::fs::write(&path, content)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        log::debug!("stored {} ({})", T::KEY, path.display());
        Ok(())
    }

    /// Loads a `Storable` item from its file, if it exists.
    pub fn load<T: Storable>(&self) -> Result<Option<T>> {
        let path = self.path_for(T::KEY);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        let item = serde_json::from_str(&content)
            .with_context(|| format!("Corrupt data in {}", path.display()))?;
        Ok(Some(item))
    }

    /// Deletes the file behind a key. Missing files are not an error.
    pub fn remove<T: Storable>(&self) -> Result<()> {
        let path = self.path_for(T::KEY);
        match std::fs::remove_file(&path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("Failed to remove {}", path.display())),
        }
    }
}
