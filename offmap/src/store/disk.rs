//! Disk-backed tile store.
//!
//! One file per tile, named `{z}_{x}_{y}.png` in a flat cache directory.
//! Keeping the key as the filename means the on-disk layout is itself the
//! index: `keys()` is a directory scan and no sidecar metadata can drift out
//! of sync with the payloads.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::warn;

use crate::coord::TileCoord;

use super::{BoxFuture, StoreError, TileStore};

/// File extension for stored tile payloads.
const TILE_EXTENSION: &str = "png";

/// Disk store configuration.
#[derive(Debug, Clone)]
pub struct DiskStoreConfig {
    /// Directory holding the tile files.
    pub directory: PathBuf,
}

impl Default for DiskStoreConfig {
    fn default() -> Self {
        let directory = dirs::cache_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("offmap")
            .join("tiles");
        Self { directory }
    }
}

impl DiskStoreConfig {
    /// Use a specific tile directory.
    pub fn with_directory(mut self, directory: impl Into<PathBuf>) -> Self {
        self.directory = directory.into();
        self
    }
}

/// Persistent tile store writing one file per tile.
pub struct DiskTileStore {
    directory: PathBuf,
}

impl DiskTileStore {
    /// Create a disk store, creating the tile directory if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Directory`] if the directory cannot be created.
    pub fn new(config: DiskStoreConfig) -> Result<Self, StoreError> {
        fs::create_dir_all(&config.directory).map_err(|source| StoreError::Directory {
            path: config.directory.display().to_string(),
            source,
        })?;
        Ok(Self {
            directory: config.directory,
        })
    }

    /// The directory tiles are stored in.
    pub fn directory(&self) -> &Path {
        &self.directory
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.directory.join(format!("{key}.{TILE_EXTENSION}"))
    }

    /// Parse a directory entry filename back into a tile key.
    ///
    /// Foreign files (wrong extension, undecodable stem) yield `None` so a
    /// shared or polluted directory does not break enumeration.
    fn key_from_file_name(name: &str) -> Option<String> {
        let stem = name.strip_suffix(&format!(".{TILE_EXTENSION}"))?;
        TileCoord::from_key(stem).ok()?;
        Some(stem.to_string())
    }
}

impl TileStore for DiskTileStore {
    fn get(&self, key: &str) -> BoxFuture<'_, Result<Option<Vec<u8>>, StoreError>> {
        let path = self.path_for(key);
        Box::pin(async move {
            match tokio::fs::read(&path).await {
                Ok(data) => Ok(Some(data)),
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
                Err(e) => {
                    // Unreadable entry degrades to a miss so the caller can
                    // re-fetch it.
                    warn!(path = %path.display(), error = %e, "tile read failed, treating as miss");
                    Ok(None)
                }
            }
        })
    }

    fn set(&self, key: &str, value: Vec<u8>) -> BoxFuture<'_, Result<(), StoreError>> {
        let path = self.path_for(key);
        Box::pin(async move {
            tokio::fs::write(&path, &value).await?;
            Ok(())
        })
    }

    fn contains(&self, key: &str) -> BoxFuture<'_, Result<bool, StoreError>> {
        let path = self.path_for(key);
        Box::pin(async move { Ok(tokio::fs::try_exists(&path).await.unwrap_or(false)) })
    }

    fn keys(&self) -> BoxFuture<'_, Result<Vec<String>, StoreError>> {
        Box::pin(async move {
            let mut keys = Vec::new();
            let mut entries = tokio::fs::read_dir(&self.directory).await?;
            while let Some(entry) = entries.next_entry().await? {
                if let Some(name) = entry.file_name().to_str() {
                    if let Some(key) = Self::key_from_file_name(name) {
                        keys.push(key);
                    }
                }
            }
            Ok(keys)
        })
    }

    fn clear(&self) -> BoxFuture<'_, Result<(), StoreError>> {
        Box::pin(async move {
            let mut entries = tokio::fs::read_dir(&self.directory).await?;
            while let Some(entry) = entries.next_entry().await? {
                let name = entry.file_name();
                let Some(name) = name.to_str() else { continue };
                // Only remove files this store owns.
                if Self::key_from_file_name(name).is_some() {
                    tokio::fs::remove_file(entry.path()).await?;
                }
            }
            Ok(())
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn store_in(dir: &TempDir) -> DiskTileStore {
        let config = DiskStoreConfig::default().with_directory(dir.path());
        DiskTileStore::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_set_then_get_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.set("14_11935_7401", vec![137, 80, 78, 71]).await.unwrap();

        let value = store.get("14_11935_7401").await.unwrap();
        assert_eq!(value, Some(vec![137, 80, 78, 71]));
        assert!(dir.path().join("14_11935_7401.png").exists());
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert_eq!(store.get("10_0_0").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_contains() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        assert!(!store.contains("12_1_2").await.unwrap());
        store.set("12_1_2", vec![1]).await.unwrap();
        assert!(store.contains("12_1_2").await.unwrap());
    }

    #[tokio::test]
    async fn test_keys_skips_foreign_files() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.set("10_1_2", vec![1]).await.unwrap();
        store.set("12_3021_1605", vec![2]).await.unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"hello").unwrap();
        std::fs::write(dir.path().join("zz_bad_key.png"), b"junk").unwrap();

        let mut keys = store.keys().await.unwrap();
        keys.sort();
        assert_eq!(keys, vec!["10_1_2".to_string(), "12_3021_1605".to_string()]);
    }

    #[tokio::test]
    async fn test_clear_leaves_foreign_files() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.set("10_1_2", vec![1]).await.unwrap();
        std::fs::write(dir.path().join("notes.txt"), b"hello").unwrap();

        store.clear().await.unwrap();

        assert!(store.keys().await.unwrap().is_empty());
        assert!(dir.path().join("notes.txt").exists());
    }

    #[tokio::test]
    async fn test_set_overwrites_existing_file() {
        let dir = TempDir::new().unwrap();
        let store = store_in(&dir);

        store.set("10_1_2", vec![1]).await.unwrap();
        store.set("10_1_2", vec![9, 9]).await.unwrap();

        assert_eq!(store.get("10_1_2").await.unwrap(), Some(vec![9, 9]));
        assert_eq!(store.keys().await.unwrap().len(), 1);
    }

    #[test]
    fn test_default_config_points_at_offmap_cache() {
        let config = DiskStoreConfig::default();
        assert!(config.directory.ends_with("offmap/tiles"));
    }
}
