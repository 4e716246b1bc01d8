// # File Registry Store
//
// File-based implementation of RegistryStore.
//
// ## Purpose
//
// The registry file is hand-edited and version controlled, so the store
// must never leave it half written and must never silently replace it
// with something else.
//
// ## Write Path
//
// - Atomic writes: serialize to `<path>.tmp`, then rename over the original
// - Backup: the previous file is copied to `<path>.backup` before the rename
// - Stable output: pretty-printed JSON with a trailing newline, key order preserved
//
// ## Read Path
//
// A missing or unparseable registry is an error. There is no fallback to
// the backup or to an empty registry; the backup exists for a human to
// restore from.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::Error;
use crate::model::Registry;
use crate::traits::registry_store::RegistryStore;

/// File-based registry store with atomic writes
///
/// # Example
///
/// ```rust,no_run
/// use v6probe_core::store::FileRegistryStore;
/// use v6probe_core::traits::RegistryStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileRegistryStore::new("data/endpoints.json");
///
///     let registry = store.load().await?;
///     store.save(&registry).await?;
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileRegistryStore {
    path: PathBuf,
}

impl FileRegistryStore {
    /// Create a store for the registry file at `path`
    ///
    /// Nothing is read until [`RegistryStore::load`] is called.
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Serialize a registry the way it is written to disk
    pub fn render(registry: &Registry) -> Result<String, Error> {
        let mut json = serde_json::to_string_pretty(registry)
            .map_err(|e| Error::store(format!("Failed to serialize registry: {}", e)))?;
        json.push('\n');
        Ok(json)
    }

    /// `<path>.tmp`, the staging file for atomic writes
    fn temp_path(&self) -> PathBuf {
        with_suffix(&self.path, ".tmp")
    }

    /// `<path>.backup`, the previous version of the registry
    fn backup_path(path: &Path) -> PathBuf {
        with_suffix(path, ".backup")
    }

    async fn write_temp(temp_path: &Path, json: &str) -> Result<(), Error> {
        let mut file = fs::File::create(temp_path).await.map_err(|e| {
            Error::store(format!(
                "Failed to create temp file {}: {}",
                temp_path.display(),
                e
            ))
        })?;

        file.write_all(json.as_bytes()).await.map_err(|e| {
            Error::store(format!(
                "Failed to write to temp file {}: {}",
                temp_path.display(),
                e
            ))
        })?;

        file.flush().await.map_err(|e| {
            Error::store(format!(
                "Failed to flush temp file {}: {}",
                temp_path.display(),
                e
            ))
        })
    }

    /// Remove a temp file left behind by a failed write
    async fn discard(temp_path: &Path) {
        if let Err(e) = fs::remove_file(temp_path).await
            && e.kind() != std::io::ErrorKind::NotFound
        {
            tracing::warn!("Failed to remove {}: {}", temp_path.display(), e);
        }
    }
}

fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut name = path.as_os_str().to_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

#[async_trait]
impl RegistryStore for FileRegistryStore {
    async fn load(&self) -> Result<Registry, Error> {
        let content = fs::read_to_string(&self.path).await.map_err(|e| {
            Error::store(format!(
                "Failed to read registry file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        let registry: Registry = serde_json::from_str(&content).map_err(|e| {
            Error::store(format!(
                "Failed to parse registry file {}: {}",
                self.path.display(),
                e
            ))
        })?;

        tracing::debug!(
            "Loaded registry from {}: {} endpoints",
            self.path.display(),
            registry.endpoints.len()
        );
        Ok(registry)
    }

    async fn save(&self, registry: &Registry) -> Result<(), Error> {
        let json = Self::render(registry)?;

        // Write to temporary file first
        let temp_path = self.temp_path();
        if let Err(e) = Self::write_temp(&temp_path, &json).await {
            Self::discard(&temp_path).await;
            return Err(e);
        }

        if fs::try_exists(&self.path).await.unwrap_or(false) {
            let backup_path = Self::backup_path(&self.path);
            if let Err(e) = fs::copy(&self.path, &backup_path).await {
                tracing::warn!("Failed to create backup: {}", e);
            }
        }

        if let Err(e) = fs::rename(&temp_path, &self.path).await {
            Self::discard(&temp_path).await;
            return Err(Error::store(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            )));
        }

        tracing::info!("Registry written to {}", self.path.display());
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Endpoint, Status};
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_file_store_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("endpoints.json");
        let store = FileRegistryStore::new(&path);

        let registry = Registry::new(vec![
            Endpoint::new("example", "Example", "https://example.com").with_status(Status::Full),
        ]);
        store.save(&registry).await.unwrap();

        let loaded = store.load().await.unwrap();
        assert_eq!(loaded, registry);
        assert!(!store.temp_path().exists());
        assert_eq!(
            store.temp_path(),
            dir.path().join("endpoints.json.tmp")
        );
    }

    #[tokio::test]
    async fn test_file_store_missing_file_is_an_error() {
        let dir = tempdir().unwrap();
        let store = FileRegistryStore::new(dir.path().join("absent.json"));

        let err = store.load().await.unwrap_err();
        assert!(err.is_store_failure());
    }

    #[tokio::test]
    async fn test_file_store_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("endpoints.json");
        fs::write(&path, b"{ not json").await.unwrap();

        let err = FileRegistryStore::new(&path).load().await.unwrap_err();
        assert!(matches!(err, Error::Store(_)));
    }

    #[tokio::test]
    async fn test_file_store_keeps_backup_of_previous_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("endpoints.json");
        let store = FileRegistryStore::new(&path);

        let first = Registry::new(vec![Endpoint::new("a", "A", "https://a.example")]);
        let second = Registry::new(vec![Endpoint::new("b", "B", "https://b.example")]);
        store.save(&first).await.unwrap();
        store.save(&second).await.unwrap();

        let backup = fs::read_to_string(FileRegistryStore::backup_path(&path))
            .await
            .unwrap();
        assert_eq!(backup, FileRegistryStore::render(&first).unwrap());
        assert_eq!(store.load().await.unwrap(), second);
    }

    #[tokio::test]
    async fn test_file_store_rewrite_is_byte_stable() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("endpoints.json");
        let store = FileRegistryStore::new(&path);

        store
            .save(&Registry::new(vec![Endpoint::new(
                "example",
                "Example",
                "https://example.com",
            )]))
            .await
            .unwrap();
        let first = fs::read(&path).await.unwrap();

        let loaded = store.load().await.unwrap();
        store.save(&loaded).await.unwrap();
        let second = fs::read(&path).await.unwrap();

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_file_store_failed_write_leaves_no_temp_file() {
        let dir = tempdir().unwrap();
        // A directory in place of the registry makes the final rename fail
        let path = dir.path().join("endpoints.json");
        fs::create_dir(&path).await.unwrap();
        let store = FileRegistryStore::new(&path);

        let err = store
            .save(&Registry::new(vec![Endpoint::new("a", "A", "https://a.example")]))
            .await
            .unwrap_err();

        assert!(err.is_store_failure());
        assert!(!store.temp_path().exists());
        assert!(path.is_dir());
    }
}
