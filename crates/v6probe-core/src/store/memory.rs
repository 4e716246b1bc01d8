// # Memory Registry Store
//
// In-memory implementation of RegistryStore.
//
// ## Purpose
//
// Holds a registry without touching the filesystem. Used by tests and by
// embedders that keep the registry elsewhere.
//
// Clones share the same registry and counters, so a test can hand one
// clone to the engine and inspect the other.

use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::sync::RwLock;

use crate::Error;
use crate::model::Registry;
use crate::traits::registry_store::RegistryStore;

/// In-memory registry store
///
/// # Example
///
/// ```rust,no_run
/// use v6probe_core::model::{Endpoint, Registry};
/// use v6probe_core::store::MemoryRegistryStore;
/// use v6probe_core::traits::RegistryStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = MemoryRegistryStore::new(Registry::new(vec![
///         Endpoint::new("example", "Example", "https://example.com"),
///     ]));
///
///     let registry = store.load().await?;
///     assert_eq!(registry.endpoints.len(), 1);
///     assert_eq!(store.save_count(), 0);
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Default)]
pub struct MemoryRegistryStore {
    inner: Arc<RwLock<Registry>>,
    save_count: Arc<AtomicUsize>,
}

impl MemoryRegistryStore {
    /// Create a store holding `registry`
    pub fn new(registry: Registry) -> Self {
        Self {
            inner: Arc::new(RwLock::new(registry)),
            save_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Current contents of the store
    pub async fn snapshot(&self) -> Registry {
        self.inner.read().await.clone()
    }

    /// Number of times `save()` was called
    pub fn save_count(&self) -> usize {
        self.save_count.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RegistryStore for MemoryRegistryStore {
    async fn load(&self) -> Result<Registry, Error> {
        Ok(self.inner.read().await.clone())
    }

    async fn save(&self, registry: &Registry) -> Result<(), Error> {
        *self.inner.write().await = registry.clone();
        self.save_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    fn location(&self) -> String {
        "memory".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Endpoint;

    #[tokio::test]
    async fn test_memory_store_clones_share_state() {
        let store = MemoryRegistryStore::default();
        let handle = store.clone();

        let registry = Registry::new(vec![Endpoint::new("a", "A", "https://a.example")]);
        store.save(&registry).await.unwrap();

        assert_eq!(handle.save_count(), 1);
        assert_eq!(handle.snapshot().await, registry);
        assert_eq!(handle.load().await.unwrap(), registry);
    }
}
