// # Registry Store Trait
//
// Defines the interface for loading and saving the endpoint registry.
//
// ## Implementations
//
// - File-based: JSON file with atomic writes (`store::FileRegistryStore`)
// - In-memory: for tests and embedding (`store::MemoryRegistryStore`)
//
// ## Usage
//
// ```rust,no_run
// use v6probe_core::RegistryStore;
// use v6probe_core::store::FileRegistryStore;
//
// #[tokio::main]
// async fn main() -> Result<(), Box<dyn std::error::Error>> {
//     let store = FileRegistryStore::new("data/endpoints.json");
//     let registry = store.load().await?;
//     println!("{} endpoints", registry.endpoints.len());
//     Ok(())
// }
// ```

use async_trait::async_trait;

use crate::model::Registry;

/// Trait for registry store implementations
///
/// # Failure Model
///
/// Store errors are the one class of error the engine does not swallow.
/// A registry that cannot be read, parsed or written aborts the run.
///
/// # Write Discipline
///
/// The engine calls [`RegistryStore::save`] at most once per run, and only
/// when something observable changed. Implementations must replace the
/// stored registry as a whole; a partially written registry must never be
/// observable.
#[async_trait]
pub trait RegistryStore: Send + Sync {
    /// Load the full registry
    ///
    /// # Returns
    ///
    /// - `Ok(Registry)`: The stored registry
    /// - `Err(Error)`: The store is missing, unreadable or unparseable
    async fn load(&self) -> Result<Registry, crate::Error>;

    /// Replace the stored registry
    async fn save(&self, registry: &Registry) -> Result<(), crate::Error>;

    /// Human-readable location of the store (for logging)
    fn location(&self) -> String;
}
