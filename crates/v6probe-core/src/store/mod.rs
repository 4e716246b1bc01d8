// # Registry Store Implementations
//
// This module provides implementations of the RegistryStore trait, plus
// the change detection that decides whether a run writes at all.

pub mod file;
pub mod memory;

pub use file::FileRegistryStore;
pub use memory::MemoryRegistryStore;

use crate::model::Registry;

/// Whether `after` differs from `before` in anything but `last_checked`
///
/// Timestamp churn alone never justifies a write.
pub fn has_observable_changes(before: &Registry, after: &Registry) -> bool {
    without_timestamps(before) != without_timestamps(after)
}

fn without_timestamps(registry: &Registry) -> Registry {
    let mut registry = registry.clone();
    for endpoint in &mut registry.endpoints {
        endpoint.ipv6.last_checked = None;
    }
    registry
}
