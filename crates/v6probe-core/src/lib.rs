// # v6probe-core
//
// Core library for the IPv6 connectivity verification engine.
//
// ## Architecture Overview
//
// This library provides the core functionality for checking and recording
// IPv6 adoption of a registry of endpoints:
// - **DomainVariant**: Which hostnames (apex, www) to probe for an endpoint URL
// - **DnsProbe** / **HttpProbe**: Traits for the AAAA/A lookups and the IPv6-only request
// - **OverridePolicy**: Endpoint-specific forced outcomes, each with a reason
// - **reconcile**: Folds probe results into versioned, named test records
// - **status**: Infers overall status, but never overrides an authoritative one
// - **RegistryStore**: Trait for loading and saving the registry
// - **ProbeEngine**: Orchestrates one probing pass and the change-suppressed write
//
// ## Design Principles
//
// 1. **Probe failures are data**: Only registry I/O produces an `Error`
// 2. **Curated data wins**: Status is advanced only from `unknown`; notes are never touched
// 3. **No spurious writes**: The registry is written only when something observable changed
// 4. **Library-First**: The binary is a thin layer over this crate

pub mod config;
pub mod engine;
pub mod error;
pub mod model;
pub mod policy;
pub mod probe;
pub mod reconcile;
pub mod status;
pub mod store;
pub mod traits;
pub mod variant;

// Re-export core types for convenience
pub use config::{ProbeConfig, RegistryConfig, RunConfig, V6ProbeConfig};
pub use engine::{EndpointReport, Persistence, ProbeEngine, RunReport};
pub use error::{Error, Result};
pub use model::{Endpoint, Ipv6Record, Registry, Status, TestRecord, TestResult};
pub use policy::{OverridePolicy, OverrideRule};
pub use probe::{ProbeResult, ProbeSet};
pub use store::{FileRegistryStore, MemoryRegistryStore};
pub use traits::{DnsProbe, HttpProbe, RegistryStore};
pub use variant::{DomainVariant, ProvidedForm};
