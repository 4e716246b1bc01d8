//! Core traits for the probe engine
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`DnsProbe`]: AAAA/A record lookups
//! - [`HttpProbe`]: IPv6-only reachability requests
//! - [`RegistryStore`]: Loading and saving the endpoint registry

pub mod dns_probe;
pub mod http_probe;
pub mod registry_store;

pub use dns_probe::{AaaaLookup, DnsProbe};
pub use http_probe::{HttpOutcome, HttpProbe, TIMEOUT_ERROR};
pub use registry_store::RegistryStore;
