// # DNS Probe Trait
//
// Defines the interface for looking up address records of a hostname.
//
// ## Implementations
//
// - hickory-resolver: `v6probe-dns` crate
//
// ## Usage
//
// ```rust,ignore
// use v6probe_core::DnsProbe;
//
// #[tokio::main]
// async fn main() {
//     let probe = /* DnsProbe implementation */;
//
//     let aaaa = probe.lookup_aaaa("example.com").await;
//     println!("AAAA: {} {:?}", aaaa.has_aaaa, aaaa.addresses);
// }
// ```

use async_trait::async_trait;
use std::net::Ipv6Addr;

/// Outcome of an AAAA lookup
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AaaaLookup {
    /// At least one AAAA record was returned
    pub has_aaaa: bool,
    /// Sample of the returned addresses, for diagnostics only
    pub addresses: Vec<Ipv6Addr>,
}

impl AaaaLookup {
    /// Lookup that found nothing (NXDOMAIN, SERVFAIL, empty answer)
    pub fn missing() -> Self {
        Self::default()
    }

    /// Lookup that found `addresses`, keeping at most `sample` of them
    pub fn found(addresses: impl IntoIterator<Item = Ipv6Addr>, sample: usize) -> Self {
        let addresses: Vec<Ipv6Addr> = addresses.into_iter().take(sample).collect();
        Self {
            has_aaaa: !addresses.is_empty(),
            addresses,
        }
    }
}

/// Trait for DNS probe implementations
///
/// # Failure Model
///
/// Lookups never fail. A resolver error of any kind, NXDOMAIN included, is
/// reported as "no records". The platform resolver's own timeout applies;
/// implementations must not retry.
#[async_trait]
pub trait DnsProbe: Send + Sync {
    /// Look up AAAA records for `hostname`
    async fn lookup_aaaa(&self, hostname: &str) -> AaaaLookup;

    /// Whether `hostname` has at least one A record
    async fn lookup_a(&self, hostname: &str) -> bool;

    /// Get the probe name (for logging/debugging)
    fn probe_name(&self) -> &'static str;
}
