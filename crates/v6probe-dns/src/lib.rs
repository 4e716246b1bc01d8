// # hickory DNS Probe
//
// This crate provides the `DnsProbe` implementation used by the v6probe
// binary, backed by hickory-resolver and the system resolver configuration.
//
// ## Failure Model
//
// Every resolver error (NXDOMAIN, SERVFAIL, timeout, no answer) is reported
// as "no records". Nothing is retried beyond what the resolver itself does.
//
// ## Search Domains
//
// Hostnames are queried fully qualified, so a missing record is never
// answered from a search-list expansion such as `example.com.corp.lan`.

use async_trait::async_trait;
use hickory_resolver::TokioResolver;
use tracing::debug;

use v6probe_core::traits::{AaaaLookup, DnsProbe};
use v6probe_core::{Error, Result};

/// DNS probe backed by a shared hickory resolver
pub struct HickoryDnsProbe {
    resolver: TokioResolver,
    sample_size: usize,
}

impl HickoryDnsProbe {
    /// Create a probe using the system resolver configuration
    ///
    /// `sample_size` bounds how many AAAA addresses are kept for diagnostics.
    pub fn new(sample_size: usize) -> Result<Self> {
        let resolver = TokioResolver::builder_tokio()
            .map_err(|e| Error::config(format!("Failed to create DNS resolver: {e}")))?
            .build();
        Ok(Self::with_resolver(resolver, sample_size))
    }

    /// Wrap an already configured resolver
    pub fn with_resolver(resolver: TokioResolver, sample_size: usize) -> Self {
        Self {
            resolver,
            sample_size,
        }
    }
}

/// Absolute form of `hostname`, with exactly one trailing dot
fn fqdn(hostname: &str) -> String {
    format!("{}.", hostname.trim_end_matches('.'))
}

#[async_trait]
impl DnsProbe for HickoryDnsProbe {
    async fn lookup_aaaa(&self, hostname: &str) -> AaaaLookup {
        match self.resolver.ipv6_lookup(fqdn(hostname)).await {
            Ok(lookup) => AaaaLookup::found(lookup.iter().map(|aaaa| aaaa.0), self.sample_size),
            Err(e) => {
                debug!(hostname, error = %e, "no AAAA record");
                AaaaLookup::missing()
            }
        }
    }

    async fn lookup_a(&self, hostname: &str) -> bool {
        match self.resolver.ipv4_lookup(fqdn(hostname)).await {
            Ok(lookup) => lookup.iter().next().is_some(),
            Err(e) => {
                debug!(hostname, error = %e, "no A record");
                false
            }
        }
    }

    fn probe_name(&self) -> &'static str {
        "hickory"
    }
}
