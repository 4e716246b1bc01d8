//! Concurrent dual-protocol probing
//!
//! For one endpoint, the AAAA lookup, the A lookup and the IPv6-only HTTP
//! request of every hostname variant run at the same time. The endpoint's
//! [`ProbeSet`] is only produced once all of them have resolved.

use std::net::Ipv6Addr;

use tracing::debug;

use crate::traits::{DnsProbe, HttpProbe};
use crate::variant::DomainVariant;

/// Error classification for endpoints whose URL has no usable hostname
pub const INVALID_URL_ERROR: &str = "INVALID_URL";

/// Raw observations for one hostname
///
/// Ephemeral: only ever folded into a test result, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProbeResult {
    pub hostname: String,
    pub has_aaaa: bool,
    pub has_a: bool,
    pub http_works: bool,
    pub http_status: Option<u16>,
    pub error: Option<String>,
    pub addresses: Vec<Ipv6Addr>,
    /// Reason of the override that forced `http_works`, if one did
    pub overridden: Option<String>,
}

impl ProbeResult {
    /// Result for a hostname that could not be derived at all
    pub fn unresolvable() -> Self {
        Self {
            error: Some(INVALID_URL_ERROR.to_string()),
            ..Self::default()
        }
    }

    /// Reachable over IPv6: needs both the AAAA record and the HTTP response
    pub fn works(&self) -> bool {
        self.has_aaaa && self.http_works
    }
}

/// Observations for every variant of one endpoint
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ProbeSet {
    pub apex: ProbeResult,
    /// Present iff the variant has a `www.` sibling
    pub www: Option<ProbeResult>,
}

impl ProbeSet {
    /// Probe set for a malformed endpoint URL
    pub fn unresolvable() -> Self {
        Self {
            apex: ProbeResult::unresolvable(),
            www: None,
        }
    }

    pub fn results_mut(&mut self) -> impl Iterator<Item = &mut ProbeResult> {
        std::iter::once(&mut self.apex).chain(self.www.as_mut())
    }
}

/// Probe one hostname: AAAA, A and HTTP over IPv6, concurrently
pub async fn probe_hostname(
    dns: &dyn DnsProbe,
    http: &dyn HttpProbe,
    variant: &DomainVariant,
    hostname: &str,
) -> ProbeResult {
    let url = variant.probe_url(hostname);

    let (aaaa, has_a, outcome) = tokio::join!(
        dns.lookup_aaaa(hostname),
        dns.lookup_a(hostname),
        http.probe(&url),
    );

    debug!(
        hostname,
        aaaa = aaaa.has_aaaa,
        a = has_a,
        http = outcome.success,
        status = ?outcome.status_code,
        error = ?outcome.error,
        "probed hostname"
    );

    ProbeResult {
        hostname: hostname.to_string(),
        has_aaaa: aaaa.has_aaaa,
        has_a,
        http_works: outcome.success,
        http_status: outcome.status_code,
        error: outcome.error,
        addresses: aaaa.addresses,
        overridden: None,
    }
}

/// Probe every hostname of `variant` concurrently
///
/// A malformed variant short-circuits to a failed apex result without
/// touching the network.
pub async fn probe_endpoint(
    dns: &dyn DnsProbe,
    http: &dyn HttpProbe,
    variant: &DomainVariant,
) -> ProbeSet {
    let Some(apex) = variant.apex.as_deref() else {
        return ProbeSet::unresolvable();
    };

    match variant.www.as_deref() {
        Some(www) => {
            let (apex, www) = tokio::join!(
                probe_hostname(dns, http, variant, apex),
                probe_hostname(dns, http, variant, www),
            );
            ProbeSet {
                apex,
                www: Some(www),
            }
        }
        None => ProbeSet {
            apex: probe_hostname(dns, http, variant, apex).await,
            www: None,
        },
    }
}
