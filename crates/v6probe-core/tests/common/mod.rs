//! Test doubles and common utilities for engine contract tests
//!
//! The probes answer from a script keyed by hostname and count their calls,
//! so tests can describe a network environment without touching one.
#![allow(dead_code)]

use std::collections::HashMap;
use std::net::Ipv6Addr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use v6probe_core::error::{Error, Result};
use v6probe_core::model::Registry;
use v6probe_core::traits::{AaaaLookup, DnsProbe, HttpOutcome, HttpProbe, RegistryStore};
use v6probe_core::{MemoryRegistryStore, OverridePolicy, ProbeEngine, RunConfig};

/// A DNS probe answering from a per-hostname script
///
/// Unscripted hostnames behave like NXDOMAIN.
#[derive(Clone, Default)]
pub struct ScriptedDnsProbe {
    aaaa: Arc<Mutex<HashMap<String, Vec<Ipv6Addr>>>>,
    a: Arc<Mutex<HashMap<String, bool>>>,
    lookups: Arc<AtomicUsize>,
}

impl ScriptedDnsProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Give `hostname` an AAAA record
    pub fn with_aaaa(self, hostname: &str) -> Self {
        self.set_aaaa(hostname, true);
        self
    }

    /// Give `hostname` an A record
    pub fn with_a(self, hostname: &str) -> Self {
        self.a.lock().unwrap().insert(hostname.to_string(), true);
        self
    }

    /// Add or remove the AAAA record of `hostname`
    pub fn set_aaaa(&self, hostname: &str, present: bool) {
        let mut aaaa = self.aaaa.lock().unwrap();
        if present {
            aaaa.insert(
                hostname.to_string(),
                vec![
                    "2001:db8::1".parse().unwrap(),
                    "2001:db8::2".parse().unwrap(),
                    "2001:db8::3".parse().unwrap(),
                ],
            );
        } else {
            aaaa.remove(hostname);
        }
    }

    /// Total number of lookups performed
    pub fn lookup_count(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl DnsProbe for ScriptedDnsProbe {
    async fn lookup_aaaa(&self, hostname: &str) -> AaaaLookup {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        match self.aaaa.lock().unwrap().get(hostname) {
            Some(addresses) => AaaaLookup::found(addresses.iter().copied(), 2),
            None => AaaaLookup::missing(),
        }
    }

    async fn lookup_a(&self, hostname: &str) -> bool {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        self.a.lock().unwrap().get(hostname).copied().unwrap_or(false)
    }

    fn probe_name(&self) -> &'static str {
        "scripted-dns"
    }
}

/// An HTTP probe answering from a per-hostname script
///
/// Unscripted hostnames refuse the connection.
#[derive(Clone, Default)]
pub struct ScriptedHttpProbe {
    outcomes: Arc<Mutex<HashMap<String, HttpOutcome>>>,
    requests: Arc<Mutex<Vec<String>>>,
}

impl ScriptedHttpProbe {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `hostname` answer with a 200
    pub fn with_response(self, hostname: &str) -> Self {
        self.set_outcome(hostname, HttpOutcome::responded(200));
        self
    }

    /// Make `hostname` answer with `outcome`
    pub fn with_outcome(self, hostname: &str, outcome: HttpOutcome) -> Self {
        self.set_outcome(hostname, outcome);
        self
    }

    pub fn set_outcome(&self, hostname: &str, outcome: HttpOutcome) {
        self.outcomes
            .lock()
            .unwrap()
            .insert(hostname.to_string(), outcome);
    }

    /// Every URL requested so far
    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

fn host_of(url: &str) -> &str {
    let rest = url.split_once("://").map_or(url, |(_, rest)| rest);
    rest.split(['/', ':']).next().unwrap_or(rest)
}

#[async_trait::async_trait]
impl HttpProbe for ScriptedHttpProbe {
    async fn probe(&self, url: &str) -> HttpOutcome {
        self.requests.lock().unwrap().push(url.to_string());

        self.outcomes
            .lock()
            .unwrap()
            .get(host_of(url))
            .cloned()
            .unwrap_or_else(|| HttpOutcome::failed("ECONNREFUSED"))
    }

    fn probe_name(&self) -> &'static str {
        "scripted-http"
    }
}

/// A store whose backing file is gone
pub struct UnreadableStore;

#[async_trait::async_trait]
impl RegistryStore for UnreadableStore {
    async fn load(&self) -> Result<Registry> {
        Err(Error::store("registry file not found"))
    }

    async fn save(&self, _registry: &Registry) -> Result<()> {
        Err(Error::store("registry is read-only"))
    }

    fn location(&self) -> String {
        "unreadable".to_string()
    }
}

/// A store that loads fine but refuses every write
#[derive(Clone)]
pub struct ReadOnlyStore(pub MemoryRegistryStore);

#[async_trait::async_trait]
impl RegistryStore for ReadOnlyStore {
    async fn load(&self) -> Result<Registry> {
        self.0.load().await
    }

    async fn save(&self, _registry: &Registry) -> Result<()> {
        Err(Error::store("permission denied"))
    }

    fn location(&self) -> String {
        "read-only".to_string()
    }
}

/// Build an engine over shared handles of the given doubles
pub fn engine(
    dns: &ScriptedDnsProbe,
    http: &ScriptedHttpProbe,
    store: &MemoryRegistryStore,
    run: RunConfig,
) -> ProbeEngine {
    engine_with_policy(dns, http, store, OverridePolicy::new(), run)
}

pub fn engine_with_policy(
    dns: &ScriptedDnsProbe,
    http: &ScriptedHttpProbe,
    store: &MemoryRegistryStore,
    overrides: OverridePolicy,
    run: RunConfig,
) -> ProbeEngine {
    ProbeEngine::new(
        Box::new(dns.clone()),
        Box::new(http.clone()),
        Box::new(store.clone()),
        overrides,
        run,
    )
    .expect("engine construction succeeds")
}

/// Run config with detail mode on
pub fn detail() -> RunConfig {
    RunConfig {
        detail: true,
        ..RunConfig::default()
    }
}
