//! Core probe engine
//!
//! The ProbeEngine is responsible for:
//! - Loading the registry once
//! - Probing every endpoint's hostname variants over DNS and HTTP
//! - Applying the override policy
//! - Reconciling test records and inferring status
//! - Writing the registry back, once, only if something observable changed
//!
//! ## Architecture
//!
//! ```text
//!                        ┌──────────────┐
//!                        │ RegistryStore│ load (once)
//!                        └──────┬───────┘
//!                               ▼
//!  ┌──────────┐  per endpoint ┌──────────────┐
//!  │ DnsProbe │◄──────────────│ ProbeEngine  │
//!  │ HttpProbe│  (concurrent) └──────┬───────┘
//!  └──────────┘                      │
//!            ┌───────────────────────┼───────────────────────┐
//!            ▼                       ▼                       ▼
//!   ┌────────────────┐     ┌──────────────────┐     ┌────────────────┐
//!   │ OverridePolicy │ ──► │ reconcile::      │ ──► │ status::infer  │
//!   └────────────────┘     │ reconcile        │     └────────────────┘
//!                          └──────────────────┘
//!                               │
//!                               ▼
//!                        ┌──────────────┐
//!                        │ RegistryStore│ save (at most once)
//!                        └──────────────┘
//! ```
//!
//! ## Ordering
//!
//! Reconciliation of endpoint N never starts before all of endpoint N's
//! probes resolve, and the store is written only after every endpoint has
//! been reconciled. With `concurrency > 1`, probing of later endpoints may
//! overlap, but results are still consumed in registry order on the
//! engine task, which is the only place the registry is mutated.

pub mod report;

pub use report::{EndpointReport, Persistence, RunReport};

use chrono::{DateTime, SubsecRound, Utc};
use futures::stream::{self, StreamExt};
use tracing::{debug, info, warn};

use crate::config::RunConfig;
use crate::error::Result;
use crate::model::{APEX_TEST_ID, Endpoint, Registry, WWW_TEST_ID};
use crate::policy::OverridePolicy;
use crate::probe::{ProbeSet, probe_endpoint};
use crate::reconcile::reconcile;
use crate::status;
use crate::store::has_observable_changes;
use crate::traits::{DnsProbe, HttpProbe, RegistryStore};
use crate::variant::DomainVariant;

/// Core probe engine
///
/// ## Lifecycle
///
/// 1. Create with [`ProbeEngine::new()`]
/// 2. Call [`ProbeEngine::run()`] once per invocation
///
/// Every call to `run()` is exactly one probing pass: there are no
/// retries, no backoff and no history.
pub struct ProbeEngine {
    /// DNS probe for AAAA/A lookups
    dns: Box<dyn DnsProbe>,

    /// HTTP probe for IPv6 reachability
    http: Box<dyn HttpProbe>,

    /// Backing store of the registry
    store: Box<dyn RegistryStore>,

    /// Endpoint-specific forced outcomes
    overrides: OverridePolicy,

    /// Per-invocation settings
    run: RunConfig,
}

impl ProbeEngine {
    /// Create a new probe engine
    ///
    /// # Parameters
    ///
    /// - `dns`: DNS probe implementation
    /// - `http`: HTTP probe implementation
    /// - `store`: Registry store implementation
    /// - `overrides`: Override policy for this run
    /// - `run`: Per-invocation settings
    pub fn new(
        dns: Box<dyn DnsProbe>,
        http: Box<dyn HttpProbe>,
        store: Box<dyn RegistryStore>,
        overrides: OverridePolicy,
        run: RunConfig,
    ) -> Result<Self> {
        run.validate()?;
        overrides.validate()?;

        Ok(Self {
            dns,
            http,
            store,
            overrides,
            run,
        })
    }

    /// Run one probing pass over the whole registry
    ///
    /// # Returns
    ///
    /// - `Ok(RunReport)`: Per-endpoint outcomes and what happened to the store
    /// - `Err(Error)`: The registry could not be loaded or written
    pub async fn run(&self) -> Result<RunReport> {
        let loaded = self.store.load().await?;
        info!(
            "Loaded {} endpoints from {}",
            loaded.endpoints.len(),
            self.store.location()
        );

        let mut registry = loaded.clone();
        let checked_at = Utc::now().trunc_subsecs(0);
        let endpoints = self.check(&mut registry, checked_at).await;

        let dirty =
            endpoints.iter().any(|e| e.dirty) || has_observable_changes(&loaded, &registry);

        let persistence = if !dirty {
            debug!("No observable changes, leaving {} untouched", self.store.location());
            Persistence::Unchanged
        } else if self.run.dry_run {
            info!("Dry run: skipping write to {}", self.store.location());
            Persistence::SkippedDryRun
        } else {
            self.store.save(&registry).await?;
            Persistence::Written
        };

        Ok(RunReport {
            checked_at,
            endpoints,
            persistence,
        })
    }

    /// Probe and reconcile every endpoint of `registry` in place
    ///
    /// Never touches the store.
    pub async fn check(
        &self,
        registry: &mut Registry,
        checked_at: DateTime<Utc>,
    ) -> Vec<EndpointReport> {
        for id in registry.duplicate_ids() {
            warn!("Duplicate endpoint id '{}' in registry", id);
        }

        let variants: Vec<DomainVariant> = registry
            .endpoints
            .iter()
            .map(|e| DomainVariant::resolve(&e.url))
            .collect();

        let mut probes = stream::iter(&variants)
            .map(|variant| probe_endpoint(self.dns.as_ref(), self.http.as_ref(), variant))
            .buffered(self.run.concurrency);

        let mut reports = Vec::with_capacity(variants.len());
        let mut targets = registry.endpoints.iter_mut().zip(&variants);

        while let Some(probe_set) = probes.next().await {
            let Some((endpoint, variant)) = targets.next() else {
                break;
            };
            reports.push(self.settle(endpoint, variant, probe_set, checked_at));
        }

        reports
    }

    /// Fold one endpoint's probe results into its record
    fn settle(
        &self,
        endpoint: &mut Endpoint,
        variant: &DomainVariant,
        mut probes: ProbeSet,
        checked_at: DateTime<Utc>,
    ) -> EndpointReport {
        if variant.is_malformed() {
            warn!(
                "Endpoint {} has no usable hostname in URL '{}'",
                endpoint.id, endpoint.url
            );
        }

        let override_reason = self
            .overrides
            .apply(&endpoint.id, &mut probes)
            .map(|rule| rule.reason.clone());

        let reconciliation = reconcile(&endpoint.ipv6.tests, &probes);
        for change in &reconciliation.changes {
            info!(endpoint = %endpoint.id, ?change, "test record changed");
        }
        let mut dirty = reconciliation.is_dirty();
        endpoint.ipv6.tests = reconciliation.tests;

        let status_before = endpoint.ipv6.status;
        let suggested_status = status::suggest_from_tests(&endpoint.ipv6.tests);
        if let Some(next) = status::infer(status_before, suggested_status) {
            info!("Status of {} inferred: {} -> {}", endpoint.id, status_before, next);
            endpoint.ipv6.status = next;
            dirty = true;
        }

        let mismatch = if self.run.detail {
            status::check(endpoint.ipv6.status, suggested_status)
        } else {
            None
        };
        if let Some(m) = &mismatch {
            warn!(
                "Status of {} is {} but results suggest {}",
                endpoint.id, m.stored, m.suggested
            );
        }

        endpoint.ipv6.last_checked = Some(checked_at);

        let result_of = |id: &str| endpoint.test(id).map(|t| t.result);
        EndpointReport {
            id: endpoint.id.clone(),
            name: endpoint.name.clone(),
            url: endpoint.url.clone(),
            variant: variant.clone(),
            apex: result_of(APEX_TEST_ID).unwrap_or_default(),
            www: result_of(WWW_TEST_ID),
            probes,
            override_reason,
            changes: reconciliation.changes,
            status_before,
            status_after: endpoint.ipv6.status,
            suggested_status,
            mismatch,
            dirty,
        }
    }
}
