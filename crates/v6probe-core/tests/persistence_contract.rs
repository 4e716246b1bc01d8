//! Contract Test: Persistence
//!
//! Constraints verified:
//! - The registry is written at most once per run
//! - Dry runs never write
//! - Curated fields (notes, unknown keys) survive untouched
//! - Override rules are applied and reported
//! - Store failures are fatal; probe failures are not
//!
//! If this test fails, the registry can be corrupted or silently left stale.

mod common;

use common::*;
use v6probe_core::traits::HttpOutcome;
use v6probe_core::{
    Endpoint, MemoryRegistryStore, OverridePolicy, OverrideRule, Persistence, ProbeEngine,
    Registry, RunConfig, Status, TestResult,
};

fn dual_stack_registry() -> Registry {
    Registry::new(vec![
        Endpoint::new("example", "Example", "https://example.com"),
        Endpoint::new("shop", "Shop", "https://shop.example.net"),
    ])
}

fn dual_stack_network() -> (ScriptedDnsProbe, ScriptedHttpProbe) {
    let dns = ScriptedDnsProbe::new()
        .with_aaaa("example.com")
        .with_aaaa("www.example.com")
        .with_a("example.com");
    let http = ScriptedHttpProbe::new()
        .with_response("example.com")
        .with_response("www.example.com")
        .with_outcome("shop.example.net", HttpOutcome::failed("ECONNREFUSED"));
    (dns, http)
}

#[tokio::test]
async fn notes_and_unknown_fields_are_never_modified() {
    let mut endpoint = Endpoint::new("example", "Example", "https://example.com");
    endpoint.ipv6.notes = Some("Verified manually in March".to_string());
    endpoint
        .extra
        .insert("logo".to_string(), serde_json::json!("example.svg"));
    let store = MemoryRegistryStore::new(Registry::new(vec![endpoint]));
    let (dns, http) = dual_stack_network();

    engine(&dns, &http, &store, RunConfig::default())
        .run()
        .await
        .unwrap();

    let saved = store.snapshot().await;
    let endpoint = saved.endpoint("example").unwrap();
    assert_eq!(
        endpoint.ipv6.notes.as_deref(),
        Some("Verified manually in March")
    );
    assert_eq!(endpoint.extra["logo"], "example.svg");
}

#[tokio::test]
async fn dry_run_reports_but_does_not_write() {
    let store = MemoryRegistryStore::new(dual_stack_registry());
    let (dns, http) = dual_stack_network();
    let run = RunConfig {
        dry_run: true,
        ..RunConfig::default()
    };

    let report = engine(&dns, &http, &store, run).run().await.unwrap();

    assert_eq!(report.persistence, Persistence::SkippedDryRun);
    assert!(report.dirty_count() > 0);
    assert_eq!(store.save_count(), 0);
    assert_eq!(store.snapshot().await, dual_stack_registry());
}

#[tokio::test]
async fn override_forces_http_outcome_and_is_reported() {
    let store = MemoryRegistryStore::new(Registry::new(vec![Endpoint::new(
        "edge",
        "Edge",
        "https://edge.example.com",
    )]));
    let dns = ScriptedDnsProbe::new().with_aaaa("edge.example.com");
    let http =
        ScriptedHttpProbe::new().with_outcome("edge.example.com", HttpOutcome::failed("ECONNRESET"));
    let policy = OverridePolicy::new().with_rule(
        "edge",
        OverrideRule::new(true, "edge network resets this client's TLS handshake"),
    );

    let report = engine_with_policy(&dns, &http, &store, policy, RunConfig::default())
        .run()
        .await
        .unwrap();

    let endpoint = &report.endpoints[0];
    assert_eq!(endpoint.apex, TestResult::Confirmed);
    assert_eq!(
        endpoint.override_reason.as_deref(),
        Some("edge network resets this client's TLS handshake")
    );
    assert_eq!(endpoint.status_after, Status::Full);
}

#[tokio::test]
async fn unreadable_store_aborts_the_run() {
    let engine = ProbeEngine::new(
        Box::new(ScriptedDnsProbe::new()),
        Box::new(ScriptedHttpProbe::new()),
        Box::new(UnreadableStore),
        OverridePolicy::new(),
        RunConfig::default(),
    )
    .unwrap();

    let err = engine.run().await.unwrap_err();
    assert!(err.is_store_failure());
}

#[tokio::test]
async fn unwritable_store_aborts_only_when_a_write_is_needed() {
    let (dns, http) = dual_stack_network();

    let dirty = ReadOnlyStore(MemoryRegistryStore::new(dual_stack_registry()));
    let engine = ProbeEngine::new(
        Box::new(dns.clone()),
        Box::new(http.clone()),
        Box::new(dirty),
        OverridePolicy::new(),
        RunConfig::default(),
    )
    .unwrap();
    assert!(engine.run().await.unwrap_err().is_store_failure());

    // Settle the registry first, then run against a read-only copy of it
    let settled = MemoryRegistryStore::new(dual_stack_registry());
    common::engine(&dns, &http, &settled, RunConfig::default())
        .run()
        .await
        .unwrap();
    let clean = ReadOnlyStore(MemoryRegistryStore::new(settled.snapshot().await));
    let engine = ProbeEngine::new(
        Box::new(dns),
        Box::new(http),
        Box::new(clean),
        OverridePolicy::new(),
        RunConfig::default(),
    )
    .unwrap();
    assert_eq!(engine.run().await.unwrap().persistence, Persistence::Unchanged);
}

#[tokio::test]
async fn invalid_run_config_is_rejected() {
    let result = ProbeEngine::new(
        Box::new(ScriptedDnsProbe::new()),
        Box::new(ScriptedHttpProbe::new()),
        Box::new(MemoryRegistryStore::default()),
        OverridePolicy::new(),
        RunConfig {
            concurrency: 0,
            ..RunConfig::default()
        },
    );

    assert!(result.is_err());
}
