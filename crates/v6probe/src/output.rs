//! Human-readable rendering of a run report
//!
//! Everything here returns strings; `main` decides where they go. The
//! summary is the only thing written to stdout.

use std::fmt::Write;

use v6probe_core::probe::ProbeResult;
use v6probe_core::{EndpointReport, Persistence, RunConfig, RunReport, TestResult};

/// Render the whole report for the given run settings
pub fn render(report: &RunReport, run: &RunConfig) -> String {
    let mut out = String::new();

    for endpoint in &report.endpoints {
        out.push_str(&summary_line(endpoint));
        out.push('\n');
        if run.detail {
            out.push_str(&detail_block(endpoint));
        } else if run.verbose {
            out.push_str(&verbose_block(endpoint));
        }
    }

    out.push('\n');
    out.push_str(&footer(report));
    out.push('\n');
    out
}

fn overall(endpoint: &EndpointReport) -> TestResult {
    let www_ok = endpoint.www.is_none_or(TestResult::is_confirmed);
    TestResult::from(endpoint.apex.is_confirmed() && www_ok)
}

/// `✓ Example (https://example.com)  apex ✓  www ✗  [partial]`
pub fn summary_line(endpoint: &EndpointReport) -> String {
    let mut line = format!(
        "{} {} ({})  apex {}",
        overall(endpoint).glyph(),
        endpoint.name,
        endpoint.url,
        endpoint.apex.glyph()
    );
    if let Some(www) = endpoint.www {
        let _ = write!(line, "  www {}", www.glyph());
    }
    let _ = write!(line, "  [{}]", endpoint.status_after);
    if endpoint.status_changed() {
        let _ = write!(line, " (was {})", endpoint.status_before);
    }
    line
}

fn probe_inline(label: &str, probe: &ProbeResult) -> String {
    let mut line = format!(
        "    {label} {}: AAAA {}  HTTP {}",
        display_host(probe),
        TestResult::from(probe.has_aaaa).glyph(),
        TestResult::from(probe.http_works).glyph()
    );
    match (probe.http_status, &probe.error) {
        (Some(code), _) => {
            let _ = write!(line, " ({code})");
        }
        (None, Some(error)) => {
            let _ = write!(line, " ({error})");
        }
        (None, None) => {}
    }
    line.push('\n');
    line
}

fn display_host(probe: &ProbeResult) -> &str {
    if probe.hostname.is_empty() {
        "<no hostname>"
    } else {
        &probe.hostname
    }
}

/// Probe outcomes inline, one line per variant
pub fn verbose_block(endpoint: &EndpointReport) -> String {
    let mut out = probe_inline("apex", &endpoint.probes.apex);
    if let Some(www) = &endpoint.probes.www {
        out.push_str(&probe_inline("www", www));
    }
    if let Some(reason) = &endpoint.override_reason {
        let _ = writeln!(out, "    override: {reason}");
    }
    out
}

fn probe_breakdown(label: &str, probe: &ProbeResult) -> String {
    let mut out = format!("    {label}: {}\n", display_host(probe));

    let addresses = if probe.addresses.is_empty() {
        "-".to_string()
    } else {
        probe
            .addresses
            .iter()
            .map(|a| a.to_string())
            .collect::<Vec<_>>()
            .join(", ")
    };
    let _ = writeln!(
        out,
        "      DNS   AAAA {}  A {}  [{}]",
        TestResult::from(probe.has_aaaa).glyph(),
        TestResult::from(probe.has_a).glyph(),
        addresses
    );

    let status = probe
        .http_status
        .map_or_else(|| "-".to_string(), |code| code.to_string());
    let _ = write!(
        out,
        "      HTTP  {}  status {}",
        TestResult::from(probe.http_works).glyph(),
        status
    );
    if let Some(error) = &probe.error {
        let _ = write!(out, "  error {error}");
    }
    if let Some(reason) = &probe.overridden {
        let _ = write!(out, "  overridden: {reason}");
    }
    out.push('\n');
    out
}

/// Full per-variant DNS/HTTP breakdown, changes and mismatch warning
pub fn detail_block(endpoint: &EndpointReport) -> String {
    let mut out = probe_breakdown("apex", &endpoint.probes.apex);
    if let Some(www) = &endpoint.probes.www {
        out.push_str(&probe_breakdown("www", www));
    }

    for change in &endpoint.changes {
        let _ = writeln!(out, "    change: {change:?}");
    }
    let _ = writeln!(out, "    suggested status: {}", endpoint.suggested_status);
    if let Some(mismatch) = &endpoint.mismatch {
        let _ = writeln!(
            out,
            "    ⚠ status is {} but results suggest {}",
            mismatch.stored, mismatch.suggested
        );
    }
    out
}

pub fn footer(report: &RunReport) -> String {
    let persistence = match report.persistence {
        Persistence::Unchanged => "registry unchanged",
        Persistence::Written => "registry written",
        Persistence::SkippedDryRun => "dry run, registry not written",
    };
    let mut out = format!(
        "Checked {} endpoint(s) at {}: {} changed, {}",
        report.endpoints.len(),
        report.checked_at.to_rfc3339(),
        report.dirty_count(),
        persistence
    );

    let mismatches = report.mismatches().count();
    if mismatches > 0 {
        let _ = write!(out, "; {mismatches} status mismatch(es)");
    }
    out
}
