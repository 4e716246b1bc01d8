// # HTTP Probe Trait
//
// Defines the interface for checking application-layer reachability of a
// URL over IPv6.
//
// ## Implementations
//
// - reqwest: `v6probe-http` crate
//
// ## Semantics
//
// The probe measures reachability, not correctness. Any response at all,
// a 404 or a 503 included, is a success. Only failing to get a response
// (connect error, TLS error, timeout) is a failure.

use async_trait::async_trait;

/// Error classification used when the deadline expires
pub const TIMEOUT_ERROR: &str = "TIMEOUT";

/// Outcome of a single reachability request
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HttpOutcome {
    /// A response (any status) was received
    pub success: bool,
    /// Status code of the response, if any
    pub status_code: Option<u16>,
    /// Classified failure (`TIMEOUT`, `ECONNREFUSED`, ...)
    pub error: Option<String>,
}

impl HttpOutcome {
    /// A response was received
    pub fn responded(status_code: u16) -> Self {
        Self {
            success: true,
            status_code: Some(status_code),
            error: None,
        }
    }

    /// No response was received
    pub fn failed(error: impl Into<String>) -> Self {
        Self {
            success: false,
            status_code: None,
            error: Some(error.into()),
        }
    }

    /// The request hit its deadline
    pub fn timed_out() -> Self {
        Self::failed(TIMEOUT_ERROR)
    }
}

/// Trait for HTTP probe implementations
///
/// # Failure Model
///
/// Probes never fail: every connectivity problem is folded into an
/// [`HttpOutcome`] with `success == false`.
///
/// # Resource Rules
///
/// - IPv6 only: a host reachable solely over IPv4 is a failure
/// - One request per call, no retries, no redirects
/// - A fixed per-request deadline owned by the implementation
/// - The connection is released as soon as the response head arrives
#[async_trait]
pub trait HttpProbe: Send + Sync {
    /// Issue a HEAD request to `url` over IPv6
    async fn probe(&self, url: &str) -> HttpOutcome;

    /// Get the probe name (for logging/debugging)
    fn probe_name(&self) -> &'static str;
}
