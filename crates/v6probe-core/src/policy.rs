//! Override policy
//!
//! Some servers reject this engine's HTTP client despite genuine IPv6
//! support (e.g. an edge network that refuses the client's TLS handshake).
//! An override forces the HTTP outcome of every variant of one endpoint.
//! Every rule carries the reason it exists, and every application is logged
//! at `warn` so it stays auditable.
//!
//! ## File Format
//!
//! ```json
//! {
//!   "example": {
//!     "http_works": true,
//!     "reason": "Edge network resets our TLS client; verified by hand"
//!   }
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::warn;

use crate::error::{Error, Result};
use crate::probe::ProbeSet;

/// One forced outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OverrideRule {
    /// Value forced onto every variant's HTTP outcome
    pub http_works: bool,

    /// Why the raw measurement is not trusted for this endpoint
    pub reason: String,
}

impl OverrideRule {
    pub fn new(http_works: bool, reason: impl Into<String>) -> Self {
        Self {
            http_works,
            reason: reason.into(),
        }
    }
}

/// Endpoint id → forced outcome
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OverridePolicy {
    rules: BTreeMap<String, OverrideRule>,
}

impl OverridePolicy {
    /// Create an empty policy
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule for `endpoint_id`
    pub fn with_rule(mut self, endpoint_id: impl Into<String>, rule: OverrideRule) -> Self {
        self.rules.insert(endpoint_id.into(), rule);
        self
    }

    /// Parse and validate a policy document
    pub fn from_json(json: &str) -> Result<Self> {
        let policy: Self = serde_json::from_str(json)
            .map_err(|e| Error::config(format!("Failed to parse override policy: {}", e)))?;
        policy.validate()?;
        Ok(policy)
    }

    /// Load a policy file
    pub async fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::config(format!(
                "Failed to read override policy {}: {}",
                path.display(),
                e
            ))
        })?;
        Self::from_json(&content)
    }

    /// Every rule must say why it exists
    pub fn validate(&self) -> Result<()> {
        for (endpoint_id, rule) in &self.rules {
            if endpoint_id.is_empty() {
                return Err(Error::config("Override rule with empty endpoint id"));
            }
            if rule.reason.trim().is_empty() {
                return Err(Error::config(format!(
                    "Override rule for '{}' has no reason",
                    endpoint_id
                )));
            }
        }
        Ok(())
    }

    pub fn rule(&self, endpoint_id: &str) -> Option<&OverrideRule> {
        self.rules.get(endpoint_id)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Force the HTTP outcome of every probed variant of `endpoint_id`
    ///
    /// Returns the rule that was applied, if any. Malformed-URL probe sets
    /// are left alone: there is no hostname to vouch for.
    pub fn apply(&self, endpoint_id: &str, probes: &mut ProbeSet) -> Option<&OverrideRule> {
        let rule = self.rules.get(endpoint_id)?;

        for result in probes.results_mut() {
            if result.hostname.is_empty() {
                continue;
            }
            if result.http_works != rule.http_works {
                warn!(
                    endpoint = endpoint_id,
                    hostname = %result.hostname,
                    measured = result.http_works,
                    forced = rule.http_works,
                    reason = %rule.reason,
                    "override applied"
                );
            }
            result.http_works = rule.http_works;
            result.overridden = Some(rule.reason.clone());
        }

        Some(rule)
    }
}
