//! Registry data model
//!
//! The registry is the authoritative, human-curated store of monitored
//! endpoints. The engine only ever touches `ipv6.tests`, `ipv6.status`
//! (while it is still `unknown`) and `ipv6.last_checked`.
//!
//! ## File Format
//!
//! ```json
//! {
//!   "endpoints": [
//!     {
//!       "id": "example",
//!       "name": "Example",
//!       "url": "https://example.com",
//!       "ipv6": {
//!         "status": "partial",
//!         "last_checked": "2025-01-09T12:00:00Z",
//!         "tests": [
//!           { "id": "apex_domain", "name": "...", "description": "...", "result": false },
//!           { "id": "www_domain", "name": "...", "description": "...", "result": true }
//!         ]
//!       }
//!     }
//!   ]
//! }
//! ```
//!
//! Keys this model does not know about are carried through untouched.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use std::fmt;

/// Test id for the apex hostname check
pub const APEX_TEST_ID: &str = "apex_domain";

/// Test id for the `www.` hostname check
pub const WWW_TEST_ID: &str = "www_domain";

/// Pre-rename id of [`APEX_TEST_ID`]
pub const LEGACY_APEX_TEST_ID: &str = "aaaa_record";

/// Pre-rename id of [`WWW_TEST_ID`]
pub const LEGACY_WWW_TEST_ID: &str = "www_variant";

/// The whole endpoint registry
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Registry {
    /// Monitored endpoints, in curated order
    pub endpoints: Vec<Endpoint>,

    /// Top-level keys not owned by the engine
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Registry {
    /// Create a registry from a list of endpoints
    pub fn new(endpoints: Vec<Endpoint>) -> Self {
        Self {
            endpoints,
            extra: Map::new(),
        }
    }

    /// Look up an endpoint by id
    pub fn endpoint(&self, id: &str) -> Option<&Endpoint> {
        self.endpoints.iter().find(|e| e.id == id)
    }

    /// Ids that appear more than once, in first-seen order
    pub fn duplicate_ids(&self) -> Vec<&str> {
        let mut seen = std::collections::HashSet::new();
        let mut dups = Vec::new();
        for endpoint in &self.endpoints {
            if !seen.insert(endpoint.id.as_str()) && !dups.contains(&endpoint.id.as_str()) {
                dups.push(endpoint.id.as_str());
            }
        }
        dups
    }
}

/// A monitored network endpoint
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Endpoint {
    /// Unique identifier (lowercase, alphanumeric and hyphen)
    pub id: String,

    /// Display name
    pub name: String,

    /// Endpoint URL, e.g. `https://example.com`
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// IPv6 adoption record
    #[serde(default)]
    pub ipv6: Ipv6Record,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Endpoint {
    /// Create an endpoint with an empty IPv6 record
    pub fn new(id: impl Into<String>, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            url: url.into(),
            category: None,
            description: None,
            ipv6: Ipv6Record::default(),
            extra: Map::new(),
        }
    }

    /// Set the IPv6 status
    pub fn with_status(mut self, status: Status) -> Self {
        self.ipv6.status = status;
        self
    }

    /// Replace the test collection
    pub fn with_tests(mut self, tests: Vec<TestRecord>) -> Self {
        self.ipv6.tests = tests;
        self
    }

    /// Look up a test by id
    pub fn test(&self, id: &str) -> Option<&TestRecord> {
        self.ipv6.tests.iter().find(|t| t.id == id)
    }
}

/// Per-endpoint IPv6 adoption record
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Ipv6Record {
    #[serde(default)]
    pub status: Status,

    /// Free text, curated by hand
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,

    #[serde(default)]
    pub last_checked: Option<DateTime<Utc>>,

    #[serde(default)]
    pub tests: Vec<TestRecord>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Overall IPv6 adoption status of an endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    /// Not yet determined; the only value the engine may advance
    #[default]
    Unknown,
    /// No working IPv6
    None,
    /// Some hostname variants work over IPv6
    Partial,
    /// Every applicable hostname variant works over IPv6
    Full,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Unknown => "unknown",
            Status::None => "none",
            Status::Partial => "partial",
            Status::Full => "full",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named connectivity test
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestRecord {
    pub id: String,
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub result: TestResult,
}

impl TestRecord {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
        result: TestResult,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            result,
        }
    }
}

/// Outcome of a connectivity test
///
/// Persisted as `true`, `false` or `null`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum TestResult {
    /// Tested and working
    Confirmed,
    /// Tested and failing
    Refuted,
    /// Not tested yet
    #[default]
    Unevaluated,
}

impl TestResult {
    pub fn as_option(self) -> Option<bool> {
        match self {
            TestResult::Confirmed => Some(true),
            TestResult::Refuted => Some(false),
            TestResult::Unevaluated => None,
        }
    }

    pub fn is_confirmed(self) -> bool {
        self == TestResult::Confirmed
    }

    /// Terminal glyph used in summaries
    pub fn glyph(self) -> &'static str {
        match self {
            TestResult::Confirmed => "✓",
            TestResult::Refuted => "✗",
            TestResult::Unevaluated => "?",
        }
    }
}

impl From<bool> for TestResult {
    fn from(works: bool) -> Self {
        if works {
            TestResult::Confirmed
        } else {
            TestResult::Refuted
        }
    }
}

impl From<Option<bool>> for TestResult {
    fn from(value: Option<bool>) -> Self {
        value.map_or(TestResult::Unevaluated, TestResult::from)
    }
}

impl Serialize for TestResult {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.as_option().serialize(serializer)
    }
}

impl<'de> Deserialize<'de> for TestResult {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(Option::<bool>::deserialize(deserializer)?.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_result_round_trips_through_json_tri_state() {
        let tests: Vec<TestRecord> = serde_json::from_str(
            r#"[
                {"id": "a", "name": "A", "description": "", "result": true},
                {"id": "b", "name": "B", "description": "", "result": false},
                {"id": "c", "name": "C", "description": "", "result": null},
                {"id": "d", "name": "D", "description": ""}
            ]"#,
        )
        .unwrap();

        let results: Vec<TestResult> = tests.iter().map(|t| t.result).collect();
        assert_eq!(
            results,
            vec![
                TestResult::Confirmed,
                TestResult::Refuted,
                TestResult::Unevaluated,
                TestResult::Unevaluated,
            ]
        );

        let json = serde_json::to_value(&tests[2]).unwrap();
        assert_eq!(json["result"], Value::Null);
    }

    #[test]
    fn unknown_fields_survive_a_load_save_cycle() {
        let input = r#"{
            "schema": "v2",
            "endpoints": [{
                "id": "example",
                "name": "Example",
                "url": "https://example.com",
                "logo": "example.svg",
                "ipv6": {
                    "status": "full",
                    "notes": "checked by hand",
                    "last_checked": null,
                    "tests": [],
                    "source": "manual"
                }
            }]
        }"#;

        let registry: Registry = serde_json::from_str(input).unwrap();
        let endpoint = &registry.endpoints[0];
        assert_eq!(endpoint.ipv6.status, Status::Full);
        assert_eq!(endpoint.extra["logo"], "example.svg");
        assert_eq!(endpoint.ipv6.extra["source"], "manual");
        assert_eq!(registry.extra["schema"], "v2");

        let json = serde_json::to_value(&registry).unwrap();
        assert_eq!(json["schema"], "v2");
        assert_eq!(json["endpoints"][0]["logo"], "example.svg");
        assert_eq!(json["endpoints"][0]["ipv6"]["notes"], "checked by hand");
        assert_eq!(json["endpoints"][0]["ipv6"]["source"], "manual");
    }

    #[test]
    fn missing_ipv6_record_defaults_to_unknown() {
        let endpoint: Endpoint = serde_json::from_str(
            r#"{"id": "bare", "name": "Bare", "url": "https://bare.example"}"#,
        )
        .unwrap();

        assert_eq!(endpoint.ipv6.status, Status::Unknown);
        assert!(endpoint.ipv6.tests.is_empty());
        assert!(endpoint.ipv6.last_checked.is_none());
    }

    #[test]
    fn duplicate_ids_are_reported_once() {
        let registry = Registry::new(vec![
            Endpoint::new("a", "A", "https://a.example"),
            Endpoint::new("b", "B", "https://b.example"),
            Endpoint::new("a", "A again", "https://a.example"),
            Endpoint::new("a", "A thrice", "https://a.example"),
        ]);

        assert_eq!(registry.duplicate_ids(), vec!["a"]);
    }
}
