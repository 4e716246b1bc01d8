//! Test record reconciliation
//!
//! Folds fresh probe observations into an endpoint's persisted test list.
//!
//! ## Rules
//!
//! 1. Legacy ids are migrated in place, keeping their `result`
//! 2. Missing tests are created as `Unevaluated`
//! 3. `result = has_aaaa && http_works` for each applicable variant
//! 4. A `www_domain` test is dropped once its variant no longer applies
//!
//! Any of these marks the endpoint dirty. Nothing else in the endpoint is
//! touched here.

use crate::model::{
    APEX_TEST_ID, LEGACY_APEX_TEST_ID, LEGACY_WWW_TEST_ID, TestRecord, TestResult, WWW_TEST_ID,
};
use crate::probe::{ProbeResult, ProbeSet};

/// Canonical definition of a managed test
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TestDefinition {
    pub id: &'static str,
    pub legacy_id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
}

impl TestDefinition {
    fn record(&self, result: TestResult) -> TestRecord {
        TestRecord::new(self.id, self.name, self.description, result)
    }
}

pub const APEX_TEST: TestDefinition = TestDefinition {
    id: APEX_TEST_ID,
    legacy_id: LEGACY_APEX_TEST_ID,
    name: "Apex domain",
    description: "The apex hostname has an AAAA record and answers HTTP over IPv6",
};

pub const WWW_TEST: TestDefinition = TestDefinition {
    id: WWW_TEST_ID,
    legacy_id: LEGACY_WWW_TEST_ID,
    name: "www domain",
    description: "The www hostname has an AAAA record and answers HTTP over IPv6",
};

const MANAGED_TESTS: [TestDefinition; 2] = [APEX_TEST, WWW_TEST];

/// A single change made to an endpoint's tests
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TestChange {
    /// A legacy id was renamed in place
    Migrated { from: &'static str, to: &'static str },
    /// A legacy record was dropped because the current id already existed
    LegacyDropped { id: String },
    /// A later record with an already-seen id was dropped
    DuplicateDropped { id: String },
    /// A test was created
    Created { id: &'static str },
    /// A test's result changed
    Updated {
        id: &'static str,
        from: TestResult,
        to: TestResult,
    },
    /// A test no longer applies and was removed
    Removed { id: &'static str },
}

/// Outcome of reconciling one endpoint
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reconciliation {
    pub tests: Vec<TestRecord>,
    pub changes: Vec<TestChange>,
}

impl Reconciliation {
    pub fn is_dirty(&self) -> bool {
        !self.changes.is_empty()
    }
}

/// Migrate legacy ids without touching results
///
/// Returns a new collection. Later duplicates of an id are dropped, and a
/// legacy record is dropped outright when its current id is already
/// present.
pub fn reconcile_legacy(tests: &[TestRecord]) -> (Vec<TestRecord>, Vec<TestChange>) {
    let mut out: Vec<TestRecord> = Vec::with_capacity(tests.len());
    let mut changes = Vec::new();

    for test in tests {
        let legacy = MANAGED_TESTS.iter().find(|def| def.legacy_id == test.id);

        let record = match legacy {
            Some(def) if tests.iter().any(|t| t.id == def.id) => {
                changes.push(TestChange::LegacyDropped {
                    id: test.id.clone(),
                });
                continue;
            }
            Some(def) => {
                changes.push(TestChange::Migrated {
                    from: def.legacy_id,
                    to: def.id,
                });
                def.record(test.result)
            }
            None => test.clone(),
        };

        if out.iter().any(|t| t.id == record.id) {
            changes.push(TestChange::DuplicateDropped { id: record.id });
            continue;
        }
        out.push(record);
    }

    (out, changes)
}

/// Reconcile `tests` against fresh probe results
pub fn reconcile(tests: &[TestRecord], probes: &ProbeSet) -> Reconciliation {
    let (mut tests, mut changes) = reconcile_legacy(tests);

    apply_result(&mut tests, &mut changes, &APEX_TEST, &probes.apex);

    match &probes.www {
        Some(www) => apply_result(&mut tests, &mut changes, &WWW_TEST, www),
        None => {
            let before = tests.len();
            tests.retain(|t| t.id != WWW_TEST.id);
            if tests.len() != before {
                changes.push(TestChange::Removed { id: WWW_TEST.id });
            }
        }
    }

    Reconciliation { tests, changes }
}

fn apply_result(
    tests: &mut Vec<TestRecord>,
    changes: &mut Vec<TestChange>,
    def: &TestDefinition,
    probe: &ProbeResult,
) {
    let index = match tests.iter().position(|t| t.id == def.id) {
        Some(index) => index,
        None => {
            tests.push(def.record(TestResult::Unevaluated));
            changes.push(TestChange::Created { id: def.id });
            tests.len() - 1
        }
    };

    let computed = TestResult::from(probe.works());
    let test = &mut tests[index];
    if test.result != computed {
        changes.push(TestChange::Updated {
            id: def.id,
            from: test.result,
            to: computed,
        });
        test.result = computed;
    }
}
