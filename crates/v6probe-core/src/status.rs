//! Status inference
//!
//! The engine may only advance a status that is still `unknown`. A status
//! set by a human, or by an earlier run, is authoritative; at most a
//! mismatch against the freshly suggested value is reported.

use crate::model::{APEX_TEST_ID, Status, TestRecord, WWW_TEST_ID};

/// Stored status disagrees with what the current test results suggest
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusMismatch {
    pub stored: Status,
    pub suggested: Status,
}

/// Status implied by the apex and (if applicable) www outcomes
///
/// With no www variant, partial is unreachable.
pub fn suggest(apex_works: bool, www_works: Option<bool>) -> Status {
    match (apex_works, www_works) {
        (true, Some(true)) | (true, None) => Status::Full,
        (true, Some(false)) | (false, Some(true)) => Status::Partial,
        (false, Some(false)) | (false, None) => Status::None,
    }
}

/// Status implied by reconciled tests
///
/// Only `Confirmed` counts as working. The www outcome is considered iff a
/// `www_domain` test is present, which after reconciliation means the
/// variant applies.
pub fn suggest_from_tests(tests: &[TestRecord]) -> Status {
    let works = |id: &str| tests.iter().find(|t| t.id == id).map(|t| t.result.is_confirmed());

    suggest(works(APEX_TEST_ID).unwrap_or(false), works(WWW_TEST_ID))
}

/// New status to store, if any
///
/// Returns `Some` only when `current` is `unknown`.
pub fn infer(current: Status, suggested: Status) -> Option<Status> {
    match current {
        Status::Unknown if suggested != Status::Unknown => Some(suggested),
        _ => None,
    }
}

/// Advisory check of an authoritative status
pub fn check(stored: Status, suggested: Status) -> Option<StatusMismatch> {
    (stored != Status::Unknown && stored != suggested).then_some(StatusMismatch { stored, suggested })
}
