//! Run reports
//!
//! What the engine observed and decided, per endpoint. Reports are plain
//! data; rendering them is up to the caller.

use chrono::{DateTime, Utc};

use crate::model::{Status, TestResult};
use crate::probe::ProbeSet;
use crate::reconcile::TestChange;
use crate::status::StatusMismatch;
use crate::variant::DomainVariant;

/// What happened to the backing store at the end of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Persistence {
    /// Nothing observable changed; the store was not touched
    Unchanged,
    /// The registry was written back
    Written,
    /// Something changed, but the run was a dry run
    SkippedDryRun,
}

/// Outcome of one probing pass
#[derive(Debug, Clone)]
pub struct RunReport {
    /// Timestamp stamped onto every checked endpoint
    pub checked_at: DateTime<Utc>,
    pub endpoints: Vec<EndpointReport>,
    pub persistence: Persistence,
}

impl RunReport {
    pub fn dirty_count(&self) -> usize {
        self.endpoints.iter().filter(|e| e.dirty).count()
    }

    pub fn mismatches(&self) -> impl Iterator<Item = (&EndpointReport, &StatusMismatch)> {
        self.endpoints
            .iter()
            .filter_map(|e| e.mismatch.as_ref().map(|m| (e, m)))
    }
}

/// Outcome for one endpoint
#[derive(Debug, Clone)]
pub struct EndpointReport {
    pub id: String,
    pub name: String,
    pub url: String,
    pub variant: DomainVariant,
    /// Probe results after the override policy was applied
    pub probes: ProbeSet,
    /// Reason of the override rule applied to this endpoint, if any
    pub override_reason: Option<String>,
    pub changes: Vec<TestChange>,
    pub status_before: Status,
    pub status_after: Status,
    /// Status the current results point to, whether or not it was stored
    pub suggested_status: Status,
    /// Only computed in detail mode
    pub mismatch: Option<StatusMismatch>,
    pub apex: TestResult,
    pub www: Option<TestResult>,
    pub dirty: bool,
}

impl EndpointReport {
    pub fn status_changed(&self) -> bool {
        self.status_before != self.status_after
    }
}
