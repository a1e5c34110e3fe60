//! Timestamp arbitration for last-write-wins reconciliation.
//!
//! Every component of the sync protocol orders records with the same rule:
//! an incoming `updated_at` only wins when it is strictly greater than the
//! stored one. Uploads use it per entity ([`decide`]), downloads and update
//! counts use it against a checkpoint ([`changed_since`]).

use crate::Timestamp;
use chrono::SubsecRound;
use serde::Serialize;

/// Outcome of comparing an existing record version with an incoming one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Decision {
    /// No record exists in scope; insert the incoming one.
    Create,
    /// The incoming record is strictly newer; overwrite the stored one.
    Apply,
    /// The incoming record is older or equal; leave the stored one untouched.
    Discard,
}

impl Decision {
    /// Whether the decision results in a write.
    pub fn writes(self) -> bool {
        !matches!(self, Decision::Discard)
    }
}

/// Decide what to do with an incoming record version.
///
/// `existing` is the stored `updated_at` of the record with the same
/// identifier in the same scope, or `None` when there is no such record.
/// Ties discard.
pub fn decide(existing: Option<Timestamp>, incoming: Timestamp) -> Decision {
    match existing {
        None => Decision::Create,
        Some(stored) if incoming > stored => Decision::Apply,
        Some(_) => Decision::Discard,
    }
}

/// Whether a record changed after a checkpoint.
///
/// Without a checkpoint every record counts as changed.
pub fn changed_since(updated_at: Timestamp, checkpoint: Option<Timestamp>) -> bool {
    checkpoint.map_or(true, |checkpoint| updated_at > checkpoint)
}

/// Truncate a timestamp to microsecond precision.
///
/// Storage keeps microseconds, so versions are normalized before they are
/// compared or stored; otherwise a replayed nanosecond timestamp would look
/// newer than its own stored copy.
pub fn normalize(timestamp: Timestamp) -> Timestamp {
    timestamp.trunc_subsecs(6)
}

/// Per-kind tally of arbiter decisions.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Tally {
    pub created: usize,
    pub applied: usize,
    pub discarded: usize,
}

impl Tally {
    /// Count one decision.
    pub fn record(&mut self, decision: Decision) {
        match decision {
            Decision::Create => self.created += 1,
            Decision::Apply => self.applied += 1,
            Decision::Discard => self.discarded += 1,
        }
    }

    /// Total number of decisions counted.
    pub fn total(&self) -> usize {
        self.created + self.applied + self.discarded
    }
}

/// Outcome of reconciling one upload batch.
///
/// This is kept server-side; callers only learn that the upload succeeded.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct UploadSummary {
    pub animals: Tally,
    pub events: Tally,
    pub vaccines: Tally,
}

impl UploadSummary {
    /// Number of entities that were written.
    pub fn written(&self) -> usize {
        [self.animals, self.events, self.vaccines]
            .iter()
            .map(|tally| tally.created + tally.applied)
            .sum()
    }

    /// Number of entities discarded as stale.
    pub fn discarded(&self) -> usize {
        self.animals.discarded + self.events.discarded + self.vaccines.discarded
    }
}
