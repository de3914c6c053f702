//! Authorization records and the per-transaction authorization map.

use serde::{Deserialize, Serialize};
use std::collections::btree_map;
use std::collections::{BTreeMap, BTreeSet};

use super::status::AuthorizationStatus;
use crate::domain::foundation::{StateMachine, Timestamp, TransactionId, ValidationError};

/// Authorization record for a single purchase transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthorizationRecord {
    pub status: AuthorizationStatus,

    /// Time carried by the action that last changed the status.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<Timestamp>,
}

impl AuthorizationRecord {
    /// Creates a record for a newly observed transaction.
    pub fn not_requested(observed_at: Option<Timestamp>) -> Self {
        Self {
            status: AuthorizationStatus::NotRequested,
            updated_at: observed_at,
        }
    }

    /// Creates a record with an explicit status.
    pub fn with_status(status: AuthorizationStatus, updated_at: Option<Timestamp>) -> Self {
        Self { status, updated_at }
    }

    /// Moves the record to `next`, validating the lifecycle transition.
    ///
    /// `at` replaces `updated_at` when present; transitions driven by
    /// actions that carry no time keep the previous value.
    pub fn transition(
        &mut self,
        next: AuthorizationStatus,
        at: Option<Timestamp>,
    ) -> Result<(), ValidationError> {
        self.status.phase().transition_to(next.phase())?;
        self.status = next;
        if at.is_some() {
            self.updated_at = at;
        }
        Ok(())
    }
}

/// Mapping from transaction identity to its authorization record.
///
/// Ordered by `TransactionId` so that iteration, selection and the
/// persisted layout are deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AuthStateMap(BTreeMap<TransactionId, AuthorizationRecord>);

impl AuthStateMap {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: &TransactionId) -> Option<&AuthorizationRecord> {
        self.0.get(id)
    }

    pub fn get_mut(&mut self, id: &TransactionId) -> Option<&mut AuthorizationRecord> {
        self.0.get_mut(id)
    }

    pub fn contains(&self, id: &TransactionId) -> bool {
        self.0.contains_key(id)
    }

    /// Inserts or replaces a record, returning the previous one.
    pub fn insert(
        &mut self,
        id: TransactionId,
        record: AuthorizationRecord,
    ) -> Option<AuthorizationRecord> {
        self.0.insert(id, record)
    }

    pub fn status_of(&self, id: &TransactionId) -> Option<&AuthorizationStatus> {
        self.0.get(id).map(|record| &record.status)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, TransactionId, AuthorizationRecord> {
        self.0.iter()
    }

    pub fn iter_mut(&mut self) -> btree_map::IterMut<'_, TransactionId, AuthorizationRecord> {
        self.0.iter_mut()
    }

    /// Returns the earliest transaction eligible for an authorization
    /// request that is not already awaiting one.
    pub fn first_eligible(&self, in_flight: &BTreeSet<TransactionId>) -> Option<&TransactionId> {
        self.0
            .iter()
            .find(|(id, record)| {
                record.status.is_eligible_for_request() && !in_flight.contains(*id)
            })
            .map(|(id, _)| id)
    }

    /// Returns a copy where records left `Pending` by an earlier session
    /// are eligible again.
    ///
    /// A stored `Pending` can never be resolved: the request that owned it
    /// died with the previous process.
    pub fn without_in_flight(&self) -> Self {
        let mut map = self.clone();
        for record in map.0.values_mut() {
            if record.status == AuthorizationStatus::Pending {
                record.status = AuthorizationStatus::NotRequested;
            }
        }
        map
    }

    /// Counts records by status.
    pub fn summary(&self) -> AuthStateSummary {
        let mut summary = AuthStateSummary::default();
        for record in self.0.values() {
            match &record.status {
                AuthorizationStatus::NotRequested => summary.not_requested += 1,
                AuthorizationStatus::Pending => summary.pending += 1,
                AuthorizationStatus::Authorized { .. } => summary.authorized += 1,
                AuthorizationStatus::Rejected(r) if r.is_permanent() => summary.rejected += 1,
                AuthorizationStatus::Rejected(_) => summary.retryable += 1,
            }
        }
        summary
    }
}

impl FromIterator<(TransactionId, AuthorizationRecord)> for AuthStateMap {
    fn from_iter<I: IntoIterator<Item = (TransactionId, AuthorizationRecord)>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a AuthStateMap {
    type Item = (&'a TransactionId, &'a AuthorizationRecord);
    type IntoIter = btree_map::Iter<'a, TransactionId, AuthorizationRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// Record counts by status, for logging and status output.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct AuthStateSummary {
    pub not_requested: usize,
    pub pending: usize,
    pub authorized: usize,
    pub retryable: usize,
    pub rejected: usize,
}
