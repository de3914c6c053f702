//! Merge of freshly observed local purchase facts into the authorization map.
//!
//! Rules, applied in order:
//!
//! 0. Observed transactions missing from the map are added as `NotRequested`.
//! 1. Transactions the remote authority rejected for good become
//!    `Rejected(permanent)`, unless already `Authorized`, already permanently
//!    rejected, or awaiting an in-flight request (the request decides those).
//! 2. `Rejected(retryable)` records go back to `NotRequested`.
//! 3. Everything else is left alone.
//!
//! Applying the same diff twice yields the same map as applying it once.

use std::collections::BTreeSet;

use super::actions::LocalDataDiff;
use super::record::{AuthStateMap, AuthorizationRecord};
use super::status::{AuthorizationPhase, AuthorizationStatus};
use super::values::{Rejection, RejectionClass};
use crate::domain::foundation::TransactionId;

/// Applies `diff` to `map`. Returns true if any record changed.
pub(crate) fn reconcile(
    map: &mut AuthStateMap,
    in_flight: &BTreeSet<TransactionId>,
    diff: &LocalDataDiff,
) -> bool {
    let at = Some(diff.observed_at);
    let mut changed = false;

    for id in &diff.observed {
        if !map.contains(id) {
            tracing::debug!(transaction_id = %id, "Recording newly observed transaction");
            map.insert(id.clone(), AuthorizationRecord::not_requested(at));
            changed = true;
        }
    }

    for (id, code) in &diff.permanently_rejected {
        if in_flight.contains(id) {
            tracing::debug!(
                transaction_id = %id,
                "Rejection reported for in-flight transaction, deferring to request result"
            );
            continue;
        }

        let next = AuthorizationStatus::Rejected(Rejection {
            class: RejectionClass::Permanent,
            code: code.clone(),
        });

        match map.get_mut(id) {
            None => {
                map.insert(id.clone(), AuthorizationRecord::with_status(next, at));
                changed = true;
            }
            Some(record) => match record.status.phase() {
                // Terminal. A permanent rejection keeps the code it was first given.
                AuthorizationPhase::Authorized | AuthorizationPhase::RejectedPermanent => {}
                _ => match record.transition(next, at) {
                    Ok(()) => {
                        tracing::info!(transaction_id = %id, code = %code, "Transaction rejected by remote authority");
                        changed = true;
                    }
                    Err(e) => {
                        tracing::warn!(transaction_id = %id, error = %e, "Skipping invalid rejection");
                    }
                },
            },
        }
    }

    for (id, record) in map.iter_mut() {
        if record.status.phase() == AuthorizationPhase::RejectedRetryable {
            match record.transition(AuthorizationStatus::NotRequested, at) {
                Ok(()) => {
                    tracing::debug!(transaction_id = %id, "Retryable rejection eligible again");
                    changed = true;
                }
                Err(e) => {
                    tracing::warn!(transaction_id = %id, error = %e, "Skipping invalid reset");
                }
            }
        }
    }

    changed
}
