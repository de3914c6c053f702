//! proptest strategies for states and actions the reducer can see.

use proptest::prelude::*;

use super::actions::{
    Action, InternalAction, LocalDataDiff, LocalDataUpdateKind, StoredStateLoadError,
    SubscriptionAction,
};
use super::record::{AuthStateMap, AuthorizationRecord};
use super::state::{StoredAuthState, SubscriptionState};
use super::status::AuthorizationStatus;
use super::values::{AuthorizationToken, ReasonCode, Rejection};
use crate::domain::foundation::{Timestamp, TransactionId};

pub(crate) fn txn_strategy() -> impl Strategy<Value = TransactionId> {
    (0u8..6).prop_map(|n| TransactionId::new(format!("t{}", n)).unwrap())
}

pub(crate) fn code_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("http_400".to_string()),
        Just("http_403".to_string()),
        Just("http_503".to_string()),
        Just("timeout".to_string()),
    ]
}

pub(crate) fn timestamp_strategy() -> impl Strategy<Value = Timestamp> {
    (1_600_000_000i64..1_800_000_000).prop_map(Timestamp::from_unix_secs)
}

pub(crate) fn rejection_strategy() -> impl Strategy<Value = Rejection> {
    prop_oneof![
        code_strategy().prop_map(Rejection::retryable),
        code_strategy().prop_map(Rejection::permanent),
    ]
}

pub(crate) fn status_strategy() -> impl Strategy<Value = AuthorizationStatus> {
    prop_oneof![
        Just(AuthorizationStatus::NotRequested),
        Just(AuthorizationStatus::Pending),
        "[a-z]{4,8}".prop_map(|t| AuthorizationStatus::Authorized {
            token: AuthorizationToken::new(t)
        }),
        rejection_strategy().prop_map(AuthorizationStatus::Rejected),
    ]
}

pub(crate) fn map_strategy() -> impl Strategy<Value = AuthStateMap> {
    proptest::collection::btree_map(
        txn_strategy(),
        (status_strategy(), proptest::option::of(timestamp_strategy()))
            .prop_map(|(status, at)| AuthorizationRecord::with_status(status, at)),
        0..6,
    )
    .prop_map(|records| records.into_iter().collect())
}

pub(crate) fn stored_strategy() -> impl Strategy<Value = StoredAuthState> {
    prop_oneof![
        1 => Just(StoredAuthState::NotLoaded),
        1 => proptest::collection::vec(kind_strategy(), 0..3).prop_map(|kinds| {
            let mut queued = Vec::new();
            for kind in kinds {
                if !queued.contains(&kind) {
                    queued.push(kind);
                }
            }
            StoredAuthState::Loading { queued }
        }),
        6 => map_strategy().prop_map(StoredAuthState::Loaded),
    ]
}

/// States the reducer can reach: in-flight requests exist only once the
/// map is loaded, and are a subset of the records marked `Pending`.
pub(crate) fn state_strategy() -> impl Strategy<Value = SubscriptionState> {
    stored_strategy()
        .prop_flat_map(|stored| {
            let pending: Vec<TransactionId> = stored
                .map()
                .iter()
                .flat_map(|m| m.iter())
                .filter(|(_, r)| r.status == AuthorizationStatus::Pending)
                .map(|(id, _)| id.clone())
                .collect();
            let len = pending.len();
            (
                Just(stored),
                proptest::sample::subsequence(pending, 0..=len),
            )
        })
        .prop_map(|(stored, in_flight)| SubscriptionState {
            purchases_auth_state: stored,
            transactions_pending_auth_request: in_flight.into_iter().collect(),
        })
}

pub(crate) fn kind_strategy() -> impl Strategy<Value = LocalDataUpdateKind> {
    prop_oneof![
        Just(LocalDataUpdateKind::RejectedAuthorizationsUpdated),
        Just(LocalDataUpdateKind::PurchasesRefreshed),
        Just(LocalDataUpdateKind::ConnectivityRestored),
    ]
}

pub(crate) fn diff_strategy() -> impl Strategy<Value = LocalDataDiff> {
    (
        kind_strategy(),
        timestamp_strategy(),
        proptest::collection::btree_set(txn_strategy(), 0..4),
        proptest::collection::btree_map(
            txn_strategy(),
            code_strategy().prop_map(ReasonCode::new),
            0..3,
        ),
    )
        .prop_map(|(kind, observed_at, observed, permanently_rejected)| LocalDataDiff {
            kind,
            observed_at,
            observed,
            permanently_rejected,
        })
}

pub(crate) fn outcome_strategy(
) -> impl Strategy<Value = Result<AuthorizationToken, Rejection>> {
    prop_oneof![
        "[a-z]{4,8}".prop_map(|t| Ok(AuthorizationToken::new(t))),
        rejection_strategy().prop_map(Err),
    ]
}

pub(crate) fn action_strategy() -> impl Strategy<Value = Action> {
    prop_oneof![
        kind_strategy().prop_map(|k| SubscriptionAction::LocalDataUpdate(k).into()),
        (
            prop_oneof![
                map_strategy().prop_map(Ok),
                Just(Err(StoredStateLoadError::new("unreadable"))),
            ],
            proptest::option::of(kind_strategy()),
        )
            .prop_map(|(result, replay)| {
                SubscriptionAction::DidLoadStoredPurchaseAuthState { result, replay }.into()
            }),
        Just(SubscriptionAction::RequestAuthorizationForPurchases.into()),
        diff_strategy().prop_map(|d| InternalAction::local_data_update_result(d).into()),
        (txn_strategy(), outcome_strategy(), timestamp_strategy()).prop_map(
            |(id, outcome, at)| {
                InternalAction::authorization_request_result(id, outcome, at).into()
            }
        ),
    ]
}
