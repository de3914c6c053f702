//! Sequential driver for one-shot runs and tests.
//!
//! Runs an action and everything it causes, depth first, awaiting each
//! effect before moving on. Deterministic for deterministic collaborators.
//! A step budget bounds the run so a cycle between actions and effects
//! surfaces as an error instead of a hang.

use super::effect_runner::EffectRunner;
use crate::domain::subscription::{reduce, Action, SubscriptionState};

/// Errors that can stop a drive before quiescence.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DriveError {
    #[error("Step budget of {budget} actions exhausted before quiescence")]
    StepBudgetExceeded { budget: usize },
}

/// Work done by one drive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DriveReport {
    /// Actions reduced, including the initial one.
    pub steps: usize,

    /// Effects executed.
    pub effects: usize,
}

/// Reduce `action` and every action its effects produce until none remain.
///
/// # Errors
/// Returns `DriveError::StepBudgetExceeded` if more than `max_steps`
/// actions would be reduced. `state` reflects the steps taken so far.
pub async fn drive_to_quiescence(
    state: &mut SubscriptionState,
    action: Action,
    runner: &EffectRunner,
    max_steps: usize,
) -> Result<DriveReport, DriveError> {
    let mut report = DriveReport::default();
    let mut stack = vec![action];

    while let Some(action) = stack.pop() {
        if report.steps >= max_steps {
            tracing::warn!(budget = max_steps, "Drive step budget exhausted");
            return Err(DriveError::StepBudgetExceeded { budget: max_steps });
        }
        report.steps += 1;

        let mut produced = Vec::new();
        for effect in reduce(state, action) {
            report.effects += 1;
            produced.extend(runner.run(effect).await);
        }

        // First produced action is reduced next.
        stack.extend(produced.into_iter().rev());
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use std::sync::Arc;

    use crate::adapters::authorization::DefaultResponse;
    use crate::adapters::{
        FixedClock, InMemoryAuthStateStore, InMemoryPurchaseData, MockAuthorizationClient,
    };
    use crate::application::SubscriptionEnvironment;
    use crate::domain::foundation::{Timestamp, TransactionId};
    use crate::domain::subscription::{
        AuthStateMap, AuthorizationRecord, AuthorizationStatus, LocalDataUpdateKind, ReasonCode,
        Rejection, SubscriptionAction,
    };
    use crate::domain::subscription::strategies::{action_strategy, state_strategy};
    use crate::ports::{AuthStateStore, AuthorizationError};

    fn txn(id: &str) -> TransactionId {
        TransactionId::new(id).unwrap()
    }

    struct World {
        store: InMemoryAuthStateStore,
        client: MockAuthorizationClient,
        purchases: InMemoryPurchaseData,
        runner: EffectRunner,
    }

    fn world() -> World {
        let store = InMemoryAuthStateStore::new();
        let client = MockAuthorizationClient::new();
        let purchases = InMemoryPurchaseData::new();
        let runner = EffectRunner::new(SubscriptionEnvironment::new(
            Arc::new(store.clone()),
            Arc::new(client.clone()),
            Arc::new(purchases.clone()),
            Arc::new(FixedClock::new(Timestamp::from_unix_secs(1_700_000_000))),
        ));
        World {
            store,
            client,
            purchases,
            runner,
        }
    }

    #[tokio::test]
    async fn first_update_loads_replays_and_persists() {
        let w = world();
        w.purchases.add_transaction(txn("t1")).await;
        let mut state = SubscriptionState::new();

        let report = drive_to_quiescence(
            &mut state,
            SubscriptionAction::LocalDataUpdate(LocalDataUpdateKind::PurchasesRefreshed).into(),
            &w.runner,
            100,
        )
        .await
        .unwrap();

        // update -> load -> replayed update -> reconciliation
        assert_eq!(report.steps, 4);
        assert_eq!(
            state.status_of(&txn("t1")),
            Some(&AuthorizationStatus::NotRequested)
        );
        assert_eq!(w.store.stored().await.len(), 1);
    }

    #[tokio::test]
    async fn authorization_round_trip_persists_token() {
        let w = world();
        let mut state = SubscriptionState::loaded(
            [(txn("t1"), AuthorizationRecord::not_requested(None))]
                .into_iter()
                .collect(),
        );

        drive_to_quiescence(
            &mut state,
            SubscriptionAction::RequestAuthorizationForPurchases.into(),
            &w.runner,
            100,
        )
        .await
        .unwrap();

        let expected = AuthorizationStatus::Authorized {
            token: MockAuthorizationClient::default_token(&txn("t1")),
        };
        assert_eq!(state.status_of(&txn("t1")), Some(&expected));
        assert!(state.transactions_pending_auth_request().is_empty());
        assert_eq!(w.store.stored().await.status_of(&txn("t1")), Some(&expected));
    }

    #[tokio::test]
    async fn budget_stops_drive() {
        let w = world();
        let mut state = SubscriptionState::new();

        let err = drive_to_quiescence(
            &mut state,
            SubscriptionAction::LocalDataUpdate(LocalDataUpdateKind::PurchasesRefreshed).into(),
            &w.runner,
            2,
        )
        .await
        .unwrap_err();

        assert_eq!(err, DriveError::StepBudgetExceeded { budget: 2 });
        assert!(state.is_loaded());
    }

    fn status_strategy() -> impl Strategy<Value = AuthorizationStatus> {
        prop_oneof![
            Just(AuthorizationStatus::NotRequested),
            Just(AuthorizationStatus::Pending),
            Just(AuthorizationStatus::Rejected(Rejection::retryable("http_503"))),
            Just(AuthorizationStatus::Rejected(Rejection::permanent("http_403"))),
        ]
    }

    fn stored_strategy() -> impl Strategy<Value = AuthStateMap> {
        proptest::collection::btree_map(
            (0u8..5).prop_map(|n| txn(&format!("t{}", n))),
            status_strategy().prop_map(|s| AuthorizationRecord::with_status(s, None)),
            0..5,
        )
        .prop_map(|records| records.into_iter().collect())
    }

    fn host_action_strategy() -> impl Strategy<Value = SubscriptionAction> {
        prop_oneof![
            Just(SubscriptionAction::LocalDataUpdate(
                LocalDataUpdateKind::PurchasesRefreshed
            )),
            Just(SubscriptionAction::LocalDataUpdate(
                LocalDataUpdateKind::RejectedAuthorizationsUpdated
            )),
            Just(SubscriptionAction::RequestAuthorizationForPurchases),
        ]
    }

    fn client_answer(client: &MockAuthorizationClient, answer: u8) {
        match answer {
            0 => {}
            1 => client.set_default(DefaultResponse::Fail(AuthorizationError::retryable(
                "http_503", "busy",
            ))),
            _ => client.set_default(DefaultResponse::Fail(AuthorizationError::permanent(
                "http_403", "forbidden",
            ))),
        }
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        /// Any action on any reachable state settles: a load with queued
        /// updates replays each once, results chain only to a persist.
        #[test]
        fn every_action_terminates_from_any_state(
            state in state_strategy(),
            action in action_strategy(),
            observed in proptest::collection::btree_set((0u8..8).prop_map(|n| txn(&format!("t{}", n))), 0..6),
            purchases_fail in any::<bool>(),
            answer in 0u8..3,
        ) {
            let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            let (report, before, after) = rt.block_on(async move {
                let w = world();
                for id in observed {
                    w.purchases.add_transaction(id).await;
                }
                if purchases_fail {
                    w.purchases.set_failure(Some("unreadable".to_string())).await;
                }
                client_answer(&w.client, answer);

                let mut next = state.clone();
                let report = drive_to_quiescence(&mut next, action, &w.runner, 50).await;
                (report, state, next)
            });

            // Root plus at most three replays, each an update and its result.
            let report = report.map_err(|e| TestCaseError::fail(e.to_string()))?;
            prop_assert!(report.steps <= 7, "took {} steps", report.steps);
            prop_assert!(
                after.transactions_pending_auth_request().len()
                    <= before.transactions_pending_auth_request().len() + 1
            );
        }

        /// Every host action reaches quiescence well within the budget,
        /// whatever the collaborators answer.
        #[test]
        fn every_host_action_terminates(
            stored in stored_strategy(),
            observed in proptest::collection::btree_set((0u8..8).prop_map(|n| txn(&format!("t{}", n))), 0..6),
            rejected in proptest::collection::btree_set((0u8..8).prop_map(|n| txn(&format!("t{}", n))), 0..3),
            loaded in any::<bool>(),
            store_fails in any::<bool>(),
            answer in 0u8..3,
            actions in proptest::collection::vec(host_action_strategy(), 1..8),
        ) {
            let rt = tokio::runtime::Builder::new_current_thread().enable_all().build().unwrap();
            rt.block_on(async move {
                let w = world();
                for id in observed {
                    w.purchases.add_transaction(id).await;
                }
                for id in rejected {
                    w.purchases.reject(id, ReasonCode::new("http_403")).await;
                }
                if store_fails {
                    w.store.fail_loads("corrupt").await;
                    w.store.fail_saves("read-only").await;
                } else {
                    w.store.save(&stored).await.unwrap();
                }
                client_answer(&w.client, answer);

                let mut state = if loaded {
                    SubscriptionState::loaded(stored.without_in_flight())
                } else {
                    SubscriptionState::new()
                };

                for action in actions {
                    let report = drive_to_quiescence(&mut state, action.into(), &w.runner, 50)
                        .await
                        .unwrap();
                    assert!(report.steps <= 6, "took {} steps", report.steps);
                    assert!(state.transactions_pending_auth_request().is_empty());
                }
            });
        }
    }
}
