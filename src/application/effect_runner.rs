//! Effect execution.
//!
//! Turns [`Effect`] descriptions into port calls and reports their
//! completion as actions. Failures never escape: each one is either
//! mapped to a failure action the reducer understands or logged and
//! dropped, as the effect's contract states.
//!
//! | Effect | Yields |
//! |--------|--------|
//! | `LoadStoredAuthState` | exactly one `DidLoadStoredPurchaseAuthState` |
//! | `LoadLocalPurchaseData` | one local data update result, or nothing on read failure |
//! | `RequestAuthorization` | exactly one authorization request result |
//! | `PersistAuthState` | nothing |
//! | `Replay` | one `LocalDataUpdate` |

use futures::future::BoxFuture;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

use super::environment::SubscriptionEnvironment;
use crate::domain::foundation::TransactionId;
use crate::domain::subscription::{
    Action, AuthStateMap, Effect, InternalAction, LocalDataUpdateKind, StoredStateLoadError,
    SubscriptionAction,
};

/// Executes effects against a [`SubscriptionEnvironment`].
///
/// Persist effects may run concurrently but land in the order they were
/// started: a snapshot older than the last one written is skipped.
#[derive(Clone)]
pub struct EffectRunner {
    env: SubscriptionEnvironment,
    next_persist_seq: Arc<AtomicU64>,
    last_persisted_seq: Arc<Mutex<u64>>,
}

impl EffectRunner {
    pub fn new(env: SubscriptionEnvironment) -> Self {
        Self {
            env,
            next_persist_seq: Arc::new(AtomicU64::new(1)),
            last_persisted_seq: Arc::new(Mutex::new(0)),
        }
    }

    pub fn environment(&self) -> &SubscriptionEnvironment {
        &self.env
    }

    /// Starts `effect`. Ordering decisions are taken here, synchronously;
    /// the returned future does the I/O.
    pub fn start(&self, effect: Effect) -> BoxFuture<'static, Vec<Action>> {
        tracing::trace!(effect = effect.name(), "Starting effect");
        let env = self.env.clone();

        match effect {
            Effect::LoadStoredAuthState { replay } => {
                Box::pin(async move { vec![load_stored_auth_state(&env, replay).await] })
            }
            Effect::LoadLocalPurchaseData { kind } => {
                Box::pin(async move { load_local_purchase_data(&env, kind).await.into_iter().collect() })
            }
            Effect::RequestAuthorization { transaction_id } => {
                Box::pin(async move { vec![request_authorization(&env, transaction_id).await] })
            }
            Effect::PersistAuthState { snapshot } => {
                let seq = self.next_persist_seq.fetch_add(1, Ordering::SeqCst);
                let last = Arc::clone(&self.last_persisted_seq);
                Box::pin(async move {
                    persist_auth_state(&env, &last, seq, snapshot).await;
                    Vec::new()
                })
            }
            Effect::Replay(kind) => Box::pin(async move {
                vec![SubscriptionAction::LocalDataUpdate(kind).into()]
            }),
        }
    }

    /// Runs `effect` to completion.
    pub async fn run(&self, effect: Effect) -> Vec<Action> {
        self.start(effect).await
    }
}

async fn load_stored_auth_state(
    env: &SubscriptionEnvironment,
    replay: Option<LocalDataUpdateKind>,
) -> Action {
    let result = match env.auth_state_store.load().await {
        // Requests recorded as pending belonged to an earlier session.
        Ok(map) => Ok(map.without_in_flight()),
        Err(e) => {
            tracing::warn!(error = %e, "Stored authorization state unreadable");
            Err(StoredStateLoadError::from(e))
        }
    };

    SubscriptionAction::DidLoadStoredPurchaseAuthState { result, replay }.into()
}

async fn load_local_purchase_data(
    env: &SubscriptionEnvironment,
    kind: LocalDataUpdateKind,
) -> Option<Action> {
    match env.purchase_data.snapshot().await {
        Ok(snapshot) => {
            let diff = snapshot.into_diff(kind, env.clock.now());
            tracing::debug!(
                %kind,
                observed = diff.observed.len(),
                rejected = diff.permanently_rejected.len(),
                "Read local purchase data"
            );
            Some(InternalAction::local_data_update_result(diff).into())
        }
        Err(e) => {
            tracing::warn!(%kind, error = %e, "Failed to read local purchase data, dropping update");
            None
        }
    }
}

async fn request_authorization(env: &SubscriptionEnvironment, transaction_id: TransactionId) -> Action {
    let outcome = env
        .authorization_client
        .authorize(&transaction_id)
        .await
        .map_err(Into::into);

    InternalAction::authorization_request_result(transaction_id, outcome, env.clock.now()).into()
}

async fn persist_auth_state(
    env: &SubscriptionEnvironment,
    last_persisted_seq: &Mutex<u64>,
    seq: u64,
    snapshot: AuthStateMap,
) {
    let mut last = last_persisted_seq.lock().await;
    if seq < *last {
        tracing::debug!(seq, last = *last, "Skipping superseded authorization state snapshot");
        return;
    }

    match env.auth_state_store.save(&snapshot).await {
        Ok(()) => *last = seq,
        Err(e) => {
            tracing::warn!(error = %e, records = snapshot.len(), "Failed to persist authorization state");
        }
    }
}
