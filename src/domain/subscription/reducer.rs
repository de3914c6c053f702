//! Subscription authorization reducer.
//!
//! Pure transition function: given the current state and one action it
//! mutates the state and returns the effects to run. It performs no I/O,
//! reads no clock and never fails; every action, including failure
//! payloads, has a defined transition.
//!
//! Admission control: `RequestAuthorizationForPurchases` admits at most one
//! transaction per invocation and an authorization result retires at most
//! one, so the set of in-flight requests moves by at most one element per
//! call.
//!
//! Stored state is read once per session. Local data updates that arrive
//! before that read completes are queued and replayed after it.

use super::actions::{
    Action, AuthorizationOutcome, InternalAction, InternalEvent, LocalDataDiff,
    LocalDataUpdateKind, StoredStateLoadError, SubscriptionAction,
};
use super::effects::Effect;
use super::reconciliation::reconcile;
use super::record::AuthStateMap;
use super::state::{StoredAuthState, SubscriptionState};
use super::status::AuthorizationStatus;
use crate::domain::foundation::{Timestamp, TransactionId};

/// Applies `action` to `state` and returns the effects to execute.
pub fn reduce(state: &mut SubscriptionState, action: Action) -> Vec<Effect> {
    tracing::trace!(action = action.name(), "Reducing action");

    match action {
        Action::External(SubscriptionAction::LocalDataUpdate(kind)) => {
            local_data_update(state, kind)
        }
        Action::External(SubscriptionAction::DidLoadStoredPurchaseAuthState { result, replay }) => {
            did_load_stored_purchase_auth_state(state, result, replay)
        }
        Action::External(SubscriptionAction::RequestAuthorizationForPurchases) => {
            request_authorization_for_purchases(state)
        }
        Action::Internal(InternalAction(InternalEvent::LocalDataUpdateResult(diff))) => {
            local_data_update_result(state, &diff)
        }
        Action::Internal(InternalAction(InternalEvent::AuthorizationRequestResult {
            transaction_id,
            outcome,
            completed_at,
        })) => authorization_request_result(state, transaction_id, outcome, completed_at),
    }
}

fn local_data_update(state: &mut SubscriptionState, kind: LocalDataUpdateKind) -> Vec<Effect> {
    match &mut state.purchases_auth_state {
        StoredAuthState::Loaded(_) => return vec![Effect::LoadLocalPurchaseData { kind }],
        StoredAuthState::Loading { queued } => {
            if !queued.contains(&kind) {
                queued.push(kind);
            }
            tracing::debug!(%kind, "Stored state load in flight, queueing update");
            return Vec::new();
        }
        StoredAuthState::NotLoaded => {}
    }

    tracing::debug!(%kind, "Stored state not loaded yet, loading before update");
    state.purchases_auth_state = StoredAuthState::Loading { queued: Vec::new() };
    vec![Effect::LoadStoredAuthState { replay: Some(kind) }]
}

fn did_load_stored_purchase_auth_state(
    state: &mut SubscriptionState,
    result: Result<AuthStateMap, StoredStateLoadError>,
    replay: Option<LocalDataUpdateKind>,
) -> Vec<Effect> {
    let map = match result {
        Ok(map) => {
            tracing::info!(records = map.len(), "Loaded stored purchase authorization state");
            map
        }
        Err(e) => {
            tracing::warn!(error = %e, "Failed to load stored purchase authorization state, starting empty");
            AuthStateMap::new()
        }
    };

    let queued = match std::mem::replace(
        &mut state.purchases_auth_state,
        StoredAuthState::Loaded(map),
    ) {
        StoredAuthState::Loading { queued } => queued,
        _ => Vec::new(),
    };

    let mut kinds: Vec<LocalDataUpdateKind> = replay.into_iter().collect();
    for kind in queued {
        if !kinds.contains(&kind) {
            kinds.push(kind);
        }
    }
    kinds.into_iter().map(Effect::Replay).collect()
}

fn local_data_update_result(state: &mut SubscriptionState, diff: &LocalDataDiff) -> Vec<Effect> {
    let Some(map) = state.purchases_auth_state.map_mut() else {
        tracing::debug!(kind = %diff.kind, "Dropping local data update for unloaded state");
        return Vec::new();
    };

    if reconcile(map, &state.transactions_pending_auth_request, diff) {
        vec![Effect::PersistAuthState {
            snapshot: map.clone(),
        }]
    } else {
        Vec::new()
    }
}

fn request_authorization_for_purchases(state: &mut SubscriptionState) -> Vec<Effect> {
    let Some(map) = state.purchases_auth_state.map_mut() else {
        tracing::debug!("Stored state not loaded yet, no purchases to authorize");
        return Vec::new();
    };

    let Some(id) = map
        .first_eligible(&state.transactions_pending_auth_request)
        .cloned()
    else {
        return Vec::new();
    };

    let Some(record) = map.get_mut(&id) else {
        return Vec::new();
    };
    if let Err(e) = record.transition(AuthorizationStatus::Pending, None) {
        tracing::warn!(transaction_id = %id, error = %e, "Cannot submit transaction");
        return Vec::new();
    }

    state.transactions_pending_auth_request.insert(id.clone());
    tracing::info!(transaction_id = %id, "Requesting authorization for purchase");

    vec![Effect::RequestAuthorization { transaction_id: id }]
}

fn authorization_request_result(
    state: &mut SubscriptionState,
    id: TransactionId,
    outcome: AuthorizationOutcome,
    completed_at: Timestamp,
) -> Vec<Effect> {
    if !state.transactions_pending_auth_request.remove(&id) {
        tracing::warn!(transaction_id = %id, "Authorization result for transaction not awaiting one");
    }

    let Some(map) = state.purchases_auth_state.map_mut() else {
        return Vec::new();
    };
    let Some(record) = map.get_mut(&id) else {
        tracing::warn!(transaction_id = %id, "Authorization result for unknown transaction");
        return Vec::new();
    };
    if record.status != AuthorizationStatus::Pending {
        tracing::debug!(transaction_id = %id, "Record no longer pending, ignoring result");
        return Vec::new();
    }

    let next = match outcome {
        Ok(token) => {
            tracing::info!(transaction_id = %id, "Purchase authorized");
            AuthorizationStatus::Authorized { token }
        }
        Err(rejection) => {
            tracing::info!(
                transaction_id = %id,
                code = %rejection.code,
                permanent = rejection.is_permanent(),
                "Purchase authorization rejected"
            );
            AuthorizationStatus::Rejected(rejection)
        }
    };

    match record.transition(next, Some(completed_at)) {
        Ok(()) => vec![Effect::PersistAuthState {
            snapshot: map.clone(),
        }],
        Err(e) => {
            tracing::warn!(transaction_id = %id, error = %e, "Skipping invalid authorization result");
            Vec::new()
        }
    }
}
