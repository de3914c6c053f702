//! SubscriptionStore - Actor that owns the authorization state.
//!
//! A single tokio task holds the [`SubscriptionState`] and is its only
//! writer. Host actions arrive over a bounded channel; effects returned by
//! the reducer run as tasks in a `JoinSet` and their result actions are
//! reduced by the same task, one at a time.
//!
//! ## Observing the store
//!
//! Every processed action publishes a [`StoreSnapshot`] on a `watch`
//! channel. A snapshot with no outstanding effects and every sent action
//! processed means the store is quiescent.
//!
//! ## Shutdown
//!
//! The actor stops when the shutdown signal flips to `true`, or when every
//! [`StoreHandle`] is dropped and no effect is outstanding. On a signalled
//! shutdown, outstanding effects are aborted and the final map is
//! persisted.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::{mpsc, watch};
use tokio::task::{JoinHandle, JoinSet};

use super::effect_runner::EffectRunner;
use crate::domain::subscription::{reduce, Action, SubscriptionAction, SubscriptionState};

/// Configuration for the SubscriptionStore actor.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Capacity of the host action channel.
    pub channel_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            channel_capacity: 64,
        }
    }
}

impl StoreConfig {
    pub fn with_channel_capacity(mut self, capacity: usize) -> Self {
        self.channel_capacity = capacity.max(1);
        self
    }
}

/// Errors returned to hosts talking to the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("Subscription store is closed")]
    Closed,
}

/// State published after every processed action.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub state: SubscriptionState,

    /// Host actions reduced so far.
    pub host_actions_processed: u64,

    /// Effects started and not yet finished.
    pub outstanding_effects: usize,
}

impl StoreSnapshot {
    pub fn is_idle(&self) -> bool {
        self.outstanding_effects == 0
    }
}

/// Host-side handle to a running store.
#[derive(Clone)]
pub struct StoreHandle {
    actions: mpsc::Sender<SubscriptionAction>,
    snapshots: watch::Receiver<StoreSnapshot>,
    sent: Arc<AtomicU64>,
}

impl StoreHandle {
    /// Dispatch a host action.
    ///
    /// # Errors
    /// Returns `StoreError::Closed` if the store has stopped.
    pub async fn send(&self, action: SubscriptionAction) -> Result<(), StoreError> {
        self.actions
            .send(action)
            .await
            .map_err(|_| StoreError::Closed)?;
        self.sent.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    /// Current state.
    pub fn state(&self) -> SubscriptionState {
        self.snapshots.borrow().state.clone()
    }

    /// Receiver notified after every processed action.
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.snapshots.clone()
    }

    /// Wait until every action sent through any handle clone has been
    /// processed and no effect is outstanding.
    ///
    /// # Errors
    /// Returns `StoreError::Closed` if the store stops first.
    pub async fn quiescent(&self) -> Result<SubscriptionState, StoreError> {
        let target = self.sent.load(Ordering::SeqCst);
        let mut rx = self.snapshots.clone();
        let snapshot = rx
            .wait_for(|s| s.host_actions_processed >= target && s.is_idle())
            .await
            .map_err(|_| StoreError::Closed)?;
        Ok(snapshot.state.clone())
    }
}

/// Actor owning the subscription authorization state.
pub struct SubscriptionStore {
    state: SubscriptionState,
    runner: EffectRunner,
    actions: mpsc::Receiver<SubscriptionAction>,
    snapshots: watch::Sender<StoreSnapshot>,
    effects: JoinSet<Vec<Action>>,
    host_actions_processed: u64,
}

impl SubscriptionStore {
    /// Spawn the store actor on the current runtime.
    ///
    /// The returned task resolves to the final state once the actor stops.
    pub fn spawn(
        runner: EffectRunner,
        config: StoreConfig,
        shutdown: watch::Receiver<bool>,
    ) -> (StoreHandle, JoinHandle<SubscriptionState>) {
        Self::spawn_with_state(SubscriptionState::new(), runner, config, shutdown)
    }

    /// Spawn the store actor starting from `state`.
    pub fn spawn_with_state(
        state: SubscriptionState,
        runner: EffectRunner,
        config: StoreConfig,
        shutdown: watch::Receiver<bool>,
    ) -> (StoreHandle, JoinHandle<SubscriptionState>) {
        let (action_tx, action_rx) = mpsc::channel(config.channel_capacity.max(1));
        let (snapshot_tx, snapshot_rx) = watch::channel(StoreSnapshot {
            state: state.clone(),
            ..StoreSnapshot::default()
        });

        let store = Self {
            state,
            runner,
            actions: action_rx,
            snapshots: snapshot_tx,
            effects: JoinSet::new(),
            host_actions_processed: 0,
        };

        let handle = StoreHandle {
            actions: action_tx,
            snapshots: snapshot_rx,
            sent: Arc::new(AtomicU64::new(0)),
        };

        (handle, tokio::spawn(store.run(shutdown)))
    }

    async fn run(mut self, mut shutdown: watch::Receiver<bool>) -> SubscriptionState {
        tracing::info!("Subscription store started");
        let mut host_open = true;
        let mut shutdown_open = true;

        loop {
            if !host_open && self.effects.is_empty() {
                tracing::info!("All store handles dropped, stopping");
                break;
            }

            tokio::select! {
                changed = shutdown.changed(), if shutdown_open => {
                    match changed {
                        Ok(()) if *shutdown.borrow() => {
                            self.shut_down().await;
                            break;
                        }
                        Ok(()) => {}
                        // Sender gone: only dropped handles can stop us now.
                        Err(_) => shutdown_open = false,
                    }
                }
                action = self.actions.recv(), if host_open => {
                    match action {
                        Some(action) => {
                            self.host_actions_processed += 1;
                            self.dispatch(action.into());
                        }
                        None => host_open = false,
                    }
                }
                Some(joined) = self.effects.join_next(), if !self.effects.is_empty() => {
                    match joined {
                        Ok(actions) => {
                            for action in actions {
                                self.dispatch(action);
                            }
                        }
                        Err(e) => tracing::error!(error = %e, "Effect task failed"),
                    }
                    self.publish();
                }
                else => break,
            }
        }

        self.state
    }

    fn dispatch(&mut self, action: Action) {
        let name = action.name();
        let effects = reduce(&mut self.state, action);
        tracing::debug!(action = name, effects = effects.len(), "Reduced action");

        for effect in effects {
            self.effects.spawn(self.runner.start(effect));
        }
        self.publish();
    }

    fn publish(&self) {
        let snapshot = StoreSnapshot {
            state: self.state.clone(),
            host_actions_processed: self.host_actions_processed,
            outstanding_effects: self.effects.len(),
        };
        self.snapshots.send_replace(snapshot);
    }

    async fn shut_down(&mut self) {
        let aborted = self.effects.len();
        self.effects.shutdown().await;
        tracing::info!(aborted_effects = aborted, "Subscription store shutting down");

        if let Some(map) = self.state.purchases_auth_state() {
            if let Err(e) = self.runner.environment().auth_state_store.save(map).await {
                tracing::warn!(error = %e, "Failed to persist final authorization state");
            }
        }
        self.publish();
    }
}
