//! Subscription purchase authorization domain.
//!
//! Tracks, per purchase transaction, whether the remote authorization
//! service has been asked about it and what it answered. All changes go
//! through [`reduce`], a pure function that returns [`Effect`] values for
//! the application layer to execute.
//!
//! # Module Structure
//!
//! - `values` - Tokens, reason codes and rejections
//! - `status` - AuthorizationStatus and its lifecycle state machine
//! - `record` - Per-transaction records and the ordered authorization map
//! - `state` - SubscriptionState owned by the reducer
//! - `actions` - Host actions and effect results
//! - `effects` - Work requested by the reducer
//! - `reconciliation` - Merge of local purchase facts into the map
//! - `reducer` - The transition function

mod actions;
mod effects;
mod reconciliation;
mod record;
mod reducer;
mod state;
mod status;
mod values;

#[cfg(test)]
pub(crate) mod strategies;

pub use actions::{
    Action, AuthorizationOutcome, InternalAction, LocalDataDiff, LocalDataUpdateKind,
    StoredStateLoadError, SubscriptionAction,
};
pub use effects::Effect;
pub use record::{AuthStateMap, AuthStateSummary, AuthorizationRecord};
pub use reducer::reduce;
pub use state::SubscriptionState;
pub use status::{AuthorizationPhase, AuthorizationStatus};
pub use values::{AuthorizationToken, ReasonCode, Rejection, RejectionClass};
