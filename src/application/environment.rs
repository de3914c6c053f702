//! Collaborators the effect runner talks to.

use std::sync::Arc;

use crate::ports::{AuthStateStore, AuthorizationClient, Clock, LocalPurchaseDataSource};

/// Ports used to execute effects.
///
/// Cheap to clone; every field is shared.
#[derive(Clone)]
pub struct SubscriptionEnvironment {
    pub auth_state_store: Arc<dyn AuthStateStore>,
    pub authorization_client: Arc<dyn AuthorizationClient>,
    pub purchase_data: Arc<dyn LocalPurchaseDataSource>,
    pub clock: Arc<dyn Clock>,
}

impl SubscriptionEnvironment {
    pub fn new(
        auth_state_store: Arc<dyn AuthStateStore>,
        authorization_client: Arc<dyn AuthorizationClient>,
        purchase_data: Arc<dyn LocalPurchaseDataSource>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            auth_state_store,
            authorization_client,
            purchase_data,
            clock,
        }
    }
}
