//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the authorization domain and the outside world. Adapters implement
//! these ports.
//!
//! - `AuthStateStore` - Persistence of the per-transaction authorization map
//! - `AuthorizationClient` - Remote purchase authorization service
//! - `LocalPurchaseDataSource` - Purchases and rejections known on this device
//! - `Clock` - Current time for stamping effect results

mod auth_state_store;
mod authorization_client;
mod clock;
mod purchase_data_source;

pub use auth_state_store::{AuthStateStore, PersistenceError};
pub use authorization_client::{AuthorizationClient, AuthorizationError};
pub use clock::Clock;
pub use purchase_data_source::{LocalPurchaseDataSource, LocalPurchaseSnapshot, PurchaseDataError};
