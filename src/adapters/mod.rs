//! Adapters - Implementations of port interfaces.
//!
//! - `storage` - Authorization map persistence (YAML file, in-memory)
//! - `authorization` - Authorization service clients (HTTP, mock)
//! - `purchases` - Local purchase data sources (YAML ledger, in-memory)
//! - `clock` - System and fixed clocks

pub mod authorization;
pub mod clock;
pub mod purchases;
pub mod storage;

pub use authorization::{
    HttpAuthorizationClient, HttpAuthorizationConfig, MockAuthorizationClient,
};
pub use clock::{FixedClock, SystemClock};
pub use purchases::{FilePurchaseLedger, InMemoryPurchaseData};
pub use storage::{FileAuthStateStore, InMemoryAuthStateStore};
