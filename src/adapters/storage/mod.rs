//! Storage adapters for the authorization map.
//!
//! - `FileAuthStateStore` - Versioned YAML document on disk
//! - `InMemoryAuthStateStore` - In-memory store for tests and development

mod file_auth_state_store;
mod in_memory_auth_state_store;

pub use file_auth_state_store::{FileAuthStateStore, STATE_FORMAT_VERSION};
pub use in_memory_auth_state_store::InMemoryAuthStateStore;
