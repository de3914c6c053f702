//! Authorization service adapters.
//!
//! - `HttpAuthorizationClient` - reqwest client for the authorization API
//! - `MockAuthorizationClient` - Scriptable client for tests

mod http_client;
mod mock_client;

pub use http_client::{classify_status, HttpAuthorizationClient, HttpAuthorizationConfig};
pub use mock_client::{DefaultResponse, MockAuthorizationClient};
