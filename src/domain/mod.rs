//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (identifiers, timestamps, errors, state machine)
//! - `subscription` - Purchase authorization state and its reducer

pub mod foundation;
pub mod subscription;
