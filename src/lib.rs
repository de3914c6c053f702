//! Subscription Auth - Purchase authorization state reconciler
//!
//! Keeps a per-transaction record of whether each subscription purchase has
//! been authorized by the remote authorization service, and drives
//! single-flight authorization requests for purchases that still need one.
//! State changes go through a pure reducer; effects are executed by the
//! application layer against pluggable ports.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod logging;
pub mod ports;
