//! Application layer - Effect execution and state ownership.
//!
//! The domain reducer decides; this layer carries its decisions out:
//!
//! - `environment` - Ports the effects talk to
//! - `effect_runner` - Executes effects and reports results as actions
//! - `store` - Actor owning the state for a running session
//! - `drive` - Sequential driver for one-shot runs and tests

mod drive;
mod effect_runner;
mod environment;
mod store;

pub use drive::{drive_to_quiescence, DriveError, DriveReport};
pub use effect_runner::EffectRunner;
pub use environment::SubscriptionEnvironment;
pub use store::{StoreConfig, StoreError, StoreHandle, StoreSnapshot, SubscriptionStore};
