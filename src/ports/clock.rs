//! Clock port.
//!
//! Effects stamp their results with the time they completed. The reducer
//! never reads a clock; time only reaches it through actions.

use crate::domain::foundation::Timestamp;

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}
