//! Time-expiring, identity-keyed metric registry.
//!
//! The registry is an explicit shared object: created at startup, entries are
//! added on first sample and removed by expiry, and everything is removed at
//! shutdown.

mod expiry;
mod store;

pub use expiry::ExpiryPolicy;
pub use store::{Registry, UpsertOutcome};
