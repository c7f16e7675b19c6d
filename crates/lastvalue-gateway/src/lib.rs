//! lastvalue gateway library entry.
//!
//! Wires the registry, expiry policy, authorization policy, management facade
//! and HTTP transport into one service. Consumed by the binary (`main.rs`) and
//! by integration tests.

pub mod app_state;
pub mod config;
pub mod facade;
pub mod obs;
pub mod ops;
pub mod policy;
pub mod registry;
pub mod router;
pub mod transport;
