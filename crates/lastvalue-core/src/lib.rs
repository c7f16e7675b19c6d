//! lastvalue core: transport-agnostic data model for the last-value metric registry.
//!
//! This crate defines the sample shape accepted at the ingestion boundary, the
//! identity derived from a sample's tags, the per-identity attribute record with
//! its timestamp ordering rule, and the error surface shared with the gateway.
//! It carries no runtime or transport dependencies.
//!
//! # Defensive guarantees
//! Panics, `unwrap`, and `expect` are compile-denied here.
//! All fallible paths surface as `LastValueError`/`Result`; a malformed sample
//! never brings the process down.

#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]

pub mod error;
pub mod identity;
pub mod record;
pub mod sample;

/// Shared result type.
pub use error::{Result, LastValueError};
pub use identity::Identity;
pub use record::{AttributeRecord, AttributeValue, WriteOutcome};
pub use sample::MetricSample;
