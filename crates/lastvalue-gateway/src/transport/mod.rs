//! Transport layer (HTTP management + ingestion).
//!
//! Thin JSON handlers over the management facade. Authentication happens
//! upstream; the asserted principal arrives in a request header.

pub mod error;
pub mod http;
pub mod principal;
