//! Top-level facade crate for lastvalue.
//!
//! Re-exports core types and the gateway library so users can depend on a single crate.

pub mod core {
    pub use lastvalue_core::*;
}

pub mod gateway {
    pub use lastvalue_gateway::*;
}
