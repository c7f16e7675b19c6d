//! Authorization layer.
//!
//! Authentication happens outside this crate; callers arrive here as an
//! asserted [`Principal`]. The policy only answers whether that principal may
//! list, read, or write.

pub mod access;
pub mod engine;

pub use access::{Operation, Principal};
pub use engine::{AccessTable, Authorizer};
