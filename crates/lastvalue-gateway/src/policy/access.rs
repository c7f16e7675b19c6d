//! Principals and the operations they can be granted.

use std::fmt;
use std::sync::Arc;

use crate::config::schema::AccessLevel;

/// Caller identity as asserted by the (external) authentication layer.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Principal(Arc<str>);

impl Principal {
    pub const ANONYMOUS: &'static str = "anonymous";

    pub fn new(name: impl Into<Arc<str>>) -> Self {
        Self(name.into())
    }

    pub fn anonymous() -> Self {
        Self::new(Self::ANONYMOUS)
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Principal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Gated management operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    List,
    Read,
    Write,
}

impl Operation {
    pub fn as_str(self) -> &'static str {
        match self {
            Operation::List => "list",
            Operation::Read => "read",
            Operation::Write => "write",
        }
    }
}

impl AccessLevel {
    pub fn permits(self, op: Operation) -> bool {
        match self {
            AccessLevel::Readonly => matches!(op, Operation::List | Operation::Read),
            AccessLevel::Readwrite => true,
        }
    }
}
