//! Management facade: the authorized, externally named view of the registry.

mod management;
mod naming;

pub use management::{BatchSummary, ManagementFacade};
pub use naming::MetricNaming;
