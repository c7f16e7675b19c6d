use lastvalue_core::error::{LastValueError, Result};
use lastvalue_core::Identity;

use crate::config::ManagementSection;

/// External names: `domain:deployment=..,job=..,index=..,ip=..` for identities,
/// `prefix + name` for metrics. Display-only; storage always uses raw names.
#[derive(Debug, Clone)]
pub struct MetricNaming {
    domain: String,
    prefix: String,
}

impl MetricNaming {
    pub fn new(domain: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            domain: domain.into(),
            prefix: prefix.into(),
        }
    }

    pub fn from_config(cfg: &ManagementSection) -> Self {
        Self::new(cfg.domain.clone(), cfg.metric_prefix.clone())
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    pub fn identity_key(&self, identity: &Identity) -> String {
        format!("{}:{}", self.domain, identity.key_properties())
    }

    pub fn parse_identity_key(&self, key: &str) -> Result<Identity> {
        // domain never contains ':', so the first one is the separator
        let (domain, props) = key.split_once(':').ok_or_else(|| {
            LastValueError::BadRequest(format!("identity key `{key}` has no domain"))
        })?;
        if domain != self.domain {
            return Err(LastValueError::BadRequest(format!(
                "identity key `{key}` is outside domain `{}`",
                self.domain
            )));
        }
        Identity::parse_key_properties(props)
    }

    pub fn exposed_name(&self, name: &str) -> String {
        format!("{}{}", self.prefix, name)
    }

    /// Stored name for an exposed one; `None` when the prefix does not match.
    pub fn stored_name<'a>(&self, exposed: &'a str) -> Option<&'a str> {
        exposed.strip_prefix(self.prefix.as_str())
    }
}
