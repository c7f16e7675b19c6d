use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;

use serde::Deserialize;
use lastvalue_core::error::{LastValueError, Result};

use crate::registry::ExpiryPolicy;

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LastValueConfig {
    pub version: u32,

    #[serde(default)]
    pub gateway: GatewaySection,

    #[serde(default)]
    pub registry: RegistrySection,

    #[serde(default)]
    pub management: ManagementSection,

    #[serde(default)]
    pub access: Vec<AccessRule>,
}

impl LastValueConfig {
    pub fn validate(&self) -> Result<()> {
        if self.version != 1 {
            return Err(LastValueError::UnsupportedVersion);
        }

        self.gateway.validate()?;
        self.registry.validate()?;
        self.management.validate()?;

        let mut seen = HashSet::new();
        for rule in &self.access {
            if rule.principal.trim().is_empty() {
                return Err(LastValueError::BadRequest("access.principal must not be empty".into()));
            }
            if !seen.insert(rule.principal.as_str()) {
                return Err(LastValueError::BadRequest(format!(
                    "access.principal listed twice: {}",
                    rule.principal
                )));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GatewaySection {
    #[serde(default = "default_listen")]
    pub listen: String,
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self { listen: default_listen() }
    }
}

impl GatewaySection {
    pub fn validate(&self) -> Result<()> {
        self.listen_addr().map(|_| ())
    }

    pub fn listen_addr(&self) -> Result<SocketAddr> {
        self.listen.parse().map_err(|e| {
            LastValueError::BadRequest(format!("gateway.listen must be a socket address: {e}"))
        })
    }
}

fn default_listen() -> String {
    "0.0.0.0:8080".into()
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegistrySection {
    /// Inactivity window. Omitted means identities never expire; 0 evicts on next access.
    #[serde(default)]
    pub ttl_ms: Option<u64>,

    #[serde(default = "default_sweep_every_writes")]
    pub sweep_every_writes: u64,
}

impl Default for RegistrySection {
    fn default() -> Self {
        Self {
            ttl_ms: None,
            sweep_every_writes: default_sweep_every_writes(),
        }
    }
}

impl RegistrySection {
    pub fn validate(&self) -> Result<()> {
        if !(1..=65536).contains(&self.sweep_every_writes) {
            return Err(LastValueError::BadRequest(
                "registry.sweep_every_writes must be between 1 and 65536".into(),
            ));
        }
        Ok(())
    }

    pub fn expiry_policy(&self) -> ExpiryPolicy {
        ExpiryPolicy::new(self.ttl_ms.map(Duration::from_millis), self.sweep_every_writes)
    }
}

fn default_sweep_every_writes() -> u64 {
    64
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ManagementSection {
    #[serde(default = "default_domain")]
    pub domain: String,

    /// Prepended to every exposed metric name.
    #[serde(default)]
    pub metric_prefix: String,
}

impl Default for ManagementSection {
    fn default() -> Self {
        Self {
            domain: default_domain(),
            metric_prefix: String::new(),
        }
    }
}

impl ManagementSection {
    pub fn validate(&self) -> Result<()> {
        if self.domain.is_empty() || self.domain.contains(&[':', ',', '='][..]) {
            return Err(LastValueError::BadRequest(
                "management.domain must be non-empty and free of ':', ',' and '='".into(),
            ));
        }
        Ok(())
    }
}

fn default_domain() -> String {
    "lastvalue".into()
}

#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AccessRule {
    pub principal: String,
    pub level: AccessLevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccessLevel {
    /// List identities and read attributes.
    Readonly,
    /// Everything `Readonly` allows, plus submitting samples.
    Readwrite,
}
