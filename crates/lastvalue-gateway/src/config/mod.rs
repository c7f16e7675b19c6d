//! Gateway config loader (strict parsing).

pub mod schema;

use std::fs;

use lastvalue_core::error::{LastValueError, Result};

pub use schema::{
    AccessLevel, AccessRule, GatewaySection, LastValueConfig, ManagementSection, RegistrySection,
};

pub fn load_from_file(path: &str) -> Result<LastValueConfig> {
    let s = fs::read_to_string(path)
        .map_err(|e| LastValueError::Internal(format!("read config failed ({path}): {e}")))?;
    load_from_str(&s)
}

pub fn load_from_str(s: &str) -> Result<LastValueConfig> {
    let cfg: LastValueConfig = serde_yaml::from_str(s)
        .map_err(|e| LastValueError::BadRequest(format!("invalid yaml: {e}")))?;
    cfg.validate()?;
    Ok(cfg)
}
