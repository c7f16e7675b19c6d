//! Shared application state for the lastvalue gateway.
//!
//! Owns the registry for the lifetime of the process: built from config at
//! startup, torn down by [`AppState::shutdown`].

use std::sync::Arc;

use lastvalue_core::error::Result;

use crate::config::LastValueConfig;
use crate::facade::{ManagementFacade, MetricNaming};
use crate::obs::GatewayMetrics;
use crate::policy::AccessTable;
use crate::registry::Registry;

#[derive(Clone)]
pub struct AppState {
    registry: Arc<Registry>,
    facade: Arc<ManagementFacade>,
    metrics: Arc<GatewayMetrics>,
}

impl AppState {
    /// Build application state. Re-validates the config so states built from
    /// hand-assembled configs get the same checks as loaded ones.
    pub fn new(cfg: LastValueConfig) -> Result<Self> {
        cfg.validate()?;

        let access = AccessTable::from_rules(&cfg.access);
        if access.is_empty() {
            tracing::warn!("access table is empty; every management call will be denied");
        }

        let expiry = cfg.registry.expiry_policy();
        match expiry.ttl() {
            Some(ttl) => {
                let ttl_ms = u64::try_from(ttl.as_millis()).unwrap_or(u64::MAX);
                tracing::info!(ttl_ms, "identity expiry enabled");
            }
            None => tracing::info!("identity expiry disabled"),
        }

        let registry = Arc::new(Registry::new(expiry));
        let metrics = Arc::new(GatewayMetrics::default());
        let facade = ManagementFacade::new(
            Arc::clone(&registry),
            Arc::new(access),
            MetricNaming::from_config(&cfg.management),
            Arc::clone(&metrics),
        );

        Ok(Self {
            registry,
            facade: Arc::new(facade),
            metrics,
        })
    }

    pub fn registry(&self) -> Arc<Registry> {
        Arc::clone(&self.registry)
    }

    pub fn facade(&self) -> &ManagementFacade {
        &self.facade
    }

    pub fn metrics(&self) -> &GatewayMetrics {
        &self.metrics
    }

    /// Registry-owned figures appended to `/metrics`.
    pub fn metrics_extra(&self) -> Vec<(&'static str, u64)> {
        vec![
            ("lastvalue_identities_live", self.registry.live_len() as u64),
            ("lastvalue_evictions_total", self.registry.evicted_total()),
        ]
    }

    /// Remove every identity. Returns how many were removed.
    pub fn shutdown(&self) -> usize {
        self.registry.shutdown()
    }
}
