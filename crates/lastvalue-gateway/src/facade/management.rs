use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use lastvalue_core::error::{LastValueError, Result};
use lastvalue_core::{AttributeValue, MetricSample};

use crate::obs::GatewayMetrics;
use crate::policy::{Authorizer, Operation, Principal};
use crate::registry::{Registry, UpsertOutcome};

use super::naming::MetricNaming;

/// Per-outcome counts for [`ManagementFacade::write_batch`].
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub applied: usize,
    pub discarded: usize,
    pub invalid: usize,
}

/// Authorized list/read/write over the registry, in external naming.
///
/// Every call is gated before the registry is touched. Missing or expired
/// identities and attributes come back as `Ok(None)`.
pub struct ManagementFacade {
    registry: Arc<Registry>,
    authorizer: Arc<dyn Authorizer>,
    naming: MetricNaming,
    metrics: Arc<GatewayMetrics>,
}

impl ManagementFacade {
    pub fn new(
        registry: Arc<Registry>,
        authorizer: Arc<dyn Authorizer>,
        naming: MetricNaming,
        metrics: Arc<GatewayMetrics>,
    ) -> Self {
        Self {
            registry,
            authorizer,
            naming,
            metrics,
        }
    }

    pub fn naming(&self) -> &MetricNaming {
        &self.naming
    }

    /// External keys of all live identities, in canonical order.
    pub fn list_identities(&self, principal: &Principal) -> Result<Vec<String>> {
        self.authorize(principal, Operation::List)?;
        Ok(self
            .registry
            .list()
            .iter()
            .map(|id| self.naming.identity_key(id))
            .collect())
    }

    /// Exposed name -> latest value for one identity.
    pub fn list_attributes(
        &self,
        principal: &Principal,
        identity_key: &str,
    ) -> Result<Option<BTreeMap<String, AttributeValue>>> {
        self.authorize(principal, Operation::Read)?;
        let identity = self.naming.parse_identity_key(identity_key)?;
        Ok(self.registry.attributes(&identity).map(|attrs| {
            attrs
                .into_iter()
                .map(|(name, v)| (self.naming.exposed_name(&name), v))
                .collect()
        }))
    }

    pub fn read_attribute(
        &self,
        principal: &Principal,
        identity_key: &str,
        name: &str,
    ) -> Result<Option<AttributeValue>> {
        self.authorize(principal, Operation::Read)?;
        let identity = self.naming.parse_identity_key(identity_key)?;
        let Some(stored) = self.naming.stored_name(name) else {
            return Ok(None);
        };
        Ok(self.registry.read(&identity, stored))
    }

    /// Submit one sample. `InvalidSample` is counted and returned; the caller
    /// decides whether to drop it.
    pub fn write(&self, principal: &Principal, sample: &MetricSample) -> Result<UpsertOutcome> {
        self.authorize(principal, Operation::Write)?;
        self.apply(sample)
    }

    /// Submit a batch under one authorization check, made even when the batch
    /// is empty. Invalid samples are counted and skipped.
    pub fn write_batch(
        &self,
        principal: &Principal,
        samples: &[MetricSample],
    ) -> Result<BatchSummary> {
        self.authorize(principal, Operation::Write)?;
        let mut summary = BatchSummary::default();
        for sample in samples {
            match self.apply(sample) {
                Ok(out) if out.write.is_accepted() => summary.applied += 1,
                Ok(_) => summary.discarded += 1,
                Err(LastValueError::InvalidSample { .. }) => summary.invalid += 1,
                Err(e) => return Err(e),
            }
        }
        Ok(summary)
    }

    fn apply(&self, sample: &MetricSample) -> Result<UpsertOutcome> {
        match self.registry.upsert(sample) {
            Ok(out) => {
                self.metrics.samples.inc(&[("outcome", out.write.as_str())]);
                Ok(out)
            }
            Err(e) => {
                self.metrics.samples.inc(&[("outcome", "invalid")]);
                tracing::warn!(metric = sample.name(), error = %e, "sample rejected");
                Err(e)
            }
        }
    }

    fn authorize(&self, principal: &Principal, op: Operation) -> Result<()> {
        if self.authorizer.allows(principal, op) {
            return Ok(());
        }
        self.metrics.auth_denied.inc(&[("op", op.as_str())]);
        tracing::warn!(%principal, op = op.as_str(), "management call denied");
        Err(LastValueError::Unauthorized {
            principal: principal.to_string(),
            op: op.as_str(),
        })
    }
}
