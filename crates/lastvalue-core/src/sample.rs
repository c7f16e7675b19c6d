//! Ingestion-boundary sample shape.
//!
//! JSON form:
//! `{"name":"system.cpu1","value":1.0,"timestamp":100,"tags":{"deployment":"d0",...}}`
//! `timestamp` is optional and defaults to 0 ("no timestamp supplied").

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::identity::Identity;

/// One observation of a named metric from a tagged source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricSample {
    name: String,
    value: f64,
    #[serde(default)]
    timestamp: i64,
    #[serde(default)]
    tags: HashMap<String, String>,
}

impl MetricSample {
    pub fn new(
        name: impl Into<String>,
        value: f64,
        timestamp: i64,
        tags: HashMap<String, String>,
    ) -> Self {
        Self {
            name: name.into(),
            value,
            timestamp,
            tags,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn value(&self) -> f64 {
        self.value
    }

    /// Caller-supplied timestamp in seconds; 0 when absent.
    pub fn timestamp(&self) -> i64 {
        self.timestamp
    }

    pub fn tags(&self) -> &HashMap<String, String> {
        &self.tags
    }

    /// Resolve the source identity from this sample's tags.
    pub fn identity(&self) -> Result<Identity> {
        Identity::from_tags(&self.tags)
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn timestamp_and_tags_default_when_omitted() {
        let s: MetricSample = serde_json::from_str(r#"{"name":"up","value":1}"#).unwrap();
        assert_eq!(s.timestamp(), 0);
        assert!(s.tags().is_empty());
        assert!(s.identity().is_err());
    }
}
