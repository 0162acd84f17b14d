//! Task/result payload modeling.
//!
//! Subnets define their own task/result shapes, so payloads are modeled as
//! a tagged variant plus a small capability view. This keeps the Scorer
//! (`moderntensor-scoring`) polymorphic over "does this have a URL /
//! version / latency" rather than depending on concrete subnet types.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Payload {
    /// Subnet-defined opaque bytes, no structure the core understands.
    Raw(Vec<u8>),
    /// A payload the core can inspect for quality-scoring hooks.
    Structured {
        result_url: Option<String>,
        model_version: Option<String>,
        extra: HashMap<String, Vec<u8>>,
    },
}

impl Payload {
    pub fn structured() -> Self {
        Payload::Structured { result_url: None, model_version: None, extra: HashMap::new() }
    }

    pub fn with_result_url(mut self, url: impl Into<String>) -> Self {
        if let Payload::Structured { result_url, .. } = &mut self {
            *result_url = Some(url.into());
        }
        self
    }

    pub fn with_model_version(mut self, version: impl Into<String>) -> Self {
        if let Payload::Structured { model_version, .. } = &mut self {
            *model_version = Some(version.into());
        }
        self
    }

    /// Capability view the Scorer reads from, independent of how the
    /// payload was actually constructed by the subnet.
    pub fn capabilities(&self) -> PayloadCapabilities {
        match self {
            Payload::Raw(_) => PayloadCapabilities::default(),
            Payload::Structured { result_url, model_version, .. } => PayloadCapabilities {
                has_url: result_url.is_some(),
                has_version: model_version.is_some(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PayloadCapabilities {
    pub has_url: bool,
    pub has_version: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_payload_has_no_capabilities() {
        assert_eq!(Payload::Raw(vec![1, 2, 3]).capabilities(), PayloadCapabilities::default());
    }

    #[test]
    fn structured_payload_reports_present_fields() {
        let p = Payload::structured().with_result_url("https://x/y").with_model_version("v1");
        let caps = p.capabilities();
        assert!(caps.has_url);
        assert!(caps.has_version);
    }
}
