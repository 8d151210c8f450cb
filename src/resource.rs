//! Resource descriptors
//!
//! A [`ResourceDescriptor`] is what callers send. [`NormalizedResource`] is
//! what the estimator works on: canonical service key resolved, region filled
//! in from the ARN when the caller left it out, parent resource discovered.

use crate::arn::Arn;
use crate::classification::{self, ParentRef};
use crate::error::Result;
use crate::normalize::normalize_resource_type;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use tracing::debug;

pub const AWS_PROVIDER: &str = "aws";

/// Caller-supplied description of a resource to price
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceDescriptor {
    #[serde(default)]
    pub provider: String,
    /// Canonical key, IaC type token or ARN
    pub resource_type: String,
    /// Instance type, volume type, storage class, ...
    #[serde(default)]
    pub sku: String,
    #[serde(default)]
    pub region: String,
    #[serde(default)]
    pub tags: BTreeMap<String, String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub arn: Option<String>,
}

impl ResourceDescriptor {
    pub fn new(
        resource_type: impl Into<String>,
        sku: impl Into<String>,
        region: impl Into<String>,
    ) -> Self {
        Self {
            provider: AWS_PROVIDER.to_string(),
            resource_type: resource_type.into(),
            sku: sku.into(),
            region: region.into(),
            ..Default::default()
        }
    }

    pub fn with_tag(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.tags.insert(key.into(), value.into());
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    pub fn with_arn(mut self, arn: impl Into<String>) -> Self {
        self.arn = Some(arn.into());
        self
    }

    /// Label for logs and recommendation output: id, then ARN, then type.
    pub fn label(&self) -> &str {
        self.id
            .as_deref()
            .or(self.arn.as_deref())
            .unwrap_or(&self.resource_type)
    }
}

/// A descriptor after normalization. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NormalizedResource {
    pub provider: String,
    /// Canonical service key (`ec2`, `ebs`, ...), or the original string if unrecognized
    pub service: String,
    /// The resource type exactly as the caller sent it
    pub resource_type: String,
    pub region: String,
    pub sku: String,
    pub tags: BTreeMap<String, String>,
    pub id: Option<String>,
    pub parent: Option<ParentRef>,
}

impl NormalizedResource {
    /// Normalizes a descriptor.
    ///
    /// An explicit `arn` is parsed strictly: a malformed or isolated-partition
    /// ARN is an error here, unlike in [`normalize_resource_type`] which passes
    /// bad input through.
    pub fn from_descriptor(descriptor: &ResourceDescriptor) -> Result<Self> {
        let arn = descriptor.arn.as_deref().map(Arn::parse).transpose()?;

        let mut service = normalize_resource_type(&descriptor.resource_type);
        let mut region = descriptor.region.trim().to_string();

        if let Some(arn) = &arn {
            if descriptor.resource_type.trim().is_empty() {
                service = normalize_resource_type(&arn.canonical_resource_type());
            }
            if region.is_empty() && !arn.region.is_empty() {
                debug!("region for {} taken from ARN: {}", descriptor.label(), arn.region);
                region = arn.region.clone();
            }
        }

        let id = descriptor.id.clone().or_else(|| {
            arn.as_ref()
                .filter(|a| !a.resource_id.is_empty())
                .map(|a| a.resource_id.clone())
        });
        let parent = classification::resolve_parent(&service, &descriptor.tags);

        Ok(Self {
            provider: descriptor.provider.trim().to_ascii_lowercase(),
            service,
            resource_type: descriptor.resource_type.clone(),
            region,
            sku: descriptor.sku.trim().to_string(),
            tags: descriptor.tags.clone(),
            id,
            parent,
        })
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(String::as_str)
    }

    /// First non-blank tag among `keys`, with the key that matched.
    pub fn first_tag<'k>(&self, keys: &[&'k str]) -> Option<(&'k str, &str)> {
        keys.iter().find_map(|key| {
            self.tag(key)
                .filter(|v| !v.trim().is_empty())
                .map(|v| (*key, v.trim()))
        })
    }
}
