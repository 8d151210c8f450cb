//! Service classification table
//!
//! Static, read-only metadata per canonical resource key: how the bill grows,
//! whether the reduced-hours dev profile applies, and how to find the parent
//! resource a charge rolls up to.
//!
//! The table is built once on first use and shared by reference afterwards.

use crate::normalize::keys;
use once_cell::sync::Lazy;
use serde::Serialize;
use std::collections::{BTreeMap, HashMap};

/// How a resource's charge evolves over time
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GrowthPattern {
    /// Fixed charge for provisioned capacity
    None,
    /// Charge grows with stored/ingested data
    Linear,
}

/// Relationship between a resource and its cost-allocation parent
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    AttachedTo,
    Within,
    ManagedBy,
}

impl std::fmt::Display for Relationship {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Relationship::AttachedTo => "attached_to",
            Relationship::Within => "within",
            Relationship::ManagedBy => "managed_by",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServiceClassification {
    pub growth: GrowthPattern,
    /// Time-based charge that the dev-hours profile scales down.
    /// Never set for storage-footprint charges.
    pub dev_sensitive: bool,
    /// Tag keys checked, in order, for the parent resource id
    pub parent_tag_keys: &'static [&'static str],
    pub parent_type: Option<&'static str>,
    pub relationship: Option<Relationship>,
}

/// A parent resource discovered from tags
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParentRef {
    pub id: String,
    pub resource_type: String,
    pub relationship: Relationship,
}

const SUBNET_TAGS: &[&str] = &["subnet_id", "subnetId"];
const VPC_TAGS: &[&str] = &["vpc_id", "vpcId"];

const fn standalone(growth: GrowthPattern, dev_sensitive: bool) -> ServiceClassification {
    ServiceClassification {
        growth,
        dev_sensitive,
        parent_tag_keys: &[],
        parent_type: None,
        relationship: None,
    }
}

const fn child(
    growth: GrowthPattern,
    dev_sensitive: bool,
    parent_tag_keys: &'static [&'static str],
    parent_type: &'static str,
    relationship: Relationship,
) -> ServiceClassification {
    ServiceClassification {
        growth,
        dev_sensitive,
        parent_tag_keys,
        parent_type: Some(parent_type),
        relationship: Some(relationship),
    }
}

static CLASSIFICATIONS: Lazy<HashMap<&'static str, ServiceClassification>> = Lazy::new(|| {
    use GrowthPattern as G;
    use Relationship::{AttachedTo, ManagedBy, Within};

    HashMap::from([
        (keys::EC2, child(G::None, true, SUBNET_TAGS, keys::SUBNET, Within)),
        (
            keys::EBS,
            child(
                G::None,
                false,
                &["instance_id", "instanceId", "attached_instance"],
                keys::EC2,
                AttachedTo,
            ),
        ),
        (keys::RDS, child(G::None, true, VPC_TAGS, keys::VPC, Within)),
        (keys::S3, standalone(G::Linear, false)),
        (keys::LAMBDA, standalone(G::None, false)),
        (keys::DYNAMODB, standalone(G::Linear, false)),
        (keys::EKS, child(G::None, true, VPC_TAGS, keys::VPC, Within)),
        (keys::ELB, child(G::None, true, VPC_TAGS, keys::VPC, Within)),
        (keys::NATGW, child(G::None, true, SUBNET_TAGS, keys::SUBNET, Within)),
        (
            keys::CLOUDWATCH,
            child(
                G::Linear,
                false,
                &["function_name", "lambda_function"],
                keys::LAMBDA,
                ManagedBy,
            ),
        ),
        (keys::ELASTICACHE, child(G::None, true, VPC_TAGS, keys::VPC, Within)),
        (keys::VPC, standalone(G::None, false)),
        (keys::SUBNET, child(G::None, false, VPC_TAGS, keys::VPC, Within)),
        (
            keys::SECURITY_GROUP,
            child(G::None, false, VPC_TAGS, keys::VPC, Within),
        ),
        (keys::IAM, standalone(G::None, false)),
    ])
});

/// Looks up the classification for a canonical key.
///
/// Returns `(classification, found)`. When not found the classification is a
/// conservative default: no growth, not dev-sensitive, no parent.
pub fn classify(key: &str) -> (ServiceClassification, bool) {
    match CLASSIFICATIONS.get(key) {
        Some(c) => (c.clone(), true),
        None => (standalone(GrowthPattern::None, false), false),
    }
}

/// Borrowing variant of [`classify`].
pub fn lookup(key: &str) -> Option<&'static ServiceClassification> {
    CLASSIFICATIONS.get(key)
}

/// Whether the dev-hours profile applies to this key.
pub fn is_dev_sensitive(key: &str) -> bool {
    lookup(key).is_some_and(|c| c.dev_sensitive)
}

/// Finds the parent resource for `key` by probing its tag keys in priority order.
pub fn resolve_parent(key: &str, tags: &BTreeMap<String, String>) -> Option<ParentRef> {
    let classification = lookup(key)?;
    let parent_type = classification.parent_type?;
    let relationship = classification.relationship?;

    classification
        .parent_tag_keys
        .iter()
        .filter_map(|tag| tags.get(*tag))
        .find(|value| !value.trim().is_empty())
        .map(|id| ParentRef {
            id: id.clone(),
            resource_type: parent_type.to_string(),
            relationship,
        })
}
