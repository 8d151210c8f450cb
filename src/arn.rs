//! ARN parsing
//!
//! Parses `arn:partition:service:region:account-id:resource` identifiers into
//! their components and derives the canonical resource key used by the rest of
//! the crate.
//!
//! Region and account may be empty (S3 buckets, IAM). The trailing resource
//! segment is kept whole when splitting segments, so `db:prod:replica` or
//! `function:name:alias` survive intact and are only split into type/id
//! afterwards.

use crate::error::ArnError;
use crate::normalize::keys;
use serde::Serialize;

pub const ARN_PREFIX: &str = "arn";

/// Partitions with public pricing data.
pub const SUPPORTED_PARTITIONS: &[&str] = &["aws", "aws-cn", "aws-us-gov"];

/// Air-gapped partitions. Pricing data never exists for these.
const ISOLATED_PARTITION_PREFIX: &str = "aws-iso";

/// Services whose ARNs carry no region.
const GLOBAL_SERVICES: &[&str] = &["s3", "iam", "cloudfront", "route53", "organizations"];

/// A parsed ARN
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Arn {
    pub partition: String,
    pub service: String,
    pub region: String,
    pub account_id: String,
    pub resource_type: String,
    pub resource_id: String,
}

impl Arn {
    pub fn parse(input: &str) -> Result<Self, ArnError> {
        let parts: Vec<&str> = input.splitn(6, ':').collect();
        if parts.len() < 6 {
            return Err(ArnError::TooFewSegments(parts.len()));
        }

        if parts[0] != ARN_PREFIX {
            return Err(ArnError::MissingPrefix(parts[0].to_string()));
        }

        let partition = parts[1];
        validate_partition(partition)?;

        let service = parts[2];
        if service.is_empty() {
            return Err(ArnError::EmptyService);
        }

        let resource = parts[5];
        if resource.is_empty() {
            return Err(ArnError::EmptyResource);
        }
        let (resource_type, resource_id) = split_resource(resource);

        Ok(Self {
            partition: partition.to_string(),
            service: service.to_string(),
            region: parts[3].to_string(),
            account_id: parts[4].to_string(),
            resource_type: resource_type.to_string(),
            resource_id: resource_id.to_string(),
        })
    }

    /// Canonical resource key for this ARN (`ec2`, `ebs`, `rds`, ...).
    pub fn canonical_resource_type(&self) -> String {
        canonical_resource_type(&self.service, &self.resource_type)
    }

    pub fn is_global(&self) -> bool {
        is_global_service(&self.service)
    }
}

impl std::fmt::Display for Arn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}:{}:{}:{}:{}:{}",
            ARN_PREFIX, self.partition, self.service, self.region, self.account_id, self.resource_type
        )?;
        if !self.resource_id.is_empty() {
            write!(f, "/{}", self.resource_id)?;
        }
        Ok(())
    }
}

impl std::str::FromStr for Arn {
    type Err = ArnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Arn::parse(s)
    }
}

fn validate_partition(partition: &str) -> Result<(), ArnError> {
    if partition.is_empty() {
        return Err(ArnError::EmptyPartition);
    }
    if SUPPORTED_PARTITIONS.contains(&partition) {
        return Ok(());
    }
    if partition.starts_with(ISOLATED_PARTITION_PREFIX) {
        return Err(ArnError::IsolatedPartition(partition.to_string()));
    }
    Err(ArnError::UnsupportedPartition(partition.to_string()))
}

/// Splits `type/id` or `type:id`. Slash wins when both are present.
fn split_resource(resource: &str) -> (&str, &str) {
    resource
        .split_once('/')
        .or_else(|| resource.split_once(':'))
        .unwrap_or((resource, ""))
}

/// Maps an ARN service and resource type to a canonical resource key.
///
/// `ec2` hosts several billable things under one service name; volumes map to
/// `ebs`, NAT gateways to `natgw`, and networking plumbing to the free `vpc`
/// keys. EC2 sub-resources with no key of their own come back as
/// `ec2-<subtype>`, which the estimator reports as unsupported rather than
/// pricing them as instances. Other services map to the service name itself.
pub fn canonical_resource_type(service: &str, resource_type: &str) -> String {
    let key = match (service, resource_type) {
        ("ec2", "instance") | ("ec2", "spot-instances-request") => keys::EC2,
        ("ec2", "volume") => keys::EBS,
        ("ec2", "natgateway") => keys::NATGW,
        ("ec2", "vpc") | ("ec2", "internet-gateway") | ("ec2", "route-table") => keys::VPC,
        ("ec2", "subnet") => keys::SUBNET,
        ("ec2", "security-group") | ("ec2", "security-group-rule") => keys::SECURITY_GROUP,
        ("ec2", other) => return unmapped_ec2_key(other),
        ("rds", _) => keys::RDS,
        ("s3", _) => keys::S3,
        ("lambda", _) => keys::LAMBDA,
        ("dynamodb", _) => keys::DYNAMODB,
        ("eks", _) => keys::EKS,
        ("elasticloadbalancing", _) => keys::ELB,
        ("logs", _) | ("cloudwatch", _) => keys::CLOUDWATCH,
        ("elasticache", _) => keys::ELASTICACHE,
        ("iam", _) => keys::IAM,
        (other, _) => other,
    };
    key.to_string()
}

/// `ec2-<subtype>`, colon-free so that it never reads as an IaC type token.
fn unmapped_ec2_key(resource_type: &str) -> String {
    format!(
        "{}-{}",
        keys::EC2,
        resource_type.to_ascii_lowercase().replace(':', "-")
    )
}

pub fn is_global_service(service: &str) -> bool {
    GLOBAL_SERVICES.contains(&service)
}
