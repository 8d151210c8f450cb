//! Resource type normalization
//!
//! Every downstream component (classification, pricing, estimation, billing)
//! joins on a short canonical key. Callers hand us one of three shapes:
//!
//! - an already-canonical key: `ec2`, `ebs`, ...
//! - an infrastructure-as-code type token: `aws:ec2/instance:Instance`
//! - an ARN: `arn:aws:ec2:us-east-1:123456789012:volume/vol-0123`
//!
//! Anything unrecognized is returned unchanged, so the estimator can answer
//! with an explicit "unsupported" estimate instead of guessing. Normalizing a
//! result a second time never changes it.

use crate::arn::{Arn, ARN_PREFIX};
use tracing::debug;

/// Canonical resource keys
pub mod keys {
    pub const EC2: &str = "ec2";
    pub const EBS: &str = "ebs";
    pub const RDS: &str = "rds";
    pub const S3: &str = "s3";
    pub const LAMBDA: &str = "lambda";
    pub const DYNAMODB: &str = "dynamodb";
    pub const EKS: &str = "eks";
    pub const ELB: &str = "elb";
    pub const NATGW: &str = "natgw";
    pub const CLOUDWATCH: &str = "cloudwatch";
    pub const ELASTICACHE: &str = "elasticache";
    pub const VPC: &str = "vpc";
    pub const SUBNET: &str = "subnet";
    pub const SECURITY_GROUP: &str = "securitygroup";
    pub const IAM: &str = "iam";

    pub const ALL: &[&str] = &[
        EC2,
        EBS,
        RDS,
        S3,
        LAMBDA,
        DYNAMODB,
        EKS,
        ELB,
        NATGW,
        CLOUDWATCH,
        ELASTICACHE,
        VPC,
        SUBNET,
        SECURITY_GROUP,
        IAM,
    ];
}

/// Returns true if `key` is one of the canonical keys.
pub fn is_canonical(key: &str) -> bool {
    keys::ALL.contains(&key)
}

/// Normalizes a resource type string to its canonical key.
pub fn normalize_resource_type(resource_type: &str) -> String {
    let trimmed = resource_type.trim();

    if looks_like_arn(trimmed) {
        return match Arn::parse(trimmed) {
            Ok(arn) => normalize_type_token(&arn.canonical_resource_type()),
            Err(e) => {
                debug!("not normalizing unparseable ARN {:?}: {}", trimmed, e);
                resource_type.to_string()
            }
        };
    }

    normalize_type_token(resource_type)
}

fn normalize_type_token(resource_type: &str) -> String {
    let lower = resource_type.trim().to_ascii_lowercase();
    if is_canonical(&lower) {
        return lower;
    }

    if let Some(key) = iac_type_key(&lower) {
        return key.to_string();
    }

    resource_type.to_string()
}

fn looks_like_arn(s: &str) -> bool {
    s.strip_prefix(ARN_PREFIX)
        .is_some_and(|rest| rest.starts_with(':'))
}

/// Resolves `provider:module/subtype:Kind` tokens (already lowercased).
///
/// Module and subtype are matched exactly rather than by substring so that
/// e.g. `ec2/vpcendpoint` does not collapse into the free `vpc` key.
fn iac_type_key(lower: &str) -> Option<&'static str> {
    let mut segments = lower.split(':');
    let _provider = segments.next()?;
    let token = segments.next()?;
    let (module, subtype) = token.split_once('/').unwrap_or((token, ""));

    let key = match (module, subtype) {
        ("ec2", "instance") | ("ec2", "spotinstancerequest") => keys::EC2,
        ("ec2", "natgateway") => keys::NATGW,
        ("ec2", "vpc") => keys::VPC,
        ("ec2", "subnet") => keys::SUBNET,
        ("ec2", "securitygroup") | ("ec2", "securitygrouprule") => keys::SECURITY_GROUP,
        ("ec2", "internetgateway") | ("ec2", "routetable") | ("ec2", "routetableassociation") => {
            keys::VPC
        }
        ("ebs", "volume") | ("ec2", "volume") => keys::EBS,
        ("rds", "instance") | ("rds", "clusterinstance") => keys::RDS,
        ("s3", "bucket") | ("s3", "bucketv2") => keys::S3,
        ("lambda", "function") => keys::LAMBDA,
        ("dynamodb", "table") => keys::DYNAMODB,
        ("eks", "cluster") => keys::EKS,
        ("lb", "loadbalancer") | ("alb", "loadbalancer") | ("elb", "loadbalancer") => keys::ELB,
        ("cloudwatch", "loggroup") | ("cloudwatch", "metricalarm") => keys::CLOUDWATCH,
        ("elasticache", "cluster") | ("elasticache", "replicationgroup") => keys::ELASTICACHE,
        ("iam", _) => keys::IAM,
        _ => return None,
    };
    Some(key)
}
