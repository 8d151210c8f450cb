//! FOCUS-aligned billing records
//!
//! Turns an estimate into a record shaped after the FinOps Open Cost and Usage
//! Specification so it can be aggregated next to other providers' data.
//!
//! Public on-demand pricing never carries discounts, commitments or credits,
//! so billed, effective and list cost are always equal, and the charge is
//! always classified as regular usage at standard pricing.

use crate::normalize::keys;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const BILLING_CURRENCY: &str = "USD";
pub const PROVIDER_NAME: &str = "AWS";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceCategory {
    Compute,
    Storage,
    Databases,
    Networking,
    #[serde(rename = "Management and Governance")]
    Management,
    Other,
}

impl ServiceCategory {
    /// Category bucket for a canonical key. Unknown keys land in `Other`.
    pub fn for_service(service: &str) -> Self {
        match service {
            keys::EC2 | keys::LAMBDA | keys::EKS => ServiceCategory::Compute,
            keys::EBS | keys::S3 => ServiceCategory::Storage,
            keys::RDS | keys::DYNAMODB | keys::ELASTICACHE => ServiceCategory::Databases,
            keys::ELB | keys::NATGW | keys::VPC | keys::SUBNET | keys::SECURITY_GROUP => {
                ServiceCategory::Networking
            }
            keys::CLOUDWATCH | keys::IAM => ServiceCategory::Management,
            _ => ServiceCategory::Other,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargeCategory {
    Usage,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargeClass {
    Regular,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChargeFrequency {
    #[serde(rename = "Usage-Based")]
    UsageBased,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PricingCategory {
    Standard,
}

/// Display name of the AWS service behind a canonical key.
pub fn service_display_name(service: &str) -> &str {
    match service {
        keys::EC2 => "Amazon Elastic Compute Cloud",
        keys::EBS => "Amazon Elastic Block Store",
        keys::RDS => "Amazon Relational Database Service",
        keys::S3 => "Amazon Simple Storage Service",
        keys::LAMBDA => "AWS Lambda",
        keys::DYNAMODB => "Amazon DynamoDB",
        keys::EKS => "Amazon Elastic Kubernetes Service",
        keys::ELB => "Elastic Load Balancing",
        keys::NATGW => "Amazon VPC NAT Gateway",
        keys::CLOUDWATCH => "Amazon CloudWatch",
        keys::ELASTICACHE => "Amazon ElastiCache",
        keys::VPC | keys::SUBNET | keys::SECURITY_GROUP => "Amazon Virtual Private Cloud",
        keys::IAM => "AWS Identity and Access Management",
        other => other,
    }
}

/// Everything the builder needs; borrowed so building never clones more than once.
#[derive(Debug, Clone, Copy)]
pub struct BillingInput<'a> {
    pub service: &'a str,
    pub resource_type: &'a str,
    pub region: &'a str,
    pub cost: f64,
    pub unit_price: f64,
    pub pricing_unit: &'a str,
    pub period_start: DateTime<Utc>,
    pub period_end: DateTime<Utc>,
    pub sku: &'a str,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct BillingRecord {
    pub billed_cost: f64,
    pub effective_cost: f64,
    pub list_cost: f64,
    pub list_unit_price: f64,
    pub billing_currency: String,
    pub service_category: ServiceCategory,
    pub service_name: String,
    pub charge_category: ChargeCategory,
    pub charge_class: ChargeClass,
    pub charge_frequency: ChargeFrequency,
    pub charge_description: String,
    pub pricing_category: PricingCategory,
    pub pricing_unit: String,
    pub charge_period_start: DateTime<Utc>,
    pub charge_period_end: DateTime<Utc>,
    pub region_id: String,
    pub resource_type: String,
    pub sku_id: String,
    pub provider_name: String,
}

/// Builds a billing record. Pure: equal inputs give equal records.
pub fn build_billing_record(input: &BillingInput<'_>) -> BillingRecord {
    let service_name = service_display_name(input.service).to_string();
    let charge_description = charge_description(&service_name, input.sku, input.region);

    BillingRecord {
        billed_cost: input.cost,
        effective_cost: input.cost,
        list_cost: input.cost,
        list_unit_price: input.unit_price,
        billing_currency: BILLING_CURRENCY.to_string(),
        service_category: ServiceCategory::for_service(input.service),
        service_name,
        charge_category: ChargeCategory::Usage,
        charge_class: ChargeClass::Regular,
        charge_frequency: ChargeFrequency::UsageBased,
        charge_description,
        pricing_category: PricingCategory::Standard,
        pricing_unit: input.pricing_unit.to_string(),
        charge_period_start: input.period_start,
        charge_period_end: input.period_end,
        region_id: input.region.to_string(),
        resource_type: input.resource_type.to_string(),
        sku_id: input.sku.to_string(),
        provider_name: PROVIDER_NAME.to_string(),
    }
}

fn charge_description(service_name: &str, sku: &str, region: &str) -> String {
    match (sku.is_empty(), region.is_empty()) {
        (false, false) => format!("{} usage for {} in {}", service_name, sku, region),
        (false, true) => format!("{} usage for {}", service_name, sku),
        (true, false) => format!("{} usage in {}", service_name, region),
        (true, true) => format!("{} usage", service_name),
    }
}
