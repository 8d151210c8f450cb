//! Cost estimation
//!
//! Routes a normalized resource to a pricing formula and computes its monthly
//! cost from an injected [`PricingLookup`].
//!
//! ## Routing
//!
//! The set of priced services is a reviewed, closed list ([`Formula`]).
//! Services we recognize but have not modeled yet get a zero-cost estimate
//! with an explanation instead of an error, so a batch of mixed resources
//! never fails because of one unmodeled type. The [`EstimateStatus`] on the
//! result tells "legitimately free" apart from "not modeled yet".
//!
//! ## Region scoping
//!
//! An estimator serves exactly one pricing region. Asking it about another
//! region is a configuration/routing mistake and fails with
//! [`CostError::RegionMismatch`], never with a pricing miss.
//!
//! ## Actual cost
//!
//! Without a usage-metered source, actual cost over a window is the projected
//! monthly cost prorated by elapsed hours over the full month.

use crate::classification;
use crate::config::Config;
use crate::error::{CostError, Result};
use crate::normalize::keys;
use crate::pricing::{PriceQuote, PricingLookup};
use crate::resource::{NormalizedResource, AWS_PROVIDER};
use crate::utils::{elapsed_hours, format_usd, prorate_monthly_cost};
use crate::validation::{parse_size_gb, validate_resource, validate_volume_size};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

pub const CURRENCY: &str = "USD";

/// Size assumed for an EBS volume with no size tag.
pub const DEFAULT_EBS_SIZE_GB: f64 = 8.0;

const EBS_SIZE_TAGS: &[&str] = &["size", "volume_size", "sizeGb"];
const S3_SIZE_TAGS: &[&str] = &["size_gb", "storage_gb"];
const RDS_STORAGE_TAGS: &[&str] = &["allocated_storage", "allocatedStorage"];
const RDS_STORAGE_SERVICE: &str = "rds-storage";

/// Pricing formula for a canonical service
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Formula {
    /// Hourly instance rate x hours per month
    Compute,
    /// GB-month rate x provisioned size
    BlockStorage,
    /// Instance hours plus optional allocated storage
    Database,
    /// GB-month rate x stored size
    ObjectStorage,
    /// Flat hourly charge (control planes, load balancers, NAT gateways)
    Hourly,
    /// Recognized, not modeled yet
    Stub,
    /// No direct charge
    Free,
    /// Unknown service or provider
    Unsupported,
}

impl Formula {
    pub fn for_service(service: &str) -> Self {
        match service {
            keys::EC2 => Formula::Compute,
            keys::EBS => Formula::BlockStorage,
            keys::RDS => Formula::Database,
            keys::S3 => Formula::ObjectStorage,
            keys::EKS | keys::ELB | keys::NATGW => Formula::Hourly,
            keys::LAMBDA | keys::DYNAMODB | keys::CLOUDWATCH | keys::ELASTICACHE => Formula::Stub,
            keys::VPC | keys::SUBNET | keys::SECURITY_GROUP | keys::IAM => Formula::Free,
            _ => Formula::Unsupported,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EstimateStatus {
    Priced,
    /// The resource has no direct charge
    Free,
    /// Recognized but no formula yet; cost reported as zero
    NotModeled,
    /// Unknown type or provider; cost reported as zero
    Unsupported,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CostEstimate {
    pub monthly_cost: f64,
    pub unit_price: f64,
    pub pricing_unit: String,
    pub currency: &'static str,
    pub billing_detail: String,
    pub status: EstimateStatus,
}

impl CostEstimate {
    fn priced(monthly_cost: f64, quote: &PriceQuote, billing_detail: String) -> Self {
        Self {
            monthly_cost,
            unit_price: quote.unit_price,
            pricing_unit: quote.unit.clone(),
            currency: CURRENCY,
            billing_detail,
            status: EstimateStatus::Priced,
        }
    }

    fn zero(status: EstimateStatus, billing_detail: String) -> Self {
        Self {
            monthly_cost: 0.0,
            unit_price: 0.0,
            pricing_unit: String::new(),
            currency: CURRENCY,
            billing_detail,
            status,
        }
    }

    pub fn is_zero_cost(&self) -> bool {
        self.monthly_cost == 0.0
    }
}

/// Actual cost over a window, prorated from the projected monthly cost
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActualCost {
    pub estimate: CostEstimate,
    pub cost: f64,
    pub elapsed_hours: f64,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

/// Estimator for one pricing region
#[derive(Clone)]
pub struct Estimator {
    config: Config,
    pricing: Arc<dyn PricingLookup>,
}

impl std::fmt::Debug for Estimator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Estimator")
            .field("region", &self.config.pricing.region)
            .field("dev_mode", &self.config.estimation.dev_mode)
            .finish_non_exhaustive()
    }
}

impl Estimator {
    pub fn new(config: Config, pricing: Arc<dyn PricingLookup>) -> Self {
        Self { config, pricing }
    }

    pub fn region(&self) -> &str {
        &self.config.pricing.region
    }

    /// Projected monthly cost of a resource.
    pub fn estimate(&self, resource: &NormalizedResource) -> Result<CostEstimate> {
        validate_resource(resource)?;

        if resource.provider != AWS_PROVIDER {
            return Ok(CostEstimate::zero(
                EstimateStatus::Unsupported,
                format!(
                    "Provider {:?} is not supported; only {:?} resources are priced",
                    resource.provider, AWS_PROVIDER
                ),
            ));
        }

        // Every route is scoped to the configured region, zero-cost ones included
        if resource.region != self.region() {
            return Err(CostError::RegionMismatch {
                configured: self.region().to_string(),
                requested: resource.region.clone(),
            });
        }

        let formula = Formula::for_service(&resource.service);
        debug!(
            "routing {} ({}) to {:?}",
            resource.resource_type, resource.service, formula
        );

        match formula {
            Formula::Compute => self.estimate_compute(resource),
            Formula::BlockStorage => self.estimate_block_storage(resource),
            Formula::Database => self.estimate_database(resource),
            Formula::ObjectStorage => self.estimate_object_storage(resource),
            Formula::Hourly => self.estimate_hourly(resource),
            Formula::Stub => Ok(CostEstimate::zero(
                EstimateStatus::NotModeled,
                format!(
                    "{} cost estimation is not implemented yet; reporting $0.00",
                    resource.service
                ),
            )),
            Formula::Free => Ok(CostEstimate::zero(
                EstimateStatus::Free,
                format!("{} resources carry no direct charges", resource.service),
            )),
            Formula::Unsupported => Ok(CostEstimate::zero(
                EstimateStatus::Unsupported,
                format!(
                    "Resource type {:?} is not supported for cost estimation",
                    resource.resource_type
                ),
            )),
        }
    }

    /// Actual cost between `start` and `end`, prorated from the monthly estimate.
    pub fn actual_cost(
        &self,
        resource: &NormalizedResource,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<ActualCost> {
        let hours = elapsed_hours(start, end)?;
        let estimate = self.estimate(resource)?;
        let cost = prorate_monthly_cost(
            estimate.monthly_cost,
            hours,
            self.config.estimation.hours_per_month,
        );
        Ok(ActualCost {
            estimate,
            cost,
            elapsed_hours: hours,
            start,
            end,
        })
    }

    /// Looks up a price, distinguishing "no data in this region" from "no such SKU".
    fn quote(
        &self,
        service: &str,
        sku: &str,
        region: &str,
        attributes: &BTreeMap<String, String>,
    ) -> Result<PriceQuote> {
        if let Some(quote) = self.pricing.lookup(service, sku, region, attributes) {
            return Ok(quote);
        }
        debug!("no price for {} {} in {}", service, sku, region);
        if !self.pricing.supports_region(service, region) {
            return Err(CostError::RegionUnavailable {
                service: service.to_string(),
                region: region.to_string(),
            });
        }
        Err(CostError::PricingNotFound {
            service: service.to_string(),
            sku: sku.to_string(),
            region: region.to_string(),
        })
    }

    fn hours_for(&self, resource: &NormalizedResource) -> f64 {
        self.config
            .effective_hours(classification::is_dev_sensitive(&resource.service))
    }

    fn estimate_compute(&self, r: &NormalizedResource) -> Result<CostEstimate> {
        let quote = self.quote(&r.service, &r.sku, &r.region, &r.tags)?;
        let hours = self.hours_for(r);
        let monthly = quote.unit_price * hours;
        let detail = format!(
            "On-demand {} in {}: {}/hr x {} hrs/month = {}",
            r.sku,
            r.region,
            format_usd(quote.unit_price),
            hours,
            format_usd(monthly)
        );
        Ok(CostEstimate::priced(monthly, &quote, detail))
    }

    fn estimate_block_storage(&self, r: &NormalizedResource) -> Result<CostEstimate> {
        let size_gb = match r.first_tag(EBS_SIZE_TAGS) {
            Some((field, raw)) => parse_size_gb(field, raw)?,
            None => DEFAULT_EBS_SIZE_GB,
        };
        validate_volume_size(size_gb)?;

        let quote = self.quote(&r.service, &r.sku, &r.region, &r.tags)?;
        let monthly = quote.unit_price * size_gb;
        let detail = format!(
            "EBS {} storage: {} GB x {}/GB-month = {}",
            r.sku,
            size_gb,
            format_usd(quote.unit_price),
            format_usd(monthly)
        );
        Ok(CostEstimate::priced(monthly, &quote, detail))
    }

    fn estimate_database(&self, r: &NormalizedResource) -> Result<CostEstimate> {
        let instance = self.quote(&r.service, &r.sku, &r.region, &r.tags)?;
        let hours = self.hours_for(r);
        let instance_monthly = instance.unit_price * hours;
        let mut detail = format!(
            "RDS {} instance: {}/hr x {} hrs/month = {}",
            r.sku,
            format_usd(instance.unit_price),
            hours,
            format_usd(instance_monthly)
        );

        let mut monthly = instance_monthly;
        if let Some((field, raw)) = r.first_tag(RDS_STORAGE_TAGS) {
            let size_gb = parse_size_gb(field, raw)?;
            let storage_type = r.tag("storage_type").unwrap_or("gp2");
            let storage = self.quote(RDS_STORAGE_SERVICE, storage_type, &r.region, &r.tags)?;
            let storage_monthly = storage.unit_price * size_gb;
            monthly += storage_monthly;
            detail.push_str(&format!(
                "; {} storage: {} GB x {}/GB-month = {}",
                storage_type,
                size_gb,
                format_usd(storage.unit_price),
                format_usd(storage_monthly)
            ));
        }

        Ok(CostEstimate::priced(monthly, &instance, detail))
    }

    fn estimate_object_storage(&self, r: &NormalizedResource) -> Result<CostEstimate> {
        let size_gb = match r.first_tag(S3_SIZE_TAGS) {
            Some((field, raw)) => parse_size_gb(field, raw)?,
            None => 0.0,
        };
        let quote = self.quote(&r.service, &r.sku, &r.region, &r.tags)?;
        let monthly = quote.unit_price * size_gb;
        let detail = format!(
            "S3 {} storage: {} GB x {}/GB-month = {}",
            r.sku,
            size_gb,
            format_usd(quote.unit_price),
            format_usd(monthly)
        );
        Ok(CostEstimate::priced(monthly, &quote, detail))
    }

    fn estimate_hourly(&self, r: &NormalizedResource) -> Result<CostEstimate> {
        let quote = self.quote(&r.service, &r.sku, &r.region, &r.tags)?;
        let hours = self.hours_for(r);
        let monthly = quote.unit_price * hours;
        let detail = format!(
            "{} {}: {}/hr x {} hrs/month = {}",
            r.service,
            r.sku,
            format_usd(quote.unit_price),
            hours,
            format_usd(monthly)
        );
        Ok(CostEstimate::priced(monthly, &quote, detail))
    }
}
