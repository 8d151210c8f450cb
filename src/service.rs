//! Cost operations
//!
//! [`CostService`] is the surface the CLI (or any transport) calls into:
//! projected cost, actual cost over a window, and recommendations. Every
//! call normalizes its descriptor first; nothing is cached between calls.

use crate::billing::{build_billing_record, BillingInput, BillingRecord};
use crate::config::Config;
use crate::error::{CostError, Result};
use crate::estimator::{ActualCost, CostEstimate, Estimator};
use crate::pricing::PricingLookup;
use crate::recommendations::{recommend, Recommendation};
use crate::resource::{NormalizedResource, ResourceDescriptor};
use crate::utils::month_bounds;
use chrono::{DateTime, Utc};
use futures::future::join_all;
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Projected monthly cost with its billing record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProjectedCost {
    pub resource: NormalizedResource,
    pub estimate: CostEstimate,
    pub billing: BillingRecord,
}

/// Actual cost over a window with its billing record
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActualCostReport {
    pub resource: NormalizedResource,
    pub actual: ActualCost,
    pub billing: BillingRecord,
}

#[derive(Debug, Clone)]
pub struct CostService {
    estimator: Estimator,
}

impl CostService {
    pub fn new(config: Config, pricing: Arc<dyn PricingLookup>) -> Self {
        Self {
            estimator: Estimator::new(config, pricing),
        }
    }

    /// Projected cost for the current calendar month.
    pub fn projected_cost(&self, descriptor: &ResourceDescriptor) -> Result<ProjectedCost> {
        self.projected_cost_at(descriptor, Utc::now())
    }

    /// Projected cost, with the billing period set to the month containing `as_of`.
    pub fn projected_cost_at(
        &self,
        descriptor: &ResourceDescriptor,
        as_of: DateTime<Utc>,
    ) -> Result<ProjectedCost> {
        let resource = NormalizedResource::from_descriptor(descriptor)?;
        let estimate = self.estimator.estimate(&resource)?;
        let (period_start, period_end) = month_bounds(as_of);
        debug!(
            "{}: projected {} ({:?})",
            descriptor.label(),
            estimate.monthly_cost,
            estimate.status
        );

        let billing = build_billing_record(&billing_input(
            &resource,
            &estimate,
            estimate.monthly_cost,
            period_start,
            period_end,
        ));
        Ok(ProjectedCost {
            resource,
            estimate,
            billing,
        })
    }

    /// Actual cost between `from` and `to`.
    pub fn actual_cost(
        &self,
        descriptor: &ResourceDescriptor,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<ActualCostReport> {
        let resource = NormalizedResource::from_descriptor(descriptor)?;
        let actual = self.estimator.actual_cost(&resource, from, to)?;
        debug!(
            "{}: {} over {} hours",
            descriptor.label(),
            actual.cost,
            actual.elapsed_hours
        );

        let billing = build_billing_record(&billing_input(
            &resource,
            &actual.estimate,
            actual.cost,
            from,
            to,
        ));
        Ok(ActualCostReport {
            resource,
            actual,
            billing,
        })
    }

    /// Recommendations for each descriptor, computed independently.
    ///
    /// A descriptor that fails to normalize is logged and skipped so one bad
    /// entry does not hide recommendations for the rest.
    pub fn recommendations(&self, descriptors: &[ResourceDescriptor]) -> Vec<Recommendation> {
        let mut out = Vec::new();
        for descriptor in descriptors {
            match NormalizedResource::from_descriptor(descriptor) {
                Ok(resource) => {
                    out.extend(recommend(&self.estimator, &resource, descriptor.label()))
                }
                Err(e) => warn!("skipping {} for recommendations: {}", descriptor.label(), e),
            }
        }
        info!(
            "{} recommendation(s) for {} resource(s)",
            out.len(),
            descriptors.len()
        );
        out
    }

    /// Projected costs for a batch, evaluated on the blocking pool.
    ///
    /// Results come back in input order; each entry fails or succeeds on its own.
    pub async fn projected_costs(
        self: Arc<Self>,
        descriptors: Vec<ResourceDescriptor>,
    ) -> Vec<Result<ProjectedCost>> {
        let as_of = Utc::now();
        let tasks = descriptors.into_iter().map(|descriptor| {
            let service = Arc::clone(&self);
            tokio::task::spawn_blocking(move || service.projected_cost_at(&descriptor, as_of))
        });

        join_all(tasks)
            .await
            .into_iter()
            .map(|joined| {
                joined.unwrap_or_else(|e| {
                    Err(CostError::Io(std::io::Error::new(
                        std::io::ErrorKind::Other,
                        format!("estimation task failed: {}", e),
                    )))
                })
            })
            .collect()
    }
}

fn billing_input<'a>(
    resource: &'a NormalizedResource,
    estimate: &'a CostEstimate,
    cost: f64,
    period_start: DateTime<Utc>,
    period_end: DateTime<Utc>,
) -> BillingInput<'a> {
    BillingInput {
        service: &resource.service,
        resource_type: &resource.resource_type,
        region: &resource.region,
        cost,
        unit_price: estimate.unit_price,
        pricing_unit: &estimate.pricing_unit,
        period_start,
        period_end,
        sku: &resource.sku,
    }
}
