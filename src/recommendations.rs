//! Right-sizing recommendations
//!
//! Per-resource suggestions built from the static family tables in
//! [`crate::instance_type`]. Pricing is used only to attach savings figures;
//! a recommendation is still produced when no price is available.

use crate::estimator::{EstimateStatus, Estimator};
use crate::instance_type::{
    ec2_generation_upgrade, ec2_graviton_equivalent, latest_ec2_generation, parse_instance_type,
    parse_rds_instance_type, rds_generation_upgrade, rds_graviton_for_engine, InstanceType,
    GRAVITON_SAVINGS_PERCENT,
};
use crate::normalize::keys;
use crate::resource::NormalizedResource;
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationKind {
    GenerationUpgrade,
    GravitonMigration,
}

impl std::fmt::Display for RecommendationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RecommendationKind::GenerationUpgrade => f.write_str("generation upgrade"),
            RecommendationKind::GravitonMigration => f.write_str("graviton migration"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Recommendation {
    /// Resource id, ARN or type, whichever the caller gave
    pub resource: String,
    pub kind: RecommendationKind,
    pub current_sku: String,
    pub recommended_sku: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_monthly_cost: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimated_monthly_savings: Option<f64>,
}

/// Recommendations for one resource. Empty for anything other than EC2/RDS
/// instances, unparseable instance types, or families already current.
pub fn recommend(
    estimator: &Estimator,
    resource: &NormalizedResource,
    label: &str,
) -> Vec<Recommendation> {
    let (parsed, upgrade, graviton) = match resource.service.as_str() {
        keys::EC2 => {
            let parsed = parse_instance_type(&resource.sku);
            let upgrade = ec2_generation_upgrade(&parsed.family);
            let graviton = ec2_graviton_equivalent(&parsed.family);
            (parsed, upgrade, graviton)
        }
        keys::RDS => {
            let parsed = parse_rds_instance_type(&resource.sku);
            let engine = resource.tag("engine").unwrap_or_default();
            let upgrade = rds_generation_upgrade(&parsed.family);
            let graviton = rds_graviton_for_engine(&parsed.family, engine);
            if graviton.is_none() && parsed.is_valid() {
                debug!(
                    "no graviton suggestion for {} with engine {:?}",
                    resource.sku, engine
                );
            }
            (parsed, upgrade, graviton)
        }
        _ => return Vec::new(),
    };

    if !parsed.is_valid() {
        debug!("skipping recommendations for unparseable type {:?}", resource.sku);
        return Vec::new();
    }

    let current_cost = priced_monthly(estimator, resource);
    let mut recommendations = Vec::new();

    if let Some(family) = upgrade {
        recommendations.extend(generation_upgrade(
            estimator,
            resource,
            label,
            &parsed,
            family,
            current_cost,
        ));
    }

    if let Some(family) = graviton {
        let recommended_sku = parsed.with_family(family);
        recommendations.push(Recommendation {
            resource: label.to_string(),
            kind: RecommendationKind::GravitonMigration,
            current_sku: resource.sku.clone(),
            description: format!(
                "Migrate {} to Graviton {} for ~{}% lower cost at comparable performance",
                resource.sku, recommended_sku, GRAVITON_SAVINGS_PERCENT
            ),
            recommended_sku,
            current_monthly_cost: current_cost,
            estimated_monthly_savings: current_cost
                .map(|cost| cost * GRAVITON_SAVINGS_PERCENT / 100.0),
        });
    }

    recommendations
}

fn generation_upgrade(
    estimator: &Estimator,
    resource: &NormalizedResource,
    label: &str,
    parsed: &InstanceType,
    family: &str,
    current_cost: Option<f64>,
) -> Option<Recommendation> {
    let recommended_sku = parsed.with_family(family);
    let candidate = NormalizedResource {
        sku: recommended_sku.clone(),
        ..resource.clone()
    };
    let savings = current_cost
        .zip(priced_monthly(estimator, &candidate))
        .map(|(current, next)| current - next);

    if savings.is_some_and(|s| s < 0.0) {
        debug!(
            "{} costs more than {} in {}; not recommending",
            recommended_sku, resource.sku, resource.region
        );
        return None;
    }

    let mut description = format!(
        "Upgrade {} to newer-generation {} for equal or better performance at the same or lower price",
        resource.sku, recommended_sku
    );
    if resource.service == keys::EC2 {
        let latest = latest_ec2_generation(family);
        if latest != family {
            description.push_str(&format!(" (latest known generation: {})", latest));
        }
    }

    Some(Recommendation {
        resource: label.to_string(),
        kind: RecommendationKind::GenerationUpgrade,
        current_sku: resource.sku.clone(),
        description,
        recommended_sku,
        current_monthly_cost: current_cost,
        estimated_monthly_savings: savings,
    })
}

fn priced_monthly(estimator: &Estimator, resource: &NormalizedResource) -> Option<f64> {
    match estimator.estimate(resource) {
        Ok(est) if est.status == EstimateStatus::Priced => Some(est.monthly_cost),
        Ok(_) => None,
        Err(e) => {
            debug!("no price for {} ({}): {}", resource.sku, resource.service, e);
            None
        }
    }
}
