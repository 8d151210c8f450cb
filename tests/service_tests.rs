//! End-to-end tests for the cost operations
//!
//! Uses the built-in price table, so everything runs offline.

use awscost::config::Config;
use awscost::error::{CostError, ErrorCode};
use awscost::estimator::EstimateStatus;
use awscost::pricing::StaticPriceTable;
use awscost::recommendations::RecommendationKind;
use awscost::resource::ResourceDescriptor;
use awscost::service::CostService;
use chrono::{Duration, TimeZone, Utc};
use std::sync::Arc;

fn service() -> CostService {
    CostService::new(Config::default(), Arc::new(StaticPriceTable::builtin()))
}

#[test]
fn test_projected_cost_from_arn_only() {
    let d = ResourceDescriptor::new("", "gp3", "")
        .with_arn("arn:aws:ec2:us-east-1:123456789012:volume/vol-0abc")
        .with_tag("size", "100");
    let projected = service().projected_cost(&d).unwrap();

    assert_eq!(projected.resource.service, "ebs");
    assert_eq!(projected.resource.region, "us-east-1");
    assert_eq!(projected.resource.id.as_deref(), Some("vol-0abc"));
    assert!((projected.estimate.monthly_cost - 8.0).abs() < 1e-9);
    assert_eq!(projected.billing.region_id, "us-east-1");
    assert_eq!(projected.billing.pricing_unit, "GB-Mo");
}

#[test]
fn test_ec2_sub_resource_arns_are_not_priced_as_instances() {
    let igw = ResourceDescriptor::new("", "igw", "")
        .with_arn("arn:aws:ec2:us-east-1:123456789012:internet-gateway/igw-0abc");
    let projected = service().projected_cost(&igw).unwrap();
    assert_eq!(projected.resource.service, "vpc");
    assert_eq!(projected.estimate.status, EstimateStatus::Free);

    let snapshot = ResourceDescriptor::new("", "standard", "")
        .with_arn("arn:aws:ec2:us-east-1:123456789012:snapshot/snap-0abc");
    let projected = service().projected_cost(&snapshot).unwrap();
    assert_eq!(projected.resource.service, "ec2-snapshot");
    assert_eq!(projected.estimate.status, EstimateStatus::Unsupported);
    assert_eq!(projected.estimate.monthly_cost, 0.0);
}

#[test]
fn test_isolated_arn_surfaces_as_error() {
    let d = ResourceDescriptor::new("ec2", "t3.micro", "")
        .with_arn("arn:aws-iso-b:ec2:us-isob-east-1:123456789012:instance/i-1");
    let err = service().projected_cost(&d).unwrap_err();
    assert_eq!(err.code(), ErrorCode::Unimplemented);
}

#[test]
fn test_projected_billing_record_for_month() {
    let as_of = Utc.with_ymd_and_hms(2024, 12, 31, 23, 59, 59).unwrap();
    let d = ResourceDescriptor::new("aws:eks/cluster:Cluster", "cluster", "us-east-1");
    let projected = service().projected_cost_at(&d, as_of).unwrap();

    assert!((projected.estimate.monthly_cost - 73.0).abs() < 1e-9);
    let json = serde_json::to_value(&projected.billing).unwrap();
    assert_eq!(json["ChargePeriodStart"], "2024-12-01T00:00:00Z");
    assert_eq!(json["ChargePeriodEnd"], "2025-01-01T00:00:00Z");
    assert_eq!(json["ServiceCategory"], "Compute");
    assert_eq!(json["ResourceType"], "aws:eks/cluster:Cluster");
}

#[test]
fn test_actual_cost_rejects_reversed_window() {
    let to = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let d = ResourceDescriptor::new("ec2", "t3.micro", "us-east-1");
    let err = service()
        .actual_cost(&d, to + Duration::hours(1), to)
        .unwrap_err();
    assert!(matches!(err, CostError::InvalidTimeWindow { .. }));
}

#[test]
fn test_recommendations_are_per_resource() {
    let descriptors = vec![
        ResourceDescriptor::new("ec2", "t3.medium", "us-east-1").with_id("web-1"),
        ResourceDescriptor::new("rds", "db.m5.large", "us-east-1")
            .with_id("orders-db")
            .with_tag("engine", "sqlserver-se"),
        ResourceDescriptor::new("s3", "STANDARD", "us-east-1").with_id("logs"),
    ];
    let recs = service().recommendations(&descriptors);

    let web: Vec<_> = recs.iter().filter(|r| r.resource == "web-1").collect();
    assert_eq!(web.len(), 1);
    assert_eq!(web[0].kind, RecommendationKind::GravitonMigration);
    assert_eq!(web[0].recommended_sku, "t4g.medium");
    let savings = web[0].estimated_monthly_savings.unwrap();
    assert!((savings - 0.0416 * 730.0 * 0.2).abs() < 1e-9);

    let db: Vec<_> = recs.iter().filter(|r| r.resource == "orders-db").collect();
    assert!(db.iter().all(|r| r.kind == RecommendationKind::GenerationUpgrade));
    assert_eq!(db.len(), 1);
    assert_eq!(db[0].recommended_sku, "db.m6i.large");

    assert!(recs.iter().all(|r| r.resource != "logs"));
}

#[tokio::test]
async fn test_batch_preserves_input_order() {
    let skus = ["t3.micro", "t3.small", "t3.medium", "t3.large", "m5.large", "m5.xlarge"];
    let descriptors: Vec<ResourceDescriptor> = skus
        .iter()
        .map(|sku| ResourceDescriptor::new("ec2", *sku, "us-east-1"))
        .collect();

    let results = Arc::new(service()).projected_costs(descriptors).await;
    assert_eq!(results.len(), skus.len());
    for (result, sku) in results.iter().zip(skus) {
        assert_eq!(result.as_ref().unwrap().resource.sku, sku);
    }
}

#[tokio::test]
async fn test_batch_isolates_failures() {
    let descriptors = vec![
        ResourceDescriptor::new("ec2", "t3.micro", "us-east-1"),
        ResourceDescriptor::new("ec2", "", "us-east-1"),
        ResourceDescriptor::new("aws:quantum/computer:Computer", "qpu", "us-east-1"),
        ResourceDescriptor::new("ec2", "no.such", "us-east-1"),
    ];

    let results = Arc::new(service()).projected_costs(descriptors).await;
    assert!(results[0].is_ok());
    assert_eq!(results[1].as_ref().unwrap_err().code(), ErrorCode::InvalidArgument);
    assert_eq!(
        results[2].as_ref().unwrap().estimate.status,
        EstimateStatus::Unsupported
    );
    assert_eq!(results[3].as_ref().unwrap_err().code(), ErrorCode::NotFound);
    assert_eq!(results[3].as_ref().unwrap_err().details()["sku"], "no.such");
}

#[tokio::test]
async fn test_empty_batch() {
    let results = Arc::new(service()).projected_costs(Vec::new()).await;
    assert!(results.is_empty());
}
