//! Estimator tests against a mocked pricing source
//!
//! The pricing lookup is the only seam; everything else is real.

use awscost::config::Config;
use awscost::error::{CostError, ErrorCode};
use awscost::estimator::{EstimateStatus, Estimator};
use awscost::pricing::{PriceQuote, PricingLookup};
use awscost::resource::{NormalizedResource, ResourceDescriptor};
use chrono::{Duration, TimeZone, Utc};
use mockall::mock;
use std::collections::BTreeMap;
use std::sync::Arc;

mock! {
    pub Pricing {}

    impl PricingLookup for Pricing {
        fn lookup(
            &self,
            service: &str,
            sku: &str,
            region: &str,
            attributes: &BTreeMap<String, String>,
        ) -> Option<PriceQuote>;

        fn supports_region(&self, service: &str, region: &str) -> bool;
    }
}

fn estimator(pricing: MockPricing) -> Estimator {
    Estimator::new(Config::default(), Arc::new(pricing))
}

fn normalized(d: ResourceDescriptor) -> NormalizedResource {
    NormalizedResource::from_descriptor(&d).unwrap()
}

#[test]
fn test_lookup_receives_canonical_key_and_tags() {
    let mut pricing = MockPricing::new();
    pricing
        .expect_lookup()
        .withf(|service, sku, region, attributes| {
            service == "rds"
                && sku == "db.m5.large"
                && region == "us-east-1"
                && attributes.get("engine").map(String::as_str) == Some("postgres")
        })
        .times(1)
        .returning(|_, _, _, _| Some(PriceQuote::new(0.2, "Hrs")));

    let r = normalized(
        ResourceDescriptor::new("aws:rds/instance:Instance", "db.m5.large", "us-east-1")
            .with_tag("engine", "postgres"),
    );
    let est = estimator(pricing).estimate(&r).unwrap();
    assert_eq!(est.status, EstimateStatus::Priced);
    assert!((est.monthly_cost - 0.2 * 730.0).abs() < 1e-9);
}

#[test]
fn test_missing_price_is_not_found_with_context() {
    let mut pricing = MockPricing::new();
    pricing.expect_lookup().returning(|_, _, _, _| None);
    pricing.expect_supports_region().return_const(true);

    let r = normalized(ResourceDescriptor::new("ec2", "t3.nano", "us-east-1"));
    let err = estimator(pricing).estimate(&r).unwrap_err();

    assert_eq!(err.code(), ErrorCode::NotFound);
    assert_eq!(
        err.to_string(),
        "ec2 pricing for SKU \"t3.nano\" not found in region \"us-east-1\""
    );
    let details = err.details();
    assert_eq!(details["service"], "ec2");
    assert_eq!(details["sku"], "t3.nano");
    assert_eq!(details["region"], "us-east-1");
}

#[test]
fn test_region_without_data_is_unavailable() {
    let mut pricing = MockPricing::new();
    pricing.expect_lookup().returning(|_, _, _, _| None);
    pricing
        .expect_supports_region()
        .withf(|service, region| service == "ebs" && region == "us-east-1")
        .return_const(false);

    let r = normalized(ResourceDescriptor::new("ebs", "gp3", "us-east-1"));
    let err = estimator(pricing).estimate(&r).unwrap_err();
    assert!(matches!(err, CostError::RegionUnavailable { .. }));
    assert_eq!(
        err.to_string(),
        "ebs pricing is not available in region \"us-east-1\""
    );
}

#[test]
fn test_region_mismatch_never_consults_pricing() {
    let mut pricing = MockPricing::new();
    pricing.expect_lookup().never();
    pricing.expect_supports_region().never();

    let r = normalized(ResourceDescriptor::new("ec2", "t3.micro", "ap-south-1"));
    let err = estimator(pricing).estimate(&r).unwrap_err();

    assert_eq!(err.code(), ErrorCode::FailedPrecondition);
    let details = err.details();
    assert_eq!(details["configured_region"], "us-east-1");
    assert_eq!(details["requested_region"], "ap-south-1");
}

#[test]
fn test_region_mismatch_applies_to_zero_cost_routes() {
    let mut pricing = MockPricing::new();
    pricing.expect_lookup().never();
    pricing.expect_supports_region().never();

    let est = estimator(pricing);
    for (resource_type, sku) in [
        ("aws:ec2/vpc:Vpc", "vpc"),
        ("aws:iam/role:Role", "role"),
        ("lambda", "python3.12"),
        ("aws:sqs/queue:Queue", "standard"),
    ] {
        let r = normalized(ResourceDescriptor::new(resource_type, sku, "eu-west-1"));
        let err = est.estimate(&r).unwrap_err();
        assert_eq!(err.code(), ErrorCode::FailedPrecondition, "{}", resource_type);
        let details = err.details();
        assert_eq!(details["configured_region"], "us-east-1");
        assert_eq!(details["requested_region"], "eu-west-1");
    }
}

#[test]
fn test_other_providers_skip_region_scope() {
    let mut pricing = MockPricing::new();
    pricing.expect_lookup().never();

    let r = normalized(ResourceDescriptor {
        provider: "gcp".to_string(),
        ..ResourceDescriptor::new("compute", "e2-micro", "europe-west1")
    });
    let e = estimator(pricing).estimate(&r).unwrap();
    assert_eq!(e.status, EstimateStatus::Unsupported);
    assert_eq!(e.monthly_cost, 0.0);
}

#[test]
fn test_zero_cost_routes_never_consult_pricing() {
    let mut pricing = MockPricing::new();
    pricing.expect_lookup().never();

    let est = estimator(pricing);
    let cases = [
        ("dynamodb", "us-east-1", EstimateStatus::NotModeled),
        ("aws:cloudwatch/logGroup:LogGroup", "us-east-1", EstimateStatus::NotModeled),
        ("aws:ec2/securityGroup:SecurityGroup", "us-east-1", EstimateStatus::Free),
        ("aws:iam/role:Role", "us-east-1", EstimateStatus::Free),
        ("aws:sqs/queue:Queue", "us-east-1", EstimateStatus::Unsupported),
    ];
    for (resource_type, region, status) in cases {
        let r = normalized(ResourceDescriptor::new(resource_type, "n/a", region));
        let e = est.estimate(&r).unwrap();
        assert_eq!(e.status, status, "{}", resource_type);
        assert_eq!(e.monthly_cost, 0.0);
        assert_eq!(e.currency, "USD");
        assert!(!e.billing_detail.is_empty());
    }
}

#[test]
fn test_invalid_input_is_distinct_from_zero_cost() {
    let mut pricing = MockPricing::new();
    pricing.expect_lookup().never();

    // An unsupported type with a missing SKU is still invalid input
    let r = normalized(ResourceDescriptor::new("aws:sqs/queue:Queue", "", "us-east-1"));
    let err = estimator(pricing).estimate(&r).unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidArgument);
    assert_eq!(err.details()["field"], "sku");
}

#[test]
fn test_failures_are_deterministic() {
    let mut pricing = MockPricing::new();
    pricing.expect_lookup().returning(|_, _, _, _| None);
    pricing.expect_supports_region().return_const(true);
    let est = estimator(pricing);

    let r = normalized(ResourceDescriptor::new("ec2", "x1.weird", "us-east-1"));
    let first = est.estimate(&r).unwrap_err().to_string();
    let second = est.estimate(&r).unwrap_err().to_string();
    assert_eq!(first, second);
}

#[test]
fn test_actual_cost_windows() {
    let mut pricing = MockPricing::new();
    pricing
        .expect_lookup()
        .returning(|_, _, _, _| Some(PriceQuote::new(0.73, "Hrs")));
    let est = estimator(pricing);
    let r = normalized(ResourceDescriptor::new("ec2", "m5.large", "us-east-1"));
    let from = Utc.with_ymd_and_hms(2024, 7, 1, 0, 0, 0).unwrap();

    let zero = est.actual_cost(&r, from, from).unwrap();
    assert_eq!(zero.elapsed_hours, 0.0);
    assert_eq!(zero.cost, 0.0);

    let ten = est.actual_cost(&r, from, from + Duration::hours(10)).unwrap();
    assert!((ten.cost - 7.3).abs() < 1e-9);

    let err = est
        .actual_cost(&r, from, from - Duration::minutes(1))
        .unwrap_err();
    assert_eq!(err.code(), ErrorCode::InvalidArgument);
    assert!(err.details().contains_key("start"));
}

#[test]
fn test_dev_mode_uses_reduced_hours_for_compute() {
    let mut config = Config::default();
    config.estimation.dev_mode = true;

    let mut pricing = MockPricing::new();
    pricing
        .expect_lookup()
        .returning(|_, _, _, _| Some(PriceQuote::new(1.0, "Hrs")));
    let est = Estimator::new(config, Arc::new(pricing));

    let ec2 = normalized(ResourceDescriptor::new("ec2", "m5.large", "us-east-1"));
    assert_eq!(est.estimate(&ec2).unwrap().monthly_cost, 160.0);

    let natgw = normalized(ResourceDescriptor::new("natgw", "nat-gateway", "us-east-1"));
    assert_eq!(est.estimate(&natgw).unwrap().monthly_cost, 160.0);
}

#[test]
fn test_s3_defaults_to_empty_bucket() {
    let mut pricing = MockPricing::new();
    pricing
        .expect_lookup()
        .returning(|_, _, _, _| Some(PriceQuote::new(0.023, "GB-Mo")));
    let est = estimator(pricing);

    let empty = normalized(ResourceDescriptor::new("s3", "STANDARD", "us-east-1"));
    assert_eq!(est.estimate(&empty).unwrap().monthly_cost, 0.0);

    let sized = normalized(
        ResourceDescriptor::new("s3", "STANDARD", "us-east-1").with_tag("size_gb", "1000"),
    );
    assert!((est.estimate(&sized).unwrap().monthly_cost - 23.0).abs() < 1e-9);
}
