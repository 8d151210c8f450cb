//! Input validation utilities
//!
//! Checks applied to resource descriptors before any pricing work is done.

use crate::error::{CostError, Result};
use crate::resource::NormalizedResource;
use once_cell::sync::Lazy;
use regex::Regex;

/// `us-east-1`, `ap-southeast-2`, `us-gov-west-1`, `cn-north-1`, ...
static REGION_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-z]{2}(-gov|-iso[a-z]?)?-[a-z]+-\d{1,2}$").expect("region regex is valid")
});

/// Largest EBS volume, in GB.
pub const MAX_VOLUME_SIZE_GB: f64 = 65_536.0;

/// Require a non-blank field.
pub fn require(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(CostError::validation(field, format!("{} is required", field)));
    }
    Ok(())
}

/// Provider, resource type, SKU and region must all be present.
pub fn validate_resource(resource: &NormalizedResource) -> Result<()> {
    require("provider", &resource.provider)?;
    require("resource_type", &resource.service)?;
    require("sku", &resource.sku)?;
    require("region", &resource.region)?;
    Ok(())
}

/// Validate AWS region format
pub fn validate_region(region: &str) -> Result<()> {
    if !REGION_RE.is_match(region) {
        return Err(CostError::validation(
            "region",
            format!("Region must look like 'us-east-1', got: {:?}", region),
        ));
    }
    Ok(())
}

/// Parse a size tag value in GB.
pub fn parse_size_gb(field: &str, raw: &str) -> Result<f64> {
    let size: f64 = raw.trim().parse().map_err(|_| {
        CostError::validation(field, format!("Size must be a number of GB, got: {:?}", raw))
    })?;

    if !size.is_finite() || size < 0.0 {
        return Err(CostError::validation(
            field,
            format!("Size must be a non-negative number of GB, got: {}", size),
        ));
    }
    Ok(size)
}

/// Validate EBS volume size (in GB)
pub fn validate_volume_size(size_gb: f64) -> Result<()> {
    if size_gb > MAX_VOLUME_SIZE_GB {
        return Err(CostError::validation(
            "volume_size",
            format!(
                "Volume size must be at most {} GB, got: {}",
                MAX_VOLUME_SIZE_GB, size_gb
            ),
        ));
    }
    Ok(())
}
