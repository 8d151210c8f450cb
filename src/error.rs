//! Error types for awscost
//!
//! This module defines the error handling strategy for awscost. There are three
//! error types: `CostError` (main error enum), `ArnError` (identifier parsing)
//! and `ConfigError` (configuration-specific).
//!
//! ## Error Handling Philosophy
//!
//! Library code uses `crate::error::Result<T>` which returns `CostError`.
//! CLI code uses `anyhow::Result<T>` for top-level error handling. The conversion
//! happens at the CLI boundary, and `exit_codes` downcasts back to `CostError`
//! to pick the process exit code.
//!
//! ## Classification
//!
//! Every error maps to an [`ErrorCode`] through [`CostError::code`]. Callers
//! that sit behind an RPC transport use the code to pick a status, and
//! [`CostError::details`] to attach a machine-readable payload.
//!
//! - `InvalidArgument`: missing descriptor fields, malformed identifiers,
//!   time windows whose end precedes their start
//! - `FailedPrecondition`: the resource region differs from the configured
//!   pricing region (configuration/routing problem, not a data gap)
//! - `NotFound`: no price for the service/SKU/region; a different SKU or
//!   region may succeed
//! - `Unimplemented`: isolated partitions, where public pricing never exists
//! - `Internal`: I/O, serialization, configuration
//!
//! Nothing here is retryable. Every failure is a deterministic function of
//! the input.

use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use thiserror::Error;

/// Main error type for awscost
#[derive(Error, Debug)]
pub enum CostError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Invalid ARN: {0}")]
    Arn(#[from] ArnError),

    #[error("Validation error: {field} - {reason}")]
    Validation { field: String, reason: String },

    #[error("Region mismatch: estimator is configured for {configured:?}, resource is in {requested:?}")]
    RegionMismatch { configured: String, requested: String },

    #[error("{}", pricing_not_found_message(.service, .sku, .region))]
    PricingNotFound {
        service: String,
        sku: String,
        region: String,
    },

    #[error("{}", region_unavailable_message(.service, .region))]
    RegionUnavailable { service: String, region: String },

    #[error("Invalid time window: end {end} precedes start {start}")]
    InvalidTimeWindow {
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON serialization error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

/// Identifier parsing errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ArnError {
    #[error("expected at least 6 colon-separated segments, got {0}")]
    TooFewSegments(usize),

    #[error("identifier must start with \"arn\", got {0:?}")]
    MissingPrefix(String),

    #[error("partition is empty")]
    EmptyPartition,

    #[error("partition {0:?} is an isolated partition; public pricing is not available there")]
    IsolatedPartition(String),

    #[error("unsupported partition {0:?}")]
    UnsupportedPartition(String),

    #[error("service is empty")]
    EmptyService,

    #[error("resource is empty")]
    EmptyResource,
}

/// Configuration-specific errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Missing required field: {0}")]
    MissingField(String),

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },
}

/// Result type alias
pub type Result<T> = std::result::Result<T, CostError>;

/// Transport-neutral classification of a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    InvalidArgument,
    FailedPrecondition,
    NotFound,
    Unimplemented,
    Internal,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            ErrorCode::InvalidArgument => "INVALID_ARGUMENT",
            ErrorCode::FailedPrecondition => "FAILED_PRECONDITION",
            ErrorCode::NotFound => "NOT_FOUND",
            ErrorCode::Unimplemented => "UNIMPLEMENTED",
            ErrorCode::Internal => "INTERNAL",
        };
        f.write_str(name)
    }
}

impl CostError {
    /// Shorthand for a `Validation` error.
    pub fn validation(field: impl Into<String>, reason: impl Into<String>) -> Self {
        CostError::Validation {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            CostError::Validation { .. } | CostError::InvalidTimeWindow { .. } => {
                ErrorCode::InvalidArgument
            }
            CostError::Arn(ArnError::IsolatedPartition(_)) => ErrorCode::Unimplemented,
            CostError::Arn(_) => ErrorCode::InvalidArgument,
            CostError::RegionMismatch { .. } => ErrorCode::FailedPrecondition,
            CostError::PricingNotFound { .. } | CostError::RegionUnavailable { .. } => {
                ErrorCode::NotFound
            }
            CostError::Config(_)
            | CostError::Io(_)
            | CostError::Json(_)
            | CostError::Toml(_) => ErrorCode::Internal,
        }
    }

    /// Structured payload for the error, keyed by stable field names.
    ///
    /// Empty for errors whose message already says everything.
    pub fn details(&self) -> BTreeMap<&'static str, String> {
        let mut details = BTreeMap::new();
        match self {
            CostError::RegionMismatch {
                configured,
                requested,
            } => {
                details.insert("configured_region", configured.clone());
                details.insert("requested_region", requested.clone());
            }
            CostError::PricingNotFound {
                service,
                sku,
                region,
            } => {
                details.insert("service", service.clone());
                details.insert("sku", sku.clone());
                details.insert("region", region.clone());
            }
            CostError::RegionUnavailable { service, region } => {
                details.insert("service", service.clone());
                details.insert("region", region.clone());
            }
            CostError::Validation { field, .. } => {
                details.insert("field", field.clone());
            }
            CostError::InvalidTimeWindow { start, end } => {
                details.insert("start", start.to_rfc3339());
                details.insert("end", end.to_rfc3339());
            }
            _ => {}
        }
        details
    }
}

/// Renders `<label> "<value>" not found`.
///
/// Downstream tooling matches on this exact shape; the value is quoted and escaped.
pub fn not_found_message(label: &str, value: &str) -> String {
    format!("{} {:?} not found", label, value)
}

/// Renders `<service> pricing is not available in region "<region>"`.
pub fn region_unavailable_message(service: &str, region: &str) -> String {
    format!("{} pricing is not available in region {:?}", service, region)
}

fn pricing_not_found_message(service: &str, sku: &str, region: &str) -> String {
    format!(
        "{} in region {:?}",
        not_found_message(&format!("{} pricing for SKU", service), sku),
        region
    )
}
