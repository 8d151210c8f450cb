//! awscost library
//!
//! Resource identification, classification and cost estimation for AWS
//! resources, producing FOCUS-aligned billing records.

pub mod arn;
pub mod billing;
pub mod classification;
pub mod config;
pub mod error;
pub mod estimator;
pub mod exit_codes;
pub mod instance_type;
pub mod normalize;
pub mod pricing;
pub mod recommendations;
pub mod resource;
pub mod service;
pub mod utils;
pub mod validation;

// Re-export commonly used types
pub use arn::Arn;
pub use billing::BillingRecord;
pub use config::Config;
pub use error::{CostError, ErrorCode, Result};
pub use estimator::{CostEstimate, EstimateStatus, Estimator};
pub use pricing::{PriceQuote, PricingLookup, StaticPriceTable};
pub use recommendations::Recommendation;
pub use resource::{NormalizedResource, ResourceDescriptor};
pub use service::CostService;
