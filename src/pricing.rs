//! Pricing lookup
//!
//! The estimator never talks to a pricing API itself. It is handed a
//! [`PricingLookup`] and asks it for unit prices by canonical service key,
//! SKU and region. "No price" is an ordinary answer (`None`), which the
//! estimator turns into a structured not-found error.
//!
//! [`StaticPriceTable`] is the in-process implementation: a TOML price file,
//! or a small built-in us-east-1 table when no file is configured.

use crate::error::{ConfigError, CostError, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::Path;
use tracing::debug;

/// A unit price and the unit it is quoted in
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceQuote {
    pub unit_price: f64,
    /// Pricing unit as published, e.g. `Hrs` or `GB-Mo`
    pub unit: String,
}

impl PriceQuote {
    pub fn new(unit_price: f64, unit: impl Into<String>) -> Self {
        Self {
            unit_price,
            unit: unit.into(),
        }
    }
}

/// Injected pricing capability
pub trait PricingLookup: Send + Sync {
    /// Unit price for a service/SKU in a region, or `None` when there is no data.
    ///
    /// `attributes` carries resource tags that may refine the match
    /// (database engine, tenancy, ...); implementations may ignore them.
    fn lookup(
        &self,
        service: &str,
        sku: &str,
        region: &str,
        attributes: &BTreeMap<String, String>,
    ) -> Option<PriceQuote>;

    /// Whether this source has any data for the service in the region.
    fn supports_region(&self, _service: &str, _region: &str) -> bool {
        true
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PriceEntry {
    pub service: String,
    pub sku: String,
    pub region: String,
    pub unit_price: f64,
    pub unit: String,
    /// Only match when the resource carries this `engine` tag (RDS)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub engine: Option<String>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct PriceFile {
    #[serde(default)]
    price: Vec<PriceEntry>,
}

type PriceKey = (String, String, String);

/// In-memory price table keyed by (service, sku, region)
#[derive(Debug, Default, Clone)]
pub struct StaticPriceTable {
    entries: HashMap<PriceKey, Vec<PriceEntry>>,
    regions: HashSet<(String, String)>,
}

impl StaticPriceTable {
    pub fn new(entries: impl IntoIterator<Item = PriceEntry>) -> Self {
        let mut table = Self::default();
        for entry in entries {
            table.insert(entry);
        }
        table
    }

    pub fn insert(&mut self, entry: PriceEntry) {
        self.regions
            .insert((entry.service.clone(), entry.region.clone()));
        self.entries
            .entry((entry.service.clone(), entry.sku.clone(), entry.region.clone()))
            .or_default()
            .push(entry);
    }

    pub fn len(&self) -> usize {
        self.entries.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Parses a TOML price file (`[[price]]` tables).
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let file: PriceFile = toml::from_str(content)?;
        for (i, entry) in file.price.iter().enumerate() {
            if !entry.unit_price.is_finite() || entry.unit_price < 0.0 {
                return Err(CostError::Config(ConfigError::InvalidValue {
                    field: format!("price[{}].unit_price", i),
                    reason: format!("must be a non-negative number, got {}", entry.unit_price),
                }));
            }
        }
        Ok(Self::new(file.price))
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let table = Self::from_toml_str(&content)?;
        debug!("loaded {} prices from {}", table.len(), path.display());
        Ok(table)
    }

    /// Public on-demand Linux prices for us-east-1.
    ///
    /// Enough to run the CLI without a price file; not a substitute for one.
    pub fn builtin() -> Self {
        const REGION: &str = "us-east-1";
        let hourly = |service: &str, sku: &str, price: f64| PriceEntry {
            service: service.to_string(),
            sku: sku.to_string(),
            region: REGION.to_string(),
            unit_price: price,
            unit: "Hrs".to_string(),
            engine: None,
        };
        let gb_month = |service: &str, sku: &str, price: f64| PriceEntry {
            unit: "GB-Mo".to_string(),
            ..hourly(service, sku, price)
        };

        Self::new([
            hourly("ec2", "t2.micro", 0.0116),
            hourly("ec2", "t2.medium", 0.0464),
            hourly("ec2", "t3.micro", 0.0104),
            hourly("ec2", "t3.small", 0.0208),
            hourly("ec2", "t3.medium", 0.0416),
            hourly("ec2", "t3.large", 0.0832),
            hourly("ec2", "t4g.micro", 0.0084),
            hourly("ec2", "t4g.medium", 0.0336),
            hourly("ec2", "t4g.large", 0.0672),
            hourly("ec2", "m4.large", 0.10),
            hourly("ec2", "m5.large", 0.096),
            hourly("ec2", "m5.xlarge", 0.192),
            hourly("ec2", "m6i.large", 0.096),
            hourly("ec2", "m6i.xlarge", 0.192),
            hourly("ec2", "m6g.large", 0.077),
            hourly("ec2", "m6g.xlarge", 0.154),
            hourly("ec2", "c5.large", 0.085),
            hourly("ec2", "c6i.large", 0.085),
            hourly("ec2", "c6g.large", 0.068),
            hourly("ec2", "r5.large", 0.126),
            hourly("ec2", "r6g.large", 0.1008),
            gb_month("ebs", "gp2", 0.10),
            gb_month("ebs", "gp3", 0.08),
            gb_month("ebs", "io1", 0.125),
            gb_month("ebs", "st1", 0.045),
            gb_month("ebs", "sc1", 0.015),
            hourly("rds", "db.t3.micro", 0.017),
            hourly("rds", "db.t3.medium", 0.068),
            hourly("rds", "db.t4g.micro", 0.016),
            hourly("rds", "db.t4g.medium", 0.065),
            hourly("rds", "db.m5.large", 0.171),
            hourly("rds", "db.m6g.large", 0.152),
            hourly("rds", "db.r5.large", 0.25),
            hourly("rds", "db.r6g.large", 0.225),
            gb_month("rds-storage", "gp2", 0.115),
            gb_month("rds-storage", "gp3", 0.115),
            gb_month("s3", "STANDARD", 0.023),
            gb_month("s3", "STANDARD_IA", 0.0125),
            gb_month("s3", "GLACIER", 0.004),
            hourly("eks", "cluster", 0.10),
            hourly("elb", "application", 0.0225),
            hourly("elb", "network", 0.0225),
            hourly("natgw", "nat-gateway", 0.045),
        ])
    }
}

impl PricingLookup for StaticPriceTable {
    fn lookup(
        &self,
        service: &str,
        sku: &str,
        region: &str,
        attributes: &BTreeMap<String, String>,
    ) -> Option<PriceQuote> {
        let candidates = self
            .entries
            .get(&(service.to_string(), sku.to_string(), region.to_string()))?;
        let engine = attributes.get("engine").map(|e| e.to_ascii_lowercase());

        // Engine-specific entries beat engine-agnostic ones.
        let specific = engine.as_deref().and_then(|engine| {
            candidates.iter().find(|c| {
                c.engine
                    .as_deref()
                    .is_some_and(|e| e.eq_ignore_ascii_case(engine))
            })
        });
        specific
            .or_else(|| candidates.iter().find(|c| c.engine.is_none()))
            .map(|c| PriceQuote::new(c.unit_price, c.unit.clone()))
    }

    fn supports_region(&self, service: &str, region: &str) -> bool {
        self.regions
            .contains(&(service.to_string(), region.to_string()))
    }
}
