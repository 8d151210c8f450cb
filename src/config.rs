use crate::error::{ConfigError, CostError};
use crate::utils::HOURS_PER_MONTH;
use crate::validation::validate_region;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Once;
use tracing::warn;

/// Reduced monthly hours for the dev profile (8h x 20 working days).
pub const DEV_HOURS_PER_MONTH: f64 = 160.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub pricing: PricingConfig,
    #[serde(default)]
    pub estimation: EstimationConfig,

    /// Deprecated: use `pricing.region`
    #[serde(default, skip_serializing)]
    region: Option<String>,
    /// Deprecated: use `estimation.dev_mode`
    #[serde(default, skip_serializing)]
    dev_hours: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PricingConfig {
    /// The one region this estimator prices
    pub region: String,
    /// TOML price file; the built-in table is used when unset
    #[serde(default)]
    pub price_file: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EstimationConfig {
    #[serde(default = "default_hours_per_month")]
    pub hours_per_month: f64,
    #[serde(default)]
    pub dev_mode: bool,
    #[serde(default = "default_dev_hours_per_month")]
    pub dev_hours_per_month: f64,
}

fn default_hours_per_month() -> f64 {
    HOURS_PER_MONTH
}

fn default_dev_hours_per_month() -> f64 {
    DEV_HOURS_PER_MONTH
}

impl Default for PricingConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            price_file: None,
        }
    }
}

impl Default for EstimationConfig {
    fn default() -> Self {
        Self {
            hours_per_month: HOURS_PER_MONTH,
            dev_mode: false,
            dev_hours_per_month: DEV_HOURS_PER_MONTH,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            pricing: PricingConfig::default(),
            estimation: EstimationConfig::default(),
            region: None,
            dev_hours: None,
        }
    }
}

static LEGACY_FLAGS_NOTICE: Once = Once::new();
static LEGACY_FLAGS_NOTICES_EMITTED: AtomicUsize = AtomicUsize::new(0);

/// Logs the legacy-flag deprecation warning. Fires at most once per process.
fn warn_legacy_flags_once(flags: &[&str]) {
    LEGACY_FLAGS_NOTICE.call_once(|| {
        LEGACY_FLAGS_NOTICES_EMITTED.fetch_add(1, Ordering::SeqCst);
        warn!(
            "Deprecated config keys in use: {}. Move them to [pricing].region / [estimation].dev_mode",
            flags.join(", ")
        );
    });
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = if let Some(p) = path {
            p.to_path_buf()
        } else {
            // Try .awscost.toml in current dir, then ~/.config/awscost/config.toml
            let local = PathBuf::from(".awscost.toml");
            if local.exists() {
                local
            } else {
                dirs::config_dir()
                    .map(|d| d.join("awscost").join("config.toml"))
                    .unwrap_or_else(|| PathBuf::from(".awscost.toml"))
            }
        };

        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)
                .with_context(|| format!("Failed to read config: {}", config_path.display()))?;
            let config = Self::from_toml_str(&content).with_context(|| {
                let mut err = format!("Failed to parse config: {}", config_path.display());
                err.push_str("\n  Common issues:");
                err.push_str("\n    - Invalid TOML syntax");
                err.push_str("\n    - Incorrect value types");
                err.push_str("\n  Tip: Run 'awscost init' to create a new config file");
                err
            })?;
            Ok(config)
        } else {
            // Use defaults but warn if user explicitly provided a path
            if path.is_some() {
                warn!(
                    "Config file not found: {}. Using default configuration",
                    config_path.display()
                );
            }
            Ok(Config::default())
        }
    }

    /// Parses TOML and folds legacy keys into their replacements.
    pub fn from_toml_str(content: &str) -> std::result::Result<Self, CostError> {
        let mut config: Config = toml::from_str(content)?;
        config.apply_legacy_flags();
        config.validate()?;
        Ok(config)
    }

    fn apply_legacy_flags(&mut self) {
        let mut used = Vec::new();
        if let Some(region) = self.region.take() {
            used.push("region");
            self.pricing.region = region;
        }
        if let Some(dev_hours) = self.dev_hours.take() {
            used.push("dev_hours");
            self.estimation.dev_mode = dev_hours;
        }
        if !used.is_empty() {
            warn_legacy_flags_once(&used);
        }
    }

    pub fn validate(&self) -> std::result::Result<(), CostError> {
        if self.pricing.region.trim().is_empty() {
            return Err(ConfigError::MissingField("pricing.region".to_string()).into());
        }
        validate_region(&self.pricing.region).map_err(|_| ConfigError::InvalidValue {
            field: "pricing.region".to_string(),
            reason: format!("not a region: {:?}", self.pricing.region),
        })?;
        for (field, value) in [
            ("estimation.hours_per_month", self.estimation.hours_per_month),
            (
                "estimation.dev_hours_per_month",
                self.estimation.dev_hours_per_month,
            ),
        ] {
            if !value.is_finite() || value <= 0.0 {
                return Err(ConfigError::InvalidValue {
                    field: field.to_string(),
                    reason: format!("must be positive, got {}", value),
                }
                .into());
            }
        }
        Ok(())
    }

    /// Monthly hours for time-based charges, honouring the dev profile.
    pub fn effective_hours(&self, dev_sensitive: bool) -> f64 {
        if self.estimation.dev_mode && dev_sensitive {
            self.estimation.dev_hours_per_month
        } else {
            self.estimation.hours_per_month
        }
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config: {}", path.display()))?;
        Ok(())
    }
}

pub fn init_config(output: &Path) -> Result<()> {
    let config = Config::default();
    config.save(output)?;
    println!("Created config file: {}", output.display());
    Ok(())
}
