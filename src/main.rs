use anyhow::{Context, Result};
use awscost::arn::Arn;
use awscost::classification;
use awscost::config::{self, Config};
use awscost::error::CostError;
use awscost::estimator::Formula;
use awscost::exit_codes::{codes, exit_code_for_anyhow};
use awscost::normalize::normalize_resource_type;
use awscost::pricing::{PricingLookup, StaticPriceTable};
use awscost::recommendations::Recommendation;
use awscost::resource::ResourceDescriptor;
use awscost::service::{ActualCostReport, CostService, ProjectedCost};
use awscost::utils::{format_duration, format_usd};
use chrono::{DateTime, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use comfy_table::{Cell, Color, Table};
use serde_json::json;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "awscost")]
#[command(
    about = "Estimate AWS resource costs and emit FOCUS-aligned billing records",
    long_about = "awscost prices AWS resources from a generic descriptor.\n\nAccepts:\n  - Canonical keys (ec2, ebs, rds, ...)\n  - IaC type tokens (aws:ec2/instance:Instance)\n  - ARNs\n\nFeatures:\n  - Projected monthly and prorated actual cost\n  - Generation upgrade and Graviton recommendations\n  - FOCUS-aligned billing records (JSON output)"
)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Text)]
    output: OutputFormat,

    /// Pricing region (overrides config)
    #[arg(long, global = true, env = "AWSCOST_REGION")]
    region: Option<String>,

    /// Log format
    #[arg(long, global = true, value_enum, default_value_t = LogFormat::Text)]
    log_format: LogFormat,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Text,
    Json,
}

#[derive(Clone, Copy, PartialEq, Eq, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
enum Commands {
    /// Projected monthly cost of one resource
    Projected {
        #[command(flatten)]
        resource: ResourceArgs,
        /// Bill for the month containing this instant (RFC 3339, default now)
        #[arg(long)]
        at: Option<DateTime<Utc>>,
    },
    /// Actual cost of one resource over a time window
    Actual {
        #[command(flatten)]
        resource: ResourceArgs,
        /// Window start (RFC 3339)
        #[arg(long)]
        from: DateTime<Utc>,
        /// Window end (RFC 3339, default now)
        #[arg(long)]
        to: Option<DateTime<Utc>>,
    },
    /// Right-sizing recommendations
    Recommend {
        #[command(flatten)]
        resource: OptionalResourceArgs,
        /// JSON array of resource descriptors ("-" for stdin)
        #[arg(short, long, conflicts_with = "resource_type")]
        file: Option<PathBuf>,
    },
    /// Projected cost for a JSON array of resource descriptors
    Batch {
        /// JSON array of resource descriptors ("-" for stdin)
        file: PathBuf,
    },
    /// Parse an ARN and show its components
    ParseArn {
        arn: String,
    },
    /// Show the canonical key, classification and pricing formula for a type
    Classify {
        /// Canonical key, IaC type token or ARN
        resource_type: String,
    },
    /// Initialize configuration
    Init {
        /// Path for the new config file
        #[arg(default_value = ".awscost.toml")]
        path: PathBuf,
    },
}

#[derive(Args)]
struct ResourceArgs {
    /// Canonical key, IaC type token or ARN
    #[arg(short = 't', long = "type")]
    resource_type: String,
    #[command(flatten)]
    rest: DescriptorArgs,
}

#[derive(Args)]
struct OptionalResourceArgs {
    /// Canonical key, IaC type token or ARN
    #[arg(short = 't', long = "type", required_unless_present = "file")]
    resource_type: Option<String>,
    #[command(flatten)]
    rest: DescriptorArgs,
}

#[derive(Args)]
struct DescriptorArgs {
    /// Instance type, volume type, storage class, ...
    #[arg(short, long, default_value = "")]
    sku: String,
    /// Resource region (defaults to the pricing region, or the ARN's region)
    #[arg(long)]
    resource_region: Option<String>,
    /// Resource ARN
    #[arg(long)]
    arn: Option<String>,
    /// Resource id
    #[arg(long)]
    id: Option<String>,
    /// Resource tag (repeatable)
    #[arg(long = "tag", value_name = "KEY=VALUE", value_parser = parse_tag)]
    tags: Vec<(String, String)>,
}

impl DescriptorArgs {
    fn into_descriptor(self, resource_type: String, pricing_region: &str) -> ResourceDescriptor {
        // A regional ARN supplies its own region
        let arn_has_region = self
            .arn
            .as_deref()
            .and_then(|arn| Arn::parse(arn).ok())
            .is_some_and(|arn| !arn.region.is_empty());
        let region = match self.resource_region {
            Some(region) => region,
            None if arn_has_region => String::new(),
            None => pricing_region.to_string(),
        };
        ResourceDescriptor {
            tags: self.tags.into_iter().collect(),
            id: self.id,
            arn: self.arn,
            ..ResourceDescriptor::new(resource_type, self.sku, region)
        }
    }
}

fn parse_tag(raw: &str) -> std::result::Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got {:?}", raw))?;
    if key.trim().is_empty() {
        return Err(format!("tag key is empty in {:?}", raw));
    }
    Ok((key.trim().to_string(), value.to_string()))
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Warnings and errors only unless --verbose; RUST_LOG wins when set
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    match cli.log_format {
        LogFormat::Json => subscriber.json().init(),
        LogFormat::Text => subscriber.init(),
    }

    let code = match run(cli).await {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            exit_code_for_anyhow(&e)
        }
    };
    std::process::exit(code);
}

async fn run(cli: Cli) -> Result<i32> {
    let output = cli.output;

    // Commands that need no pricing
    match &cli.command {
        Commands::Init { path } => {
            config::init_config(path)?;
            return Ok(codes::SUCCESS);
        }
        Commands::ParseArn { arn } => {
            let parsed = Arn::parse(arn).map_err(CostError::from)?;
            print_arn(&parsed, output)?;
            return Ok(codes::SUCCESS);
        }
        Commands::Classify { resource_type } => {
            print_classification(resource_type, output)?;
            return Ok(codes::SUCCESS);
        }
        _ => {}
    }

    let mut config = Config::load(cli.config.as_deref())?;
    if let Some(region) = cli.region {
        debug!("pricing region overridden: {}", region);
        config.pricing.region = region;
        config.validate()?;
    }
    let pricing = load_pricing(&config)?;
    let pricing_region = config.pricing.region.clone();
    let service = CostService::new(config, pricing);

    match cli.command {
        Commands::Projected { resource, at } => {
            let descriptor = resource
                .rest
                .into_descriptor(resource.resource_type, &pricing_region);
            let projected = service
                .projected_cost_at(&descriptor, at.unwrap_or_else(Utc::now))
                .context("Failed to estimate projected cost")?;
            print_projected(&projected, output)?;
        }
        Commands::Actual { resource, from, to } => {
            let descriptor = resource
                .rest
                .into_descriptor(resource.resource_type, &pricing_region);
            let report = service
                .actual_cost(&descriptor, from, to.unwrap_or_else(Utc::now))
                .context("Failed to compute actual cost")?;
            print_actual(&report, output)?;
        }
        Commands::Recommend { resource, file } => {
            let descriptors = match (file, resource.resource_type) {
                (Some(path), _) => read_descriptors(&path)?,
                (None, Some(resource_type)) => {
                    vec![resource.rest.into_descriptor(resource_type, &pricing_region)]
                }
                (None, None) => anyhow::bail!("Either --type or --file is required"),
            };
            let recommendations = service.recommendations(&descriptors);
            print_recommendations(&recommendations, output)?;
        }
        Commands::Batch { file } => {
            let descriptors = read_descriptors(&file)?;
            let labels: Vec<String> = descriptors.iter().map(|d| d.label().to_string()).collect();
            info!("estimating {} resources", descriptors.len());
            let results = Arc::new(service).projected_costs(descriptors).await;
            let failed = results.iter().filter(|r| r.is_err()).count();
            print_batch(&labels, &results, output)?;
            if failed > 0 {
                return Ok(codes::USER_ERROR);
            }
        }
        Commands::Init { .. } | Commands::ParseArn { .. } | Commands::Classify { .. } => {}
    }

    Ok(codes::SUCCESS)
}

fn load_pricing(config: &Config) -> Result<Arc<dyn PricingLookup>> {
    let table = match &config.pricing.price_file {
        Some(path) => StaticPriceTable::from_file(path)
            .with_context(|| format!("Failed to load price file: {}", path.display()))?,
        None => {
            debug!("no price file configured, using built-in us-east-1 prices");
            StaticPriceTable::builtin()
        }
    };
    Ok(Arc::new(table))
}

fn read_descriptors(path: &Path) -> Result<Vec<ResourceDescriptor>> {
    let content = if path == Path::new("-") {
        std::io::read_to_string(std::io::stdin()).context("Failed to read stdin")?
    } else {
        std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read descriptors: {}", path.display()))?
    };
    let descriptors: Vec<ResourceDescriptor> = serde_json::from_str(&content)
        .map_err(CostError::from)
        .with_context(|| format!("Failed to parse descriptors: {}", path.display()))?;
    Ok(descriptors)
}

fn error_json(error: &CostError) -> serde_json::Value {
    json!({
        "code": error.code().to_string(),
        "message": error.to_string(),
        "details": error.details(),
    })
}

fn print_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_projected(projected: &ProjectedCost, output: OutputFormat) -> Result<()> {
    if output == OutputFormat::Json {
        return print_json(projected);
    }

    let r = &projected.resource;
    let e = &projected.estimate;
    let mut table = Table::new();
    table.set_header(vec!["Service", "SKU", "Region", "Unit price", "Monthly", "Status"]);
    table.add_row(vec![
        Cell::new(&r.service),
        Cell::new(&r.sku),
        Cell::new(&r.region),
        Cell::new(unit_price_label(e.unit_price, &e.pricing_unit)),
        Cell::new(format_usd(e.monthly_cost)),
        status_cell(e.status),
    ]);
    println!("{}", table);
    println!("{}", e.billing_detail);
    if let Some(parent) = &r.parent {
        println!("Parent: {} {} ({})", parent.resource_type, parent.id, parent.relationship);
    }
    Ok(())
}

fn print_actual(report: &ActualCostReport, output: OutputFormat) -> Result<()> {
    if output == OutputFormat::Json {
        return print_json(report);
    }

    let r = &report.resource;
    let a = &report.actual;
    let mut table = Table::new();
    table.set_header(vec!["Service", "SKU", "From", "To", "Elapsed", "Monthly", "Cost"]);
    table.add_row(vec![
        Cell::new(&r.service),
        Cell::new(&r.sku),
        Cell::new(a.start.format("%Y-%m-%d %H:%M UTC")),
        Cell::new(a.end.format("%Y-%m-%d %H:%M UTC")),
        Cell::new(format_duration((a.elapsed_hours * 3600.0).round() as u64)),
        Cell::new(format_usd(a.estimate.monthly_cost)),
        Cell::new(format_usd(a.cost)),
    ]);
    println!("{}", table);
    println!("{}", a.estimate.billing_detail);
    Ok(())
}

fn print_recommendations(recommendations: &[Recommendation], output: OutputFormat) -> Result<()> {
    if output == OutputFormat::Json {
        return print_json(recommendations);
    }
    if recommendations.is_empty() {
        println!("No recommendations");
        return Ok(());
    }

    let mut table = Table::new();
    table.set_header(vec!["Resource", "Kind", "Current", "Recommended", "Savings/mo"]);
    for rec in recommendations {
        let savings = rec
            .estimated_monthly_savings
            .map(format_usd)
            .unwrap_or_else(|| "-".to_string());
        table.add_row(vec![
            Cell::new(&rec.resource),
            Cell::new(rec.kind),
            Cell::new(&rec.current_sku),
            Cell::new(&rec.recommended_sku).fg(Color::Green),
            Cell::new(savings),
        ]);
    }
    println!("{}", table);
    Ok(())
}

fn print_batch(
    labels: &[String],
    results: &[awscost::Result<ProjectedCost>],
    output: OutputFormat,
) -> Result<()> {
    if output == OutputFormat::Json {
        let entries: Vec<serde_json::Value> = labels
            .iter()
            .zip(results)
            .map(|(label, result)| match result {
                Ok(projected) => json!({ "resource": label, "result": projected }),
                Err(e) => json!({ "resource": label, "error": error_json(e) }),
            })
            .collect();
        return print_json(&entries);
    }

    let mut table = Table::new();
    table.set_header(vec!["Resource", "Service", "SKU", "Monthly", "Status"]);
    let mut total = 0.0;
    for (label, result) in labels.iter().zip(results) {
        match result {
            Ok(p) => {
                total += p.estimate.monthly_cost;
                table.add_row(vec![
                    Cell::new(label),
                    Cell::new(&p.resource.service),
                    Cell::new(&p.resource.sku),
                    Cell::new(format_usd(p.estimate.monthly_cost)),
                    status_cell(p.estimate.status),
                ]);
            }
            Err(e) => {
                table.add_row(vec![
                    Cell::new(label),
                    Cell::new("-"),
                    Cell::new("-"),
                    Cell::new("-"),
                    Cell::new(format!("{}: {}", e.code(), e)).fg(Color::Red),
                ]);
            }
        }
    }
    println!("{}", table);
    println!("Total: {}/month", format_usd(total));
    Ok(())
}

fn print_arn(arn: &Arn, output: OutputFormat) -> Result<()> {
    if output == OutputFormat::Json {
        return print_json(&json!({
            "arn": arn,
            "canonical_resource_type": arn.canonical_resource_type(),
            "global": arn.is_global(),
        }));
    }

    let mut table = Table::new();
    table.set_header(vec!["Field", "Value"]);
    for (field, value) in [
        ("partition", arn.partition.as_str()),
        ("service", arn.service.as_str()),
        ("region", arn.region.as_str()),
        ("account", arn.account_id.as_str()),
        ("resource type", arn.resource_type.as_str()),
        ("resource id", arn.resource_id.as_str()),
    ] {
        table.add_row(vec![field, if value.is_empty() { "-" } else { value }]);
    }
    table.add_row(vec!["canonical".to_string(), arn.canonical_resource_type()]);
    table.add_row(vec!["global".to_string(), arn.is_global().to_string()]);
    println!("{}", table);
    Ok(())
}

fn print_classification(resource_type: &str, output: OutputFormat) -> Result<()> {
    let key = normalize_resource_type(resource_type);
    let (class, found) = classification::classify(&key);
    let formula = Formula::for_service(&key);

    if output == OutputFormat::Json {
        return print_json(&json!({
            "input": resource_type,
            "canonical": key,
            "known": found,
            "formula": format!("{:?}", formula),
            "classification": class,
        }));
    }

    println!("{} -> {}", resource_type, key);
    if !found {
        println!("Unrecognized type; estimates will be reported as unsupported ($0.00)");
        return Ok(());
    }
    let mut table = Table::new();
    table.set_header(vec!["Growth", "Dev-sensitive", "Parent", "Parent tags", "Formula"]);
    let parent = match (class.parent_type, class.relationship) {
        (Some(parent), Some(rel)) => format!("{} {}", rel, parent),
        _ => "-".to_string(),
    };
    table.add_row(vec![
        format!("{:?}", class.growth),
        class.dev_sensitive.to_string(),
        parent,
        class.parent_tag_keys.join(", "),
        format!("{:?}", formula),
    ]);
    println!("{}", table);
    Ok(())
}

fn unit_price_label(unit_price: f64, unit: &str) -> String {
    if unit.is_empty() {
        "-".to_string()
    } else {
        format!("{}/{}", format_usd(unit_price), unit)
    }
}

fn status_cell(status: awscost::EstimateStatus) -> Cell {
    use awscost::EstimateStatus::*;
    match status {
        Priced => Cell::new("priced").fg(Color::Green),
        Free => Cell::new("free"),
        NotModeled => Cell::new("not modeled").fg(Color::Yellow),
        Unsupported => Cell::new("unsupported").fg(Color::Yellow),
    }
}
