// src/main.rs
use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::{debug, info};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use expiry_core::{
    CanonicalDate, Clock, DashboardQuery, DashboardView, RecordSetAnalyzer, SystemClock,
    TierFilter,
};

mod config;
mod error;
mod records;

use config::{load_policies, MonitorConfig};
use error::AppError;
use records::{date_field, has_field, load_records, Record};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Table,
    Json,
}

/// Prints an expiry dashboard (tier counts and a priority-sorted table) for
/// one date field of a record snapshot.
#[derive(Parser, Debug)]
#[command(name = "expiry-monitor", version, about)]
struct Cli {
    /// Record snapshot: a .json array of objects or a .csv file with a header row
    #[arg(long)]
    records: PathBuf,

    /// Date field to monitor [default: EXPIRY_FIELD or kontrak_akhir]
    #[arg(long)]
    field: Option<String>,

    /// JSON file with extra threshold policies [default: EXPIRY_POLICY_FILE]
    #[arg(long)]
    policy_file: Option<PathBuf>,

    /// Evaluate as of this date instead of today
    #[arg(long)]
    as_of: Option<String>,

    /// Tier to show: "all" or a tier name such as Expired, Critical, Unknown
    #[arg(long, default_value = "all")]
    tier: String,

    /// Only show records with a field containing this text (case-insensitive)
    #[arg(long, default_value = "")]
    search: String,

    #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
    format: OutputFormat,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = MonitorConfig::from_env().map_err(AppError::from)?;

    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::new(&config.log))
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;
    debug!("Configuration: {:?}", config);

    run(cli, config)
}

/// Field, policy, evaluation date and tier filter for one run. Flags win
/// over `EXPIRY_*` settings.
#[derive(Debug)]
struct Selection {
    field: String,
    analyzer: RecordSetAnalyzer,
    as_of: CanonicalDate,
    tier: TierFilter,
}

fn select(cli: &Cli, config: &MonitorConfig, clock: &dyn Clock) -> Result<Selection, AppError> {
    let field = cli.field.clone().unwrap_or_else(|| config.field.clone());
    let policy_file = cli.policy_file.as_deref().or(config.policy_file.as_deref());

    let mut policies = load_policies(policy_file)?;
    let policy = policies
        .remove(&field)
        .ok_or_else(|| AppError::NoPolicyForField(field.clone()))?;
    let analyzer = RecordSetAnalyzer::new(policy);

    let as_of = match cli.as_of.as_deref() {
        Some(text) => text
            .parse::<CanonicalDate>()
            .map_err(AppError::InvalidAsOf)?,
        None => clock.today(),
    };
    let tier = TierFilter::parse(&cli.tier, analyzer.policy())
        .ok_or_else(|| AppError::InvalidTier(cli.tier.clone()))?;

    Ok(Selection {
        field,
        analyzer,
        as_of,
        tier,
    })
}

/// An empty snapshot passes; otherwise some record must carry `field`.
fn ensure_field(records: &[Record], field: &str) -> Result<(), AppError> {
    if !records.is_empty() && !has_field(records, field) {
        return Err(AppError::UnknownField(field.to_string()));
    }
    Ok(())
}

fn run(cli: Cli, config: MonitorConfig) -> Result<()> {
    let Selection {
        field,
        analyzer,
        as_of,
        tier,
    } = select(&cli, &config, &SystemClock).context("Invalid monitor settings")?;

    let records = load_records(&cli.records)
        .with_context(|| format!("Failed to load records from {}", cli.records.display()))?;
    ensure_field(&records, &field)?;

    let query = DashboardQuery {
        term: cli.search,
        tier,
    };
    let view = analyzer.dashboard(&records, |record| date_field(record, &field), as_of, &query);
    info!(
        "Field '{}' as of {}: {} of {} records shown",
        field,
        as_of,
        view.rows.len(),
        records.len()
    );

    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&view)?),
        OutputFormat::Table => print_table(&field, &view),
    }
    Ok(())
}

fn print_table(field: &str, view: &DashboardView<'_, Record>) {
    println!("{} as of {}", field, view.as_of);
    let boxes: Vec<String> = view
        .counts
        .iter()
        .map(|(tier, count)| format!("{}: {}", tier, count))
        .collect();
    println!("{}", boxes.join(" | "));
    println!();
    println!(
        "{:<10} {:>6} {:<10} {:<20} RECORD",
        "TIER", "DAYS", "DATE", "STATUS"
    );
    for row in &view.rows {
        let days = row
            .days_remaining
            .map_or_else(|| "-".to_string(), |days| days.to_string());
        let date = row
            .date
            .map_or_else(|| "-".to_string(), |date| date.to_string());
        println!(
            "{:<10} {:>6} {:<10} {:<20} {}",
            row.tier.name(),
            days,
            date,
            row.status_text(),
            serde_json::Value::Object(row.record.clone())
        );
    }
}
