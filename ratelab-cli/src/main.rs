//! RateLab CLI — strategy listing, config validation, history and merge commands.
//!
//! Commands:
//! - `strategies` — list registered strategy types and their leg counts
//! - `validate` — check every strategy in an analysis TOML
//! - `history` — assemble per-strategy record series from a rates CSV
//! - `merge` — reconcile protocol snapshots into lend/borrow/collateral tables

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use ratelab_core::merge::TableKind;
use ratelab_core::{merge_protocols, standard_registry, ProtocolSnapshot, StrategyConfig};
use ratelab_runner::source::parse_timestamp;
use ratelab_runner::{
    build_history, save_history, save_merged, AnalysisConfig, CsvRateSource, HistoryOptions,
    TimeRange,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "ratelab",
    about = "RateLab CLI — leg resolution and cross-protocol rate reconciliation"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List registered strategy types.
    Strategies,
    /// Validate every strategy in an analysis config.
    Validate {
        /// Path to the analysis TOML.
        #[arg(long)]
        config: PathBuf,
    },
    /// Assemble market-data histories from a rates CSV.
    History {
        /// Path to the analysis TOML.
        #[arg(long)]
        config: PathBuf,

        /// Rates CSV (timestamp, token_contract, protocol, metric columns).
        #[arg(long)]
        rates: PathBuf,

        /// Only this strategy: index in the config or strategy id.
        #[arg(long)]
        strategy: Option<String>,

        /// Start (YYYY-MM-DD or RFC 3339), inclusive.
        #[arg(long)]
        start: Option<String>,

        /// End (YYYY-MM-DD or RFC 3339), inclusive; a date covers the whole day.
        #[arg(long)]
        end: Option<String>,

        /// Assemble row groups in parallel.
        #[arg(long, default_value_t = false)]
        parallel: bool,

        /// Output directory for JSONL files.
        #[arg(long, default_value = "histories")]
        out: PathBuf,
    },
    /// Merge protocol snapshots into cross-protocol tables.
    Merge {
        /// JSON array of protocol snapshots.
        #[arg(long)]
        input: PathBuf,

        /// Analysis TOML supplying the stablecoin allowlist.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Write lend.csv, borrow.csv, collateral.csv here.
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Strategies => run_strategies(),
        Commands::Validate { config } => run_validate(&config),
        Commands::History {
            config,
            rates,
            strategy,
            start,
            end,
            parallel,
            out,
        } => run_history(
            &config,
            &rates,
            strategy.as_deref(),
            start.as_deref(),
            end.as_deref(),
            parallel,
            &out,
        ),
        Commands::Merge { input, config, out } => {
            run_merge(&input, config.as_deref(), out.as_deref())
        }
    }
}

fn run_strategies() -> Result<()> {
    println!("{:<32} {:<24} {:>4}", "strategy_type", "shape", "legs");
    for (key, shape) in standard_registry().iter() {
        println!(
            "{:<32} {:<24} {:>4}",
            key,
            format!("{shape:?}"),
            shape.required_leg_count()
        );
    }
    Ok(())
}

fn run_validate(config_path: &Path) -> Result<()> {
    let analysis = AnalysisConfig::from_file(config_path)?;
    let mut failures = 0;

    for (i, (strategy, result)) in analysis
        .strategies
        .iter()
        .zip(analysis.validate(standard_registry()))
        .enumerate()
    {
        match result {
            Ok(()) => println!("[{i}] ok    {} ({})", strategy.strategy_type, strategy.strategy_id()),
            Err(e) => {
                failures += 1;
                println!("[{i}] error {}: {e}", strategy.strategy_type);
            }
        }
    }

    if failures > 0 {
        bail!("{failures} of {} strategies are invalid", analysis.strategies.len());
    }
    println!("All {} strategies valid.", analysis.strategies.len());
    Ok(())
}

fn run_history(
    config_path: &Path,
    rates_path: &Path,
    selector: Option<&str>,
    start: Option<&str>,
    end: Option<&str>,
    parallel: bool,
    out: &Path,
) -> Result<()> {
    let analysis = AnalysisConfig::from_file(config_path)?;
    let range = TimeRange {
        start: start.map(|s| parse_bound(s, false)).transpose()?,
        end: end.map(|s| parse_bound(s, true)).transpose()?,
    };
    if let (Some(s), Some(e)) = (range.start, range.end) {
        if s > e {
            bail!("--start {s} is after --end {e}");
        }
    }

    let strategies: Vec<&StrategyConfig> = match selector {
        Some(sel) => match analysis.find_strategy(sel) {
            Some(config) => vec![config],
            None => bail!("no strategy matches '{sel}'"),
        },
        None => analysis.strategies.iter().collect(),
    };
    if strategies.is_empty() {
        bail!("{} defines no strategies", config_path.display());
    }

    let source = CsvRateSource::from_path(rates_path)
        .with_context(|| format!("failed to load rates from {}", rates_path.display()))?;
    info!(rows = source.len(), "loaded rates");

    let opts = HistoryOptions { parallel };
    let mut failures = 0;
    for config in strategies {
        let shape = match standard_registry().get(&config.strategy_type) {
            Ok(shape) => shape,
            Err(e) => {
                warn!(error = %e, "skipping strategy");
                failures += 1;
                continue;
            }
        };
        match build_history(&source, shape, config, &range, &opts) {
            Ok(history) => {
                let path = save_history(&history, out)?;
                println!(
                    "{:<32} {}  assembled {:>6}  skipped {:>6}  coverage {:>5.1}%  → {}",
                    history.strategy_type,
                    history.strategy_id,
                    history.records.len(),
                    history.skipped.len(),
                    history.coverage() * 100.0,
                    path.display()
                );
            }
            Err(e) => {
                warn!(strategy_type = %config.strategy_type, error = %e, "history failed");
                failures += 1;
            }
        }
    }

    if failures > 0 {
        bail!("{failures} strategies failed");
    }
    Ok(())
}

fn run_merge(input: &Path, config_path: Option<&Path>, out: Option<&Path>) -> Result<()> {
    let json = std::fs::read_to_string(input)
        .with_context(|| format!("failed to read {}", input.display()))?;
    let snapshots: Vec<ProtocolSnapshot> =
        serde_json::from_str(&json).context("failed to parse protocol snapshots")?;

    let stablecoins = match config_path {
        Some(path) => AnalysisConfig::from_file(path)?.stablecoins,
        None => Vec::new(),
    };

    let tables = merge_protocols(&snapshots, &stablecoins);
    for kind in TableKind::ALL {
        let df = tables.table(kind).to_dataframe()?;
        println!("{}\n{df}\n", kind.metric_name());
    }

    if let Some(dir) = out {
        for path in save_merged(&tables, dir)? {
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}

/// Date-only bounds cover the whole day: an end date stops one nanosecond
/// before the next midnight, so sub-second stamps in the last second count.
fn parse_bound(s: &str, end_of_day: bool) -> Result<DateTime<Utc>> {
    if let Some(ts) = parse_timestamp(s) {
        return Ok(ts);
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("invalid date or timestamp '{s}'"))?;
    let day = if end_of_day { date.succ_opt() } else { Some(date) };
    match day.and_then(|d| d.and_hms_opt(0, 0, 0)) {
        Some(midnight) if end_of_day => Ok(midnight.and_utc() - Duration::nanoseconds(1)),
        Some(midnight) => Ok(midnight.and_utc()),
        None => bail!("invalid date '{s}'"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn date_bounds_cover_the_day() {
        let start = parse_bound("2025-01-02", false).unwrap();
        let end = parse_bound("2025-01-02", true).unwrap();
        assert_eq!(start.to_rfc3339(), "2025-01-02T00:00:00+00:00");
        assert!(end < parse_bound("2025-01-03", false).unwrap());
        assert!(parse_bound("not-a-date", false).is_err());
    }

    #[test]
    fn end_date_keeps_last_second_of_day() {
        let range = TimeRange {
            start: Some(parse_bound("2025-01-02", false).unwrap()),
            end: Some(parse_bound("2025-01-02", true).unwrap()),
        };
        let last_second = Utc.with_ymd_and_hms(2025, 1, 2, 23, 59, 59).unwrap();
        assert!(range.contains(last_second));
        assert!(range.contains(last_second + Duration::milliseconds(500)));
        assert!(!range.contains(Utc.with_ymd_and_hms(2025, 1, 3, 0, 0, 0).unwrap()));
    }

    #[test]
    fn timestamp_bounds_pass_through() {
        let ts = parse_bound("2025-01-02T06:00:00Z", true).unwrap();
        assert_eq!(ts.to_rfc3339(), "2025-01-02T06:00:00+00:00");
    }
}
