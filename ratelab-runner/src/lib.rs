//! RateLab Runner — turn persisted rate rows into strategy histories.
//!
//! This crate builds on `ratelab-core` to provide:
//! - TOML analysis config (stablecoin allowlist + strategies)
//! - Rate sources: in-memory and CSV
//! - History assembly, sequential or parallel
//! - APR calculator seam and yield summaries
//! - JSONL / CSV export

pub mod config;
pub mod export;
pub mod history;
pub mod source;
pub mod yields;

pub use config::{AnalysisConfig, LoadError, StrategyProblem};
pub use export::{
    export_merged_csv, export_records_jsonl, export_yield_csv, import_records_jsonl,
    save_history, save_merged,
};
pub use history::{build_history, HistoryError, HistoryOptions, MarketHistory, SkippedTimestamp};
pub use source::{CsvRateSource, InMemorySource, RateSource, RateTable, SourceError, TimeRange};
pub use yields::{yield_series, AprCalculator, FieldApr, YieldPoint, YieldSummary};
