//! History assembly — turn a rate table into one strategy's record series.
//!
//! Pipeline: validate the config, fetch rows for the declared legs, group by
//! exact timestamp, assemble each group. Groups that fail soft are recorded
//! as skipped; a schema contract violation aborts the whole run.

use chrono::{DateTime, Utc};
use rayon::prelude::*;
use ratelab_core::domain::group_by_timestamp;
use ratelab_core::{
    AssembleError, Assembly, ConfigError, MarketDataRecord, RowGroup, SkipReason, StrategyConfig,
    StrategyShape,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::source::{RateSource, SourceError, TimeRange};

#[derive(Debug, Error)]
pub enum HistoryError {
    #[error("invalid strategy config: {0}")]
    Config(#[from] ConfigError),

    #[error("fetch rates: {0}")]
    Source(#[from] SourceError),

    #[error(transparent)]
    Assemble(#[from] AssembleError),
}

/// How to run the assembly loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HistoryOptions {
    /// Assemble row groups on the rayon pool.
    pub parallel: bool,
}

/// A timestamp whose row group produced no record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedTimestamp {
    pub timestamp: DateTime<Utc>,
    #[serde(flatten)]
    pub reason: SkipReason,
}

/// One strategy's assembled series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketHistory {
    pub strategy_type: String,
    pub strategy_id: String,
    /// Ascending by timestamp.
    pub records: Vec<MarketDataRecord>,
    /// Ascending by timestamp.
    pub skipped: Vec<SkippedTimestamp>,
}

impl MarketHistory {
    /// Number of row groups seen.
    pub fn timestamps(&self) -> usize {
        self.records.len() + self.skipped.len()
    }

    pub fn coverage(&self) -> f64 {
        let total = self.timestamps();
        if total == 0 {
            return 0.0;
        }
        self.records.len() as f64 / total as f64
    }
}

/// Build the record series for one strategy.
pub fn build_history(
    source: &dyn RateSource,
    shape: StrategyShape,
    config: &StrategyConfig,
    range: &TimeRange,
    opts: &HistoryOptions,
) -> Result<MarketHistory, HistoryError> {
    shape.validate_config(config).map_err(|e| {
        warn!(strategy_type = %config.strategy_type, error = %e, "strategy config rejected");
        e
    })?;
    let legs = shape.required_legs(config)?;

    let table = source.fetch(&legs, range)?;
    let groups = group_by_timestamp(&table.rows, &table.schema, &legs);
    debug!(
        strategy_type = %config.strategy_type,
        rows = table.rows.len(),
        groups = groups.len(),
        "grouped rate rows"
    );

    let assemble = |group: &RowGroup| -> Result<(DateTime<Utc>, Assembly), AssembleError> {
        Ok((group.timestamp, shape.assemble(group, config)?))
    };
    let outcomes: Result<Vec<_>, AssembleError> = if opts.parallel {
        groups.par_iter().map(assemble).collect()
    } else {
        groups.iter().map(assemble).collect()
    };
    let outcomes = outcomes.map_err(|e| {
        warn!(strategy_type = %config.strategy_type, error = %e, "assembly aborted");
        e
    })?;

    let mut records = Vec::with_capacity(outcomes.len());
    let mut skipped = Vec::new();
    for (timestamp, outcome) in outcomes {
        match outcome {
            Assembly::Record(record) => records.push(record),
            Assembly::Skipped(reason) => {
                debug!(%timestamp, %reason, "skipped timestamp");
                skipped.push(SkippedTimestamp { timestamp, reason });
            }
        }
    }

    let history = MarketHistory {
        strategy_type: config.strategy_type.clone(),
        strategy_id: config.strategy_id(),
        records,
        skipped,
    };
    info!(
        strategy_type = %history.strategy_type,
        strategy_id = %history.strategy_id,
        records = history.records.len(),
        skipped = history.skipped.len(),
        "history assembled"
    );
    Ok(history)
}
