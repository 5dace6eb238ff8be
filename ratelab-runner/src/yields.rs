//! Yield series — apply an APR formula over an assembled history.
//!
//! APR formulas themselves belong to the presentation layer; this module
//! only defines the seam and the summary statistics charts consume.

use chrono::{DateTime, Utc};
use ratelab_core::MarketDataRecord;
use serde::{Deserialize, Serialize};

use crate::history::MarketHistory;

/// Turns one market-data record into an APR. `None` means "no value here".
pub trait AprCalculator: Send + Sync {
    fn calculate(&self, record: &MarketDataRecord) -> Option<f64>;
}

impl<F> AprCalculator for F
where
    F: Fn(&MarketDataRecord) -> Option<f64> + Send + Sync,
{
    fn calculate(&self, record: &MarketDataRecord) -> Option<f64> {
        self(record)
    }
}

/// Reads one numeric field, e.g. `lend_total_apr_1A`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldApr(pub String);

impl AprCalculator for FieldApr {
    fn calculate(&self, record: &MarketDataRecord) -> Option<f64> {
        record.number(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YieldPoint {
    pub timestamp: DateTime<Utc>,
    pub apr: f64,
}

/// One point per record the calculator produced a finite value for.
pub fn yield_series(history: &MarketHistory, calculator: &dyn AprCalculator) -> Vec<YieldPoint> {
    history
        .records
        .iter()
        .filter_map(|record| {
            let apr = calculator.calculate(record)?;
            apr.is_finite().then_some(YieldPoint {
                timestamp: record.timestamp,
                apr,
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YieldSummary {
    pub count: usize,
    pub mean: f64,
    pub min: f64,
    pub max: f64,
    pub last: f64,
}

impl YieldSummary {
    /// `None` for an empty series.
    pub fn from_series(points: &[YieldPoint]) -> Option<Self> {
        let last = points.last()?.apr;
        let (sum, min, max) = points.iter().fold(
            (0.0, f64::INFINITY, f64::NEG_INFINITY),
            |(sum, min, max), p| (sum + p.apr, min.min(p.apr), max.max(p.apr)),
        );
        Some(Self {
            count: points.len(),
            mean: sum / points.len() as f64,
            min,
            max,
            last,
        })
    }
}
