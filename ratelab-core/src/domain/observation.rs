//! Rate observations and the metric schema they are read against.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// A per-leg numeric column carried by rate observations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Metric {
    LendTotalApr,
    BorrowTotalApr,
    PriceUsd,
    CollateralRatio,
    LiquidationThreshold,
    BorrowFee,
    LendAvg8hrApr,
    LendAvg24hrApr,
}

impl Metric {
    pub const ALL: [Metric; 8] = [
        Metric::LendTotalApr,
        Metric::BorrowTotalApr,
        Metric::PriceUsd,
        Metric::CollateralRatio,
        Metric::LiquidationThreshold,
        Metric::BorrowFee,
        Metric::LendAvg8hrApr,
        Metric::LendAvg24hrApr,
    ];

    /// Column name as persisted by the readers.
    pub fn column(self) -> &'static str {
        match self {
            Metric::LendTotalApr => "lend_total_apr",
            Metric::BorrowTotalApr => "borrow_total_apr",
            Metric::PriceUsd => "price_usd",
            Metric::CollateralRatio => "collateral_ratio",
            Metric::LiquidationThreshold => "liquidation_threshold",
            Metric::BorrowFee => "borrow_fee",
            Metric::LendAvg8hrApr => "lend_avg8hr_apr",
            Metric::LendAvg24hrApr => "lend_avg24hr_apr",
        }
    }

    /// Key prefix used in market-data records (`price_usd` is emitted as `price`).
    pub fn record_prefix(self) -> &'static str {
        match self {
            Metric::PriceUsd => "price",
            other => other.column(),
        }
    }

    pub fn from_column(name: &str) -> Option<Metric> {
        Metric::ALL.into_iter().find(|m| m.column() == name)
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.column())
    }
}

/// The set of metric columns a row table structurally carries.
///
/// A null value in a carried column is a data gap. A column the schema does
/// not carry at all can never be filled, so asking for it is a contract bug.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ObservationSchema {
    columns: BTreeSet<Metric>,
}

impl ObservationSchema {
    /// Schema carrying every known metric.
    pub fn full() -> Self {
        Self {
            columns: Metric::ALL.into_iter().collect(),
        }
    }

    pub fn new(columns: impl IntoIterator<Item = Metric>) -> Self {
        Self {
            columns: columns.into_iter().collect(),
        }
    }

    /// Build from a table header. Non-metric columns are ignored.
    pub fn from_header<'a>(header: impl IntoIterator<Item = &'a str>) -> Self {
        Self::new(header.into_iter().filter_map(Metric::from_column))
    }

    pub fn carries(&self, metric: Metric) -> bool {
        self.columns.contains(&metric)
    }

    pub fn without(mut self, metric: Metric) -> Self {
        self.columns.remove(&metric);
        self
    }

    pub fn metrics(&self) -> impl Iterator<Item = Metric> + '_ {
        self.columns.iter().copied()
    }
}

impl Default for ObservationSchema {
    fn default() -> Self {
        Self::full()
    }
}

/// One persisted rate row: a (timestamp, token contract, protocol) sample.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateObservation {
    pub timestamp: DateTime<Utc>,
    pub token_contract: String,
    pub protocol: String,
    #[serde(default)]
    pub lend_total_apr: Option<f64>,
    #[serde(default)]
    pub borrow_total_apr: Option<f64>,
    #[serde(default)]
    pub price_usd: Option<f64>,
    #[serde(default)]
    pub collateral_ratio: Option<f64>,
    #[serde(default)]
    pub liquidation_threshold: Option<f64>,
    #[serde(default)]
    pub borrow_fee: Option<f64>,
    #[serde(default)]
    pub lend_avg8hr_apr: Option<f64>,
    #[serde(default)]
    pub lend_avg24hr_apr: Option<f64>,
}

impl RateObservation {
    /// Observation with every metric null.
    pub fn empty(timestamp: DateTime<Utc>, token_contract: &str, protocol: &str) -> Self {
        Self {
            timestamp,
            token_contract: token_contract.to_string(),
            protocol: protocol.to_string(),
            lend_total_apr: None,
            borrow_total_apr: None,
            price_usd: None,
            collateral_ratio: None,
            liquidation_threshold: None,
            borrow_fee: None,
            lend_avg8hr_apr: None,
            lend_avg24hr_apr: None,
        }
    }

    pub fn metric(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::LendTotalApr => self.lend_total_apr,
            Metric::BorrowTotalApr => self.borrow_total_apr,
            Metric::PriceUsd => self.price_usd,
            Metric::CollateralRatio => self.collateral_ratio,
            Metric::LiquidationThreshold => self.liquidation_threshold,
            Metric::BorrowFee => self.borrow_fee,
            Metric::LendAvg8hrApr => self.lend_avg8hr_apr,
            Metric::LendAvg24hrApr => self.lend_avg24hr_apr,
        }
    }

    pub fn set_metric(&mut self, metric: Metric, value: Option<f64>) {
        let slot = match metric {
            Metric::LendTotalApr => &mut self.lend_total_apr,
            Metric::BorrowTotalApr => &mut self.borrow_total_apr,
            Metric::PriceUsd => &mut self.price_usd,
            Metric::CollateralRatio => &mut self.collateral_ratio,
            Metric::LiquidationThreshold => &mut self.liquidation_threshold,
            Metric::BorrowFee => &mut self.borrow_fee,
            Metric::LendAvg8hrApr => &mut self.lend_avg8hr_apr,
            Metric::LendAvg24hrApr => &mut self.lend_avg24hr_apr,
        };
        *slot = value;
    }

    pub fn with(mut self, metric: Metric, value: f64) -> Self {
        self.set_metric(metric, Some(value));
        self
    }
}
