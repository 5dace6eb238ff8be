//! Rate sources — where persisted rate observations come from.
//!
//! The readers that scrape protocols live elsewhere; this module only reads
//! what they persisted. A source always reports the [`ObservationSchema`] of
//! its rows so leg assembly can tell a null value from a column that never
//! existed.

use std::collections::HashMap;
use std::io::Read;
use std::path::Path;

use chrono::{DateTime, NaiveDateTime, Utc};
use ratelab_core::{LegKey, Metric, ObservationSchema, RateObservation};
use thiserror::Error;

/// Errors from reading persisted rate rows.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("read rates from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("rates table is missing required column '{0}'")]
    MissingColumn(&'static str),

    #[error("line {line}: cannot parse {column} value '{value}'")]
    Parse {
        line: u64,
        column: String,
        value: String,
    },
}

/// Inclusive timestamp bounds; `None` leaves that side open.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TimeRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl TimeRange {
    pub fn all() -> Self {
        Self::default()
    }

    pub fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        self.start.map_or(true, |s| ts >= s) && self.end.map_or(true, |e| ts <= e)
    }
}

/// Rows plus the schema they were read with.
#[derive(Debug, Clone, PartialEq)]
pub struct RateTable {
    pub schema: ObservationSchema,
    pub rows: Vec<RateObservation>,
}

/// Anything that can answer "rows for these legs in this window".
pub trait RateSource: Send + Sync {
    fn fetch(&self, legs: &[LegKey], range: &TimeRange) -> Result<RateTable, SourceError>;
}

fn filter_rows(table: &RateTable, legs: &[LegKey], range: &TimeRange) -> RateTable {
    let rows = table
        .rows
        .iter()
        .filter(|row| range.contains(row.timestamp) && legs.contains(&LegKey::of(row)))
        .cloned()
        .collect();
    RateTable {
        schema: table.schema.clone(),
        rows,
    }
}

// ─── In-memory source ────────────────────────────────────────────────

/// Rows already materialized by a caller.
#[derive(Debug, Clone)]
pub struct InMemorySource {
    table: RateTable,
}

impl InMemorySource {
    pub fn new(rows: Vec<RateObservation>) -> Self {
        Self::with_schema(ObservationSchema::full(), rows)
    }

    pub fn with_schema(schema: ObservationSchema, rows: Vec<RateObservation>) -> Self {
        Self {
            table: RateTable { schema, rows },
        }
    }
}

impl RateSource for InMemorySource {
    fn fetch(&self, legs: &[LegKey], range: &TimeRange) -> Result<RateTable, SourceError> {
        Ok(filter_rows(&self.table, legs, range))
    }
}

// ─── CSV source ──────────────────────────────────────────────────────

const TIMESTAMP: &str = "timestamp";
const TOKEN_CONTRACT: &str = "token_contract";
const PROTOCOL: &str = "protocol";

/// Rate rows loaded eagerly from a CSV export.
///
/// Required columns: `timestamp`, `token_contract`, `protocol`. Metric
/// columns present in the header define the schema; empty cells are null.
/// Timestamps are RFC 3339 or `YYYY-MM-DD HH:MM:SS` (UTC).
#[derive(Debug, Clone)]
pub struct CsvRateSource {
    table: RateTable,
}

impl CsvRateSource {
    pub fn from_path(path: &Path) -> Result<Self, SourceError> {
        let file = std::fs::File::open(path).map_err(|source| SourceError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<Self, SourceError> {
        let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
        let headers = rdr.headers()?.clone();

        let position: HashMap<&str, usize> =
            headers.iter().enumerate().map(|(i, h)| (h, i)).collect();
        let column = |name: &'static str| {
            position
                .get(name)
                .copied()
                .ok_or(SourceError::MissingColumn(name))
        };
        let ts_col = column(TIMESTAMP)?;
        let contract_col = column(TOKEN_CONTRACT)?;
        let protocol_col = column(PROTOCOL)?;

        let schema = ObservationSchema::from_header(headers.iter());
        let metric_cols: Vec<(Metric, usize)> = schema
            .metrics()
            .filter_map(|m| position.get(m.column()).map(|&i| (m, i)))
            .collect();

        let mut rows = Vec::new();
        for result in rdr.records() {
            let record = result?;
            let line = record.position().map_or(0, |p| p.line());
            let field = |i: usize| record.get(i).unwrap_or("");

            let timestamp = parse_timestamp(field(ts_col)).ok_or_else(|| SourceError::Parse {
                line,
                column: TIMESTAMP.to_string(),
                value: field(ts_col).to_string(),
            })?;
            let mut obs =
                RateObservation::empty(timestamp, field(contract_col), field(protocol_col));

            for &(metric, i) in &metric_cols {
                let raw = field(i);
                if raw.is_empty() {
                    continue;
                }
                let value: f64 = raw.parse().map_err(|_| SourceError::Parse {
                    line,
                    column: metric.column().to_string(),
                    value: raw.to_string(),
                })?;
                obs.set_metric(metric, Some(value));
            }
            rows.push(obs);
        }

        Ok(Self {
            table: RateTable { schema, rows },
        })
    }

    pub fn schema(&self) -> &ObservationSchema {
        &self.table.schema
    }

    pub fn len(&self) -> usize {
        self.table.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.table.rows.is_empty()
    }
}

impl RateSource for CsvRateSource {
    fn fetch(&self, legs: &[LegKey], range: &TimeRange) -> Result<RateTable, SourceError> {
        Ok(filter_rows(&self.table, legs, range))
    }
}

/// Parse an RFC 3339 or `%Y-%m-%d %H:%M:%S` timestamp as UTC.
pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S")
        .ok()
        .map(|naive| naive.and_utc())
}
