//! Per-timestamp row groups restricted to a strategy's declared legs.

use chrono::{DateTime, Utc};
use std::collections::{BTreeMap, HashSet};
use std::fmt;

use super::observation::{ObservationSchema, RateObservation};
use crate::address::normalize;

/// A (contract, protocol) pair with the contract in normalized form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LegKey {
    pub contract: String,
    pub protocol: String,
}

impl LegKey {
    pub fn new(contract: &str, protocol: &str) -> Self {
        Self {
            contract: normalize(contract),
            protocol: protocol.to_string(),
        }
    }

    pub fn of(observation: &RateObservation) -> Self {
        Self::new(&observation.token_contract, &observation.protocol)
    }
}

impl fmt::Display for LegKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.contract, self.protocol)
    }
}

/// All observations sharing one timestamp.
#[derive(Debug, Clone, PartialEq)]
pub struct RowGroup {
    pub timestamp: DateTime<Utc>,
    pub schema: ObservationSchema,
    pub rows: Vec<RateObservation>,
}

impl RowGroup {
    pub fn new(
        timestamp: DateTime<Utc>,
        schema: ObservationSchema,
        rows: Vec<RateObservation>,
    ) -> Self {
        Self {
            timestamp,
            schema,
            rows,
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Group rows by exact timestamp, keeping only rows on one of `legs`.
///
/// Groups come back in ascending timestamp order. Rows within a group keep
/// their input order.
pub fn group_by_timestamp(
    rows: &[RateObservation],
    schema: &ObservationSchema,
    legs: &[LegKey],
) -> Vec<RowGroup> {
    let wanted: HashSet<&LegKey> = legs.iter().collect();
    let mut buckets: BTreeMap<DateTime<Utc>, Vec<RateObservation>> = BTreeMap::new();

    for row in rows {
        if wanted.contains(&LegKey::of(row)) {
            buckets.entry(row.timestamp).or_default().push(row.clone());
        }
    }

    buckets
        .into_iter()
        .map(|(timestamp, rows)| RowGroup::new(timestamp, schema.clone(), rows))
        .collect()
}
