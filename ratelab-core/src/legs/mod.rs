//! Leg handlers — map a strategy shape onto per-timestamp row groups.
//!
//! Each [`StrategyShape`] declares a fixed, ordered list of [`LegSlot`]s.
//! `assemble` matches the observations of one [`RowGroup`] onto those slots,
//! checks the metrics each slot's role needs, and emits a
//! [`MarketDataRecord`] with the shape's fixed key schema.
//!
//! Failure policy:
//! - data gaps (wrong row count, unmatched or duplicated leg, null metric)
//!   produce [`Assembly::Skipped`] so the surrounding time series survives;
//! - a role asking for a column the row schema never carries, or a config
//!   missing a leg identity, is an [`AssembleError`].

mod cross_loop;
mod perp_borrow;
mod recursive_loop;
mod single_lend;
pub mod slot;
mod spot_perp;

use std::collections::{BTreeSet, HashMap};
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{
    LegKey, MarketDataRecord, Metric, ProtocolSlot, RateObservation, RowGroup, StrategyConfig,
    TokenSlot,
};

pub use slot::{LegRole, LegSide, LegSlot};

// ─── Errors and outcomes ─────────────────────────────────────────────

/// A strategy config that cannot drive its shape.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("strategy '{strategy_type}' is missing required field '{field}'")]
    MissingField {
        strategy_type: String,
        field: String,
    },

    #[error(
        "strategy '{strategy_type}' legs {first} and {second} both resolve to {key}; \
         slots must name distinct (contract, protocol) pairs"
    )]
    DuplicateLeg {
        strategy_type: String,
        first: &'static str,
        second: &'static str,
        key: String,
    },

    #[error(
        "strategy '{strategy_type}' has liquidation_distance {value}; expected a fraction in (0, 1)"
    )]
    InvalidLiquidationDistance { strategy_type: String, value: f64 },
}

/// Loud assembly failures. Data gaps are never reported here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum AssembleError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(
        "schema contract violation: {strategy_type} slot {slot} requires '{metric}' \
         but the row schema does not carry that column"
    )]
    SchemaViolation {
        strategy_type: &'static str,
        slot: &'static str,
        metric: Metric,
    },
}

/// Why a row group produced no record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum SkipReason {
    WrongRowCount { expected: usize, actual: usize },
    UnexpectedObservation { contract: String, protocol: String },
    DuplicateLeg { slot: String },
    UnmatchedLeg { slot: String },
    MissingMetric { slot: String, metric: Metric },
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SkipReason::WrongRowCount { expected, actual } => {
                write!(f, "expected {expected} rows, got {actual}")
            }
            SkipReason::UnexpectedObservation { contract, protocol } => {
                write!(f, "row {contract}@{protocol} matches no leg")
            }
            SkipReason::DuplicateLeg { slot } => write!(f, "leg {slot} has more than one row"),
            SkipReason::UnmatchedLeg { slot } => write!(f, "leg {slot} has no row"),
            SkipReason::MissingMetric { slot, metric } => {
                write!(f, "leg {slot} is missing {metric}")
            }
        }
    }
}

/// Outcome of assembling one row group.
#[derive(Debug, Clone, PartialEq)]
pub enum Assembly {
    Record(MarketDataRecord),
    Skipped(SkipReason),
}

impl Assembly {
    pub fn record(self) -> Option<MarketDataRecord> {
        match self {
            Assembly::Record(r) => Some(r),
            Assembly::Skipped(_) => None,
        }
    }

    pub fn is_record(&self) -> bool {
        matches!(self, Assembly::Record(_))
    }

    pub fn skip_reason(&self) -> Option<&SkipReason> {
        match self {
            Assembly::Record(_) => None,
            Assembly::Skipped(reason) => Some(reason),
        }
    }
}

// ─── Shapes ──────────────────────────────────────────────────────────

/// The closed set of strategy shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StrategyShape {
    /// Supply one token on one protocol.
    SingleAssetLend,
    /// Lend spot, short the perp.
    SpotPerp,
    /// Lend token1, borrow token2 on the same protocol, lend token2 elsewhere.
    CrossProtocolLoop,
    /// Lend token1, borrow token2, go long the token2 perp.
    PerpHedgedBorrow,
    /// Cross-protocol loop that re-collateralizes and borrows token1 back.
    RecursiveLoop,
}

impl StrategyShape {
    pub const ALL: [StrategyShape; 5] = [
        StrategyShape::SingleAssetLend,
        StrategyShape::SpotPerp,
        StrategyShape::CrossProtocolLoop,
        StrategyShape::PerpHedgedBorrow,
        StrategyShape::RecursiveLoop,
    ];

    /// Canonical strategy-type identifier.
    pub fn strategy_type(self) -> &'static str {
        match self {
            StrategyShape::SingleAssetLend => "stablecoin_lending",
            StrategyShape::SpotPerp => "perp_lending",
            StrategyShape::CrossProtocolLoop => "noloop_cross_protocol_lending",
            StrategyShape::PerpHedgedBorrow => "perp_borrowing",
            StrategyShape::RecursiveLoop => "recursive_lending",
        }
    }

    /// Slots in canonical order.
    pub fn slots(self) -> &'static [LegSlot] {
        match self {
            StrategyShape::SingleAssetLend => single_lend::SLOTS,
            StrategyShape::SpotPerp => spot_perp::SLOTS,
            StrategyShape::CrossProtocolLoop => cross_loop::SLOTS,
            StrategyShape::PerpHedgedBorrow => perp_borrow::SLOTS,
            StrategyShape::RecursiveLoop => recursive_loop::SLOTS,
        }
    }

    pub fn required_leg_count(self) -> usize {
        self.slots().len()
    }

    /// Tokens referenced by any slot, in token order.
    pub fn tokens(self) -> Vec<TokenSlot> {
        let set: BTreeSet<TokenSlot> = self.slots().iter().map(|s| s.token).collect();
        set.into_iter().collect()
    }

    /// Protocols referenced by any slot, A before B.
    pub fn protocols(self) -> Vec<ProtocolSlot> {
        let set: BTreeSet<ProtocolSlot> = self.slots().iter().map(|s| s.protocol).collect();
        set.into_iter().collect()
    }

    /// Shapes with a collateral leg carry `liquidation_distance`.
    pub fn uses_collateral(self) -> bool {
        self.slots().iter().any(|s| s.role.collateral)
    }

    /// Raw-value duplicates emitted for display: (slot index, metric).
    fn raw_duplicates(self) -> &'static [(usize, Metric)] {
        match self {
            StrategyShape::PerpHedgedBorrow => perp_borrow::RAW_DUPLICATES,
            _ => &[],
        }
    }

    /// Check that every identity the slots need is present.
    ///
    /// Returns the first problem found; rate data is never inspected.
    pub fn validate_config(self, config: &StrategyConfig) -> Result<(), ConfigError> {
        self.required_legs(config)?;
        if let Some(value) = config.liquidation_distance {
            if !(value > 0.0 && value < 1.0) {
                return Err(ConfigError::InvalidLiquidationDistance {
                    strategy_type: self.strategy_type().to_string(),
                    value,
                });
            }
        }
        Ok(())
    }

    /// The (contract, protocol) pair of each slot, in slot order.
    pub fn required_legs(self, config: &StrategyConfig) -> Result<Vec<LegKey>, ConfigError> {
        let missing = |field: String| ConfigError::MissingField {
            strategy_type: self.strategy_type().to_string(),
            field,
        };

        let mut legs: Vec<LegKey> = Vec::with_capacity(self.required_leg_count());
        for slot in self.slots() {
            let token = config
                .token(slot.token)
                .ok_or_else(|| missing(slot.token.key().to_string()))?;
            if token.symbol.trim().is_empty() {
                return Err(missing(format!("{}.symbol", slot.token.key())));
            }
            if token.contract.trim().is_empty() {
                return Err(missing(format!("{}.contract", slot.token.key())));
            }
            let protocol = config
                .protocol(slot.protocol)
                .filter(|p| !p.trim().is_empty())
                .ok_or_else(|| missing(slot.protocol.key().to_string()))?;

            let key = LegKey::new(&token.contract, protocol);
            if let Some(first) = legs.iter().position(|k| *k == key) {
                return Err(ConfigError::DuplicateLeg {
                    strategy_type: self.strategy_type().to_string(),
                    first: self.slots()[first].label,
                    second: slot.label,
                    key: key.to_string(),
                });
            }
            legs.push(key);
        }
        Ok(legs)
    }

    /// The exact key set of every record this shape emits, sorted.
    pub fn record_keys(self) -> Vec<String> {
        let mut keys: BTreeSet<String> = BTreeSet::new();
        for token in self.tokens() {
            keys.insert(token.key().to_string());
            keys.insert(token.contract_key().to_string());
        }
        for protocol in self.protocols() {
            keys.insert(protocol.key().to_string());
        }
        for slot in self.slots() {
            for metric in slot.role.required_metrics() {
                keys.insert(slot.key(metric));
            }
            for metric in slot.role.optional_metrics() {
                keys.insert(slot.key(*metric));
            }
        }
        for (index, metric) in self.raw_duplicates() {
            keys.insert(raw_key(&self.slots()[*index], *metric));
        }
        if self.uses_collateral() {
            keys.insert("liquidation_distance".to_string());
        }
        keys.into_iter().collect()
    }

    /// Assemble one row group into a market-data record.
    ///
    /// Order of checks: schema contract (loud), config identities (loud),
    /// row count, leg matching, then per-slot metric completeness.
    pub fn assemble(
        self,
        group: &RowGroup,
        config: &StrategyConfig,
    ) -> Result<Assembly, AssembleError> {
        for slot in self.slots() {
            for metric in slot.role.required_metrics() {
                if !group.schema.carries(metric) {
                    return Err(AssembleError::SchemaViolation {
                        strategy_type: self.strategy_type(),
                        slot: slot.label,
                        metric,
                    });
                }
            }
        }

        let legs = self.required_legs(config)?;

        if group.len() != legs.len() {
            return Ok(Assembly::Skipped(SkipReason::WrongRowCount {
                expected: legs.len(),
                actual: group.len(),
            }));
        }

        let matched = match match_legs(self.slots(), &legs, &group.rows) {
            Ok(matched) => matched,
            Err(reason) => return Ok(Assembly::Skipped(reason)),
        };

        for (slot, row) in self.slots().iter().zip(&matched) {
            for metric in slot.role.required_metrics() {
                if row.metric(metric).is_none() {
                    return Ok(Assembly::Skipped(SkipReason::MissingMetric {
                        slot: slot.label.to_string(),
                        metric,
                    }));
                }
            }
        }

        Ok(Assembly::Record(self.build_record(group, config, &matched)))
    }

    fn build_record(
        self,
        group: &RowGroup,
        config: &StrategyConfig,
        matched: &[&RateObservation],
    ) -> MarketDataRecord {
        let mut record = MarketDataRecord::new(group.timestamp);

        for token_slot in self.tokens() {
            if let Some(token) = config.token(token_slot) {
                record.insert(token_slot.key(), token.symbol.as_str());
                record.insert(token_slot.contract_key(), token.contract.as_str());
            }
        }
        for protocol_slot in self.protocols() {
            if let Some(protocol) = config.protocol(protocol_slot) {
                record.insert(protocol_slot.key(), protocol);
            }
        }

        for (slot, row) in self.slots().iter().zip(matched) {
            for metric in slot.role.required_metrics() {
                record.insert(slot.key(metric), row.metric(metric));
            }
            for metric in slot.role.optional_metrics() {
                let value = if group.schema.carries(*metric) {
                    row.metric(*metric)
                } else {
                    None
                };
                record.insert(slot.key(*metric), value);
            }
        }

        for (index, metric) in self.raw_duplicates() {
            let slot = &self.slots()[*index];
            record.insert(raw_key(slot, *metric), matched[*index].metric(*metric));
        }

        if self.uses_collateral() {
            record.insert(
                "liquidation_distance",
                config.liquidation_distance_or_default(),
            );
        }

        record
    }
}

impl fmt::Display for StrategyShape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.strategy_type())
    }
}

fn raw_key(slot: &LegSlot, metric: Metric) -> String {
    format!("raw_{}", slot.key(metric))
}

/// Assign each row to the slot whose key it matches.
///
/// Independent of row order: every slot must end up with exactly one row.
fn match_legs<'a>(
    slots: &[LegSlot],
    legs: &[LegKey],
    rows: &'a [RateObservation],
) -> Result<Vec<&'a RateObservation>, SkipReason> {
    let index: HashMap<&LegKey, usize> = legs.iter().enumerate().map(|(i, k)| (k, i)).collect();
    let mut assigned: Vec<Option<&RateObservation>> = vec![None; slots.len()];

    for row in rows {
        let key = LegKey::of(row);
        let Some(&i) = index.get(&key) else {
            return Err(SkipReason::UnexpectedObservation {
                contract: row.token_contract.clone(),
                protocol: row.protocol.clone(),
            });
        };
        if assigned[i].is_some() {
            return Err(SkipReason::DuplicateLeg {
                slot: slots[i].label.to_string(),
            });
        }
        assigned[i] = Some(row);
    }

    assigned
        .into_iter()
        .zip(slots)
        .map(|(row, slot)| {
            row.ok_or_else(|| SkipReason::UnmatchedLeg {
                slot: slot.label.to_string(),
            })
        })
        .collect()
}
