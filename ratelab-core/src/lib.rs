//! RateLab Core — leg resolution and cross-protocol reconciliation.
//!
//! This crate contains the pure, I/O-free heart of the rate analysis:
//! - Domain types (rate observations, strategy configs, row groups, records)
//! - Contract address normalization
//! - Leg handlers: one per strategy shape, matching per-timestamp row groups
//!   onto named legs and emitting fixed-schema market-data records
//! - Handler registry mapping strategy-type identifiers to shapes
//! - Protocol merger building cross-protocol lend/borrow/collateral tables

pub mod address;
pub mod domain;
pub mod legs;
pub mod merge;
pub mod registry;

#[cfg(test)]
mod test_support;

pub use address::normalize;
pub use domain::{
    FieldValue, LegKey, MarketDataRecord, Metric, ObservationSchema, RateObservation, RowGroup,
    StrategyConfig, TokenRef,
};
pub use legs::{AssembleError, Assembly, ConfigError, SkipReason, StrategyShape};
pub use merge::{merge_protocols, MergedTables, ProtocolSnapshot, TokenRate};
pub use registry::{standard_registry, HandlerRegistry, RegistryError};
