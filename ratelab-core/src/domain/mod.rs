//! Domain types: observations, strategy configs, row groups, records.

pub mod observation;
pub mod record;
pub mod row_group;
pub mod strategy;

pub use observation::{Metric, ObservationSchema, RateObservation};
pub use record::{FieldValue, MarketDataRecord};
pub use row_group::{group_by_timestamp, LegKey, RowGroup};
pub use strategy::{
    ProtocolSlot, StrategyConfig, TokenRef, TokenSlot, DEFAULT_LIQUIDATION_DISTANCE,
};
