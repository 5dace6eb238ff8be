//! Shared fixtures for unit tests.

use chrono::{DateTime, TimeZone, Utc};

use crate::domain::{
    Metric, ObservationSchema, ProtocolSlot, RateObservation, RowGroup, StrategyConfig, TokenSlot,
};
use crate::legs::StrategyShape;

pub const USDC: &str =
    "0xdba34672e30cb065b1f93e3ab55318768fd6fef66c15942c9f7cb846e2f900e7::usdc::USDC";
pub const USDC_PADDED: &str =
    "0x00DBA34672E30CB065B1F93E3AB55318768FD6FEF66C15942C9F7CB846E2F900E7::usdc::USDC";
pub const SUI: &str = "0x2::sui::SUI";
pub const SUI_PERP: &str = "0x1a2b::perp::SUI_PERP";

pub const NAVI: &str = "navi";
pub const SUILEND: &str = "suilend";
pub const BLUEFIN: &str = "bluefin";

pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 1, 8, 0, 0).unwrap()
}

/// A valid config for `shape` using the fixture tokens and protocols.
pub fn config_for(shape: StrategyShape) -> StrategyConfig {
    let base = StrategyConfig::new(shape.strategy_type());
    match shape {
        StrategyShape::SingleAssetLend => base
            .with_token(TokenSlot::Token1, "USDC", USDC)
            .with_protocol(ProtocolSlot::A, NAVI),
        StrategyShape::SpotPerp => base
            .with_token(TokenSlot::Token1, "SUI", SUI)
            .with_token(TokenSlot::Token3, "SUI-PERP", SUI_PERP)
            .with_protocol(ProtocolSlot::A, NAVI)
            .with_protocol(ProtocolSlot::B, BLUEFIN),
        StrategyShape::CrossProtocolLoop | StrategyShape::RecursiveLoop => base
            .with_token(TokenSlot::Token1, "USDC", USDC)
            .with_token(TokenSlot::Token2, "SUI", SUI)
            .with_protocol(ProtocolSlot::A, NAVI)
            .with_protocol(ProtocolSlot::B, SUILEND),
        StrategyShape::PerpHedgedBorrow => base
            .with_token(TokenSlot::Token1, "USDC", USDC)
            .with_token(TokenSlot::Token2, "SUI", SUI)
            .with_token(TokenSlot::Token3, "SUI-PERP", SUI_PERP)
            .with_protocol(ProtocolSlot::A, NAVI)
            .with_protocol(ProtocolSlot::B, BLUEFIN),
    }
}

/// Observation with every metric filled; values vary with `seed`.
pub fn full_row(contract: &str, protocol: &str, seed: usize) -> RateObservation {
    let s = seed as f64;
    RateObservation::empty(t0(), contract, protocol)
        .with(Metric::LendTotalApr, 0.05 + s * 0.01)
        .with(Metric::BorrowTotalApr, 0.08 + s * 0.01)
        .with(Metric::PriceUsd, 1.0 + s)
        .with(Metric::CollateralRatio, 0.75)
        .with(Metric::LiquidationThreshold, 0.80)
        .with(Metric::BorrowFee, 0.001)
        .with(Metric::LendAvg8hrApr, 0.04 + s * 0.01)
        .with(Metric::LendAvg24hrApr, 0.045 + s * 0.01)
}

/// One fully populated row per slot of `shape`, in slot order.
pub fn complete_group(shape: StrategyShape, config: &StrategyConfig) -> RowGroup {
    let rows = shape
        .slots()
        .iter()
        .enumerate()
        .map(|(i, slot)| {
            let contract = &config.token(slot.token).unwrap().contract;
            let protocol = config.protocol(slot.protocol).unwrap();
            full_row(contract, protocol, i)
        })
        .collect();
    RowGroup::new(t0(), ObservationSchema::full(), rows)
}
