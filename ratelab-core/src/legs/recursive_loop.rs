//! Recursive loop: the cross-protocol loop, but the token2 supplied on B is
//! posted as collateral to borrow token1 back, closing the loop.

use super::slot::{LegRole, LegSlot};
use crate::domain::{ProtocolSlot, TokenSlot};

pub(super) const SLOTS: &[LegSlot] = &[
    LegSlot::new(
        "1A",
        TokenSlot::Token1,
        ProtocolSlot::A,
        LegRole::lend().with_collateral(),
    ),
    LegSlot::new(
        "2A",
        TokenSlot::Token2,
        ProtocolSlot::A,
        LegRole::borrow().with_fee(),
    ),
    LegSlot::new(
        "2B",
        TokenSlot::Token2,
        ProtocolSlot::B,
        LegRole::lend().with_collateral(),
    ),
    LegSlot::new(
        "3B",
        TokenSlot::Token1,
        ProtocolSlot::B,
        LegRole::borrow().with_fee(),
    ),
];

#[cfg(test)]
mod tests {
    use crate::domain::Metric;
    use crate::legs::{SkipReason, StrategyShape};
    use crate::test_support::*;

    #[test]
    fn b_side_collateral_required() {
        let shape = StrategyShape::RecursiveLoop;
        let config = config_for(shape);
        let mut group = complete_group(shape, &config);
        group.rows[2].liquidation_threshold = None;

        let outcome = shape.assemble(&group, &config).unwrap();
        assert_eq!(
            outcome.skip_reason(),
            Some(&SkipReason::MissingMetric {
                slot: "2B".into(),
                metric: Metric::LiquidationThreshold,
            })
        );
    }

    #[test]
    fn token1_appears_on_both_protocols() {
        let shape = StrategyShape::RecursiveLoop;
        let config = config_for(shape);
        let legs = shape.required_legs(&config).unwrap();
        assert_eq!(legs[0].contract, legs[3].contract);
        assert_ne!(legs[0].protocol, legs[3].protocol);
    }

    #[test]
    fn full_key_set() {
        let keys = StrategyShape::RecursiveLoop.record_keys();
        assert_eq!(keys.len(), 21);
        assert!(keys.iter().any(|k| k == "borrow_fee_3B"));
        assert!(keys.iter().any(|k| k == "collateral_ratio_2B"));
        assert!(!keys.iter().any(|k| k.starts_with("token3")));
    }
}
