//! Cross-protocol loop: lend token1 on A as collateral, borrow token2 on A,
//! lend the borrowed token2 on B. No re-collateralization on B.

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
    LegSlot::new("2B", TokenSlot::Token2, ProtocolSlot::B, LegRole::lend()),
];

#[cfg(test)]
mod tests {
    use crate::domain::Metric;
    use crate::legs::{Assembly, SkipReason, StrategyShape};
    use crate::test_support::*;

    #[test]
    fn missing_collateral_ratio_skips_despite_rates() {
        let shape = StrategyShape::CrossProtocolLoop;
        let config = config_for(shape);
        let mut group = complete_group(shape, &config);
        group.rows[0].collateral_ratio = None;

        assert_eq!(
            shape.assemble(&group, &config).unwrap(),
            Assembly::Skipped(SkipReason::MissingMetric {
                slot: "1A".into(),
                metric: Metric::CollateralRatio,
            })
        );
    }

    #[test]
    fn borrow_leg_requires_fee() {
        let shape = StrategyShape::CrossProtocolLoop;
        let config = config_for(shape);
        let mut group = complete_group(shape, &config);
        group.rows[1].borrow_fee = None;

        let outcome = shape.assemble(&group, &config).unwrap();
        assert_eq!(
            outcome.skip_reason(),
            Some(&SkipReason::MissingMetric {
                slot: "2A".into(),
                metric: Metric::BorrowFee,
            })
        );
    }

    #[test]
    fn values_land_on_their_slots() {
        let shape = StrategyShape::CrossProtocolLoop;
        let config = config_for(shape).with_liquidation_distance(0.15);
        let group = complete_group(shape, &config);

        let record = shape.assemble(&group, &config).unwrap().record().unwrap();
        assert_eq!(record.number("lend_total_apr_1A"), Some(0.05));
        assert_eq!(record.number("borrow_total_apr_2A"), Some(0.09));
        assert_eq!(record.number("price_2A"), Some(2.0));
        assert_eq!(record.number("lend_total_apr_2B"), Some(0.07));
        assert_eq!(record.number("price_2B"), Some(3.0));
        assert_eq!(record.number("liquidation_distance"), Some(0.15));
        assert!(!record.contains_key("collateral_ratio_2B"));
    }
}
