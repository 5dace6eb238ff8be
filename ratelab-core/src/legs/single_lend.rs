//! Single-asset lend: supply token1 on protocol A and earn the lend rate.
//!
//! No loan is taken, so the leg carries no collateral fields and the record
//! has no `liquidation_distance`.

use super::slot::{LegRole, LegSlot};
use crate::domain::{ProtocolSlot, TokenSlot};

pub(super) const SLOTS: &[LegSlot] = &[LegSlot::new(
    "1A",
    TokenSlot::Token1,
    ProtocolSlot::A,
    LegRole::lend(),
)];

#[cfg(test)]
mod tests {
    use crate::domain::{Metric, ObservationSchema, RateObservation, RowGroup};
    use crate::legs::{Assembly, StrategyShape};
    use crate::test_support::*;

    #[test]
    fn lend_only_row_yields_minimal_record() {
        let shape = StrategyShape::SingleAssetLend;
        let config = config_for(shape);
        let row = RateObservation::empty(t0(), USDC, NAVI)
            .with(Metric::LendTotalApr, 0.05)
            .with(Metric::PriceUsd, 1.0);
        let group = RowGroup::new(t0(), ObservationSchema::full(), vec![row]);

        let record = shape.assemble(&group, &config).unwrap().record().unwrap();
        let keys: Vec<&str> = record.keys().collect();
        assert_eq!(
            keys,
            vec![
                "lend_total_apr_1A",
                "price_1A",
                "protocol_a",
                "token1",
                "token1_contract"
            ]
        );
        assert_eq!(record.number("lend_total_apr_1A"), Some(0.05));
        assert_eq!(record.number("price_1A"), Some(1.0));
        assert_eq!(record.text("token1"), Some("USDC"));
        assert_eq!(record.text("protocol_a"), Some(NAVI));
    }

    #[test]
    fn missing_price_skips() {
        let shape = StrategyShape::SingleAssetLend;
        let config = config_for(shape);
        let row = RateObservation::empty(t0(), USDC, NAVI).with(Metric::LendTotalApr, 0.05);
        let group = RowGroup::new(t0(), ObservationSchema::full(), vec![row]);

        let outcome = shape.assemble(&group, &config).unwrap();
        assert!(matches!(outcome, Assembly::Skipped(_)));
    }

    #[test]
    fn lend_table_without_borrow_columns_is_fine() {
        let shape = StrategyShape::SingleAssetLend;
        let config = config_for(shape);
        let schema = ObservationSchema::new([Metric::LendTotalApr, Metric::PriceUsd]);
        let row = RateObservation::empty(t0(), USDC, NAVI)
            .with(Metric::LendTotalApr, 0.031)
            .with(Metric::PriceUsd, 0.9998);
        let group = RowGroup::new(t0(), schema, vec![row]);

        assert!(shape.assemble(&group, &config).unwrap().is_record());
    }
}
