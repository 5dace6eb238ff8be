//! Property tests for reconciliation invariants.
//!
//! Uses proptest to verify:
//! 1. Normalization is idempotent and padding/case-insensitive
//! 2. Leg assignment does not depend on row order within a group
//! 3. Groups of the wrong size never assemble
//! 4. Merge inclusion: single-venue tokens drop unless allowlisted

use chrono::{TimeZone, Utc};
use proptest::prelude::*;
use ratelab_core::domain::{Metric, ObservationSchema, ProtocolSlot, TokenSlot};
use ratelab_core::merge::{merge_protocols, ProtocolSnapshot, TableKind, TokenRate};
use ratelab_core::{normalize, RateObservation, RowGroup, StrategyConfig, StrategyShape};

// ── Strategies (proptest) ────────────────────────────────────────────

fn arb_hex() -> impl Strategy<Value = String> {
    "[0-9a-fA-F]{1,64}"
}

fn arb_address() -> impl Strategy<Value = String> {
    (arb_hex(), "[a-z_]{1,12}", "[A-Za-z_]{1,12}")
        .prop_map(|(hex, module, ty)| format!("0x{hex}::{module}::{ty}"))
}

fn arb_rate() -> impl Strategy<Value = f64> {
    (0.0..0.5_f64).prop_map(|r| (r * 10_000.0).round() / 10_000.0)
}

const USDC: &str = "0xdba3::usdc::USDC";
const SUI: &str = "0x2::sui::SUI";

fn recursive_config() -> StrategyConfig {
    StrategyConfig::new("recursive_lending")
        .with_token(TokenSlot::Token1, "USDC", USDC)
        .with_token(TokenSlot::Token2, "SUI", SUI)
        .with_protocol(ProtocolSlot::A, "navi")
        .with_protocol(ProtocolSlot::B, "suilend")
}

fn full_row(contract: &str, protocol: &str, rate: f64) -> RateObservation {
    let ts = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
    RateObservation::empty(ts, contract, protocol)
        .with(Metric::LendTotalApr, rate)
        .with(Metric::BorrowTotalApr, rate + 0.02)
        .with(Metric::PriceUsd, 1.0)
        .with(Metric::CollateralRatio, 0.7)
        .with(Metric::LiquidationThreshold, 0.75)
        .with(Metric::BorrowFee, 0.0005)
}

// ── 1. Normalization ─────────────────────────────────────────────────

proptest! {
    #[test]
    fn normalize_is_idempotent(addr in arb_address()) {
        let once = normalize(&addr);
        prop_assert_eq!(normalize(&once), once);
    }

    #[test]
    fn normalize_is_idempotent_on_arbitrary_text(text in "[ -~]{0,40}") {
        let once = normalize(&text);
        prop_assert_eq!(normalize(&once), once);
    }

    #[test]
    fn padding_and_case_do_not_matter(hex in arb_hex(), zeros in 0usize..10) {
        let plain = format!("0x{hex}::coin::COIN");
        let padded = format!("0X{}{}::coin::COIN", "0".repeat(zeros), hex.to_uppercase());
        prop_assert_eq!(normalize(&plain), normalize(&padded));
    }

    #[test]
    fn type_segments_preserved(addr in arb_address()) {
        let original: Vec<&str> = addr.split("::").skip(1).collect();
        let normalized = normalize(&addr);
        let kept: Vec<&str> = normalized.split("::").skip(1).collect();
        prop_assert_eq!(original, kept);
    }
}

// ── 2–3. Leg assignment ──────────────────────────────────────────────

proptest! {
    #[test]
    fn assembly_is_order_independent(
        rates in proptest::collection::vec(arb_rate(), 4),
        order in Just(vec![0usize, 1, 2, 3]).prop_shuffle(),
    ) {
        let config = recursive_config();
        let shape = StrategyShape::RecursiveLoop;
        let legs = [(USDC, "navi"), (SUI, "navi"), (SUI, "suilend"), (USDC, "suilend")];
        let rows: Vec<RateObservation> = legs
            .iter()
            .zip(&rates)
            .map(|((c, p), r)| full_row(c, p, *r))
            .collect();
        let ts = rows[0].timestamp;

        let sorted = RowGroup::new(ts, ObservationSchema::full(), rows.clone());
        let shuffled = RowGroup::new(
            ts,
            ObservationSchema::full(),
            order.iter().map(|&i| rows[i].clone()).collect(),
        );

        let a = shape.assemble(&sorted, &config).unwrap();
        let b = shape.assemble(&shuffled, &config).unwrap();
        prop_assert!(a.is_record());
        prop_assert_eq!(a, b);
    }

    #[test]
    fn wrong_size_groups_never_assemble(n in 0usize..8) {
        prop_assume!(n != 4);
        let config = recursive_config();
        let rows: Vec<RateObservation> = (0..n).map(|_| full_row(USDC, "navi", 0.05)).collect();
        let ts = Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap();
        let group = RowGroup::new(ts, ObservationSchema::full(), rows);

        let outcome = StrategyShape::RecursiveLoop.assemble(&group, &config).unwrap();
        prop_assert!(!outcome.is_record());
    }
}

// ── 4. Merge inclusion ───────────────────────────────────────────────

proptest! {
    #[test]
    fn single_venue_tokens_drop_unless_stable(
        hex in "[1-9a-f][0-9a-f]{3,10}",
        venue in 0usize..3,
        rate in arb_rate(),
        stable in any::<bool>(),
    ) {
        let contract = format!("0x{hex}::coin::COIN");
        let protocols = ["navi", "suilend", "scallop"];
        let snapshots: Vec<ProtocolSnapshot> = protocols
            .iter()
            .enumerate()
            .map(|(i, p)| {
                let snap = ProtocolSnapshot::new(p);
                if i == venue {
                    snap.with_lend(TokenRate::new("COIN", &contract, rate))
                } else {
                    snap
                }
            })
            .collect();
        let allowlist = if stable { vec![contract.clone()] } else { vec![] };

        let merged = merge_protocols(&snapshots, &allowlist);
        for kind in TableKind::ALL {
            prop_assert_eq!(merged.table(kind).row(&contract).is_some(), stable);
        }
    }
}
