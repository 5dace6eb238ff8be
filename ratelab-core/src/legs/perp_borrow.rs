//! Perp-hedged borrow: lend token1 on A, borrow token2 on A and sell it,
//! then go long the token2 perp on B to neutralize price exposure.
//!
//! The long side's funding is read as a lend rate on 3B. Perp venues also
//! publish 8h/24h rolling funding averages, emitted as nullable fields, and
//! the record repeats the unadjusted per-leg rates under `raw_*` keys for
//! display.

use super::slot::{LegRole, LegSlot};
use crate::domain::{Metric, ProtocolSlot, TokenSlot};

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
        "3B",
        TokenSlot::Token3,
        ProtocolSlot::B,
        LegRole::lend().with_rolling_averages(),
    ),
];

pub(super) const RAW_DUPLICATES: &[(usize, Metric)] = &[
    (0, Metric::LendTotalApr),
    (1, Metric::BorrowTotalApr),
    (2, Metric::LendTotalApr),
];
