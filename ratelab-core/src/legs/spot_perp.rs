//! Spot-vs-perp: lend the spot token on protocol A, short its perp on B.
//!
//! The perp venue stores the short side's funding as a borrow rate, so the
//! 3B leg is read through `borrow_total_apr`.

use super::slot::{LegRole, LegSlot};
use crate::domain::{ProtocolSlot, TokenSlot};

pub(super) const SLOTS: &[LegSlot] = &[
    LegSlot::new(
        "1A",
        TokenSlot::Token1,
        ProtocolSlot::A,
        LegRole::lend().with_collateral(),
    ),
    LegSlot::new("3B", TokenSlot::Token3, ProtocolSlot::B, LegRole::borrow()),
];
