//! Leg slots: the fixed (token, protocol, role) positions of a strategy shape.

use crate::domain::{Metric, ProtocolSlot, TokenSlot};

/// Whether a leg supplies or borrows its token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegSide {
    Lend,
    Borrow,
}

/// Structural role of a leg. Determines which metrics must be present.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegRole {
    pub side: LegSide,
    /// Posted as loan collateral: needs collateral ratio and liquidation threshold.
    pub collateral: bool,
    /// Borrowed against: needs the origination fee.
    pub borrow_fee: bool,
    /// Emits the nullable 8h/24h rolling-average lend rates.
    pub rolling_averages: bool,
}

impl LegRole {
    pub const fn lend() -> Self {
        Self {
            side: LegSide::Lend,
            collateral: false,
            borrow_fee: false,
            rolling_averages: false,
        }
    }

    pub const fn borrow() -> Self {
        Self {
            side: LegSide::Borrow,
            collateral: false,
            borrow_fee: false,
            rolling_averages: false,
        }
    }

    pub const fn with_collateral(mut self) -> Self {
        self.collateral = true;
        self
    }

    pub const fn with_fee(mut self) -> Self {
        self.borrow_fee = true;
        self
    }

    pub const fn with_rolling_averages(mut self) -> Self {
        self.rolling_averages = true;
        self
    }

    /// Metrics that must be non-null for the leg to be usable, in record order.
    pub fn required_metrics(&self) -> Vec<Metric> {
        let mut metrics = Vec::with_capacity(5);
        metrics.push(match self.side {
            LegSide::Lend => Metric::LendTotalApr,
            LegSide::Borrow => Metric::BorrowTotalApr,
        });
        if self.borrow_fee {
            metrics.push(Metric::BorrowFee);
        }
        metrics.push(Metric::PriceUsd);
        if self.collateral {
            metrics.push(Metric::CollateralRatio);
            metrics.push(Metric::LiquidationThreshold);
        }
        metrics
    }

    /// Metrics emitted when available, null otherwise.
    pub fn optional_metrics(&self) -> &'static [Metric] {
        if self.rolling_averages {
            &[Metric::LendAvg8hrApr, Metric::LendAvg24hrApr]
        } else {
            &[]
        }
    }
}

/// One named leg position within a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegSlot {
    /// Label used as the record key suffix (`1A`, `2B`, ...).
    pub label: &'static str,
    pub token: TokenSlot,
    pub protocol: ProtocolSlot,
    pub role: LegRole,
}

impl LegSlot {
    pub const fn new(
        label: &'static str,
        token: TokenSlot,
        protocol: ProtocolSlot,
        role: LegRole,
    ) -> Self {
        Self {
            label,
            token,
            protocol,
            role,
        }
    }

    /// Record key for `metric` on this slot, e.g. `borrow_fee_2A`.
    pub fn key(&self, metric: Metric) -> String {
        format!("{}_{}", metric.record_prefix(), self.label)
    }
}
