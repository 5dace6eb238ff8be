//! Per-protocol input tables and merged cross-protocol output tables.

use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// One metric value for a token on one protocol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenRate {
    pub token: String,
    pub contract: String,
    #[serde(default)]
    pub value: Option<f64>,
}

impl TokenRate {
    pub fn new(token: &str, contract: &str, value: f64) -> Self {
        Self {
            token: token.to_string(),
            contract: contract.to_string(),
            value: Some(value),
        }
    }

    pub fn null(token: &str, contract: &str) -> Self {
        Self {
            token: token.to_string(),
            contract: contract.to_string(),
            value: None,
        }
    }
}

/// Which of the three merged tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableKind {
    Lend,
    Borrow,
    Collateral,
}

impl TableKind {
    pub const ALL: [TableKind; 3] = [TableKind::Lend, TableKind::Borrow, TableKind::Collateral];

    /// Metric column the readers publish for this table.
    pub fn metric_name(self) -> &'static str {
        match self {
            TableKind::Lend => "Supply_apr",
            TableKind::Borrow => "Borrow_apr",
            TableKind::Collateral => "Collateralization_factor",
        }
    }
}

/// The current-state tables one protocol reader produced.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProtocolSnapshot {
    pub protocol: String,
    #[serde(default)]
    pub lend: Vec<TokenRate>,
    #[serde(default)]
    pub borrow: Vec<TokenRate>,
    #[serde(default)]
    pub collateral: Vec<TokenRate>,
}

impl ProtocolSnapshot {
    pub fn new(protocol: &str) -> Self {
        Self {
            protocol: protocol.to_string(),
            ..Self::default()
        }
    }

    pub fn with_lend(mut self, rate: TokenRate) -> Self {
        self.lend.push(rate);
        self
    }

    pub fn with_borrow(mut self, rate: TokenRate) -> Self {
        self.borrow.push(rate);
        self
    }

    pub fn with_collateral(mut self, rate: TokenRate) -> Self {
        self.collateral.push(rate);
        self
    }

    pub fn table(&self, kind: TableKind) -> &[TokenRate] {
        match kind {
            TableKind::Lend => &self.lend,
            TableKind::Borrow => &self.borrow,
            TableKind::Collateral => &self.collateral,
        }
    }

    /// Rows of all three tables: lend, borrow, collateral.
    pub fn all_rates(&self) -> impl Iterator<Item = &TokenRate> {
        self.lend
            .iter()
            .chain(self.borrow.iter())
            .chain(self.collateral.iter())
    }
}

/// One token's values across protocols.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedRow {
    pub token: String,
    /// Normalized contract.
    pub contract: String,
    /// One value per protocol, aligned with [`MergedTable::protocols`].
    pub values: Vec<Option<f64>>,
}

impl MergedRow {
    pub fn non_null_count(&self) -> usize {
        self.values.iter().filter(|v| v.is_some()).count()
    }
}

/// A token × protocol table for one metric.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MergedTable {
    pub kind: TableKind,
    pub protocols: Vec<String>,
    pub rows: Vec<MergedRow>,
}

impl MergedTable {
    pub fn row(&self, contract: &str) -> Option<&MergedRow> {
        self.rows
            .iter()
            .find(|r| crate::address::same_contract(&r.contract, contract))
    }

    /// Value for (`contract`, `protocol`); `None` if either is absent or null.
    pub fn value(&self, contract: &str, protocol: &str) -> Option<f64> {
        let col = self.protocols.iter().position(|p| p == protocol)?;
        self.row(contract)?.values.get(col).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Columns `Token`, `Contract`, then one nullable float column per protocol.
    pub fn to_dataframe(&self) -> PolarsResult<DataFrame> {
        let tokens: Vec<&str> = self.rows.iter().map(|r| r.token.as_str()).collect();
        let contracts: Vec<&str> = self.rows.iter().map(|r| r.contract.as_str()).collect();

        let mut columns: Vec<Column> = Vec::with_capacity(self.protocols.len() + 2);
        columns.push(Series::new("Token".into(), tokens).into());
        columns.push(Series::new("Contract".into(), contracts).into());
        for (i, protocol) in self.protocols.iter().enumerate() {
            let values: Vec<Option<f64>> = self
                .rows
                .iter()
                .map(|r| r.values.get(i).copied().flatten())
                .collect();
            columns.push(Series::new(protocol.as_str().into(), values).into());
        }
        DataFrame::new(columns)
    }
}
