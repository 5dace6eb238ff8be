//! Protocol merger — reconcile independently fetched protocol tables.
//!
//! Each protocol reader publishes lend, borrow and collateral tables keyed by
//! its own spelling of the contract address. The merger normalizes every
//! address, builds a [`TokenUniverse`], lays each table out as token ×
//! protocol, and drops tokens that are neither allowlisted stablecoins nor
//! lendable on at least two protocols. Single-venue tokens are treated as
//! illiquid outliers; stablecoins are fungible across venues.

pub mod table;
pub mod universe;

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::address::normalize;

pub use table::{MergedRow, MergedTable, ProtocolSnapshot, TableKind, TokenRate};
pub use universe::{TokenUniverse, UniverseEntry};

/// Minimum number of protocols with a non-null lend rate for a
/// non-stablecoin token to be kept.
pub const MIN_LEND_PROTOCOLS: usize = 2;

/// The three merged tables. Row `i` describes the same token in all three.
#[derive(Debug, Clone, PartialEq)]
pub struct MergedTables {
    pub lend: MergedTable,
    pub borrow: MergedTable,
    pub collateral: MergedTable,
}

impl MergedTables {
    pub fn table(&self, kind: TableKind) -> &MergedTable {
        match kind {
            TableKind::Lend => &self.lend,
            TableKind::Borrow => &self.borrow,
            TableKind::Collateral => &self.collateral,
        }
    }
}

/// Per-protocol value lookup for one table kind: normalized contract → value.
///
/// When a protocol lists the same token twice, the first row wins.
fn index_table(rates: &[TokenRate]) -> HashMap<String, Option<f64>> {
    let mut index = HashMap::with_capacity(rates.len());
    for rate in rates {
        index.entry(normalize(&rate.contract)).or_insert(rate.value);
    }
    index
}

/// One snapshot per protocol name; later repeats are dropped.
fn distinct_protocols(snapshots: &[ProtocolSnapshot]) -> Vec<&ProtocolSnapshot> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(snapshots.len());
    snapshots
        .iter()
        .filter(|s| {
            let first = seen.insert(s.protocol.as_str());
            if !first {
                warn!(protocol = %s.protocol, "ignoring repeated protocol snapshot");
            }
            first
        })
        .collect()
}

/// Merge protocol snapshots into lend, borrow and collateral tables.
///
/// Protocol columns follow the order of `snapshots`; rows follow the
/// universe's first-seen order. A protocol named twice keeps its first
/// snapshot, as a token listed twice within one table keeps its first row.
pub fn merge_protocols(snapshots: &[ProtocolSnapshot], stablecoins: &[String]) -> MergedTables {
    let snapshots = distinct_protocols(snapshots);
    let universe = TokenUniverse::build(snapshots.iter().copied());
    let allowlist: HashSet<String> = stablecoins.iter().map(|s| normalize(s)).collect();
    let protocols: Vec<String> = snapshots.iter().map(|s| s.protocol.clone()).collect();

    let build = |kind: TableKind| -> Vec<MergedRow> {
        let indexes: Vec<HashMap<String, Option<f64>>> = snapshots
            .iter()
            .map(|s| index_table(s.table(kind)))
            .collect();
        universe
            .entries()
            .iter()
            .map(|entry| MergedRow {
                token: entry.symbol.clone(),
                contract: entry.contract.clone(),
                values: indexes
                    .iter()
                    .map(|index| index.get(&entry.contract).copied().flatten())
                    .collect(),
            })
            .collect()
    };

    let lend_rows = build(TableKind::Lend);
    let borrow_rows = build(TableKind::Borrow);
    let collateral_rows = build(TableKind::Collateral);

    let keep: Vec<bool> = lend_rows
        .iter()
        .map(|row| {
            let stable = allowlist.contains(&row.contract);
            let cross_protocol = row.non_null_count() >= MIN_LEND_PROTOCOLS;
            if !stable && !cross_protocol {
                debug!(
                    token = %row.token,
                    contract = %row.contract,
                    lend_protocols = row.non_null_count(),
                    "dropping single-venue token from merged tables"
                );
            }
            stable || cross_protocol
        })
        .collect();

    let retain = |rows: Vec<MergedRow>| -> Vec<MergedRow> {
        rows.into_iter()
            .zip(&keep)
            .filter_map(|(row, &k)| k.then_some(row))
            .collect()
    };

    let table = |kind: TableKind, rows: Vec<MergedRow>| MergedTable {
        kind,
        protocols: protocols.clone(),
        rows: retain(rows),
    };

    let merged = MergedTables {
        lend: table(TableKind::Lend, lend_rows),
        borrow: table(TableKind::Borrow, borrow_rows),
        collateral: table(TableKind::Collateral, collateral_rows),
    };
    debug!(
        universe = universe.len(),
        kept = merged.lend.len(),
        protocols = protocols.len(),
        "merged protocol snapshots"
    );
    merged
}
