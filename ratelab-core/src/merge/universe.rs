//! Token universe — every normalized contract seen across protocol snapshots.

use std::collections::{BTreeSet, HashMap};

use super::table::ProtocolSnapshot;
use crate::address::normalize;

/// One token in the universe.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UniverseEntry {
    /// Normalized contract address.
    pub contract: String,
    /// Display symbol, first one seen.
    pub symbol: String,
    /// Protocols listing the token in any table.
    pub protocols: BTreeSet<String>,
}

/// Normalized contract → entry, in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct TokenUniverse {
    entries: Vec<UniverseEntry>,
    index: HashMap<String, usize>,
}

impl TokenUniverse {
    /// Scan every table of every snapshot: lend, then borrow, then collateral.
    ///
    /// Rows with an empty contract cannot be identified and are ignored.
    pub fn build<'a>(snapshots: impl IntoIterator<Item = &'a ProtocolSnapshot>) -> Self {
        let mut universe = Self::default();
        for snapshot in snapshots {
            for rate in snapshot.all_rates() {
                if rate.contract.trim().is_empty() {
                    continue;
                }
                universe.observe(&normalize(&rate.contract), &rate.token, &snapshot.protocol);
            }
        }
        universe
    }

    fn observe(&mut self, contract: &str, symbol: &str, protocol: &str) {
        let i = match self.index.get(contract) {
            Some(&i) => i,
            None => {
                self.entries.push(UniverseEntry {
                    contract: contract.to_string(),
                    symbol: symbol.to_string(),
                    protocols: BTreeSet::new(),
                });
                self.index.insert(contract.to_string(), self.entries.len() - 1);
                self.entries.len() - 1
            }
        };
        self.entries[i].protocols.insert(protocol.to_string());
    }

    pub fn get(&self, contract: &str) -> Option<&UniverseEntry> {
        self.index
            .get(&normalize(contract))
            .map(|&i| &self.entries[i])
    }

    pub fn entries(&self) -> &[UniverseEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
