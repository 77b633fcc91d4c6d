use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Symbol;

/// A single balance observation reported by one source.
///
/// The same symbol may appear in many records, across sources or within one
/// source (separate sub-accounts). Records are never merged here; that is the
/// aggregator's job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BalanceRecord {
    /// Label of the source that reported this balance (e.g. "binance").
    pub source: String,
    pub symbol: Symbol,
    /// Amount as an exact decimal to avoid floating point accumulation error.
    pub balance: Decimal,
}

impl BalanceRecord {
    pub fn new(source: impl Into<String>, symbol: impl Into<Symbol>, balance: Decimal) -> Self {
        Self {
            source: source.into(),
            symbol: symbol.into(),
            balance,
        }
    }
}

/// Combined holdings for one symbol across every source that reported it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedBalance {
    pub symbol: Symbol,
    /// Deduplicated labels of the contributing sources.
    pub sources: BTreeSet<String>,
    /// Exact sum of every contributing record's balance.
    pub balance: Decimal,
}
