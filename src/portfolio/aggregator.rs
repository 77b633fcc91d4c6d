//! Combines raw balance records into one entry per symbol.

use std::collections::{BTreeMap, BTreeSet};

use rust_decimal::Decimal;

use crate::models::{AggregatedBalance, BalanceRecord};

/// Fold balance records into per-symbol aggregates.
///
/// Balances for the same symbol are summed exactly, including repeats from a
/// single source (sub-accounts). Source labels are deduplicated. The output is
/// sorted by symbol, which fixes the row order of everything downstream.
pub fn aggregate_balances(records: Vec<BalanceRecord>) -> Vec<AggregatedBalance> {
    let mut by_symbol: BTreeMap<_, AggregatedBalance> = BTreeMap::new();

    for record in records {
        let entry = by_symbol
            .entry(record.symbol.clone())
            .or_insert_with(|| AggregatedBalance {
                symbol: record.symbol,
                sources: BTreeSet::new(),
                balance: Decimal::ZERO,
            });
        entry.sources.insert(record.source);
        entry.balance += record.balance;
    }

    by_symbol.into_values().collect()
}
