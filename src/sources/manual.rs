//! Manually tracked holdings.
//!
//! Reads a TOML file of `[[holding]]` entries for assets that live outside
//! any API-reachable account (cold wallets, paper wallets, other exchanges).
//!
//! ```toml
//! [[holding]]
//! symbol = "BTC"
//! balance = "0.25"
//!
//! [[holding]]
//! source = "ledger"
//! symbol = "ETH"
//! balance = "2.0"
//! ```

use std::path::PathBuf;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;

use super::BalanceSource;
use crate::models::{BalanceRecord, Symbol};

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ManualHoldingError {
    #[error("Holding {index}: invalid symbol {value:?}")]
    InvalidSymbol { index: usize, value: String },
    #[error("Holding {index} ({symbol}): balance must not be negative")]
    NegativeBalance { index: usize, symbol: String },
}

/// File-backed source of manually entered balances.
pub struct ManualSource {
    name: String,
    path: PathBuf,
}

#[derive(Debug, Deserialize)]
struct HoldingsFile {
    #[serde(default)]
    holding: Vec<HoldingEntry>,
}

#[derive(Debug, Deserialize)]
struct HoldingEntry {
    /// Label to report for this entry. Defaults to the source name.
    #[serde(default)]
    source: Option<String>,
    symbol: String,
    balance: Decimal,
}

impl ManualSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            name: "manual".to_string(),
            path: path.into(),
        }
    }

    /// Override the label used for entries that do not name their own source.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

/// Validate entries and turn them into records.
///
/// Zero balances are skipped (a zero holding is no holding); negative
/// balances and unusable symbols are rejected so a typo in the file surfaces
/// instead of silently skewing the report.
fn records_from_entries(
    default_source: &str,
    entries: Vec<HoldingEntry>,
) -> Result<Vec<BalanceRecord>, ManualHoldingError> {
    let mut records = Vec::with_capacity(entries.len());

    for (index, entry) in entries.into_iter().enumerate() {
        let symbol = Symbol::parse(&entry.symbol).map_err(|_| ManualHoldingError::InvalidSymbol {
            index,
            value: entry.symbol.clone(),
        })?;

        if entry.balance < Decimal::ZERO {
            return Err(ManualHoldingError::NegativeBalance {
                index,
                symbol: symbol.to_string(),
            });
        }

        if entry.balance.is_zero() {
            continue;
        }

        let source = entry.source.unwrap_or_else(|| default_source.to_string());
        records.push(BalanceRecord::new(source, symbol, entry.balance));
    }

    Ok(records)
}

#[async_trait::async_trait]
impl BalanceSource for ManualSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_balances(&self) -> Result<Vec<BalanceRecord>> {
        let content = tokio::fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read holdings file: {}", self.path.display()))?;

        let file: HoldingsFile = toml::from_str(&content)
            .with_context(|| format!("Failed to parse holdings file: {}", self.path.display()))?;

        let records = records_from_entries(&self.name, file.holding)?;
        Ok(records)
    }
}
