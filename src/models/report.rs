use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Symbol;

/// Column labels of the final report, in output order.
///
/// Writers must emit exactly this set, in this order.
pub const REPORT_LABELS: [&str; 12] = [
    "Exchange(s) / Network(s)",
    "Symbol",
    "Full Name",
    "Coin Rank",
    "Market Cap",
    "Max Supply",
    "Total Supply",
    "Circulating Supply",
    "Balance",
    "Price (USD)",
    "Total Value (USD)",
    "Portfolio Percentage",
];

/// One line of the final report: an aggregated balance joined with market
/// data, plus the derived valuation columns.
///
/// Descriptive fields are `None` when no market data matched the symbol. The
/// row is still emitted; it just contributes zero value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportRow {
    pub sources: BTreeSet<String>,
    pub symbol: Symbol,
    pub name: Option<String>,
    pub rank: Option<u32>,
    pub market_cap: Option<Decimal>,
    pub max_supply: Option<Decimal>,
    pub total_supply: Option<Decimal>,
    pub circulating_supply: Option<Decimal>,
    pub balance: Decimal,
    pub price_usd: Option<Decimal>,
    pub total_value_usd: Decimal,
    /// Share of the portfolio total as a fraction in [0, 1].
    pub portfolio_percentage: Decimal,
}

impl ReportRow {
    /// Render the contributing sources as a single cell, e.g. "binance|kraken".
    ///
    /// `sources` is an ordered set, so the label is deterministic.
    pub fn sources_label(&self) -> String {
        self.sources.iter().cloned().collect::<Vec<_>>().join("|")
    }

    /// Cell values in `REPORT_LABELS` order.
    ///
    /// Numeric cells use normalized decimal form (no trailing zeros, no
    /// exponent); absent fields render as empty strings. Display rounding is
    /// left to the writers.
    pub fn values(&self) -> [String; 12] {
        [
            self.sources_label(),
            self.symbol.to_string(),
            self.name.clone().unwrap_or_default(),
            self.rank.map(|rank| rank.to_string()).unwrap_or_default(),
            opt_decimal_cell(self.market_cap),
            opt_decimal_cell(self.max_supply),
            opt_decimal_cell(self.total_supply),
            opt_decimal_cell(self.circulating_supply),
            decimal_cell(self.balance),
            opt_decimal_cell(self.price_usd),
            decimal_cell(self.total_value_usd),
            decimal_cell(self.portfolio_percentage),
        ]
    }
}

/// A complete portfolio valuation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioReport {
    pub generated_at: DateTime<Utc>,
    pub total_value_usd: Decimal,
    /// Rows in symbol order, one per distinct aggregated symbol.
    pub rows: Vec<ReportRow>,
}

impl PortfolioReport {
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

fn decimal_cell(value: Decimal) -> String {
    value.normalize().to_string()
}

fn opt_decimal_cell(value: Option<Decimal>) -> String {
    value.map(decimal_cell).unwrap_or_default()
}
