//! Joins aggregated balances with market data and derives the valuation
//! columns.

use std::collections::HashMap;

use chrono::Utc;
use rust_decimal::Decimal;

use crate::models::{AggregatedBalance, CoinInfo, PortfolioReport, ReportRow, Symbol};

/// Assemble the final report from aggregates and market data.
///
/// Left join on symbol: every aggregate yields exactly one row, with blank
/// market columns when nothing matched, and coin info for symbols nobody
/// holds is ignored. Percentages are derived in a second pass once the
/// portfolio total is known.
pub fn build_report(
    aggregates: Vec<AggregatedBalance>,
    coin_info: &HashMap<Symbol, CoinInfo>,
) -> PortfolioReport {
    let mut rows: Vec<ReportRow> = aggregates
        .into_iter()
        .map(|aggregate| {
            let info = coin_info.get(&aggregate.symbol);
            join_row(aggregate, info)
        })
        .collect();

    let total_value_usd: Decimal = rows.iter().map(|row| row.total_value_usd).sum();

    // A portfolio with no priced assets reports 0% everywhere instead of
    // dividing by zero.
    if !total_value_usd.is_zero() {
        for row in &mut rows {
            row.portfolio_percentage = row.total_value_usd / total_value_usd;
        }
    }

    PortfolioReport {
        generated_at: Utc::now(),
        total_value_usd,
        rows,
    }
}

fn join_row(aggregate: AggregatedBalance, info: Option<&CoinInfo>) -> ReportRow {
    let price_usd = info.map(|info| info.price_usd);
    // An unpriced asset contributes nothing to the total rather than
    // poisoning the whole report.
    let total_value_usd = price_usd
        .map(|price| aggregate.balance * price)
        .unwrap_or(Decimal::ZERO);

    ReportRow {
        sources: aggregate.sources,
        symbol: aggregate.symbol,
        name: info.map(|info| info.name.clone()),
        rank: info.and_then(|info| info.rank),
        market_cap: info.and_then(|info| info.market_cap),
        max_supply: info.and_then(|info| info.max_supply),
        total_supply: info.and_then(|info| info.total_supply),
        circulating_supply: info.and_then(|info| info.circulating_supply),
        balance: aggregate.balance,
        price_usd,
        total_value_usd,
        portfolio_percentage: Decimal::ZERO,
    }
}
