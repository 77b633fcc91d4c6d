//! Terminal table rendering.

use anyhow::Result;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{CellAlignment, ContentArrangement, Table};
use rust_decimal::Decimal;

use super::ReportWriter;
use crate::models::{PortfolioReport, ReportRow, REPORT_LABELS};

/// First numeric column; everything from here on is right-aligned.
const FIRST_NUMERIC_COLUMN: usize = 3;

/// Renders the report as a table on stdout.
///
/// Monetary cells are rounded for readability; the CSV writer is the place
/// to go for full-precision values.
#[derive(Debug, Default)]
pub struct TableReportWriter;

impl TableReportWriter {
    pub fn new() -> Self {
        Self
    }

    fn render(report: &PortfolioReport) -> Table {
        let mut table = Table::new();
        table
            .load_preset(UTF8_FULL_CONDENSED)
            .set_content_arrangement(ContentArrangement::Dynamic)
            .set_header(REPORT_LABELS.to_vec());

        for row in &report.rows {
            table.add_row(display_cells(row));
        }

        for (index, column) in table.column_iter_mut().enumerate() {
            if index >= FIRST_NUMERIC_COLUMN {
                column.set_cell_alignment(CellAlignment::Right);
            }
        }

        table
    }
}

/// Cell values in label order, with display rounding applied to the monetary
/// columns.
fn display_cells(row: &ReportRow) -> Vec<String> {
    let mut cells = row.values().to_vec();
    cells[4] = row.market_cap.map(money).unwrap_or_default();
    cells[9] = row.price_usd.map(money).unwrap_or_default();
    cells[10] = money(row.total_value_usd);
    cells[11] = percent(row.portfolio_percentage);
    cells
}

/// USD amounts with two decimal places.
fn money(value: Decimal) -> String {
    format!("{:.2}", value.round_dp(2))
}

/// Fraction rendered as a percentage, e.g. 0.9259 becomes "92.59%".
fn percent(fraction: Decimal) -> String {
    format!("{:.2}%", (fraction * Decimal::ONE_HUNDRED).round_dp(2))
}

#[async_trait::async_trait]
impl ReportWriter for TableReportWriter {
    async fn write(&self, report: &PortfolioReport) -> Result<()> {
        println!("{}", Self::render(report));
        println!();
        println!("Total value (USD): {}", money(report.total_value_usd));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;

    use chrono::Utc;
    use rust_decimal_macros::dec;

    use crate::models::Symbol;

    fn sample_report() -> PortfolioReport {
        PortfolioReport {
            generated_at: Utc::now(),
            total_value_usd: dec!(81000),
            rows: vec![
                ReportRow {
                    sources: BTreeSet::from(["binance".to_string()]),
                    symbol: Symbol::new("BTC"),
                    name: Some("Bitcoin".to_string()),
                    rank: Some(1),
                    market_cap: Some(dec!(985123456789.123)),
                    max_supply: Some(dec!(21000000)),
                    total_supply: None,
                    circulating_supply: None,
                    balance: dec!(1.5),
                    price_usd: Some(dec!(50000)),
                    total_value_usd: dec!(75000),
                    portfolio_percentage: dec!(0.9259259259),
                },
                ReportRow {
                    sources: BTreeSet::from(["manual".to_string()]),
                    symbol: Symbol::new("ETH"),
                    name: None,
                    rank: None,
                    market_cap: None,
                    max_supply: None,
                    total_supply: None,
                    circulating_supply: None,
                    balance: dec!(2),
                    price_usd: Some(dec!(3000)),
                    total_value_usd: dec!(6000),
                    portfolio_percentage: dec!(0.0740740741),
                },
            ],
        }
    }

    #[test]
    fn test_money_rounds_to_cents() {
        assert_eq!(money(dec!(985123456789.1284)), "985123456789.13");
        assert_eq!(money(dec!(50000)), "50000.00");
    }

    #[test]
    fn test_percent_renders_fraction() {
        assert_eq!(percent(dec!(0.9259259259)), "92.59%");
        assert_eq!(percent(Decimal::ZERO), "0.00%");
        assert_eq!(percent(Decimal::ONE), "100.00%");
    }

    #[test]
    fn test_render_contains_rows_and_rounded_cells() {
        let rendered = TableReportWriter::render(&sample_report()).to_string();

        assert!(rendered.contains("Symbol"));
        assert!(rendered.contains("BTC"));
        assert!(rendered.contains("Bitcoin"));
        assert!(rendered.contains("92.59%"));
        assert!(rendered.contains("7.41%"));
        assert!(rendered.contains("75000.00"));
    }

    #[test]
    fn test_display_cells_keep_label_arity() {
        let report = sample_report();
        assert_eq!(display_cells(&report.rows[0]).len(), REPORT_LABELS.len());
        assert_eq!(display_cells(&report.rows[1])[9], "3000.00");
        // Absent market cap stays blank rather than rendering as zero.
        assert_eq!(display_cells(&report.rows[1])[4], "");
    }
}
