use std::collections::HashMap;

use cryptofolio::models::{AggregatedBalance, BalanceRecord, CoinInfo, Symbol};
use cryptofolio::portfolio::{aggregate_balances, build_report};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn record(source: &str, symbol: &str, balance: Decimal) -> BalanceRecord {
    BalanceRecord::new(source, Symbol::new(symbol), balance)
}

fn coin(symbol: &str, price: Decimal) -> CoinInfo {
    CoinInfo {
        symbol: Symbol::new(symbol),
        name: format!("{symbol} Coin"),
        rank: None,
        price_usd: price,
        market_cap: None,
        max_supply: None,
        total_supply: None,
        circulating_supply: None,
    }
}

fn info_map(coins: Vec<CoinInfo>) -> HashMap<Symbol, CoinInfo> {
    coins
        .into_iter()
        .map(|coin| (coin.symbol.clone(), coin))
        .collect()
}

fn total_of(aggregates: &[AggregatedBalance]) -> Decimal {
    aggregates.iter().map(|aggregate| aggregate.balance).sum()
}

#[test]
fn aggregation_conserves_balances_regardless_of_order() {
    let records = vec![
        record("binance", "BTC", dec!(1.0)),
        record("kraken", "BTC", dec!(0.5)),
        record("manual", "ETH", dec!(2.0)),
        record("wallet1", "ETH", dec!(0.125)),
        record("wallet1", "ADA", dec!(300)),
    ];
    let input_total: Decimal = records.iter().map(|r| r.balance).sum();

    let forward = aggregate_balances(records.clone());
    let mut reversed_input = records;
    reversed_input.reverse();
    let reversed = aggregate_balances(reversed_input);

    assert_eq!(total_of(&forward), input_total);
    assert_eq!(forward, reversed);
}

#[test]
fn repeated_source_observations_dedupe_in_the_source_set() {
    let aggregates = aggregate_balances(vec![
        record("coinbase", "BTC", dec!(0.05)),
        record("coinbase", "BTC", dec!(1.2)),
        record("binance", "BTC", dec!(0.25)),
    ]);

    assert_eq!(aggregates.len(), 1);
    let btc = &aggregates[0];
    assert_eq!(btc.balance, dec!(1.5));
    assert_eq!(btc.sources.len(), 2);
    assert!(btc.sources.contains("coinbase"));
    assert!(btc.sources.contains("binance"));
}

#[test]
fn aggregates_come_out_in_symbol_order() {
    let aggregates = aggregate_balances(vec![
        record("a", "ZEC", dec!(1)),
        record("a", "ADA", dec!(1)),
        record("a", "BTC", dec!(1)),
    ]);

    let symbols: Vec<&str> = aggregates
        .iter()
        .map(|aggregate| aggregate.symbol.as_str())
        .collect();
    assert_eq!(symbols, vec!["ADA", "BTC", "ZEC"]);
}

#[test]
fn percentages_sum_to_one_for_priced_portfolios() {
    let aggregates = aggregate_balances(vec![
        record("binance", "BTC", dec!(0.7)),
        record("kraken", "ETH", dec!(11)),
        record("manual", "ADA", dec!(12345.678)),
    ]);
    let info = info_map(vec![
        coin("BTC", dec!(63211.77)),
        coin("ETH", dec!(3456.78)),
        coin("ADA", dec!(0.4321)),
    ]);

    let report = build_report(aggregates, &info);

    let sum: Decimal = report
        .rows
        .iter()
        .map(|row| row.portfolio_percentage)
        .sum();
    assert!(
        (Decimal::ONE - sum).abs() < dec!(0.000000001),
        "percentages summed to {sum}"
    );
}

#[test]
fn every_aggregate_lands_in_exactly_one_row() {
    let aggregates = aggregate_balances(vec![
        record("binance", "BTC", dec!(1)),
        record("wallet1", "XYZ", dec!(10)),
        record("manual", "ETH", dec!(2)),
    ]);
    let info = info_map(vec![coin("BTC", dec!(50000))]);

    let report = build_report(aggregates, &info);

    let symbols: Vec<&str> = report.rows.iter().map(|row| row.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["BTC", "ETH", "XYZ"]);
}

#[test]
fn unheld_market_data_never_leaks_into_the_report() {
    let aggregates = aggregate_balances(vec![record("binance", "BTC", dec!(1))]);
    let info = info_map(vec![coin("BTC", dec!(50000)), coin("DOGE", dec!(0.1))]);

    let report = build_report(aggregates, &info);

    assert_eq!(report.rows.len(), 1);
    assert_eq!(report.rows[0].symbol, Symbol::new("BTC"));
}

#[test]
fn aggregation_is_idempotent_for_equal_inputs() {
    let records = vec![
        record("binance", "BTC", dec!(1.0)),
        record("kraken", "BTC", dec!(0.5)),
        record("manual", "ETH", dec!(2.0)),
    ];

    assert_eq!(
        aggregate_balances(records.clone()),
        aggregate_balances(records)
    );
}

#[test]
fn zero_balance_records_still_aggregate_exactly() {
    let aggregates = aggregate_balances(vec![
        record("binance", "DUST", dec!(0.000000000000000001)),
        record("kraken", "DUST", dec!(0.000000000000000002)),
    ]);

    assert_eq!(aggregates.len(), 1);
    assert_eq!(aggregates[0].balance, dec!(0.000000000000000003));
}
