//! Report pipeline facade.

use std::sync::Arc;

use anyhow::Result;
use tracing::info;

use crate::market::{CoinInfoProvider, NoopProvider};
use crate::models::{PortfolioReport, Symbol};
use crate::sources::BalanceSource;

use super::{aggregate_balances, build_report, BalanceCollector, MarketEnricher};

/// Wires the pipeline stages into a single report run: collect balances from
/// every source, fold them per symbol, resolve market data, derive values.
///
/// The provider defaults to [`NoopProvider`], which prices nothing; callers
/// that want a valued report attach a real provider with
/// [`with_provider`](Self::with_provider).
pub struct PortfolioService {
    collector: BalanceCollector,
    enricher: MarketEnricher,
}

impl PortfolioService {
    pub fn new(sources: Vec<Arc<dyn BalanceSource>>) -> Self {
        Self {
            collector: BalanceCollector::new(sources),
            enricher: MarketEnricher::new(Arc::new(NoopProvider)),
        }
    }

    pub fn with_provider(mut self, provider: Arc<dyn CoinInfoProvider>) -> Self {
        self.enricher = MarketEnricher::new(provider);
        self
    }

    /// Run the full pipeline once and hand back the assembled report.
    pub async fn generate_report(&self) -> Result<PortfolioReport> {
        let outcome = self.collector.collect().await;
        info!(
            records = outcome.records.len(),
            collected = outcome.collected.len(),
            empty = outcome.empty.len(),
            failed = outcome.failed.len(),
            "Balance collection complete"
        );

        let aggregates = aggregate_balances(outcome.records);
        info!(assets = aggregates.len(), "Balances aggregated");

        let symbols: Vec<Symbol> = aggregates
            .iter()
            .map(|aggregate| aggregate.symbol.clone())
            .collect();
        let coin_info = self.enricher.enrich(&symbols).await?;

        let report = build_report(aggregates, &coin_info);
        info!(
            rows = report.rows.len(),
            total_value_usd = %report.total_value_usd,
            "Report assembled"
        );

        Ok(report)
    }
}
