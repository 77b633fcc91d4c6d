//! Market data lookup for the aggregated symbol set.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{debug, info, warn};

use crate::market::CoinInfoProvider;
use crate::models::{CoinInfo, Symbol};

/// Resolves market data for every distinct symbol in the portfolio.
///
/// One provider call serves a whole report run; nothing is cached across
/// runs, so every report reflects current quotes.
pub struct MarketEnricher {
    provider: Arc<dyn CoinInfoProvider>,
}

impl MarketEnricher {
    pub fn new(provider: Arc<dyn CoinInfoProvider>) -> Self {
        Self { provider }
    }

    /// Look up coin info for the given symbols in one batch.
    ///
    /// Symbols the provider does not know stay absent from the result and the
    /// corresponding rows render unpriced. A wholesale provider failure is
    /// fatal: a report where every value silently reads zero is worse than no
    /// report at all.
    pub async fn enrich(&self, symbols: &[Symbol]) -> Result<HashMap<Symbol, CoinInfo>> {
        if symbols.is_empty() {
            debug!("No symbols to look up; skipping market data call");
            return Ok(HashMap::new());
        }

        let mut info = self
            .provider
            .get_coin_info(symbols)
            .await
            .with_context(|| format!("Market data lookup failed ({})", self.provider.name()))?;

        // A misbehaving provider must not smuggle extra rows into the report.
        let requested: HashSet<&Symbol> = symbols.iter().collect();
        info.retain(|symbol, _| {
            let keep = requested.contains(symbol);
            if !keep {
                warn!(symbol = %symbol, "Dropping unrequested symbol from market data");
            }
            keep
        });

        for symbol in symbols {
            if !info.contains_key(symbol) {
                debug!(symbol = %symbol, "No market data for symbol");
            }
        }

        info!(
            requested = symbols.len(),
            resolved = info.len(),
            provider = self.provider.name(),
            "Market data lookup complete"
        );

        Ok(info)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, bail};
    use rust_decimal::Decimal;
    use rust_decimal_macros::dec;

    struct FixedProvider {
        info: Vec<CoinInfo>,
    }

    #[async_trait::async_trait]
    impl CoinInfoProvider for FixedProvider {
        fn name(&self) -> &str {
            "fixed"
        }

        async fn get_coin_info(&self, _symbols: &[Symbol]) -> Result<HashMap<Symbol, CoinInfo>> {
            Ok(self
                .info
                .iter()
                .map(|info| (info.symbol.clone(), info.clone()))
                .collect())
        }
    }

    struct FailingProvider;

    #[async_trait::async_trait]
    impl CoinInfoProvider for FailingProvider {
        fn name(&self) -> &str {
            "failing"
        }

        async fn get_coin_info(&self, _symbols: &[Symbol]) -> Result<HashMap<Symbol, CoinInfo>> {
            Err(anyhow!("quota exceeded"))
        }
    }

    /// Fails the test if the provider is consulted at all.
    struct UnreachableProvider;

    #[async_trait::async_trait]
    impl CoinInfoProvider for UnreachableProvider {
        fn name(&self) -> &str {
            "unreachable"
        }

        async fn get_coin_info(&self, _symbols: &[Symbol]) -> Result<HashMap<Symbol, CoinInfo>> {
            bail!("provider should not have been called")
        }
    }

    fn coin(symbol: &str, price: Decimal) -> CoinInfo {
        CoinInfo {
            symbol: Symbol::new(symbol),
            name: symbol.to_string(),
            rank: None,
            price_usd: price,
            market_cap: None,
            max_supply: None,
            total_supply: None,
            circulating_supply: None,
        }
    }

    #[tokio::test]
    async fn test_empty_symbol_set_skips_the_provider() {
        let enricher = MarketEnricher::new(Arc::new(UnreachableProvider));

        let info = enricher.enrich(&[]).await.unwrap();
        assert!(info.is_empty());
    }

    #[tokio::test]
    async fn test_missing_symbols_are_tolerated() {
        let enricher = MarketEnricher::new(Arc::new(FixedProvider {
            info: vec![coin("BTC", dec!(50000))],
        }));

        let symbols = [Symbol::new("BTC"), Symbol::new("XYZ")];
        let info = enricher.enrich(&symbols).await.unwrap();

        assert_eq!(info.len(), 1);
        assert!(info.contains_key(&Symbol::new("BTC")));
        assert!(!info.contains_key(&Symbol::new("XYZ")));
    }

    #[tokio::test]
    async fn test_unrequested_symbols_are_dropped() {
        let enricher = MarketEnricher::new(Arc::new(FixedProvider {
            info: vec![coin("BTC", dec!(50000)), coin("DOGE", dec!(0.1))],
        }));

        let symbols = [Symbol::new("BTC")];
        let info = enricher.enrich(&symbols).await.unwrap();

        assert_eq!(info.keys().collect::<Vec<_>>(), vec![&Symbol::new("BTC")]);
    }

    #[tokio::test]
    async fn test_provider_failure_is_fatal() {
        let enricher = MarketEnricher::new(Arc::new(FailingProvider));

        let err = enricher
            .enrich(&[Symbol::new("BTC")])
            .await
            .unwrap_err()
            .to_string();
        assert!(err.contains("Market data lookup failed"));
    }
}
