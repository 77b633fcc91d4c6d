use std::collections::HashMap;

use anyhow::Result;

use crate::models::{CoinInfo, Symbol};

/// Trait for market data providers - resolves coin metadata by symbol.
#[async_trait::async_trait]
pub trait CoinInfoProvider: Send + Sync {
    /// Fetch metadata for the given symbols in one batch.
    ///
    /// Symbols the provider does not know are simply absent from the result;
    /// only a wholesale failure (network, auth) is an error.
    async fn get_coin_info(&self, symbols: &[Symbol]) -> Result<HashMap<Symbol, CoinInfo>>;

    fn name(&self) -> &str;
}

/// Provider that knows nothing. Reports still render, with blank market
/// columns and zero valuations.
pub struct NoopProvider;

#[async_trait::async_trait]
impl CoinInfoProvider for NoopProvider {
    async fn get_coin_info(&self, _symbols: &[Symbol]) -> Result<HashMap<Symbol, CoinInfo>> {
        Ok(HashMap::new())
    }

    fn name(&self) -> &str {
        "noop"
    }
}
