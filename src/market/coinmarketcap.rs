//! CoinMarketCap market data provider.
//!
//! Uses the `/v2/cryptocurrency/quotes/latest` endpoint, which accepts a
//! comma-separated symbol batch and returns every listing known for each
//! symbol. One call serves a whole report run.

use std::collections::HashMap;

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use tracing::debug;

use super::CoinInfoProvider;
use crate::models::{CoinInfo, Symbol};

const CMC_API_BASE: &str = "https://pro-api.coinmarketcap.com";

/// CoinMarketCap quotes provider.
pub struct CoinMarketCapProvider {
    api_key: SecretString,
    base_url: String,
    client: Client,
}

/// `/v2/cryptocurrency/quotes/latest` response, keyed by requested symbol.
#[derive(Debug, Deserialize)]
struct QuotesResponse {
    data: HashMap<String, Vec<Listing>>,
}

#[derive(Debug, Deserialize)]
struct Listing {
    name: String,
    #[allow(dead_code)]
    symbol: String,
    #[serde(default)]
    is_active: Option<u8>,
    #[serde(default)]
    cmc_rank: Option<u32>,
    #[serde(default)]
    max_supply: Option<Decimal>,
    #[serde(default)]
    total_supply: Option<Decimal>,
    #[serde(default)]
    circulating_supply: Option<Decimal>,
    quote: HashMap<String, Quote>,
}

#[derive(Debug, Deserialize)]
struct Quote {
    #[serde(default)]
    price: Option<Decimal>,
    #[serde(default)]
    market_cap: Option<Decimal>,
}

impl CoinMarketCapProvider {
    /// Create a provider with the given API key.
    pub fn new(api_key: SecretString) -> Self {
        Self {
            api_key,
            base_url: CMC_API_BASE.to_string(),
            client: Client::new(),
        }
    }

    /// Override API base URL (useful for tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

/// Pick one listing per symbol and map it into `CoinInfo`.
///
/// CoinMarketCap may return several listings for one symbol (forks,
/// rebrands). The first active listing wins. Listings without a USD price
/// are skipped, so the symbol surfaces downstream as having no market data.
fn coin_info_from_quotes(response: QuotesResponse) -> HashMap<Symbol, CoinInfo> {
    let mut result = HashMap::new();

    for (raw_symbol, listings) in response.data {
        let symbol = Symbol::new(&raw_symbol);

        let listing = listings
            .into_iter()
            .find(|listing| listing.is_active.unwrap_or(1) == 1);

        let Some(listing) = listing else {
            debug!(symbol = %symbol, "No active listing for symbol");
            continue;
        };

        let usd = listing.quote.get("USD");
        let Some(price_usd) = usd.and_then(|quote| quote.price) else {
            debug!(symbol = %symbol, "No USD quote for symbol");
            continue;
        };
        let market_cap = usd.and_then(|quote| quote.market_cap);

        result.insert(
            symbol.clone(),
            CoinInfo {
                symbol,
                name: listing.name,
                rank: listing.cmc_rank,
                price_usd,
                market_cap,
                max_supply: listing.max_supply,
                total_supply: listing.total_supply,
                circulating_supply: listing.circulating_supply,
            },
        );
    }

    result
}

#[async_trait::async_trait]
impl CoinInfoProvider for CoinMarketCapProvider {
    async fn get_coin_info(&self, symbols: &[Symbol]) -> Result<HashMap<Symbol, CoinInfo>> {
        if symbols.is_empty() {
            return Ok(HashMap::new());
        }

        let joined = symbols
            .iter()
            .map(Symbol::as_str)
            .collect::<Vec<_>>()
            .join(",");

        // skip_invalid keeps one unknown symbol from failing the whole batch.
        let url = format!(
            "{}/v2/cryptocurrency/quotes/latest?symbol={}&skip_invalid=true",
            self.base_url, joined
        );

        let response = self
            .client
            .get(&url)
            .header("X-CMC_PRO_API_KEY", self.api_key.expose_secret())
            .header("Accept", "application/json")
            .send()
            .await
            .context("CoinMarketCap request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("CoinMarketCap API error: {} - {}", status, body));
        }

        let quotes: QuotesResponse = response
            .json()
            .await
            .context("Failed to parse CoinMarketCap response")?;

        Ok(coin_info_from_quotes(quotes))
    }

    fn name(&self) -> &str {
        "coinmarketcap"
    }
}
