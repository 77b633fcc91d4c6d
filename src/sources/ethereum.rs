//! Ethereum wallet source.
//!
//! Reads native ETH balances for a set of addresses from an Etherscan-style
//! API. Each address contributes its own record; repeated observations of ETH
//! are folded into one line by the aggregator.

use anyhow::{anyhow, Context, Result};
use reqwest::Client;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::BalanceSource;
use crate::models::{BalanceRecord, Symbol};

const ETHERSCAN_API_BASE: &str = "https://api.etherscan.io";

/// Balances arrive as integer wei; one ETH is 10^18 wei.
const WEI_SCALE: u32 = 18;

/// Ethereum address balance source.
pub struct EthereumSource {
    name: String,
    addresses: Vec<String>,
    api_key: SecretString,
    base_url: String,
    client: Client,
}

/// Etherscan response envelope. `result` is the wei amount as a string on
/// success, or an error description when `status` is not "1".
#[derive(Debug, Deserialize)]
struct BalanceResponse {
    status: String,
    message: String,
    result: String,
}

impl EthereumSource {
    /// Create a source reading the given addresses.
    pub fn new(addresses: Vec<String>, api_key: SecretString) -> Self {
        Self {
            name: "ethereum".to_string(),
            addresses,
            api_key,
            base_url: ETHERSCAN_API_BASE.to_string(),
            client: Client::new(),
        }
    }

    /// Override the label used in report rows and logs.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Override API base URL (useful for tests).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    async fn fetch_address_balance(&self, address: &str) -> Result<Decimal> {
        let url = format!(
            "{}/api?module=account&action=balance&address={}&tag=latest&apikey={}",
            self.base_url,
            address,
            self.api_key.expose_secret()
        );

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .context("Etherscan request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Etherscan API error: {} - {}", status, body));
        }

        let body: BalanceResponse = response
            .json()
            .await
            .context("Failed to parse Etherscan response")?;

        if body.status != "1" {
            return Err(anyhow!(
                "Etherscan error for {}: {} - {}",
                address,
                body.message,
                body.result
            ));
        }

        wei_to_eth(&body.result)
    }
}

/// Convert a wei amount (integer string) to ETH exactly.
fn wei_to_eth(wei: &str) -> Result<Decimal> {
    let wei: i128 = wei
        .trim()
        .parse()
        .with_context(|| format!("Invalid wei amount: {wei}"))?;
    let eth = Decimal::try_from_i128_with_scale(wei, WEI_SCALE)
        .with_context(|| format!("Wei amount out of range: {wei}"))?;
    Ok(eth.normalize())
}

#[async_trait::async_trait]
impl BalanceSource for EthereumSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_balances(&self) -> Result<Vec<BalanceRecord>> {
        let mut records = Vec::new();

        for address in &self.addresses {
            let balance = self.fetch_address_balance(address).await?;
            if balance.is_zero() {
                continue;
            }
            records.push(BalanceRecord::new(&self.name, Symbol::new("ETH"), balance));
        }

        Ok(records)
    }
}
