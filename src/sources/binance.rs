//! Binance spot account source.
//!
//! Uses the signed `GET /api/v3/account` endpoint. Binance requires an
//! HMAC-SHA256 signature over the query string plus the API key in the
//! `X-MBX-APIKEY` header.

use anyhow::{anyhow, Context, Result};
use chrono::Utc;
use hmac::{Hmac, Mac};
use reqwest::Client;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use sha2::Sha256;

use super::BalanceSource;
use crate::models::{BalanceRecord, Symbol};

const BINANCE_API_BASE: &str = "https://api.binance.com";

type HmacSha256 = Hmac<Sha256>;

/// Binance spot account balance source.
pub struct BinanceSource {
    name: String,
    api_key: SecretString,
    api_secret: SecretString,
    base_url: String,
    client: Client,
}

/// Binance `/api/v3/account` response, reduced to what we read.
#[derive(Debug, Deserialize)]
struct AccountResponse {
    balances: Vec<AccountBalance>,
}

#[derive(Debug, Deserialize)]
struct AccountBalance {
    asset: String,
    free: Decimal,
    locked: Decimal,
}

impl BinanceSource {
    /// Create a source with explicit credentials.
    pub fn new(api_key: SecretString, api_secret: SecretString) -> Self {
        Self {
            name: "binance".to_string(),
            api_key,
            api_secret,
            base_url: BINANCE_API_BASE.to_string(),
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

    /// Sign a query string the way Binance expects: HMAC-SHA256 over the
    /// query, hex-encoded.
    fn sign(&self, query: &str) -> Result<String> {
        let mut mac = HmacSha256::new_from_slice(self.api_secret.expose_secret().as_bytes())
            .context("Invalid Binance API secret")?;
        mac.update(query.as_bytes());
        Ok(hex::encode(mac.finalize().into_bytes()))
    }

    async fn get_account(&self) -> Result<AccountResponse> {
        let query = format!("timestamp={}", Utc::now().timestamp_millis());
        let signature = self.sign(&query)?;
        let url = format!(
            "{}/api/v3/account?{}&signature={}",
            self.base_url, query, signature
        );

        let response = self
            .client
            .get(&url)
            .header("X-MBX-APIKEY", self.api_key.expose_secret())
            .send()
            .await
            .context("Binance request failed")?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Binance API error: {} - {}", status, body));
        }

        response
            .json()
            .await
            .context("Failed to parse Binance account response")
    }
}

#[async_trait::async_trait]
impl BalanceSource for BinanceSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_balances(&self) -> Result<Vec<BalanceRecord>> {
        let account = self.get_account().await?;

        let records = account
            .balances
            .into_iter()
            .filter_map(|entry| {
                // Funds locked in open orders still belong to the portfolio.
                let total = entry.free + entry.locked;
                if total.is_zero() {
                    return None;
                }
                Some(BalanceRecord::new(
                    &self.name,
                    Symbol::new(&entry.asset),
                    total,
                ))
            })
            .collect();

        Ok(records)
    }
}
