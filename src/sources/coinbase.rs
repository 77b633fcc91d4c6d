//! Coinbase CDP API source.
//!
//! Uses Coinbase's CDP API with per-request JWT authentication. Every
//! brokerage account with a positive available balance becomes one record, so
//! two accounts holding the same currency contribute two observations from
//! the same source.

use anyhow::{Context, Result};
use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use chrono::Utc;
use p256::ecdsa::{signature::Signer, Signature, SigningKey};
use p256::SecretKey;
use reqwest::Client;
use rust_decimal::Decimal;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::BalanceSource;
use crate::models::{BalanceRecord, Symbol};

const CDP_API_BASE: &str = "https://api.coinbase.com";

/// Coinbase CDP API balance source.
pub struct CoinbaseSource {
    name: String,
    key_name: String,
    private_key_pem: SecretString,
    base_url: String,
    client: Client,
}

#[derive(Debug, Serialize)]
struct JwtClaims {
    sub: String,
    iss: String,
    nbf: i64,
    exp: i64,
    uri: String,
}

#[derive(Debug, Deserialize)]
struct AccountsResponse {
    accounts: Vec<CoinbaseAccount>,
    #[serde(default)]
    cursor: Option<String>,
    #[serde(default)]
    has_next: bool,
}

#[derive(Debug, Deserialize)]
struct CoinbaseAccount {
    #[allow(dead_code)]
    name: String,
    currency: String,
    available_balance: CoinbaseBalance,
}

#[derive(Debug, Deserialize)]
struct CoinbaseBalance {
    value: Decimal,
    #[allow(dead_code)]
    currency: String,
}

impl CoinbaseSource {
    /// Create a source with explicit credentials.
    pub fn new(key_name: String, private_key_pem: SecretString) -> Self {
        Self {
            name: "coinbase".to_string(),
            key_name,
            private_key_pem,
            base_url: CDP_API_BASE.to_string(),
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

    fn generate_jwt(&self, method: &str, path: &str) -> Result<String> {
        let now = Utc::now().timestamp();
        let host = self
            .base_url
            .replace("https://", "")
            .replace("http://", "");
        let uri = format!("{} {}{}", method, host, path);

        let claims = JwtClaims {
            sub: self.key_name.clone(),
            iss: "cdp".to_string(),
            nbf: now,
            exp: now + 120, // 2 minute expiry
            uri,
        };

        let header = serde_json::json!({
            "alg": "ES256",
            "typ": "JWT",
            "kid": self.key_name,
            "nonce": format!("{:x}", rand::random::<u64>())
        });

        let header_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_string(&header)?);
        let claims_b64 = URL_SAFE_NO_PAD.encode(serde_json::to_string(&claims)?);
        let message = format!("{}.{}", header_b64, claims_b64);

        // Parse the EC private key (SEC1 format)
        let secret_key = SecretKey::from_sec1_pem(self.private_key_pem.expose_secret())
            .context("Failed to parse EC private key")?;
        let signing_key = SigningKey::from(&secret_key);

        let signature: Signature = signing_key.sign(message.as_bytes());
        let sig_b64 = URL_SAFE_NO_PAD.encode(signature.to_bytes());

        Ok(format!("{}.{}", message, sig_b64))
    }

    async fn get<T: for<'de> Deserialize<'de>>(&self, path: &str) -> Result<T> {
        let jwt = self.generate_jwt("GET", path)?;
        let url = format!("{}{}", self.base_url, path);

        let response = self
            .client
            .get(&url)
            .header("Authorization", format!("Bearer {}", jwt))
            .header("Content-Type", "application/json")
            .send()
            .await
            .context("HTTP request failed")?;

        let status = response.status();
        let body = response
            .text()
            .await
            .context("Failed to read response body")?;

        if !status.is_success() {
            anyhow::bail!("Coinbase API request failed ({}): {}", status, body);
        }

        serde_json::from_str(&body).context("Failed to parse Coinbase response")
    }

    async fn get_accounts(&self) -> Result<Vec<CoinbaseAccount>> {
        let mut accounts = Vec::new();
        let mut cursor: Option<String> = None;

        loop {
            let path = match &cursor {
                Some(cursor) => format!("/api/v3/brokerage/accounts?cursor={}", cursor),
                None => "/api/v3/brokerage/accounts".to_string(),
            };

            let response: AccountsResponse = self.get(&path).await?;
            accounts.extend(response.accounts);

            let next = response.cursor.filter(|c| !c.is_empty());
            match (response.has_next, next) {
                (true, Some(next)) => cursor = Some(next),
                _ => break,
            }
        }

        Ok(accounts)
    }
}

#[async_trait::async_trait]
impl BalanceSource for CoinbaseSource {
    fn name(&self) -> &str {
        &self.name
    }

    async fn fetch_balances(&self) -> Result<Vec<BalanceRecord>> {
        let accounts = self.get_accounts().await?;

        let records = accounts
            .into_iter()
            .filter(|account| account.available_balance.value > Decimal::ZERO)
            .map(|account| {
                BalanceRecord::new(
                    &self.name,
                    Symbol::new(&account.currency),
                    account.available_balance.value,
                )
            })
            .collect();

        Ok(records)
    }
}
