//! Builds balance sources from configuration.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use secrecy::ExposeSecret;

use super::{BalanceSource, BinanceSource, CoinbaseSource, EthereumSource, ManualSource};
use crate::config::{ExchangeConfig, NetworkConfig, ResolvedConfig};
use crate::credentials::{get_required_secret, CredentialStore};

/// Which configured sources a run should include.
#[derive(Debug, Clone)]
pub struct SourceFilter {
    /// Exchange names to include; `None` means every configured exchange.
    pub exchanges: Option<Vec<String>>,
    /// Network names to include; `None` means every configured network.
    pub networks: Option<Vec<String>>,
    /// Include the manual holdings file when one is configured.
    pub include_manual: bool,
}

impl Default for SourceFilter {
    fn default() -> Self {
        Self::all()
    }
}

impl SourceFilter {
    /// Every configured source, manual holdings included.
    pub fn all() -> Self {
        Self {
            exchanges: None,
            networks: None,
            include_manual: true,
        }
    }

    fn includes(filter: &Option<Vec<String>>, name: &str) -> bool {
        match filter {
            None => true,
            Some(names) => names.iter().any(|n| n.eq_ignore_ascii_case(name)),
        }
    }
}

/// Build every source selected by the filter, in configuration order.
///
/// Exchanges come first, then networks, then the manual file. The collector
/// preserves this order in its output, which is what makes report runs
/// deterministic.
pub async fn build_sources(
    config: &ResolvedConfig,
    filter: &SourceFilter,
    credentials: &dyn CredentialStore,
) -> Result<Vec<Arc<dyn BalanceSource>>> {
    let exchange_names: Vec<&str> = config.exchanges.iter().map(ExchangeConfig::name).collect();
    let network_names: Vec<&str> = config.networks.iter().map(NetworkConfig::name).collect();
    ensure_all_matched(&filter.exchanges, &exchange_names, "exchange")?;
    ensure_all_matched(&filter.networks, &network_names, "network")?;

    let mut sources: Vec<Arc<dyn BalanceSource>> = Vec::new();

    for exchange in &config.exchanges {
        if !SourceFilter::includes(&filter.exchanges, exchange.name()) {
            continue;
        }
        sources.push(build_exchange(exchange, credentials).await?);
    }

    for network in &config.networks {
        if !SourceFilter::includes(&filter.networks, network.name()) {
            continue;
        }
        sources.push(build_network(network, credentials).await?);
    }

    if filter.include_manual {
        if let Some(manual) = &config.manual {
            sources.push(Arc::new(ManualSource::new(manual.path.clone())));
        }
    }

    Ok(sources)
}

/// Reject filter names that match nothing, so a typo doesn't silently produce
/// a report missing a source.
fn ensure_all_matched(requested: &Option<Vec<String>>, known: &[&str], kind: &str) -> Result<()> {
    let Some(requested) = requested else {
        return Ok(());
    };

    for name in requested {
        if !known.iter().any(|k| k.eq_ignore_ascii_case(name)) {
            bail!(
                "Unknown {kind} {:?} (configured: {})",
                name,
                if known.is_empty() {
                    "none".to_string()
                } else {
                    known.join(", ")
                }
            );
        }
    }

    Ok(())
}

async fn build_exchange(
    config: &ExchangeConfig,
    credentials: &dyn CredentialStore,
) -> Result<Arc<dyn BalanceSource>> {
    match config {
        ExchangeConfig::Binance {
            name,
            api_key_env,
            api_secret_env,
        } => {
            let api_key = get_required_secret(credentials, api_key_env)
                .await
                .with_context(|| format!("Cannot configure exchange {name}"))?;
            let api_secret = get_required_secret(credentials, api_secret_env)
                .await
                .with_context(|| format!("Cannot configure exchange {name}"))?;

            Ok(Arc::new(
                BinanceSource::new(api_key, api_secret).with_name(name.clone()),
            ))
        }
        ExchangeConfig::Coinbase {
            name,
            key_name_env,
            private_key_env,
        } => {
            let key_name = get_required_secret(credentials, key_name_env)
                .await
                .with_context(|| format!("Cannot configure exchange {name}"))?;
            let private_key = get_required_secret(credentials, private_key_env)
                .await
                .with_context(|| format!("Cannot configure exchange {name}"))?;

            Ok(Arc::new(
                CoinbaseSource::new(key_name.expose_secret().to_string(), private_key)
                    .with_name(name.clone()),
            ))
        }
    }
}

async fn build_network(
    config: &NetworkConfig,
    credentials: &dyn CredentialStore,
) -> Result<Arc<dyn BalanceSource>> {
    match config {
        NetworkConfig::Ethereum {
            name,
            addresses,
            api_key_env,
        } => {
            let api_key = get_required_secret(credentials, api_key_env)
                .await
                .with_context(|| format!("Cannot configure network {name}"))?;

            Ok(Arc::new(
                EthereumSource::new(addresses.clone(), api_key).with_name(name.clone()),
            ))
        }
    }
}
