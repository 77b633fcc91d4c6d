use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// Default directory for generated report files.
fn default_output_dir() -> PathBuf {
    PathBuf::from("reports/portfolio")
}

fn default_binance_name() -> String {
    "binance".to_string()
}

fn default_binance_api_key_env() -> String {
    "BINANCE_API_KEY".to_string()
}

fn default_binance_api_secret_env() -> String {
    "BINANCE_API_SECRET".to_string()
}

fn default_coinbase_name() -> String {
    "coinbase".to_string()
}

fn default_coinbase_key_name_env() -> String {
    "COINBASE_KEY_NAME".to_string()
}

fn default_coinbase_private_key_env() -> String {
    "COINBASE_PRIVATE_KEY".to_string()
}

fn default_ethereum_name() -> String {
    "ethereum".to_string()
}

fn default_etherscan_api_key_env() -> String {
    "ETHERSCAN_API_KEY".to_string()
}

fn default_market_data_api_key_env() -> String {
    "COINMARKETCAP_API_KEY".to_string()
}

/// One configured exchange account (`[[exchange]]` entry).
///
/// Credentials never live in the config file; each entry names the
/// environment variables that hold them. `name` labels the source in report
/// rows and logs and must be unique when the same kind appears twice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ExchangeConfig {
    Binance {
        #[serde(default = "default_binance_name")]
        name: String,
        #[serde(default = "default_binance_api_key_env")]
        api_key_env: String,
        #[serde(default = "default_binance_api_secret_env")]
        api_secret_env: String,
    },
    Coinbase {
        #[serde(default = "default_coinbase_name")]
        name: String,
        #[serde(default = "default_coinbase_key_name_env")]
        key_name_env: String,
        #[serde(default = "default_coinbase_private_key_env")]
        private_key_env: String,
    },
}

impl ExchangeConfig {
    pub fn name(&self) -> &str {
        match self {
            Self::Binance { name, .. } | Self::Coinbase { name, .. } => name,
        }
    }
}

/// One configured blockchain wallet set (`[[network]]` entry).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum NetworkConfig {
    Ethereum {
        #[serde(default = "default_ethereum_name")]
        name: String,
        /// Wallet addresses to read.
        addresses: Vec<String>,
        #[serde(default = "default_etherscan_api_key_env")]
        api_key_env: String,
    },
}

impl NetworkConfig {
    pub fn name(&self) -> &str {
        match self {
            Self::Ethereum { name, .. } => name,
        }
    }
}

/// Manual holdings file settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManualConfig {
    /// Path to the holdings TOML file. If relative, resolved from the config
    /// file's directory.
    pub path: PathBuf,
}

/// Market data provider settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MarketDataConfig {
    /// Environment variable holding the CoinMarketCap API key.
    pub api_key_env: String,
}

impl Default for MarketDataConfig {
    fn default() -> Self {
        Self {
            api_key_env: default_market_data_api_key_env(),
        }
    }
}

/// Application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory where report files are written. If relative, resolved from
    /// the config file's directory.
    pub output_dir: PathBuf,

    /// Exchange accounts to query.
    #[serde(rename = "exchange")]
    pub exchanges: Vec<ExchangeConfig>,

    /// Blockchain wallets to query.
    #[serde(rename = "network")]
    pub networks: Vec<NetworkConfig>,

    /// Manual holdings file, if any.
    pub manual: Option<ManualConfig>,

    /// Market data provider settings.
    pub market_data: MarketDataConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output_dir: default_output_dir(),
            exchanges: Vec::new(),
            networks: Vec::new(),
            manual: None,
            market_data: MarketDataConfig::default(),
        }
    }
}

impl Config {
    /// Load config from a TOML file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Resolve relative paths against the config file's directory.
    pub fn resolve(self, config_dir: &Path) -> ResolvedConfig {
        ResolvedConfig {
            output_dir: resolve_path(&self.output_dir, config_dir),
            exchanges: self.exchanges,
            networks: self.networks,
            manual: self.manual.map(|manual| ManualConfig {
                path: resolve_path(&manual.path, config_dir),
            }),
            market_data: self.market_data,
        }
    }
}

fn resolve_path(path: &Path, config_dir: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        config_dir.join(path)
    }
}

/// Loaded configuration with resolved paths.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
    /// The resolved report output directory.
    pub output_dir: PathBuf,

    /// Exchange accounts to query.
    pub exchanges: Vec<ExchangeConfig>,

    /// Blockchain wallets to query.
    pub networks: Vec<NetworkConfig>,

    /// Manual holdings file, if any.
    pub manual: Option<ManualConfig>,

    /// Market data provider settings.
    pub market_data: MarketDataConfig,
}

/// Returns the default config file path.
///
/// Resolution order:
/// 1. `./cryptofolio.toml` if it exists in current directory
/// 2. `~/.config/cryptofolio/cryptofolio.toml` (XDG config directory)
pub fn default_config_path() -> PathBuf {
    let local_config = PathBuf::from("cryptofolio.toml");
    if local_config.exists() {
        return local_config;
    }

    // XDG config directory fallback
    if let Some(config_dir) = dirs::config_dir() {
        return config_dir.join("cryptofolio").join("cryptofolio.toml");
    }

    // Final fallback to local
    local_config
}

impl ResolvedConfig {
    /// Load and resolve config from a file path.
    ///
    /// Relative paths are resolved against the config file's parent directory.
    pub fn load(config_path: &Path) -> Result<Self> {
        let config_path = config_path
            .canonicalize()
            .with_context(|| format!("Config file not found: {}", config_path.display()))?;

        let config_dir = config_path
            .parent()
            .context("Config file has no parent directory")?;

        let config = Config::load(&config_path)?;
        Ok(config.resolve(config_dir))
    }

    /// Load config, falling back to defaults if the file doesn't exist.
    ///
    /// Without a config file there are no sources to query; the defaults
    /// still give the output directory a home next to the intended config
    /// location.
    pub fn load_or_default(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            Self::load(config_path)
        } else {
            // Resolve the config path relative to current directory
            let config_path = if config_path.is_relative() {
                std::env::current_dir()
                    .context("Failed to get current directory")?
                    .join(config_path)
            } else {
                config_path.to_path_buf()
            };

            let config_dir = config_path
                .parent()
                .context("Config path has no parent directory")?;

            Ok(Config::default().resolve(config_dir))
        }
    }
}
