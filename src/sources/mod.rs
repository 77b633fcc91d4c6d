mod binance;
mod coinbase;
mod ethereum;
mod factory;
mod manual;

pub use binance::BinanceSource;
pub use coinbase::CoinbaseSource;
pub use ethereum::EthereumSource;
pub use factory::{build_sources, SourceFilter};
pub use manual::{ManualHoldingError, ManualSource};

use anyhow::Result;

use crate::models::BalanceRecord;

/// Trait for balance sources - reports current holdings from one place.
///
/// This is intentionally minimal. A source says what it holds right now;
/// everything else (aggregation, pricing, valuation) happens downstream.
#[async_trait::async_trait]
pub trait BalanceSource: Send + Sync {
    /// Configured label for this source, used in report rows and logs.
    fn name(&self) -> &str;

    /// Fetch every non-zero holding this source currently has.
    ///
    /// An account with no holdings returns `Ok` with an empty vec; `Err` is
    /// reserved for fetch failures (auth, network, bad payloads).
    async fn fetch_balances(&self) -> Result<Vec<BalanceRecord>>;
}
