mod coinmarketcap;
mod provider;

pub use coinmarketcap::CoinMarketCapProvider;
pub use provider::{CoinInfoProvider, NoopProvider};
