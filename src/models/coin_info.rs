use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::Symbol;

/// Market metadata for one coin, as resolved by a market data provider.
///
/// All monetary figures are denominated in USD. Fields the provider does not
/// know for a coin are `None` and render as blank report cells.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CoinInfo {
    pub symbol: Symbol,
    pub name: String,
    pub rank: Option<u32>,
    pub price_usd: Decimal,
    pub market_cap: Option<Decimal>,
    pub max_supply: Option<Decimal>,
    pub total_supply: Option<Decimal>,
    pub circulating_supply: Option<Decimal>,
}
