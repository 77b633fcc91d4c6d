mod balance;
mod coin_info;
mod report;
mod symbol;

pub use balance::{AggregatedBalance, BalanceRecord};
pub use coin_info::CoinInfo;
pub use report::{PortfolioReport, ReportRow, REPORT_LABELS};
pub use symbol::{Symbol, SymbolError};
