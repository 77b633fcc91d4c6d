//! The report pipeline: collect, aggregate, enrich, value.

mod aggregator;
mod collector;
mod enricher;
mod service;
mod valuation;

pub use aggregator::aggregate_balances;
pub use collector::{BalanceCollector, CollectOutcome};
pub use enricher::MarketEnricher;
pub use service::PortfolioService;
pub use valuation::build_report;
