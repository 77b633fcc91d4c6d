//! Report sinks.

mod csv;
#[cfg(feature = "cli")]
mod table;

pub use csv::CsvReportWriter;
#[cfg(feature = "cli")]
pub use table::TableReportWriter;

use anyhow::Result;

use crate::models::PortfolioReport;

/// Sink for a finished report.
///
/// Writers own presentation: rounding, layout, file naming. The rows they
/// receive are already in final order with the fixed column set.
#[async_trait::async_trait]
pub trait ReportWriter: Send + Sync {
    async fn write(&self, report: &PortfolioReport) -> Result<()>;
}
