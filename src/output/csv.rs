//! CSV report files.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tokio::fs;
use tracing::info;

use super::ReportWriter;
use crate::models::{PortfolioReport, REPORT_LABELS};

/// Writes one timestamped CSV file per report under the output directory.
///
/// Cells carry full-precision normalized decimals; display rounding belongs
/// to the table writer.
pub struct CsvReportWriter {
    output_dir: PathBuf,
}

impl CsvReportWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    /// File name derived from the report's generation time, so successive
    /// runs never clobber each other.
    fn file_name(report: &PortfolioReport) -> String {
        format!(
            "crypto_portfolio_report_{}.csv",
            report.generated_at.format("%Y%m%d_%H%M%S")
        )
    }

    fn render(report: &PortfolioReport) -> String {
        let mut lines = Vec::with_capacity(report.rows.len() + 1);
        lines.push(csv_line(REPORT_LABELS.iter().copied()));
        for row in &report.rows {
            lines.push(csv_line(row.values().iter().map(String::as_str)));
        }
        lines.join("\n") + "\n"
    }
}

fn csv_line<'a>(cells: impl Iterator<Item = &'a str>) -> String {
    cells.map(escape_field).collect::<Vec<_>>().join(",")
}

/// Quote a field when it contains a separator, quote, or newline.
fn escape_field(value: &str) -> String {
    if value.contains([',', '"', '\n']) {
        format!("\"{}\"", value.replace('"', "\"\""))
    } else {
        value.to_string()
    }
}

#[async_trait::async_trait]
impl ReportWriter for CsvReportWriter {
    async fn write(&self, report: &PortfolioReport) -> Result<()> {
        fs::create_dir_all(&self.output_dir).await.with_context(|| {
            format!(
                "Failed to create output directory: {}",
                self.output_dir.display()
            )
        })?;

        let path = self.output_dir.join(Self::file_name(report));
        fs::write(&path, Self::render(report))
            .await
            .with_context(|| format!("Failed to write report file: {}", path.display()))?;

        info!(path = %path.display(), rows = report.rows.len(), "Report written");
        Ok(())
    }
}
