// SPDX-FileCopyrightText: 2025 Joost van der Laan <joost@fashionunited.com>
//
// SPDX-License-Identifier: AGPL-3.0-only

use std::path::{Path, PathBuf};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{error, info};

use crate::api::HistoryScraper;
use crate::error::HistoryError;
use crate::models::{parse_history_document, HistorySnapshot};
use crate::report::{format_snapshots, write_pdf};
use crate::scheduler::ScheduledJob;
use crate::validator::validate_snapshots;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReportOutcome {
    Written { path: PathBuf, snapshots: usize },
    /// Rendering or writing the file failed; already logged.
    WriteFailed,
}

/// Fetch the rate history, validate it and render it into the report file.
pub struct HistoryReportPipeline {
    scraper: Arc<dyn HistoryScraper>,
    output_path: PathBuf,
}

impl HistoryReportPipeline {
    pub fn new(scraper: Arc<dyn HistoryScraper>, output_path: impl Into<PathBuf>) -> Self {
        Self {
            scraper,
            output_path: output_path.into(),
        }
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    /// Parsed history, ordered by date, with every entry validated.
    pub async fn fetch_snapshots(&self) -> Result<Vec<HistorySnapshot>, HistoryError> {
        let raw = self.scraper.fetch_history().await?;
        let snapshots = parse_history_document(&raw)?;
        validate_snapshots(&snapshots)?;
        Ok(snapshots)
    }

    /// Fetch and validation errors propagate; failing to write the file does not.
    pub async fn run(&self) -> Result<ReportOutcome, HistoryError> {
        let snapshots = self.fetch_snapshots().await?;
        let text = format_snapshots(&snapshots);

        match write_pdf(&self.output_path, &text) {
            Ok(()) => {
                info!(
                    "✅ History report with {} snapshots written to {}",
                    snapshots.len(),
                    self.output_path.display()
                );
                Ok(ReportOutcome::Written {
                    path: self.output_path.clone(),
                    snapshots: snapshots.len(),
                })
            }
            Err(e) => {
                error!("Failed to write history report: {:#}", e);
                Ok(ReportOutcome::WriteFailed)
            }
        }
    }
}

#[async_trait]
impl ScheduledJob for HistoryReportPipeline {
    fn name(&self) -> &str {
        "history-report"
    }

    async fn run(&self) -> anyhow::Result<()> {
        HistoryReportPipeline::run(self).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::MockHistoryScraper;
    use crate::error::ScrapeError;
    use crate::report::parse_report;
    use anyhow::Result;
    use lopdf::Document;
    use std::fs;

    const HISTORY: &str = r#"{
        "amount": 1.0,
        "base": "EUR",
        "start_date": "2025-01-02",
        "end_date": "2025-01-03",
        "rates": {
            "2025-01-02": {"GBP": 0.8297, "USD": 1.0321},
            "2025-01-03": {"GBP": 0.8314, "USD": 1.0299}
        }
    }"#;

    fn scraper_returning(body: &'static str) -> MockHistoryScraper {
        let mut scraper = MockHistoryScraper::new();
        scraper
            .expect_fetch_history()
            .times(1)
            .returning(move || Ok(body.to_string()));
        scraper
    }

    #[tokio::test]
    async fn test_run_writes_report() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("history.pdf");
        let pipeline = HistoryReportPipeline::new(Arc::new(scraper_returning(HISTORY)), &path);

        let outcome = pipeline.run().await?;

        assert_eq!(
            outcome,
            ReportOutcome::Written {
                path: path.clone(),
                snapshots: 2
            }
        );
        let doc = Document::load(&path)?;
        assert_eq!(doc.get_pages().len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn test_fetch_snapshots_matches_report_text() -> Result<()> {
        let pipeline = HistoryReportPipeline::new(
            Arc::new(scraper_returning(HISTORY)),
            "unused.pdf",
        );

        let snapshots = pipeline.fetch_snapshots().await?;
        let text = format_snapshots(&snapshots);

        assert!(text.starts_with("2025-01-02\nGBP - 0.8297\nUSD - 1.0321\n\n"));
        assert_eq!(parse_report(&text)?, snapshots);
        Ok(())
    }

    #[tokio::test]
    async fn test_run_propagates_scrape_errors() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("history.pdf");
        let mut scraper = MockHistoryScraper::new();
        scraper
            .expect_fetch_history()
            .returning(|| Err(ScrapeError::Source("timeout".to_string())));
        let pipeline = HistoryReportPipeline::new(Arc::new(scraper), &path);

        assert!(matches!(pipeline.run().await, Err(HistoryError::Scrape(_))));
        assert!(!path.exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_run_rejects_invalid_history_and_keeps_old_report() -> Result<()> {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("history.pdf");
        fs::write(&path, "previous report")?;
        let body = r#"{"base": "EUR", "rates": {"2025-01-02": {"USD": 1.03, "GBP": -0.8}}}"#;
        let pipeline = HistoryReportPipeline::new(Arc::new(scraper_returning(body)), &path);

        match pipeline.run().await {
            Err(HistoryError::Validation(err)) => assert_eq!(err.code, "GBP"),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(fs::read_to_string(&path)?, "previous report");
        Ok(())
    }

    #[tokio::test]
    async fn test_run_rejects_unparseable_history() {
        let pipeline = HistoryReportPipeline::new(
            Arc::new(scraper_returning("<html>maintenance</html>")),
            "unused.pdf",
        );
        assert!(matches!(pipeline.run().await, Err(HistoryError::Parse(_))));
    }

    #[tokio::test]
    async fn test_run_swallows_write_errors() -> Result<()> {
        let dir = tempfile::tempdir()?;
        // A directory sits where the report file should go
        let path = dir.path().join("history.pdf");
        fs::create_dir(&path)?;
        let pipeline = HistoryReportPipeline::new(Arc::new(scraper_returning(HISTORY)), &path);

        assert_eq!(pipeline.run().await?, ReportOutcome::WriteFailed);
        Ok(())
    }
}
