//! Concurrent balance collection across all configured sources.

use std::sync::Arc;

use futures::future::join_all;
use tracing::{debug, info, warn};

use crate::models::BalanceRecord;
use crate::sources::BalanceSource;

/// Fans out to every source concurrently and gathers the results.
///
/// A source that errors (or panics) is recorded and skipped; it never aborts
/// the run or hides the other sources' balances.
pub struct BalanceCollector {
    sources: Vec<Arc<dyn BalanceSource>>,
}

/// What happened during one collection pass.
#[derive(Debug, Default)]
pub struct CollectOutcome {
    /// Every record from every source that responded, in source order.
    pub records: Vec<BalanceRecord>,
    /// Sources that returned at least one balance.
    pub collected: Vec<String>,
    /// Sources that responded with no balances.
    pub empty: Vec<String>,
    /// Sources that failed, with the reason.
    pub failed: Vec<(String, String)>,
}

impl BalanceCollector {
    pub fn new(sources: Vec<Arc<dyn BalanceSource>>) -> Self {
        Self { sources }
    }

    /// Fetch balances from every source.
    ///
    /// Sources run as separate tasks; results are folded back in the
    /// configured source order so output is deterministic regardless of which
    /// source answers first.
    pub async fn collect(&self) -> CollectOutcome {
        let mut names = Vec::with_capacity(self.sources.len());
        let mut handles = Vec::with_capacity(self.sources.len());
        for source in &self.sources {
            names.push(source.name().to_string());
            let source = Arc::clone(source);
            handles.push(tokio::spawn(async move { source.fetch_balances().await }));
        }

        let results = join_all(handles).await;

        let mut outcome = CollectOutcome::default();
        for (name, result) in names.into_iter().zip(results) {
            match result {
                Ok(Ok(records)) => {
                    if records.is_empty() {
                        debug!(source = %name, "Source reported no balances");
                        outcome.empty.push(name);
                    } else {
                        info!(source = %name, count = records.len(), "Collected balances");
                        outcome.records.extend(records);
                        outcome.collected.push(name);
                    }
                }
                Ok(Err(e)) => {
                    warn!(source = %name, error = %e, "Skipping unavailable source");
                    outcome.failed.push((name, e.to_string()));
                }
                Err(e) => {
                    warn!(source = %name, error = %e, "Source task panicked");
                    outcome.failed.push((name, e.to_string()));
                }
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use anyhow::{anyhow, Result};
    use rust_decimal_macros::dec;
    use tracing::field::{Field, Visit};
    use tracing::{span, Event, Level, Metadata, Subscriber};

    struct StubSource {
        name: String,
        records: Vec<BalanceRecord>,
    }

    impl StubSource {
        fn new(name: &str, records: Vec<BalanceRecord>) -> Arc<dyn BalanceSource> {
            Arc::new(Self {
                name: name.to_string(),
                records,
            })
        }
    }

    #[async_trait::async_trait]
    impl BalanceSource for StubSource {
        fn name(&self) -> &str {
            &self.name
        }

        async fn fetch_balances(&self) -> Result<Vec<BalanceRecord>> {
            Ok(self.records.clone())
        }
    }

    struct FailingSource;

    #[async_trait::async_trait]
    impl BalanceSource for FailingSource {
        fn name(&self) -> &str {
            "broken"
        }

        async fn fetch_balances(&self) -> Result<Vec<BalanceRecord>> {
            Err(anyhow!("connection refused"))
        }
    }

    /// Captures emitted events so tests can assert their levels.
    #[derive(Clone, Default)]
    struct LogRecorder {
        events: Arc<Mutex<Vec<(Level, String)>>>,
    }

    struct MessageVisitor(String);

    impl Visit for MessageVisitor {
        fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
            if field.name() == "message" {
                self.0 = format!("{value:?}");
            }
        }
    }

    impl Subscriber for LogRecorder {
        fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
            true
        }

        fn new_span(&self, _attrs: &span::Attributes<'_>) -> span::Id {
            span::Id::from_u64(1)
        }

        fn record(&self, _id: &span::Id, _values: &span::Record<'_>) {}

        fn record_follows_from(&self, _id: &span::Id, _follows: &span::Id) {}

        fn event(&self, event: &Event<'_>) {
            let mut visitor = MessageVisitor(String::new());
            event.record(&mut visitor);
            self.events
                .lock()
                .unwrap()
                .push((*event.metadata().level(), visitor.0));
        }

        fn enter(&self, _id: &span::Id) {}

        fn exit(&self, _id: &span::Id) {}
    }

    #[tokio::test]
    async fn test_collects_in_configured_order() {
        let collector = BalanceCollector::new(vec![
            StubSource::new(
                "binance",
                vec![BalanceRecord::new("binance", "BTC", dec!(1))],
            ),
            StubSource::new("kraken", vec![BalanceRecord::new("kraken", "ETH", dec!(2))]),
        ]);

        let outcome = collector.collect().await;

        assert_eq!(outcome.collected, vec!["binance", "kraken"]);
        assert_eq!(outcome.records.len(), 2);
        assert_eq!(outcome.records[0].source, "binance");
        assert_eq!(outcome.records[1].source, "kraken");
    }

    #[tokio::test]
    async fn test_failed_source_does_not_abort_the_rest() {
        let collector = BalanceCollector::new(vec![
            Arc::new(FailingSource),
            StubSource::new("manual", vec![BalanceRecord::new("manual", "ETH", dec!(2))]),
        ]);

        let outcome = collector.collect().await;

        assert_eq!(outcome.collected, vec!["manual"]);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.failed[0].0, "broken");
        assert!(outcome.failed[0].1.contains("connection refused"));
        assert_eq!(outcome.records.len(), 1);
    }

    #[tokio::test]
    async fn test_empty_source_is_reported_separately() {
        let collector = BalanceCollector::new(vec![StubSource::new("coinbase", Vec::new())]);

        let outcome = collector.collect().await;

        assert!(outcome.collected.is_empty());
        assert_eq!(outcome.empty, vec!["coinbase"]);
        assert!(outcome.records.is_empty());
    }

    #[tokio::test]
    async fn test_no_sources_gives_empty_outcome() {
        let collector = BalanceCollector::new(Vec::new());
        let outcome = collector.collect().await;

        assert!(outcome.records.is_empty());
        assert!(outcome.collected.is_empty());
        assert!(outcome.failed.is_empty());
    }

    #[tokio::test]
    async fn test_source_log_levels_match_outcomes() {
        let recorder = LogRecorder::default();
        let _guard = tracing::subscriber::set_default(recorder.clone());

        let collector = BalanceCollector::new(vec![
            StubSource::new(
                "binance",
                vec![BalanceRecord::new("binance", "BTC", dec!(1))],
            ),
            StubSource::new("coinbase", Vec::new()),
            Arc::new(FailingSource),
        ]);
        collector.collect().await;

        // A source that produced data reports at info so the default filter
        // shows it; only the empty case drops to debug.
        let events = recorder.events.lock().unwrap();
        let level_of = |message: &str| {
            events
                .iter()
                .find(|(_, recorded)| recorded == message)
                .map(|(level, _)| *level)
        };
        assert_eq!(level_of("Collected balances"), Some(Level::INFO));
        assert_eq!(level_of("Source reported no balances"), Some(Level::DEBUG));
        assert_eq!(level_of("Skipping unavailable source"), Some(Level::WARN));
    }
}
