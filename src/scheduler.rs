use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use crate::config::SchedulerConfig;
use crate::extractor::ProductExtractor;
use crate::models::{PollState, Product, StatusReport};
use crate::plugins::traits::{NotifierPlugin, StatusReporter};
use crate::scraper::{fetch_products, PageFetcher};

/// What one cycle did. The state handed back alongside it is already the
/// state for the next cycle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CycleOutcome {
    /// No previous baseline, so nothing was announced.
    Baseline { total: usize },
    Unchanged { total: usize },
    Notified { total: usize, new: usize },
    /// State still advanced; the delta is not announced again.
    NotifyFailed { total: usize, new: usize, error: String },
    /// Fetch or extraction failed; state untouched.
    Failed { error: String },
    /// Shutdown interrupted the fetch; state untouched.
    Cancelled,
}

impl CycleOutcome {
    pub fn fetched(&self) -> bool {
        !matches!(self, CycleOutcome::Failed { .. } | CycleOutcome::Cancelled)
    }
}

/// Result of comparing a fresh product list with the previous state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollDiff {
    pub next: PollState,
    pub new_products: Vec<Product>,
    pub total: usize,
    /// False whenever there was no baseline to compare against.
    pub notify: bool,
}

impl PollDiff {
    pub fn compute(previous: &PollState, current: &[Product]) -> Self {
        let new_products = previous.new_products(current);
        let notify = !previous.is_empty() && !new_products.is_empty();

        Self {
            next: PollState::from_products(current),
            new_products,
            total: current.len(),
            notify,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct WatcherStats {
    pub cycles: u64,
    pub succeeded: u64,
    pub failed: u64,
    pub notifications_sent: u64,
    pub notification_failures: u64,
    pub last_run: Option<DateTime<Utc>>,
    pub last_error: Option<String>,
}

/// Drives fetch, diff and notify on a fixed interval. Owns the only copy of
/// the previous poll's result; cycles never overlap.
pub struct PollLoop {
    fetcher: Box<dyn PageFetcher>,
    extractor: ProductExtractor,
    notifier: Box<dyn NotifierPlugin>,
    reporter: Box<dyn StatusReporter>,
    config: SchedulerConfig,
    friendly_name: String,
    stats: WatcherStats,
}

impl PollLoop {
    pub fn new(
        fetcher: Box<dyn PageFetcher>,
        extractor: ProductExtractor,
        notifier: Box<dyn NotifierPlugin>,
        reporter: Box<dyn StatusReporter>,
        config: SchedulerConfig,
        friendly_name: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            extractor,
            notifier,
            reporter,
            config,
            friendly_name: friendly_name.into(),
            stats: WatcherStats::default(),
        }
    }

    pub fn stats(&self) -> &WatcherStats {
        &self.stats
    }

    /// Runs until `cancel` fires. A cancellation that arrives mid-cycle is
    /// observed by the fetch; notify and report finish on their own timeouts.
    pub async fn run(mut self, cancel: CancellationToken) -> WatcherStats {
        let period = Duration::from_secs(self.config.interval_secs);
        let first = if self.config.check_on_start {
            Instant::now()
        } else {
            Instant::now() + period
        };
        let mut ticker = tokio::time::interval_at(first, period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            "Poll loop started (every {}s, notifier: {})",
            period.as_secs(),
            self.notifier.name()
        );

        let mut state = PollState::new();
        loop {
            tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    tracing::info!("Stopping poll loop");
                    break;
                }
                _ = ticker.tick() => {
                    let (next, outcome) = self.run_cycle(state, &cancel).await;
                    state = next;
                    tracing::debug!(?outcome, known = state.len(), "Cycle finished");
                }
            }
        }

        if let Err(e) = self.notifier.shutdown().await {
            tracing::warn!("Error shutting down notifier {}: {}", self.notifier.plugin_type(), e);
        }

        tracing::info!(
            "Poll loop stopped after {} cycles ({} failed, {} notifications)",
            self.stats.cycles,
            self.stats.failed,
            self.stats.notifications_sent
        );
        self.stats
    }

    /// One fetch, diff and notify pass. Takes the previous state by value and
    /// returns the state for the next cycle.
    pub async fn run_cycle(&mut self, state: PollState, cancel: &CancellationToken) -> (PollState, CycleOutcome) {
        self.stats.cycles += 1;
        self.stats.last_run = Some(Utc::now());

        tracing::info!("Checking page...");
        self.report(StatusReport::checking(&self.friendly_name, Utc::now())).await;

        let products = match fetch_products(self.fetcher.as_ref(), &self.extractor, cancel).await {
            Ok(products) => products,
            Err(e) if cancel.is_cancelled() => {
                tracing::debug!("Fetch interrupted by shutdown: {}", e);
                return (state, CycleOutcome::Cancelled);
            }
            Err(e) => {
                tracing::error!(kind = e.kind(), "Could not get products: {}", e);
                self.stats.failed += 1;
                self.stats.last_error = Some(e.to_string());
                self.report(StatusReport::error(&self.friendly_name, Utc::now(), &e.to_string()))
                    .await;
                return (state, CycleOutcome::Failed { error: e.to_string() });
            }
        };

        self.stats.succeeded += 1;
        let diff = PollDiff::compute(&state, &products);
        tracing::info!(total = diff.total, new = diff.new_products.len(), "Fetched products");

        let outcome = if state.is_empty() {
            if !diff.new_products.is_empty() {
                tracing::info!("First successful poll, recording {} products as baseline", diff.total);
            }
            CycleOutcome::Baseline { total: diff.total }
        } else if !diff.notify {
            CycleOutcome::Unchanged { total: diff.total }
        } else {
            self.announce(&diff).await
        };

        self.report(StatusReport::idle(&self.friendly_name, Utc::now(), diff.total))
            .await;

        (diff.next, outcome)
    }

    async fn announce(&mut self, diff: &PollDiff) -> CycleOutcome {
        let new = diff.new_products.len();
        match self.notifier.notify(&diff.new_products).await {
            Ok(result) => {
                self.stats.notifications_sent += 1;
                tracing::info!(
                    "Notification sent for {} new products ({:?})",
                    new,
                    result.message_id
                );
                CycleOutcome::Notified { total: diff.total, new }
            }
            Err(e) => {
                self.stats.notification_failures += 1;
                self.stats.last_error = Some(e.to_string());
                tracing::error!(
                    kind = e.kind(),
                    "Could not notify of {} new products, they will not be announced again: {}",
                    new,
                    e
                );
                CycleOutcome::NotifyFailed {
                    total: diff.total,
                    new,
                    error: e.to_string(),
                }
            }
        }
    }

    async fn report(&self, report: StatusReport) {
        if let Err(e) = self.reporter.report(&report).await {
            tracing::warn!("Failed to report state '{}': {}", report.state.as_str(), e);
        }
    }
}
