use rand::Rng;
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use crate::config::{AppConfig, RetailerConfig, WatcherConfig};
use crate::element_finder::ProductExtractor;
use crate::models::StockTransition;
use crate::plugins::notifiers::DiscordNotifier;
use crate::plugins::traits::{NotificationEvent, Notifier};
use crate::scraper::{PageFetcher, PageSource};
use crate::state_store::{AvailabilityState, StateStore};
use crate::utils::error::Result;
use crate::watchlist;

/// Outcome of one pass over every tracked identifier.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct CycleReport {
    pub checked: usize,
    pub failed: usize,
    pub notified: usize,
    pub delivery_failures: usize,
    pub state_changed: bool,
}

/// Polls every tracked product in a fixed order and notifies on restocks.
pub struct Watcher {
    asins: Vec<String>,
    source: Box<dyn PageSource>,
    notifier: Box<dyn Notifier>,
    extractor: ProductExtractor,
    store: StateStore,
    state: AvailabilityState,
    retailer: RetailerConfig,
    config: WatcherConfig,
    unsaved: bool,
}

impl Watcher {
    /// Loads the persisted state once; it is only written back when it changes.
    pub fn new(
        asins: Vec<String>,
        source: Box<dyn PageSource>,
        notifier: Box<dyn Notifier>,
        store: StateStore,
        config: &AppConfig,
    ) -> Result<Self> {
        config.validate()?;
        let extractor = ProductExtractor::new(&config.retailer)?;
        let state = store.load();

        Ok(Self {
            asins,
            source,
            notifier,
            extractor,
            store,
            state,
            retailer: config.retailer.clone(),
            config: config.watcher.clone(),
            unsaved: false,
        })
    }

    /// Wires the HTTP fetcher, the Discord notifier and the state file from
    /// configuration.
    pub fn from_config(config: &AppConfig) -> Result<Self> {
        let asins = watchlist::load(&config.watcher)?;
        let source = PageFetcher::new(config)?;
        let notifier = DiscordNotifier::new(config)?;
        let store = StateStore::new(config.watcher.state_file.clone());

        Self::new(asins, Box::new(source), Box::new(notifier), store, config)
    }

    pub fn asins(&self) -> &[String] {
        &self.asins
    }

    pub fn state(&self) -> &AvailabilityState {
        &self.state
    }

    /// Runs cycles until `shutdown` resolves. Shutdown is only observed while
    /// waiting on a fetch or a sleep, so a product that was already announced
    /// always has its new state recorded before the loop exits.
    pub async fn run_until<F>(&mut self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()>,
    {
        tracing::info!("Watcher started for {:?}", self.asins);
        tokio::pin!(shutdown);

        loop {
            let (report, stopped) = self.cycle(shutdown.as_mut()).await;
            tracing::info!(
                "Cycle done: {} checked, {} failed, {} notified, {} delivery failures",
                report.checked,
                report.failed,
                report.notified,
                report.delivery_failures
            );
            if stopped {
                break;
            }

            let delay = self.next_cycle_delay();
            tracing::debug!("Sleeping {:?} before next cycle", delay);
            tokio::select! {
                biased;
                _ = shutdown.as_mut() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        tracing::info!("Shutting down...");
        if self.unsaved {
            self.persist();
        }
        Ok(())
    }

    /// One pass over every identifier. A failure for one identifier is logged
    /// and never stops the others.
    pub async fn run_cycle(&mut self) -> CycleReport {
        let never = std::future::pending::<()>();
        tokio::pin!(never);
        self.cycle(never).await.0
    }

    /// Returns the report and whether `shutdown` fired before every
    /// identifier was processed.
    async fn cycle<F>(&mut self, mut shutdown: Pin<&mut F>) -> (CycleReport, bool)
    where
        F: Future<Output = ()>,
    {
        let mut report = CycleReport::default();
        let mut stopped = false;
        let asins = self.asins.clone();

        for asin in &asins {
            let fetched = tokio::select! {
                biased;
                _ = shutdown.as_mut() => None,
                result = self.source.fetch(asin) => Some(result),
            };
            let Some(fetched) = fetched else {
                stopped = true;
                break;
            };

            let html = match fetched {
                Ok(html) => html,
                Err(e) => {
                    tracing::error!("Fetch failed for {}: {}", asin, e);
                    report.failed += 1;
                    let backoff = self.error_backoff();
                    let interrupted = tokio::select! {
                        biased;
                        _ = shutdown.as_mut() => true,
                        _ = tokio::time::sleep(backoff) => false,
                    };
                    if interrupted {
                        stopped = true;
                        break;
                    }
                    continue;
                }
            };
            report.checked += 1;

            let snapshot = self.extractor.extract(&html);
            let current = snapshot.is_purchasable();
            let previous = self.state.get(asin).copied();
            let transition = StockTransition::between(previous, current);
            tracing::debug!(
                "{}: available={} sold_by_retailer={} transition={:?}",
                asin,
                snapshot.available,
                snapshot.sold_by_retailer,
                transition
            );

            if transition.should_notify(self.config.notify_on_first_seen) {
                let event = NotificationEvent {
                    asin: asin.clone(),
                    product_url: self.retailer.product_url(asin),
                    snapshot,
                };
                match self.notifier.notify(&event).await {
                    Ok(()) => report.notified += 1,
                    Err(e) => {
                        tracing::error!("Notification failed for {}: {}", asin, e);
                        report.delivery_failures += 1;
                    }
                }
            } else if matches!(transition, StockTransition::FirstSeen { available: true }) {
                tracing::info!("{} already available on first check, not notifying", asin);
            }

            if transition.changes_state() {
                self.state.insert(asin.clone(), current);
                self.unsaved = true;
                report.state_changed = true;
            }
        }

        // A failed write leaves `unsaved` set, so it is retried on the next cycle
        if self.unsaved {
            self.persist();
        }
        (report, stopped)
    }

    fn persist(&mut self) {
        if self.store.save(&self.state) {
            self.unsaved = false;
        }
    }

    fn error_backoff(&self) -> Duration {
        let ms = rand::thread_rng()
            .gen_range(self.config.error_backoff_min_ms..=self.config.error_backoff_max_ms);
        Duration::from_millis(ms)
    }

    fn next_cycle_delay(&self) -> Duration {
        let jitter = rand::thread_rng().gen_range(0..=self.config.jitter_ms);
        Duration::from_secs(self.config.check_interval_secs) + Duration::from_millis(jitter)
    }
}
