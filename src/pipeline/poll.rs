// src/pipeline/poll.rs

//! One poll cycle and the state carried between cycles.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{Config, EntityState, Snapshot};
use crate::pipeline::Throttle;
use crate::services::{
    EntityContext, EntityView, OutageExtractor, StatusParser, build_entities,
};
use crate::utils::http;

/// What a call to [`Monitor::poll`] did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// Page fetched and parsed
    Fresh { outages: usize },
    /// Skipped by the throttle; cached state stands
    Throttled,
    /// Fetch failed; entities are now unavailable
    Failed { error: String },
}

/// Poller for one watched location.
pub struct Monitor {
    config: Arc<Config>,
    client: reqwest::Client,
    extractor: OutageExtractor,
    status_parser: StatusParser,
    context: EntityContext,
    throttle: Throttle,
    snapshot: Option<Snapshot>,
    available: bool,
    last_success: Option<DateTime<Utc>>,
}

impl Monitor {
    /// Create a monitor with the given configuration.
    pub fn new(config: Arc<Config>) -> Result<Self> {
        let client = http::create_async_client(&config.source)?;
        let extractor = OutageExtractor::new(&config.location.street)?;
        let status_parser =
            StatusParser::new(&config.location.street, config.location.heat_point)?;
        let context = EntityContext::new(&config.location);
        let throttle = Throttle::new(Duration::from_secs(config.source.min_fetch_interval_secs));

        Ok(Self {
            config,
            client,
            extractor,
            status_parser,
            context,
            throttle,
            snapshot: None,
            available: true,
            last_success: None,
        })
    }

    /// Fetch and parse the page unless the throttle says otherwise.
    pub async fn poll(&mut self) -> PollOutcome {
        if !self.throttle.try_acquire(Instant::now()) {
            log::debug!(
                "Fetch throttled, {}s left",
                self.throttle.remaining(Instant::now()).as_secs()
            );
            return PollOutcome::Throttled;
        }

        log::debug!("Fetching {}", self.config.source.url);
        let page = http::fetch_text(&self.client, &self.config.source.url).await;
        self.record(page, Utc::now())
    }

    /// Apply a fetch result to the monitor state.
    pub fn record(&mut self, page: Result<String>, now: DateTime<Utc>) -> PollOutcome {
        match page {
            Ok(html) => {
                let snapshot = self.analyze(&html, now);
                let outages = snapshot.total_found();
                log::info!(
                    "Poll ok: {} outage(s) for {}",
                    outages,
                    self.context.street
                );
                self.snapshot = Some(snapshot);
                self.available = true;
                self.last_success = Some(now);
                PollOutcome::Fresh { outages }
            }
            Err(error) => {
                log::error!("Poll failed: {}", error);
                self.available = false;
                PollOutcome::Failed {
                    error: error.to_string(),
                }
            }
        }
    }

    /// Run both parsers over a page.
    pub fn analyze(&self, html: &str, now: DateTime<Utc>) -> Snapshot {
        let extraction = self.extractor.extract(html, now);
        Snapshot {
            fetched_at: now,
            outages: extraction.outages,
            status: self.status_parser.parse(html),
        }
    }

    /// Render the current state as entities.
    pub fn entities(&self) -> Vec<EntityState> {
        build_entities(
            &self.context,
            EntityView {
                snapshot: self.snapshot.as_ref(),
                available: self.available,
                last_success: self.last_success,
            },
        )
    }

    pub fn snapshot(&self) -> Option<&Snapshot> {
        self.snapshot.as_ref()
    }

    pub fn is_available(&self) -> bool {
        self.available
    }

    pub fn last_success(&self) -> Option<DateTime<Utc>> {
        self.last_success
    }

    pub fn context(&self) -> &EntityContext {
        &self.context
    }

    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;

    const PAGE: &str = "<div>Str. Lizeanu: avarie apă caldă, cauză: spargere. Revine 12.01.2025 ora 20:00</div>";

    fn monitor() -> Monitor {
        let mut config = Config::default();
        config.location.street = "Str. Lizeanu".to_string();
        config.source.min_fetch_interval_secs = 3600;
        config.source.url = "http://127.0.0.1:9/status".to_string();
        Monitor::new(Arc::new(config)).unwrap()
    }

    #[test]
    fn test_record_success() {
        let mut monitor = monitor();
        let now = Utc::now();
        let outcome = monitor.record(Ok(PAGE.to_string()), now);

        assert_eq!(outcome, PollOutcome::Fresh { outages: 1 });
        assert!(monitor.is_available());
        assert_eq!(monitor.last_success(), Some(now));
        let snapshot = monitor.snapshot().unwrap();
        assert_eq!(snapshot.outages[0].cause, "spargere");
        assert_eq!(snapshot.outages[0].estimated_time, "20:00");
    }

    #[test]
    fn test_failure_marks_unavailable_and_keeps_last_success() {
        let mut monitor = monitor();
        let first = Utc::now();
        monitor.record(Ok(PAGE.to_string()), first);

        let outcome = monitor.record(Err(AppError::status("https://x", 500)), Utc::now());
        assert!(matches!(outcome, PollOutcome::Failed { .. }));
        assert!(!monitor.is_available());
        assert_eq!(monitor.last_success(), Some(first));
        assert!(monitor.entities().iter().all(|e| e.is_unavailable()));

        monitor.record(Ok(String::new()), Utc::now());
        assert!(monitor.is_available());
        assert!(monitor.entities().iter().all(|e| !e.is_unavailable()));
    }

    #[test]
    fn test_each_poll_recomputes_from_scratch() {
        let mut monitor = monitor();
        monitor.record(Ok(PAGE.to_string()), Utc::now());
        monitor.record(Ok("<p>nimic</p>".to_string()), Utc::now());
        assert_eq!(monitor.snapshot().unwrap().total_found(), 0);
    }

    #[tokio::test]
    async fn test_second_poll_is_throttled() {
        let mut monitor = monitor();
        // the first poll claims the throttle slot whatever the fetch result
        let _ = monitor.poll().await;
        assert_eq!(monitor.poll().await, PollOutcome::Throttled);
    }
}
