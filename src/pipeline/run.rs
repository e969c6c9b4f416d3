// src/pipeline/run.rs

//! The polling loop.

use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};

use crate::error::Result;
use crate::models::OUTAGE_LOG_TEMPLATE;
use crate::pipeline::{Monitor, PollOutcome};
use crate::publish::EntityPublisher;

/// Poll, then publish every entity. Failures are logged, never raised.
pub async fn run_cycle(monitor: &mut Monitor, publisher: &dyn EntityPublisher) -> PollOutcome {
    let outcome = monitor.poll().await;
    match outcome {
        PollOutcome::Throttled => log::info!("Refresh throttled; republishing cached state"),
        PollOutcome::Fresh { .. } => {
            if let Some(snapshot) = monitor.snapshot() {
                for outage in &snapshot.outages {
                    log::info!("{}", outage.format(OUTAGE_LOG_TEMPLATE));
                }
            }
        }
        PollOutcome::Failed { .. } => {}
    }

    let entities = monitor.entities();
    match publisher.publish(&entities).await {
        Ok(summary) if summary.is_complete() => {
            log::debug!(
                "Published {} entities at {}",
                summary.written,
                summary.timestamp.to_rfc3339()
            );
        }
        Ok(summary) => {
            log::warn!(
                "Published {} of {} entities at {}",
                summary.written,
                summary.written + summary.failed,
                summary.timestamp.to_rfc3339()
            );
        }
        Err(e) => log::error!("Publish failed: {}", e),
    }

    outcome
}

/// Run until Ctrl-C, polling every configured interval.
///
/// On Unix, SIGHUP requests an immediate refresh, subject to the fetch
/// throttle.
pub async fn run_monitor(mut monitor: Monitor, publisher: &dyn EntityPublisher) -> Result<()> {
    let minutes = monitor.config().poll.interval_minutes;
    let mut ticker = interval(Duration::from_secs(minutes * 60));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut refresh = RefreshSignal::new()?;
    let shutdown = tokio::signal::ctrl_c();
    tokio::pin!(shutdown);

    log::info!(
        "Watching '{}' every {} min",
        monitor.context().street,
        minutes
    );

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                run_cycle(&mut monitor, publisher).await;
            }
            _ = refresh.recv() => {
                log::info!("Manual refresh requested");
                run_cycle(&mut monitor, publisher).await;
            }
            result = &mut shutdown => {
                result?;
                log::info!("Shutdown requested");
                break;
            }
        }
    }

    Ok(())
}

#[cfg(unix)]
struct RefreshSignal(tokio::signal::unix::Signal);

#[cfg(unix)]
impl RefreshSignal {
    fn new() -> Result<Self> {
        use tokio::signal::unix::{SignalKind, signal};
        Ok(Self(signal(SignalKind::hangup())?))
    }

    async fn recv(&mut self) {
        if self.0.recv().await.is_none() {
            futures::future::pending::<()>().await;
        }
    }
}

#[cfg(not(unix))]
struct RefreshSignal;

#[cfg(not(unix))]
impl RefreshSignal {
    fn new() -> Result<Self> {
        Ok(Self)
    }

    async fn recv(&mut self) {
        futures::future::pending::<()>().await;
    }
}
