//! Report generation.
//!
//! The report summarises the current poll only; nothing is kept between
//! polls, so the period is echoed back rather than aggregated over.

use chrono::{DateTime, Utc};

use crate::error::Result;
use crate::models::{REPORT_EVENT, Report, ReportPeriod, ReportSummary, Snapshot};
use crate::pipeline::Monitor;
use crate::publish::EntityPublisher;

/// Build a report from a snapshot.
pub fn build_report(
    period: ReportPeriod,
    snapshot: Option<&Snapshot>,
    now: DateTime<Utc>,
) -> Report {
    let mut services_affected: Vec<String> = Vec::new();
    if let Some(snapshot) = snapshot {
        for outage in &snapshot.outages {
            let label = outage.service.label().to_string();
            if !services_affected.contains(&label) {
                services_affected.push(label);
            }
        }
    }

    Report {
        period,
        window_days: period.days(),
        generated_at: now,
        summary: ReportSummary {
            total_interruptions: snapshot.map_or(0, Snapshot::total_found),
            services_affected,
            average_duration: "N/A".to_string(),
        },
    }
}

/// Poll once, build the report and fire it as a platform event.
pub async fn run_report(
    monitor: &mut Monitor,
    publisher: &dyn EntityPublisher,
    period: ReportPeriod,
) -> Result<Report> {
    log::info!("Generating report for period: {}", period);
    monitor.poll().await;

    let report = build_report(period, monitor.snapshot(), Utc::now());
    let payload = serde_json::to_value(&report)?;
    publisher.fire_event(REPORT_EVENT, &payload).await?;
    Ok(report)
}
