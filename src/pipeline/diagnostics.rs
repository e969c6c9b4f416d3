//! Diagnostics dump.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::{Config, EntityState};
use crate::pipeline::Monitor;

/// Everything needed to debug a misbehaving setup, minus secrets.
#[derive(Debug, Serialize)]
pub struct Diagnostics {
    pub config: Config,
    pub entry_id: String,
    pub integration_version: &'static str,
    pub available: bool,
    pub last_success: Option<DateTime<Utc>>,
    pub outages_found: usize,
    pub entities: Vec<EntityState>,
}

/// Collect diagnostics from a monitor's current state.
pub fn collect(monitor: &Monitor) -> Diagnostics {
    Diagnostics {
        config: monitor.config().redacted(),
        entry_id: monitor.context().entry_id.clone(),
        integration_version: env!("CARGO_PKG_VERSION"),
        available: monitor.is_available(),
        last_success: monitor.last_success(),
        outages_found: monitor.snapshot().map_or(0, |s| s.total_found()),
        entities: monitor.entities(),
    }
}
