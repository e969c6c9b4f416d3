// src/models/mod.rs

//! Domain models for the monitor.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod config;
mod entity;
mod outage;
mod report;
mod status;

// Re-export all public types
pub use config::{
    Config, HeatPoint, HomeAssistantConfig, LocationConfig, MAX_INTERVAL_MINUTES,
    MIN_INTERVAL_MINUTES, OutputConfig, PollConfig, PublisherKind, Sector, SourceConfig,
    TOKEN_ENV,
};
pub use entity::{EntityKind, EntityState, STATE_UNAVAILABLE};
pub use outage::{OUTAGE_LOG_TEMPLATE, Outage, ServiceType, UNSPECIFIED};
pub use report::{REPORT_EVENT, Report, ReportPeriod, ReportSummary};
pub use status::{
    NOT_AVAILABLE, STATUS_RUNNING, STATUS_STOPPED, STATUS_UNKNOWN, StatusBoard, StatusField,
};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything one successful poll learned about the page.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    /// When the page was fetched
    pub fetched_at: DateTime<Utc>,

    /// Matching outage candidates, in document order
    pub outages: Vec<Outage>,

    /// Status sensor values
    pub status: StatusBoard,
}

impl Snapshot {
    pub fn total_found(&self) -> usize {
        self.outages.len()
    }
}
