//! Report over the current poll.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

/// Platform event fired when a report is generated.
pub const REPORT_EVENT: &str = "termo_bucuresti_report_generated";

/// Reporting window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum ReportPeriod {
    #[serde(rename = "1day")]
    OneDay,
    #[default]
    #[serde(rename = "7days")]
    SevenDays,
    #[serde(rename = "30days")]
    ThirtyDays,
}

impl ReportPeriod {
    /// Lenient parse: any unrecognised value means the widest window.
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or(ReportPeriod::ThirtyDays)
    }

    pub fn days(&self) -> u32 {
        match self {
            ReportPeriod::OneDay => 1,
            ReportPeriod::SevenDays => 7,
            ReportPeriod::ThirtyDays => 30,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ReportPeriod::OneDay => "1day",
            ReportPeriod::SevenDays => "7days",
            ReportPeriod::ThirtyDays => "30days",
        }
    }
}

impl FromStr for ReportPeriod {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "1day" => Ok(ReportPeriod::OneDay),
            "7days" => Ok(ReportPeriod::SevenDays),
            "30days" => Ok(ReportPeriod::ThirtyDays),
            other => Err(AppError::validation(format!("unknown report period '{other}'"))),
        }
    }
}

impl fmt::Display for ReportPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Report summary block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReportSummary {
    pub total_interruptions: usize,
    pub services_affected: Vec<String>,
    pub average_duration: String,
}

/// Report event payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Report {
    pub period: ReportPeriod,
    pub window_days: u32,
    pub generated_at: DateTime<Utc>,
    pub summary: ReportSummary,
}
