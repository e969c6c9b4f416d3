//! Outage candidate extracted from the status page.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Value used for every field no pattern could fill.
pub const UNSPECIFIED: &str = "Nespecificat";

/// Which thermal service an outage affects.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    #[serde(rename = "Apă caldă")]
    HotWater,
    #[serde(rename = "Căldură")]
    Heating,
    #[serde(rename = "Serviciu termic")]
    Unspecified,
}

impl ServiceType {
    /// Label shown in entity attributes.
    pub fn label(&self) -> &'static str {
        match self {
            ServiceType::HotWater => "Apă caldă",
            ServiceType::Heating => "Căldură",
            ServiceType::Unspecified => "Serviciu termic",
        }
    }

    /// Whether an outage of this type can cut hot water.
    ///
    /// An unspecified thermal service counts for both hot water and heating.
    pub fn affects_hot_water(&self) -> bool {
        matches!(self, ServiceType::HotWater | ServiceType::Unspecified)
    }

    /// Whether an outage of this type can cut heating.
    pub fn affects_heating(&self) -> bool {
        matches!(self, ServiceType::Heating | ServiceType::Unspecified)
    }
}

impl fmt::Display for ServiceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One notice block that matched the configured street.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Outage {
    /// Street as configured
    pub street: String,

    /// Affected service
    pub service: ServiceType,

    /// Cause, or [`UNSPECIFIED`]
    pub cause: String,

    /// Estimated restoration date, or [`UNSPECIFIED`]
    pub estimated_date: String,

    /// Estimated restoration time, or [`UNSPECIFIED`]
    pub estimated_time: String,

    /// When the poll that found this block ran
    pub detected_at: DateTime<Utc>,
}

/// Template used when logging a detected outage.
pub const OUTAGE_LOG_TEMPLATE: &str = "{service} - {street}: {cause} ({date} {time})";

impl Outage {
    /// Format outage for display using a template.
    ///
    /// Supported placeholders:
    /// - `{street}`, `{service}`, `{cause}`, `{date}`, `{time}`
    pub fn format(&self, template: &str) -> String {
        template
            .replace("{street}", &self.street)
            .replace("{service}", self.service.label())
            .replace("{cause}", &self.cause)
            .replace("{date}", &self.estimated_date)
            .replace("{time}", &self.estimated_time)
    }
}
