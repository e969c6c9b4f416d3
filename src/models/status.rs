//! Structured status values read from the page's tables and panels.

use serde::{Deserialize, Serialize};

/// Status value when nothing was found.
pub const STATUS_UNKNOWN: &str = "Necunoscut";
/// Status value for a stopped service.
pub const STATUS_STOPPED: &str = "Oprită";
/// Status value for a running service.
pub const STATUS_RUNNING: &str = "Funcționează";
/// Placeholder for free-text fields that were not found.
pub const NOT_AVAILABLE: &str = "N/A";

/// Values backing the status sensors.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct StatusBoard {
    pub hot_water_status: String,
    pub heating_status: String,
    pub cause: String,
    pub description: String,
    pub estimated_repair: String,
}

impl Default for StatusBoard {
    fn default() -> Self {
        Self {
            hot_water_status: STATUS_UNKNOWN.to_string(),
            heating_status: STATUS_UNKNOWN.to_string(),
            cause: NOT_AVAILABLE.to_string(),
            description: NOT_AVAILABLE.to_string(),
            estimated_repair: NOT_AVAILABLE.to_string(),
        }
    }
}

/// Status sensor kinds, in publish order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusField {
    HotWater,
    Heating,
    Cause,
    Description,
    EstimatedRepair,
}

impl StatusField {
    pub const ALL: [StatusField; 5] = [
        StatusField::HotWater,
        StatusField::Heating,
        StatusField::Cause,
        StatusField::Description,
        StatusField::EstimatedRepair,
    ];

    /// Sensor type key used in entity ids and the `tip_senzor` attribute.
    pub fn key(&self) -> &'static str {
        match self {
            StatusField::HotWater => "stare_apa_calda",
            StatusField::Heating => "stare_caldura",
            StatusField::Cause => "cauza",
            StatusField::Description => "descriere",
            StatusField::EstimatedRepair => "data_estimare",
        }
    }

    /// Human-readable sensor name.
    pub fn display_name(&self) -> &'static str {
        match self {
            StatusField::HotWater => "Stare Apă Caldă",
            StatusField::Heating => "Stare Căldură",
            StatusField::Cause => "Cauză Intervenție",
            StatusField::Description => "Descriere Intervenție",
            StatusField::EstimatedRepair => "Dată Estimare Reparație",
        }
    }

    /// Whether the field holds a service status rather than free text.
    pub fn is_status(&self) -> bool {
        matches!(self, StatusField::HotWater | StatusField::Heating)
    }

    /// Read the field from a board.
    pub fn value<'a>(&self, board: &'a StatusBoard) -> &'a str {
        match self {
            StatusField::HotWater => &board.hot_water_status,
            StatusField::Heating => &board.heating_status,
            StatusField::Cause => &board.cause,
            StatusField::Description => &board.description,
            StatusField::EstimatedRepair => &board.estimated_repair,
        }
    }
}
