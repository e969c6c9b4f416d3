//! Snapshot export.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::error::{AppError, Result};
use crate::models::Snapshot;

/// Supported export encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExportFormat {
    #[default]
    Json,
    Toml,
}

impl FromStr for ExportFormat {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "json" => Ok(ExportFormat::Json),
            "toml" => Ok(ExportFormat::Toml),
            other => Err(AppError::validation(format!("unknown export format '{other}'"))),
        }
    }
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Json => f.write_str("json"),
            ExportFormat::Toml => f.write_str("toml"),
        }
    }
}

/// Export document.
#[derive(Debug, Serialize)]
pub struct ExportDocument<'a> {
    pub street: &'a str,
    pub exported_at: DateTime<Utc>,
    pub available: bool,
    pub total_found: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub snapshot: Option<&'a Snapshot>,
}

/// Encode an export document.
pub fn render(document: &ExportDocument<'_>, format: ExportFormat) -> Result<String> {
    match format {
        ExportFormat::Json => Ok(serde_json::to_string_pretty(document)?),
        ExportFormat::Toml => Ok(toml::to_string_pretty(document)?),
    }
}
