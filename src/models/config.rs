//! Application configuration structures.

use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Environment variable that overrides `home_assistant.token`.
pub const TOKEN_ENV: &str = "TERMO_HA_TOKEN";

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Status page and HTTP behavior settings
    #[serde(default)]
    pub source: SourceConfig,

    /// Which street (and optionally heat point / sector) to watch
    #[serde(default)]
    pub location: LocationConfig,

    /// Poll scheduling
    #[serde(default)]
    pub poll: PollConfig,

    /// Home Assistant REST endpoint
    #[serde(default)]
    pub home_assistant: HomeAssistantConfig,

    /// Where entity states go
    #[serde(default)]
    pub output: OutputConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    ///
    /// The Home Assistant token from [`TOKEN_ENV`] wins over the file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let mut config: Self = toml::from_str(&content)?;
        config.apply_env();
        Ok(config)
    }

    fn apply_env(&mut self) {
        if let Ok(token) = std::env::var(TOKEN_ENV) {
            if !token.trim().is_empty() {
                self.home_assistant.token = Some(token);
            }
        }
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        self.validate_source()?;
        self.validate_publisher()
    }

    /// Checks needed to poll the page, independent of where results go.
    pub fn validate_source(&self) -> Result<()> {
        if self.location.street.trim().is_empty() {
            return Err(AppError::validation("location.street is empty"));
        }
        if self.source.user_agent.trim().is_empty() {
            return Err(AppError::validation("source.user_agent is empty"));
        }
        if self.source.timeout_secs == 0 {
            return Err(AppError::validation("source.timeout_secs must be > 0"));
        }
        url::Url::parse(&self.source.url)
            .map_err(|e| AppError::validation(format!("source.url is invalid: {e}")))?;
        if !(MIN_INTERVAL_MINUTES..=MAX_INTERVAL_MINUTES).contains(&self.poll.interval_minutes) {
            return Err(AppError::validation(format!(
                "poll.interval_minutes must be between {MIN_INTERVAL_MINUTES} and {MAX_INTERVAL_MINUTES}"
            )));
        }
        Ok(())
    }

    /// Checks for the configured publisher.
    pub fn validate_publisher(&self) -> Result<()> {
        if self.output.publisher == PublisherKind::HomeAssistant {
            url::Url::parse(&self.home_assistant.base_url).map_err(|e| {
                AppError::validation(format!("home_assistant.base_url is invalid: {e}"))
            })?;
            if self.home_assistant.token.as_deref().is_none_or(|t| t.trim().is_empty()) {
                return Err(AppError::validation(format!(
                    "home_assistant.token is not set (config or {TOKEN_ENV})"
                )));
            }
            if self.home_assistant.max_concurrent == 0 {
                return Err(AppError::validation(
                    "home_assistant.max_concurrent must be > 0",
                ));
            }
        }
        Ok(())
    }

    /// Copy of the configuration with secrets blanked out.
    pub fn redacted(&self) -> Self {
        let mut copy = self.clone();
        if copy.home_assistant.token.is_some() {
            copy.home_assistant.token = Some("**REDACTED**".to_string());
        }
        copy
    }
}

/// Lower bound of the poll interval.
pub const MIN_INTERVAL_MINUTES: u64 = 5;
/// Upper bound of the poll interval.
pub const MAX_INTERVAL_MINUTES: u64 = 120;

/// Status page location and HTTP client settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceConfig {
    /// URL of the status page
    #[serde(default = "defaults::source_url")]
    pub url: String,

    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Fetches closer together than this are skipped
    #[serde(default = "defaults::min_fetch_interval")]
    pub min_fetch_interval_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            url: defaults::source_url(),
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            min_fetch_interval_secs: defaults::min_fetch_interval(),
        }
    }
}

/// The watched address.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct LocationConfig {
    /// Street name as it appears on the status page
    #[serde(default)]
    pub street: String,

    /// Heat point area
    #[serde(default)]
    pub heat_point: HeatPoint,

    /// City sector
    #[serde(default)]
    pub sector: Sector,
}

/// Heat point (punct termic) areas offered by the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HeatPoint {
    #[default]
    Toate,
    Centru,
    Vest,
    Sud,
    Nord,
    Est,
}

impl HeatPoint {
    /// Configuration key.
    pub fn key(&self) -> &'static str {
        match self {
            HeatPoint::Toate => "toate",
            HeatPoint::Centru => "centru",
            HeatPoint::Vest => "vest",
            HeatPoint::Sud => "sud",
            HeatPoint::Nord => "nord",
            HeatPoint::Est => "est",
        }
    }

    /// Display name, as printed on the status page.
    pub fn display_name(&self) -> &'static str {
        match self {
            HeatPoint::Toate => "Toate punctele termice",
            HeatPoint::Centru => "Centru",
            HeatPoint::Vest => "Vest",
            HeatPoint::Sud => "Sud",
            HeatPoint::Nord => "Nord",
            HeatPoint::Est => "Est",
        }
    }

    /// Name to look for on the page; `None` when every heat point is watched.
    pub fn search_term(&self) -> Option<&'static str> {
        match self {
            HeatPoint::Toate => None,
            other => Some(other.display_name()),
        }
    }
}

impl fmt::Display for HeatPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// City sectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Sector {
    #[default]
    Toate,
    Sector1,
    Sector2,
    Sector3,
    Sector4,
    Sector5,
    Sector6,
}

impl Sector {
    /// Configuration key.
    pub fn key(&self) -> &'static str {
        match self {
            Sector::Toate => "toate",
            Sector::Sector1 => "sector1",
            Sector::Sector2 => "sector2",
            Sector::Sector3 => "sector3",
            Sector::Sector4 => "sector4",
            Sector::Sector5 => "sector5",
            Sector::Sector6 => "sector6",
        }
    }

    /// Display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            Sector::Toate => "Toate sectoarele",
            Sector::Sector1 => "Sector 1",
            Sector::Sector2 => "Sector 2",
            Sector::Sector3 => "Sector 3",
            Sector::Sector4 => "Sector 4",
            Sector::Sector5 => "Sector 5",
            Sector::Sector6 => "Sector 6",
        }
    }
}

impl fmt::Display for Sector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Poll scheduling.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    /// Minutes between polls (5-120)
    #[serde(default = "defaults::interval_minutes")]
    pub interval_minutes: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_minutes: defaults::interval_minutes(),
        }
    }
}

/// Home Assistant REST API access.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HomeAssistantConfig {
    /// Base URL, e.g. `http://homeassistant.local:8123`
    #[serde(default = "defaults::ha_base_url")]
    pub base_url: String,

    /// Long-lived access token
    #[serde(default)]
    pub token: Option<String>,

    /// Maximum concurrent state writes
    #[serde(default = "defaults::max_concurrent")]
    pub max_concurrent: usize,
}

impl Default for HomeAssistantConfig {
    fn default() -> Self {
        Self {
            base_url: defaults::ha_base_url(),
            token: None,
            max_concurrent: defaults::max_concurrent(),
        }
    }
}

/// Publisher backend selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum PublisherKind {
    #[default]
    HomeAssistant,
    Local,
}

/// Output settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Which publisher receives entity states
    #[serde(default)]
    pub publisher: PublisherKind,

    /// Directory for the local publisher
    #[serde(default = "defaults::local_dir")]
    pub local_dir: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            publisher: PublisherKind::default(),
            local_dir: defaults::local_dir(),
        }
    }
}

mod defaults {
    // Source defaults
    pub fn source_url() -> String {
        "https://www.cmteb.ro/functionare_sistem_termoficare.php".into()
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36".into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn min_fetch_interval() -> u64 {
        60
    }

    // Poll defaults
    pub fn interval_minutes() -> u64 {
        15
    }

    // Home Assistant defaults
    pub fn ha_base_url() -> String {
        "http://homeassistant.local:8123".into()
    }
    pub fn max_concurrent() -> usize {
        4
    }

    // Output defaults
    pub fn local_dir() -> String {
        "data/out".into()
    }
}
