//! Publisher abstractions for entity state.
//!
//! Two backends share one trait:
//! - `HomeAssistantPublisher`: writes states and fires events over the REST API
//! - `LocalPublisher`: writes the same payloads as JSON files, for dry runs
//!
//! ## Local Directory Structure
//!
//! ```text
//! out/
//! ├── entities.json                 # Latest state of every entity
//! └── events/
//!     └── <event_type>-<ts>.json    # One file per fired event
//! ```

pub mod home_assistant;
pub mod local;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::error::Result;
use crate::models::{Config, EntityState, PublisherKind};

// Re-export for convenience
pub use home_assistant::HomeAssistantPublisher;
pub use local::LocalPublisher;

/// Metadata about a publish operation.
#[derive(Debug, Clone)]
pub struct PublishSummary {
    /// Entities written successfully
    pub written: usize,
    /// Entities the backend rejected
    pub failed: usize,
    /// Timestamp of the write
    pub timestamp: DateTime<Utc>,
}

impl PublishSummary {
    pub fn is_complete(&self) -> bool {
        self.failed == 0
    }
}

/// Trait for entity publishing backends.
#[async_trait]
pub trait EntityPublisher: Send + Sync {
    /// Write the state of every entity.
    ///
    /// Individual failures are counted, not raised; an error means the
    /// backend could not be used at all.
    async fn publish(&self, entities: &[EntityState]) -> Result<PublishSummary>;

    /// Fire a platform event.
    async fn fire_event(&self, event_type: &str, data: &Value) -> Result<()>;
}

/// Build the publisher the configuration selects.
pub fn from_config(config: &Config) -> Result<Box<dyn EntityPublisher>> {
    match config.output.publisher {
        PublisherKind::HomeAssistant => Ok(Box::new(HomeAssistantPublisher::new(
            &config.home_assistant,
        )?)),
        PublisherKind::Local => Ok(Box::new(LocalPublisher::new(&config.output.local_dir))),
    }
}
