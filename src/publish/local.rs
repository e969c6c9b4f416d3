//! Local filesystem publisher.
//!
//! Writes what would be sent to the platform as JSON, for dry runs and
//! for setups that pick the files up with another tool.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use serde::{Deserialize, Serialize, de::DeserializeOwned};
use serde_json::Value;
use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::EntityState;
use crate::publish::{EntityPublisher, PublishSummary};

/// Contents of `entities.json`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntitiesFile {
    pub updated_at: chrono::DateTime<Utc>,
    pub count: usize,
    pub entities: Vec<EntityState>,
}

/// Local filesystem publisher.
#[derive(Clone)]
pub struct LocalPublisher {
    root_dir: PathBuf,
}

impl LocalPublisher {
    /// Create a new LocalPublisher rooted at the given directory.
    pub fn new(root_dir: impl Into<PathBuf>) -> Self {
        Self {
            root_dir: root_dir.into(),
        }
    }

    /// Get the full path for a relative key.
    fn path(&self, key: &str) -> PathBuf {
        self.root_dir.join(key)
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.path(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }

        let tmp = path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &path).await?;
        Ok(())
    }

    async fn write_json<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(value)?;
        self.write_bytes(key, &bytes).await
    }

    /// Read JSON data, returning None if the file doesn't exist.
    pub async fn read_json<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match tokio::fs::read(self.path(key)).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Load the last written entity file.
    pub async fn load_entities(&self) -> Result<Option<EntitiesFile>> {
        self.read_json("entities.json").await
    }
}

#[async_trait]
impl EntityPublisher for LocalPublisher {
    async fn publish(&self, entities: &[EntityState]) -> Result<PublishSummary> {
        let now = Utc::now();
        let file = EntitiesFile {
            updated_at: now,
            count: entities.len(),
            entities: entities.to_vec(),
        };
        self.write_json("entities.json", &file).await?;
        log::info!(
            "{} entities written to {}",
            file.count,
            self.path("entities.json").display()
        );

        Ok(PublishSummary {
            written: entities.len(),
            failed: 0,
            timestamp: now,
        })
    }

    async fn fire_event(&self, event_type: &str, data: &Value) -> Result<()> {
        let key = format!(
            "events/{}-{}.json",
            event_type,
            Utc::now().format("%Y%m%dT%H%M%S%.3f")
        );
        self.write_json(&key, data).await?;
        log::info!("Event {} written to {}", event_type, self.path(&key).display());
        Ok(())
    }
}
