// src/publish/home_assistant.rs

//! Home Assistant REST publisher.
//!
//! States go to `POST /api/states/<entity_id>`, events to
//! `POST /api/events/<event_type>`, both with a long-lived bearer token.

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use futures::stream::{self, StreamExt};
use reqwest::Client;
use serde_json::Value;

use crate::error::{AppError, Result};
use crate::models::{EntityState, HomeAssistantConfig};
use crate::publish::{EntityPublisher, PublishSummary};
use crate::utils::join_url;

/// Publisher backed by the Home Assistant REST API.
pub struct HomeAssistantPublisher {
    client: Client,
    base_url: String,
    token: String,
    max_concurrent: usize,
}

impl HomeAssistantPublisher {
    /// Create a publisher from the `home_assistant` config section.
    pub fn new(config: &HomeAssistantConfig) -> Result<Self> {
        let token = config
            .token
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| AppError::config("home_assistant.token is not set"))?;
        url::Url::parse(&config.base_url)?;

        let client = Client::builder().timeout(Duration::from_secs(10)).build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
            token,
            max_concurrent: config.max_concurrent.max(1),
        })
    }

    /// Endpoint for one entity's state.
    pub fn state_url(&self, entity_id: &str) -> Result<String> {
        Ok(join_url(&self.base_url, &format!("api/states/{entity_id}"))?)
    }

    /// Endpoint for firing an event.
    pub fn event_url(&self, event_type: &str) -> Result<String> {
        Ok(join_url(&self.base_url, &format!("api/events/{event_type}"))?)
    }

    async fn post_json(&self, url: &str, target: &str, body: &Value) -> Result<()> {
        let response = self
            .client
            .post(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::publish(target, format!("HTTP {status}")));
        }
        Ok(())
    }

    async fn write_state(&self, entity: &EntityState) -> Result<()> {
        let url = self.state_url(&entity.entity_id)?;
        self.post_json(&url, &entity.entity_id, &entity.to_payload())
            .await
    }
}

#[async_trait]
impl EntityPublisher for HomeAssistantPublisher {
    async fn publish(&self, entities: &[EntityState]) -> Result<PublishSummary> {
        let mut summary = PublishSummary {
            written: 0,
            failed: 0,
            timestamp: Utc::now(),
        };

        let tasks: Vec<_> = entities
            .iter()
            .map(|entity| async move { (entity, self.write_state(entity).await) })
            .collect();
        let mut writes = stream::iter(tasks).buffer_unordered(self.max_concurrent);

        while let Some((entity, result)) = writes.next().await {
            match result {
                Ok(()) => {
                    summary.written += 1;
                    log::debug!("HA state {} = {}", entity.entity_id, entity.state);
                }
                Err(error) => {
                    summary.failed += 1;
                    log::warn!("Failed to write {}: {}", entity.entity_id, error);
                }
            }
        }

        Ok(summary)
    }

    async fn fire_event(&self, event_type: &str, data: &Value) -> Result<()> {
        let url = self.event_url(event_type)?;
        self.post_json(&url, event_type, data).await?;
        log::info!("Fired event {}", event_type);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    use super::*;

    fn config(token: Option<&str>) -> HomeAssistantConfig {
        HomeAssistantConfig {
            base_url: "http://ha.local:8123".to_string(),
            token: token.map(str::to_string),
            max_concurrent: 2,
        }
    }

    #[test]
    fn test_requires_token() {
        assert!(HomeAssistantPublisher::new(&config(None)).is_err());
        assert!(HomeAssistantPublisher::new(&config(Some(" "))).is_err());
        assert!(HomeAssistantPublisher::new(&config(Some("t"))).is_ok());
    }

    #[test]
    fn test_endpoints() {
        let publisher = HomeAssistantPublisher::new(&config(Some("t"))).unwrap();
        assert_eq!(
            publisher.state_url("binary_sensor.termo_alert_general_x").unwrap(),
            "http://ha.local:8123/api/states/binary_sensor.termo_alert_general_x"
        );
        assert_eq!(
            publisher.event_url("termo_bucuresti_report_generated").unwrap(),
            "http://ha.local:8123/api/events/termo_bucuresti_report_generated"
        );
    }

    #[tokio::test]
    async fn test_unreachable_host_counts_failures() {
        let mut cfg = config(Some("t"));
        // port 9 (discard) on localhost is closed on test machines
        cfg.base_url = "http://127.0.0.1:9".to_string();
        let publisher = HomeAssistantPublisher::new(&cfg).unwrap();

        let entity = EntityState {
            entity_id: "sensor.x".to_string(),
            kind: crate::models::EntityKind::Sensor,
            state: "N/A".to_string(),
            attributes: serde_json::Map::new(),
        };
        let summary = publisher.publish(&[entity]).await.unwrap();
        assert_eq!(summary.written, 0);
        assert_eq!(summary.failed, 1);
        assert!(!summary.is_complete());
    }

    /// Accept one request on a local listener, answer 200 and return it raw.
    async fn serve_once(listener: TcpListener) -> String {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut buf = Vec::new();
        let mut chunk = [0u8; 1024];
        loop {
            let n = socket.read(&mut chunk).await.unwrap();
            if n == 0 {
                break;
            }
            buf.extend_from_slice(&chunk[..n]);
            let text = String::from_utf8_lossy(&buf);
            if let Some(head_end) = text.find("\r\n\r\n") {
                let length = text[..head_end]
                    .lines()
                    .filter_map(|line| line.split_once(':'))
                    .find(|(name, _)| name.eq_ignore_ascii_case("content-length"))
                    .and_then(|(_, value)| value.trim().parse::<usize>().ok())
                    .unwrap_or(0);
                if buf.len() >= head_end + 4 + length {
                    break;
                }
            }
        }
        socket
            .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 2\r\nconnection: close\r\n\r\n{}")
            .await
            .unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[tokio::test]
    async fn test_publish_posts_state_with_bearer_token() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let server = tokio::spawn(serve_once(listener));

        let mut cfg = config(Some("secret-token"));
        cfg.base_url = format!("http://{addr}");
        let publisher = HomeAssistantPublisher::new(&cfg).unwrap();

        let mut attributes = serde_json::Map::new();
        attributes.insert("cauza".to_string(), Value::from("avarie"));
        let entity = EntityState {
            entity_id: "binary_sensor.termo_alert_general_str_lizeanu".to_string(),
            kind: crate::models::EntityKind::BinarySensor,
            state: "on".to_string(),
            attributes,
        };

        let summary = publisher.publish(&[entity]).await.unwrap();
        assert_eq!(summary.written, 1);
        assert!(summary.is_complete());

        let request = server.await.unwrap();
        let (head, body) = request.split_once("\r\n\r\n").unwrap();
        assert!(head.starts_with(
            "POST /api/states/binary_sensor.termo_alert_general_str_lizeanu HTTP/1.1"
        ));
        assert!(
            head.lines()
                .any(|line| line.eq_ignore_ascii_case("authorization: Bearer secret-token"))
        );

        let body: Value = serde_json::from_str(body).unwrap();
        assert_eq!(body["state"], "on");
        assert_eq!(body["attributes"]["cauza"], "avarie");
    }
}
