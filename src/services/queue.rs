use async_trait::async_trait;
use aws_sdk_sqs::error::DisplayErrorContext;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::config::QueueConfig;

#[derive(Debug, Error)]
pub enum QueueError {
    #[error("Failed to serialize message: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to publish message: {0}")]
    Publish(String),
}

/// Message telling downstream workers a project is ready for rendering
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DispatchMessage {
    pub project_id: Uuid,
}

impl DispatchMessage {
    pub fn to_body(&self) -> Result<String, QueueError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Outbound queue. `publish` returns once the broker has accepted the message.
#[async_trait]
pub trait MessageQueue: Send + Sync {
    async fn publish(&self, queue_url: &str, body: String) -> Result<(), QueueError>;
}

#[derive(Clone, Debug)]
pub struct SqsQueue {
    client: aws_sdk_sqs::Client,
}

impl SqsQueue {
    pub fn new(client: aws_sdk_sqs::Client) -> Self {
        Self { client }
    }

    /// Load credentials from the default AWS provider chain for the configured region
    pub async fn from_config(config: &QueueConfig) -> Self {
        let region = aws_sdk_sqs::config::Region::new(config.region.clone());
        let sdk_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
            .region(region)
            .load()
            .await;
        Self::new(aws_sdk_sqs::Client::new(&sdk_config))
    }
}

#[async_trait]
impl MessageQueue for SqsQueue {
    async fn publish(&self, queue_url: &str, body: String) -> Result<(), QueueError> {
        let output = self
            .client
            .send_message()
            .queue_url(queue_url)
            .message_body(body)
            .send()
            .await
            .map_err(|e| QueueError::Publish(DisplayErrorContext(&e).to_string()))?;

        tracing::debug!(message_id = ?output.message_id(), "message published");
        Ok(())
    }
}
