use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use tracing::{debug, info};

use tempo_core::config::EffectConfig;
use tempo_core::types::Schedule;

use crate::error::{EngineError, Result};

/// Performs the actual effect for one due schedule.
#[async_trait]
pub trait ExecutionHandler: Send + Sync {
    async fn execute(&self, schedule: &Schedule) -> Result<()>;
}

/// Production handler: POST to a configured endpoint with the schedule id as
/// a query parameter and a JSON content-type header, no body.
///
/// The reqwest client carries the configured timeout so a stuck endpoint
/// cannot pin a worker indefinitely.
pub struct HttpEffectHandler {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpEffectHandler {
    pub fn new(config: &EffectConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()?;
        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }
}

#[async_trait]
impl ExecutionHandler for HttpEffectHandler {
    async fn execute(&self, schedule: &Schedule) -> Result<()> {
        debug!(schedule_id = %schedule.id, endpoint = %self.endpoint, "calling effect endpoint");

        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("id", schedule.id.as_str())])
            .header(CONTENT_TYPE, "application/json")
            .send()
            .await?;

        let status = response.status();
        info!(schedule_id = %schedule.id, status = %status, "effect endpoint responded");

        if !status.is_success() {
            return Err(EngineError::EffectRejected(format!(
                "effect endpoint returned {status}"
            )));
        }
        Ok(())
    }
}
