use common::demo_analysis::ParsedDemo;

#[derive(Debug, thiserror::Error)]
pub enum DeliveryError {
    #[error("sending result: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("webhook returned status {status}: {body}")]
    Status { status: u16, body: String },
}

/// Receiver of finished analysis results.
#[async_trait::async_trait]
pub trait ResultSink: Send + Sync {
    async fn deliver(&self, result: &ParsedDemo) -> Result<(), DeliveryError>;
}

/// Posts results as JSON to a webhook, authenticated with a bearer secret.
///
/// Exactly one attempt is made per result.
pub struct WebhookClient {
    http: reqwest::Client,
    url: String,
    secret: String,
    timeout: std::time::Duration,
}

impl WebhookClient {
    pub fn new(
        http: reqwest::Client,
        url: impl Into<String>,
        secret: impl Into<String>,
        timeout: std::time::Duration,
    ) -> Self {
        Self {
            http,
            url: url.into(),
            secret: secret.into(),
            timeout,
        }
    }
}

#[async_trait::async_trait]
impl ResultSink for WebhookClient {
    #[tracing::instrument(skip(self, result), fields(demo_id = %result.demo_id))]
    async fn deliver(&self, result: &ParsedDemo) -> Result<(), DeliveryError> {
        let response = self
            .http
            .post(&self.url)
            .bearer_auth(&self.secret)
            .timeout(self.timeout)
            .json(result)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(DeliveryError::Status {
                status: status.as_u16(),
                body,
            });
        }

        tracing::debug!(status = status.as_u16(), "Delivered result");
        Ok(())
    }
}
