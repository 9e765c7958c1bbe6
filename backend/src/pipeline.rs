//! The work done for a single parse request.

use std::sync::Arc;

use analysis::replay::{DecodeError, ReplayDecoder};
use common::ParseRequest;

use crate::config::Config;
use crate::delivery::{DeliveryError, ResultSink, WebhookClient};
use crate::storage::{DemoStorage, FileStorage, HttpStorage, StorageError};

#[derive(Debug, thiserror::Error)]
pub enum ProcessError {
    #[error(transparent)]
    Download(#[from] StorageError),
    #[error("parsing demo: {0}")]
    Decode(#[from] DecodeError),
    #[error(transparent)]
    Delivery(#[from] DeliveryError),
    #[error("analysis task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

#[derive(Debug, thiserror::Error)]
pub enum SetupError {
    #[error("building http client: {0}")]
    Http(#[from] reqwest::Error),
    #[error("either a demo folder or the storage url and key must be configured")]
    MissingStorage,
}

/// Download, parse and delivery of one demo, strictly in that order.
///
/// A pipeline holds no per request state, so one instance is shared by all
/// requests.
pub struct Pipeline {
    storage: Arc<dyn DemoStorage>,
    decoder: Arc<dyn ReplayDecoder>,
    sink: Arc<dyn ResultSink>,
}

impl Pipeline {
    pub fn new(
        storage: Arc<dyn DemoStorage>,
        decoder: Arc<dyn ReplayDecoder>,
        sink: Arc<dyn ResultSink>,
    ) -> Self {
        Self {
            storage,
            decoder,
            sink,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, SetupError> {
        let http = reqwest::Client::builder().build()?;

        let storage: Arc<dyn DemoStorage> = match (
            &config.demo_folder,
            &config.storage_url,
            &config.storage_key,
        ) {
            (Some(folder), _, _) => {
                tracing::info!(?folder, "Loading demos from local folder");
                Arc::new(FileStorage::new(folder.clone()))
            }
            (None, Some(url), Some(key)) => Arc::new(HttpStorage::new(
                http.clone(),
                url.as_str(),
                config.storage_bucket.as_str(),
                key.as_str(),
                config.download_timeout(),
            )),
            (None, _, _) => return Err(SetupError::MissingStorage),
        };

        let sink = Arc::new(WebhookClient::new(
            http,
            config.webhook_url.as_str(),
            config.webhook_secret.as_str(),
            config.delivery_timeout(),
        ));

        Ok(Self::new(
            storage,
            Arc::new(analysis::eventlog::EventLogDecoder),
            sink,
        ))
    }

    #[tracing::instrument(skip(self, request), fields(demo_id = %request.demo_id))]
    pub async fn run(&self, request: &ParseRequest) -> Result<(), ProcessError> {
        let data = self.storage.load(request.file_path.clone()).await?;
        tracing::info!(bytes = data.data().len(), "Loaded demo");

        let decoder = self.decoder.clone();
        let demo_id = request.demo_id.clone();
        let result = tokio::task::spawn_blocking(move || {
            analysis::parse(&demo_id, decoder.as_ref(), data.data())
        })
        .await??;

        tracing::info!(
            players = result.players.len(),
            rounds = result.rounds.len(),
            events = result.events.len(),
            "Parsed demo"
        );

        self.sink.deliver(&result).await?;

        Ok(())
    }
}
