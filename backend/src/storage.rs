use futures::FutureExt;

#[derive(Debug, Clone)]
pub enum AnalysisData {
    MemMapped(std::sync::Arc<memmap2::Mmap>),
    Preloaded(bytes::Bytes),
}

impl AnalysisData {
    pub fn data(&self) -> &[u8] {
        match self {
            AnalysisData::MemMapped(v) => v,
            AnalysisData::Preloaded(v) => v,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("requesting demo: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("failed to download demo: status {status}")]
    Status { status: u16 },
    #[error("reading demo: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid demo path {0:?}")]
    InvalidPath(String),
}

/// Checks that `file_path` stays below the folder or bucket it is resolved
/// against. A single leading `/` is tolerated.
pub fn relative_demo_path(file_path: &str) -> Result<&std::path::Path, StorageError> {
    let relative = std::path::Path::new(file_path.strip_prefix('/').unwrap_or(file_path));

    let escapes = relative
        .components()
        .any(|c| !matches!(c, std::path::Component::Normal(_)));
    if escapes || relative.as_os_str().is_empty() {
        return Err(StorageError::InvalidPath(file_path.to_owned()));
    }

    Ok(relative)
}

pub trait DemoStorage: Send + Sync {
    fn load<'f, 'own>(
        &'own self,
        file_path: String,
    ) -> futures::future::BoxFuture<'f, Result<AnalysisData, StorageError>>
    where
        'own: 'f;
}

/// Demos stored below a local folder.
pub struct FileStorage {
    folder: std::sync::Arc<std::path::PathBuf>,
}

impl FileStorage {
    pub fn new<P>(folder: P) -> Self
    where
        P: Into<std::path::PathBuf>,
    {
        Self {
            folder: std::sync::Arc::new(folder.into()),
        }
    }
}

impl DemoStorage for FileStorage {
    fn load<'f, 'own>(
        &'own self,
        file_path: String,
    ) -> futures::future::BoxFuture<'f, Result<AnalysisData, StorageError>>
    where
        'own: 'f,
    {
        async move {
            let relative = relative_demo_path(&file_path)?;
            let demo_file_path = self.folder.join(relative);
            let file = std::fs::File::open(demo_file_path.as_path())?;
            // The mapping is only read, demos are never modified in place.
            let mmap = unsafe { memmap2::MmapOptions::new().map(&file)? };

            Ok(AnalysisData::MemMapped(std::sync::Arc::new(mmap)))
        }
        .boxed()
    }
}

/// Demos stored in a bucket behind the storage HTTP API.
pub struct HttpStorage {
    http: reqwest::Client,
    base_url: String,
    bucket: String,
    key: String,
    timeout: std::time::Duration,
}

impl HttpStorage {
    pub fn new(
        http: reqwest::Client,
        base_url: impl Into<String>,
        bucket: impl Into<String>,
        key: impl Into<String>,
        timeout: std::time::Duration,
    ) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            bucket: bucket.into(),
            key: key.into(),
            timeout,
        }
    }

    pub fn object_url(&self, file_path: &str) -> String {
        format!(
            "{}/storage/v1/object/{}/{}",
            self.base_url.trim_end_matches('/'),
            self.bucket,
            file_path.trim_start_matches('/')
        )
    }
}

impl DemoStorage for HttpStorage {
    fn load<'f, 'own>(
        &'own self,
        file_path: String,
    ) -> futures::future::BoxFuture<'f, Result<AnalysisData, StorageError>>
    where
        'own: 'f,
    {
        async move {
            relative_demo_path(&file_path)?;

            let url = self.object_url(&file_path);
            tracing::debug!(%url, "Downloading demo");

            let response = self
                .http
                .get(url)
                .bearer_auth(&self.key)
                .timeout(self.timeout)
                .send()
                .await?;

            if !response.status().is_success() {
                return Err(StorageError::Status {
                    status: response.status().as_u16(),
                });
            }

            let body = response.bytes().await?;
            tracing::debug!(bytes = body.len(), "Downloaded demo");

            Ok(AnalysisData::Preloaded(body))
        }
        .boxed()
    }
}
