use std::path::PathBuf;
use std::time::Duration;

/// Everything the service reads from its environment.
///
/// Built once in `main` and handed to whatever needs it.
#[derive(Clone, clap::Parser)]
#[command(version, about = "Parses uploaded demos and forwards the results")]
pub struct Config {
    /// Base URL of the object storage
    #[arg(long, env = "SUPABASE_URL", required_unless_present = "demo_folder")]
    pub storage_url: Option<String>,

    #[arg(
        long,
        env = "SUPABASE_SERVICE_ROLE_KEY",
        hide_env_values = true,
        required_unless_present = "demo_folder"
    )]
    pub storage_key: Option<String>,

    #[arg(long, env = "STORAGE_BUCKET", default_value = "demos")]
    pub storage_bucket: String,

    /// Serve demos from a local folder instead of the object storage
    #[arg(long, env = "DEMO_FOLDER")]
    pub demo_folder: Option<PathBuf>,

    #[arg(long, env = "WEBHOOK_URL")]
    pub webhook_url: String,

    #[arg(long, env = "WEBHOOK_SECRET", hide_env_values = true)]
    pub webhook_secret: String,

    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    #[arg(long, env = "DOWNLOAD_TIMEOUT_SECS", default_value_t = 120)]
    pub download_timeout_secs: u64,

    #[arg(long, env = "DELIVERY_TIMEOUT_SECS", default_value_t = 30)]
    pub delivery_timeout_secs: u64,
}

impl Config {
    pub fn download_timeout(&self) -> Duration {
        Duration::from_secs(self.download_timeout_secs)
    }

    pub fn delivery_timeout(&self) -> Duration {
        Duration::from_secs(self.delivery_timeout_secs)
    }

    pub fn listen_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::from(([0, 0, 0, 0], self.port))
    }
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("storage_url", &self.storage_url)
            .field("storage_key", &self.storage_key.as_ref().map(|_| "<redacted>"))
            .field("storage_bucket", &self.storage_bucket)
            .field("demo_folder", &self.demo_folder)
            .field("webhook_url", &self.webhook_url)
            .field("webhook_secret", &"<redacted>")
            .field("port", &self.port)
            .field("download_timeout_secs", &self.download_timeout_secs)
            .field("delivery_timeout_secs", &self.delivery_timeout_secs)
            .finish()
    }
}
