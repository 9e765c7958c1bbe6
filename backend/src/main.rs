use clap::Parser;
use tracing_subscriber::prelude::__tracing_subscriber_SubscriberExt;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let registry = tracing_subscriber::Registry::default()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::filter_fn(|meta| {
            let target = meta.target();
            target.contains("backend") || target.contains("analysis") || target.contains("tower_http")
        }));
    tracing::subscriber::set_global_default(registry)?;

    let config = backend::config::Config::parse();
    tracing::info!(?config, "Starting...");

    let pipeline = backend::pipeline::Pipeline::from_config(&config)?;
    let router = backend::api::router(std::sync::Arc::new(pipeline));

    let listener = tokio::net::TcpListener::bind(config.listen_addr()).await?;
    tracing::info!("Demo parser service listening on {}", listener.local_addr()?);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Listening for shutdown signal: {:?}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
