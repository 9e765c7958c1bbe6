use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;

use crate::pipeline::Pipeline;

pub fn router(pipeline: Arc<Pipeline>) -> axum::Router {
    axum::Router::new()
        .route("/health", axum::routing::get(health))
        .route("/parse", axum::routing::post(parse))
        .layer(tower_http::trace::TraceLayer::new_for_http())
        .with_state(pipeline)
}

async fn health() -> &'static str {
    "OK"
}

// The body is decoded by hand so any invalid JSON is a plain 400, whatever
// the content type says.
#[tracing::instrument(skip_all)]
async fn parse(
    State(pipeline): State<Arc<Pipeline>>,
    body: Bytes,
) -> Result<axum::response::Json<common::ParseResponse>, (StatusCode, String)> {
    let request: common::ParseRequest = serde_json::from_slice(&body).map_err(|e| {
        tracing::warn!("Invalid parse request: {}", e);
        (StatusCode::BAD_REQUEST, e.to_string())
    })?;

    tracing::info!("Parsing demo: {}", request.demo_id);

    pipeline.run(&request).await.map_err(|e| {
        tracing::error!("Processing demo {}: {}", request.demo_id, e);
        (StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
    })?;

    Ok(axum::Json(common::ParseResponse::success()))
}
