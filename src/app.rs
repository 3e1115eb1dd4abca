use anyhow::Context;
use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::{config::AppConfig, products, state::AppState, uploads, users};

pub fn build_app(state: AppState) -> Router {
    let upload_limit = state.config.upload_max_bytes;
    Router::new()
        .merge(users::router())
        .merge(products::router())
        .merge(uploads::router(upload_limit))
        .route("/health", get(|| async { "ok" }))
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|req: &axum::http::Request<_>| {
                    let method = req.method().clone();
                    let uri = req.uri().clone();
                    tracing::info_span!(
                        "http_request",
                        %method,
                        uri = %uri,
                        status = tracing::field::Empty
                    )
                })
                .on_response(
                    |res: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     span: &tracing::Span| {
                        let status = res.status();
                        span.record("status", tracing::field::display(status));
                        let latency_ms = latency.as_millis() as u64;
                        if status.is_server_error() {
                            tracing::error!(%status, latency_ms, "response");
                        } else {
                            tracing::info!(%status, latency_ms, "response");
                        }
                    },
                ),
        )
}

/// Binds `host:port` from the config and runs until the server stops.
pub async fn serve(app: Router, config: &AppConfig) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind((config.host.as_str(), config.port))
        .await
        .with_context(|| format!("bind {}:{}", config.host, config.port))?;
    tracing::info!(addr = %listener.local_addr()?, "stockroom listening");
    axum::serve(listener, app).await?;
    Ok(())
}
