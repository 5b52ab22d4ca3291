use std::{future::Future, net::SocketAddr};

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing, Router,
};
use bytes::Bytes;
use prometheus::{Encoder, TextEncoder};
use snafu::ResultExt;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::{error, Error, Metrics};

/// Serves the Prometheus text exposition on `/metrics` until `shutdown_signal`
/// resolves.
///
/// # Errors
///
/// Returns an error if the listener can not be bound or the server fails.
pub async fn start_metrics_server<M, ShutdownSignal>(
    listen_address: SocketAddr,
    metrics: M,
    shutdown_signal: ShutdownSignal,
) -> Result<(), Error>
where
    M: Metrics + 'static,
    ShutdownSignal: Future<Output = ()> + Send + 'static,
{
    let router = Router::new()
        .route("/metrics", routing::get(export::<M>))
        .layer(TraceLayer::new_for_http())
        .with_state(metrics);

    let listener = TcpListener::bind(&listen_address).await.context(error::BindMetricsServerSnafu)?;

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .context(error::ServeMetricsServerSnafu)
}

async fn export<M: Metrics>(State(metrics): State<M>) -> Response {
    let encoder = TextEncoder::new();
    let mut buffer = Vec::new();

    match encoder.encode(&metrics.gather(), &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [(header::CONTENT_TYPE, encoder.format_type().to_string())],
            Bytes::from(buffer),
        )
            .into_response(),
        Err(err) => {
            tracing::error!("Failed to encode metrics, error: {err}");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                [(header::CONTENT_TYPE, mime::TEXT_PLAIN_UTF_8.to_string())],
                err.to_string(),
            )
                .into_response()
        }
    }
}
