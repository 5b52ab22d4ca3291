pub mod controller;
pub mod error;

use std::{future::Future, net::SocketAddr, sync::Arc, time::Duration};

use axum::{
    extract::{DefaultBodyLimit, Request},
    http, routing, Extension, Json, Router, ServiceExt,
};
use smtp_notifier_axum::json_response;
use smtp_notifier_core::ServerInfo;
use smtp_notifier_metrics::NotificationMetrics;
use snafu::ResultExt;
use tokio::net::TcpListener;
use tower::{Layer, ServiceBuilder};
use tower_http::{
    compression::CompressionLayer, normalize_path::NormalizePathLayer, trace::TraceLayer,
};
use utoipa::OpenApi;

pub use self::{controller::ApiDoc, error::Error};
use crate::service::{MailerConnector, MediaConverter, NotifierService, storage::NotifierStore};

pub async fn new_api_server<ShutdownSignal>(
    socket_address: SocketAddr,
    service_state: ServiceState,
    server_info: ServerInfo,
    shutdown_signal: ShutdownSignal,
) -> Result<(), Error>
where
    ShutdownSignal: Future<Output = ()> + Send + 'static,
{
    let router = {
        let router = NormalizePathLayer::trim_trailing_slash().layer(new_router(service_state, server_info));
        ServiceExt::<Request>::into_make_service_with_connect_info::<SocketAddr>(router)
    };

    let listener = TcpListener::bind(&socket_address).await.context(error::BindTcpServerSnafu)?;
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal)
        .await
        .map_err(|err| Error::ServeHttpServer { message: err.to_string() })
}

/// Room left in a request body for the title, the text body and JSON syntax
/// around inline media.
const REQUEST_BODY_OVERHEAD: usize = 64 * 1024;

/// Largest request body accepted, big enough for base64 encoded media of
/// `max_media_size` bytes.
const fn request_body_limit(max_media_size: usize) -> usize {
    max_media_size.div_ceil(3).saturating_mul(4).saturating_add(REQUEST_BODY_OVERHEAD)
}

/// Every route of the HTTP API, without the listener.
pub fn new_router(service_state: ServiceState, server_info: ServerInfo) -> Router {
    let body_limit = request_body_limit(service_state.notifier_service.max_media_size());
    let middleware_stack =
        ServiceBuilder::new().layer(TraceLayer::new_for_http()).layer(CompressionLayer::new());

    Router::new()
        .route("/", routing::get(controller::server_info))
        .route("/openapi.json", routing::get(openapi_json))
        .merge(controller::api_v1_router(&service_state))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(Extension(server_info))
        .layer(middleware_stack)
        .fallback(fallback)
}

// SAFETY: `axum` handler must be async
#[allow(clippy::unused_async)]
async fn fallback(uri: http::Uri) -> axum::response::Response {
    json_response! {
        status: http::StatusCode::NOT_FOUND,
        error: smtp_notifier_axum::response::Error::new(
            smtp_notifier_axum::response::ErrorType::NotFound,
            format!("No route for {uri}")
        )
    }
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> { Json(ApiDoc::openapi()) }

#[derive(Clone)]
pub struct ServiceState {
    pub notifier_service: NotifierService,
}

impl ServiceState {
    #[must_use]
    pub fn new(
        store: Arc<dyn NotifierStore>,
        connector: Arc<dyn MailerConnector>,
        media: MediaConverter,
        metrics: NotificationMetrics,
        smtp_timeout: Duration,
    ) -> Self {
        let notifier_service = NotifierService::new(store, connector, media, metrics, smtp_timeout);

        Self { notifier_service }
    }
}
