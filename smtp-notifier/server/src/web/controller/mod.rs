// FIXME: remove this after this utoipa issue is fixed: https://github.com/juhaku/utoipa/pull/1423
#![allow(clippy::needless_for_each)]
mod error;
mod notifier;

use axum::{routing, Extension, Router};
use smtp_notifier_axum::response::EncapsulatedJson;
use smtp_notifier_core::{
    model::{Setting, SettingType},
    ServerInfo,
};
use utoipa::OpenApi;

pub use self::error::{Error, Result};
use crate::ServiceState;

pub fn api_v1_router(service_state: &ServiceState) -> Router {
    let routes = Router::new()
        .route("/v1/info", routing::get(server_info))
        .route(
            "/v1/notifiers",
            routing::get(notifier::list_notifiers).post(notifier::create_notifier),
        )
        .route("/v1/notifiers/create-settings", routing::get(notifier::creation_settings))
        .route(
            "/v1/notifiers/:id",
            routing::get(notifier::get_notifier).delete(notifier::release_notifier),
        )
        .route("/v1/notifiers/:id/settings", routing::get(notifier::get_settings))
        .route("/v1/notifiers/:id/settings/:key", routing::put(notifier::put_setting))
        .route("/v1/notifiers/:id/notifications", routing::post(notifier::send_notification));

    Router::new().nest("/api", routes).with_state(service_state.clone())
}

/// Get server info
#[utoipa::path(
    get,
    operation_id = "get_server_info",
    path = "/api/v1/info",
    responses(
        (status = 200, body = ServerInfo)
    )
)]
pub async fn server_info(
    Extension(server_info): Extension<ServerInfo>,
) -> Result<EncapsulatedJson<ServerInfo>> {
    Ok(EncapsulatedJson::ok(server_info))
}

#[derive(OpenApi)]
#[openapi(
    paths(
        server_info,
        notifier::list_notifiers,
        notifier::create_notifier,
        notifier::creation_settings,
        notifier::get_notifier,
        notifier::release_notifier,
        notifier::get_settings,
        notifier::put_setting,
        notifier::send_notification,
    ),
    components(schemas(
        ServerInfo,
        Setting,
        SettingType,
        crate::entity::Notifier,
        crate::entity::CreateNotifierRequest,
        crate::entity::PutSettingRequest,
        crate::entity::MediaSource,
        crate::entity::SendNotificationRequest,
        crate::entity::SendNotificationResponse,
    )),
    tags(
        (name = "Notifiers", description = "SMTP notifier management and delivery")
    )
)]
pub struct ApiDoc;
