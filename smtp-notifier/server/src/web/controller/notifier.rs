use axum::{
    extract::{Path, State},
    Json,
};
use smtp_notifier_axum::response::EncapsulatedJson;
use smtp_notifier_core::model::Setting;
use uuid::Uuid;

use crate::{
    entity::{
        CreateNotifierRequest, Notifier, PutSettingRequest, SendNotificationRequest,
        SendNotificationResponse,
    },
    service::NotifierService,
    web::controller::Result,
    ServiceState,
};

/// List notifiers
#[utoipa::path(
    get,
    operation_id = "list_notifiers",
    path = "/api/v1/notifiers",
    responses(
        (status = 200, description = "Notifiers in creation order", body = [Notifier])
    ),
    tag = "Notifiers"
)]
pub async fn list_notifiers(
    State(state): State<ServiceState>,
) -> Result<EncapsulatedJson<Vec<Notifier>>> {
    Ok(EncapsulatedJson::ok(state.notifier_service.list_notifiers().await?))
}

/// Create a notifier
///
/// The notifier starts without SMTP settings and refuses to send until they
/// are complete.
#[utoipa::path(
    post,
    operation_id = "create_notifier",
    path = "/api/v1/notifiers",
    request_body = CreateNotifierRequest,
    responses(
        (status = 200, description = "Notifier created", body = Notifier)
    ),
    tag = "Notifiers"
)]
pub async fn create_notifier(
    State(state): State<ServiceState>,
    Json(request): Json<CreateNotifierRequest>,
) -> Result<EncapsulatedJson<Notifier>> {
    let notifier = state.notifier_service.create_notifier(request.name.as_deref()).await?;

    Ok(EncapsulatedJson::ok(notifier))
}

/// Settings asked for when creating a notifier
#[utoipa::path(
    get,
    operation_id = "get_creation_settings",
    path = "/api/v1/notifiers/create-settings",
    responses(
        (status = 200, body = [Setting])
    ),
    tag = "Notifiers"
)]
// SAFETY: `axum` handler must be async
#[allow(clippy::unused_async)]
pub async fn creation_settings() -> Result<EncapsulatedJson<Vec<Setting>>> {
    Ok(EncapsulatedJson::ok(NotifierService::creation_settings()))
}

/// Get a notifier
#[utoipa::path(
    get,
    operation_id = "get_notifier",
    path = "/api/v1/notifiers/{id}",
    params(
        ("id" = Uuid, Path, description = "Notifier ID")
    ),
    responses(
        (status = 200, body = Notifier),
        (status = 404, description = "Notifier not found")
    ),
    tag = "Notifiers"
)]
pub async fn get_notifier(
    State(state): State<ServiceState>,
    Path(id): Path<Uuid>,
) -> Result<EncapsulatedJson<Notifier>> {
    Ok(EncapsulatedJson::ok(state.notifier_service.get_notifier(id).await?))
}

/// Release a notifier, its settings are removed
#[utoipa::path(
    delete,
    operation_id = "release_notifier",
    path = "/api/v1/notifiers/{id}",
    params(
        ("id" = Uuid, Path, description = "Notifier ID")
    ),
    responses(
        (status = 200, description = "Notifier released", body = ()),
        (status = 404, description = "Notifier not found")
    ),
    tag = "Notifiers"
)]
pub async fn release_notifier(
    State(state): State<ServiceState>,
    Path(id): Path<Uuid>,
) -> Result<EncapsulatedJson<()>> {
    state.notifier_service.release_notifier(id).await?;

    Ok(EncapsulatedJson::empty())
}

/// Get the SMTP settings of a notifier
///
/// The password is never returned, a stored password shows as `********`.
#[utoipa::path(
    get,
    operation_id = "get_notifier_settings",
    path = "/api/v1/notifiers/{id}/settings",
    params(
        ("id" = Uuid, Path, description = "Notifier ID")
    ),
    responses(
        (status = 200, body = [Setting]),
        (status = 404, description = "Notifier not found")
    ),
    tag = "Notifiers"
)]
pub async fn get_settings(
    State(state): State<ServiceState>,
    Path(id): Path<Uuid>,
) -> Result<EncapsulatedJson<Vec<Setting>>> {
    Ok(EncapsulatedJson::ok(state.notifier_service.get_settings(id).await?))
}

/// Change one SMTP setting
#[utoipa::path(
    put,
    operation_id = "put_notifier_setting",
    path = "/api/v1/notifiers/{id}/settings/{key}",
    params(
        ("id" = Uuid, Path, description = "Notifier ID"),
        ("key" = String, Path, description = "Setting key, e.g. `port`")
    ),
    request_body = PutSettingRequest,
    responses(
        (status = 200, description = "Settings after the change", body = [Setting]),
        (status = 400, description = "Unknown key or invalid value"),
        (status = 404, description = "Notifier not found")
    ),
    tag = "Notifiers"
)]
pub async fn put_setting(
    State(state): State<ServiceState>,
    Path((id, key)): Path<(Uuid, String)>,
    Json(request): Json<PutSettingRequest>,
) -> Result<EncapsulatedJson<Vec<Setting>>> {
    let settings = state.notifier_service.put_setting(id, &key, &request.value).await?;

    Ok(EncapsulatedJson::ok(settings))
}

/// Send a notification as email
#[utoipa::path(
    post,
    operation_id = "send_notification",
    path = "/api/v1/notifiers/{id}/notifications",
    params(
        ("id" = Uuid, Path, description = "Notifier ID")
    ),
    request_body = SendNotificationRequest,
    responses(
        (status = 200, description = "Email accepted by the SMTP server", body = SendNotificationResponse),
        (status = 400, description = "Media can not be read"),
        (status = 404, description = "Notifier not found"),
        (status = 422, description = "SMTP settings incomplete"),
        (status = 502, description = "SMTP server or media conversion failed")
    ),
    tag = "Notifiers"
)]
pub async fn send_notification(
    State(state): State<ServiceState>,
    Path(id): Path<Uuid>,
    Json(request): Json<SendNotificationRequest>,
) -> Result<EncapsulatedJson<SendNotificationResponse>> {
    let response = state.notifier_service.send_notification(id, request).await?;

    Ok(EncapsulatedJson::ok(response))
}
