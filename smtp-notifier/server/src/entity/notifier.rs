use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

/// A configured SMTP destination
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ToSchema, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Notifier {
    /// Unique notifier ID
    #[schema(example = "550e8400-e29b-41d4-a716-446655440000")]
    pub id: Uuid,

    /// Human readable name
    #[schema(example = "Front door camera")]
    pub name: String,

    /// Timestamp when the notifier was created
    pub created_at: DateTime<Utc>,
}

/// Request to create a notifier
#[derive(Clone, Debug, Default, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateNotifierRequest {
    /// Name of the notifier, `New SMTP Notifier` when omitted
    #[schema(example = "Front door camera")]
    #[serde(default)]
    pub name: Option<String>,
}

/// Request to change one setting
#[derive(Clone, Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PutSettingRequest {
    /// New value, `null` clears the setting
    #[schema(value_type = Object, example = 587)]
    #[serde(default)]
    pub value: serde_json::Value,
}

/// Media resource attached to a notification
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ToSchema)]
#[serde(untagged)]
pub enum MediaSource {
    /// `http(s)` or `data:` URL of an image, or a stream URL (`rtsp://`,
    /// `rtmp://`) to take a snapshot from
    Url { url: String },

    /// Base64 encoded media
    Inline {
        data: String,

        #[serde(default, rename = "mimeType")]
        mime_type: Option<String>,
    },
}

/// A notification event
#[derive(Clone, Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationRequest {
    /// Subject of the email
    #[schema(example = "Motion detected")]
    pub title: String,

    /// Plain text body of the email
    #[schema(example = "Someone is at the front door")]
    #[serde(default)]
    pub body: Option<String>,

    /// Media converted to a PNG attachment
    #[serde(default)]
    pub media: Option<MediaSource>,
}

/// Outcome of a delivered notification
#[derive(Clone, Debug, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendNotificationResponse {
    pub notifier_id: Uuid,

    /// Recipients as configured in `to_email`
    #[schema(example = "owner@example.com")]
    pub recipients: String,

    /// Whether an `image.png` attachment was included
    pub attachment: bool,
}
