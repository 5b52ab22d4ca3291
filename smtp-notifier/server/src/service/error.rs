use std::path::PathBuf;

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use smtp_notifier_axum::{json_response, response};
use snafu::Snafu;
use uuid::Uuid;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Fail to acquire database connection, error: {source}"))]
    AcquireConnection { source: sqlx::Error },

    #[snafu(display("Fail to list notifiers, error: {source}"))]
    ListNotifiers { source: sqlx::Error },

    #[snafu(display("Fail to get notifier by id, error: {source}"))]
    GetNotifierById { source: sqlx::Error },

    #[snafu(display("Fail to insert notifier, error: {source}"))]
    InsertNotifier { source: sqlx::Error },

    #[snafu(display("Fail to delete notifier, error: {source}"))]
    DeleteNotifier { source: sqlx::Error },

    #[snafu(display("Fail to get notifier settings, error: {source}"))]
    GetSettings { source: sqlx::Error },

    #[snafu(display("Fail to store notifier setting, error: {source}"))]
    PutSetting { source: sqlx::Error },

    #[snafu(display("Notifier not found: {id}"))]
    NotifierNotFound { id: Uuid },

    #[snafu(display("{source}"))]
    Setting { source: smtp_notifier_core::error::Error },

    #[snafu(display("SMTP client not initialized."))]
    NotifierNotConfigured { id: Uuid },

    #[snafu(display("{source}"))]
    ConnectSmtp { source: notification::Error },

    #[snafu(display("{source}"))]
    SendEmail { source: notification::Error },

    #[snafu(display("Fail to build HTTP client for media, error: {source}"))]
    BuildHttpClient { source: reqwest::Error },

    #[snafu(display("Invalid media URL `{url}`"))]
    InvalidMediaUrl { url: String },

    #[snafu(display("Unsupported media URL scheme `{scheme}`"))]
    UnsupportedMediaScheme { scheme: String },

    #[snafu(display("Fail to decode base64 media, error: {source}"))]
    DecodeMedia { source: base64::DecodeError },

    #[snafu(display("Fail to fetch media from {url}, error: {source}"))]
    FetchMedia { url: String, source: reqwest::Error },

    #[snafu(display("Media of {size} bytes exceeds the limit of {limit} bytes"))]
    MediaTooLarge { size: u64, limit: usize },

    #[snafu(display("Fail to run `{}`, error: {source}", path.display()))]
    SpawnFfmpeg { path: PathBuf, source: std::io::Error },

    #[snafu(display("Media conversion did not finish in time"))]
    FfmpegTimeout,

    #[snafu(display("Media conversion failed: {message}"))]
    FfmpegFailed { message: String },
}

impl From<smtp_notifier_core::error::Error> for Error {
    fn from(source: smtp_notifier_core::error::Error) -> Self { Self::Setting { source } }
}

impl Error {
    /// Label used by the `notifications_failed_total` counter.
    #[must_use]
    pub const fn failure_reason(&self) -> &'static str {
        match self {
            Self::NotifierNotConfigured { .. } => "not_configured",
            Self::ConnectSmtp { .. } => "connect",
            Self::SendEmail { .. } => "send",
            Self::InvalidMediaUrl { .. }
            | Self::UnsupportedMediaScheme { .. }
            | Self::DecodeMedia { .. }
            | Self::FetchMedia { .. }
            | Self::MediaTooLarge { .. }
            | Self::SpawnFfmpeg { .. }
            | Self::FfmpegTimeout
            | Self::FfmpegFailed { .. } => "media",
            _ => "internal",
        }
    }
}

impl IntoResponse for Error {
    // SAFETY: allow: high cognitive complexity caused by `tracing` macro
    #[allow(clippy::cognitive_complexity)]
    fn into_response(self) -> Response {
        match self {
            Self::Setting { source } => source.into_response(),
            Self::NotifierNotFound { .. } => json_response! {
                reason: self,
                status: StatusCode::NOT_FOUND,
                error: response::Error::new(response::ErrorType::NotFound, self.to_string())
            },
            Self::NotifierNotConfigured { .. } => json_response! {
                reason: self,
                status: StatusCode::UNPROCESSABLE_ENTITY,
                error: response::Error::new(
                    response::ErrorType::UnprocessableEntity,
                    self.to_string()
                )
            },
            Self::InvalidMediaUrl { .. }
            | Self::UnsupportedMediaScheme { .. }
            | Self::DecodeMedia { .. }
            | Self::MediaTooLarge { .. } => json_response! {
                reason: self,
                status: StatusCode::BAD_REQUEST,
                error: response::Error::new(response::ErrorType::BadRequest, self.to_string())
            },
            Self::ConnectSmtp { .. }
            | Self::SendEmail { .. }
            | Self::FetchMedia { .. }
            | Self::FfmpegTimeout
            | Self::FfmpegFailed { .. } => json_response! {
                reason: self,
                status: StatusCode::BAD_GATEWAY,
                error: response::Error::new(response::ErrorType::Execution, self.to_string())
            },
            _ => json_response! {
                reason: self,
                status: StatusCode::INTERNAL_SERVER_ERROR,
                error: response::Error::new(response::ErrorType::Internal, self.to_string())
            },
        }
    }
}
