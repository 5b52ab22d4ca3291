use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
};
use smtp_notifier_axum::{json_response, response};
use snafu::Snafu;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("Unknown setting `{key}`"))]
    UnknownSettingKey { key: String },

    #[snafu(display("Port must be a number."))]
    PortNotNumber { value: String },

    #[snafu(display("Port must be between 0 and 65535."))]
    PortOutOfRange { value: i64 },

    #[snafu(display("Setting `{key}` expects a scalar value"))]
    UnsupportedSettingValue { key: String },
}

impl IntoResponse for Error {
    // SAFETY: allow: high cognitive complexity caused by `tracing` macro
    #[allow(clippy::cognitive_complexity)]
    fn into_response(self) -> Response {
        match self {
            Self::UnknownSettingKey { .. }
            | Self::PortNotNumber { .. }
            | Self::PortOutOfRange { .. }
            | Self::UnsupportedSettingValue { .. } => json_response! {
                reason: self,
                status: StatusCode::BAD_REQUEST,
                error: response::Error::new(response::ErrorType::Validation, self.to_string())
            },
        }
    }
}
