use std::fmt::Debug;

use axum::{
    body,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EncapsulatedResponse<T, M = ()> {
    #[serde(rename = "_status", with = "http_serde::status_code")]
    status_code: StatusCode,

    #[serde(rename = "_metadata", skip_serializing_if = "Option::is_none")]
    metadata: Option<M>,

    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<T>,
}

impl<T, M> EncapsulatedResponse<T, M> {
    #[inline]
    #[must_use]
    pub const fn ok(data: T) -> Self {
        Self { status_code: StatusCode::OK, metadata: None, data: Some(data) }
    }

    #[inline]
    #[must_use]
    pub const fn empty() -> Self { Self { status_code: StatusCode::OK, metadata: None, data: None } }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct EncapsulatedResponseError<E, M = ()> {
    #[serde(rename = "_status", with = "http_serde::status_code")]
    status_code: StatusCode,

    #[serde(rename = "_metadata", skip_serializing_if = "Option::is_none")]
    metadata: Option<M>,

    error: Option<E>,
}

impl<E, M> EncapsulatedResponseError<E, M> {
    #[inline]
    #[must_use]
    pub const fn err(error: E) -> Self {
        Self { status_code: StatusCode::INTERNAL_SERVER_ERROR, metadata: None, error: Some(error) }
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct EncapsulatedJson<T, M = ()>(pub EncapsulatedResponse<T, M>);

impl<T, M> EncapsulatedJson<T, M> {
    #[inline]
    #[must_use]
    pub const fn ok(data: T) -> Self { Self(EncapsulatedResponse::ok(data)) }

    #[inline]
    #[must_use]
    pub const fn empty() -> Self { Self(EncapsulatedResponse::empty()) }

    #[inline]
    #[must_use]
    pub const fn status_code(mut self, status_code: StatusCode) -> Self {
        self.0.status_code = status_code;
        self
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct EncapsulatedJsonError<E, M = ()>(pub EncapsulatedResponseError<E, M>);

impl<E, M> EncapsulatedJsonError<E, M> {
    #[inline]
    #[must_use]
    pub const fn err(error: E) -> Self { Self(EncapsulatedResponseError::err(error)) }

    #[inline]
    #[must_use]
    pub const fn status_code(mut self, status_code: StatusCode) -> Self {
        self.0.status_code = status_code;
        self
    }
}

fn json_body<B: Serialize>(status_code: StatusCode, body: &B) -> Response {
    let body = body::Body::from(serde_json::to_vec(body).expect("envelope is serializable"));

    Response::builder()
        .status(status_code)
        .header(header::CONTENT_TYPE, mime::APPLICATION_JSON.as_ref())
        .body(body)
        .expect("Build `Axum` response successfully; qed")
}

impl<T, M> IntoResponse for EncapsulatedJson<T, M>
where
    T: Serialize,
    M: Serialize,
{
    fn into_response(self) -> Response { json_body(self.0.status_code, &self.0) }
}

impl<E, M> IntoResponse for EncapsulatedJsonError<E, M>
where
    E: Debug + Serialize,
    M: Serialize,
{
    fn into_response(self) -> Response { json_body(self.0.status_code, &self.0) }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Error {
    #[serde(rename = "type")]
    pub type_: ErrorType,

    pub message: String,

    #[serde(flatten, skip_serializing_if = "IndexMap::is_empty")]
    pub additional_fields: IndexMap<String, serde_json::Value>,
}

impl Error {
    #[inline]
    #[must_use]
    pub fn new(type_: ErrorType, message: impl Into<String>) -> Self {
        Self { type_, message: message.into(), additional_fields: IndexMap::default() }
    }
}

/// Builds an enveloped JSON response.
///
/// The `reason:` forms also log the underlying error, at `error` level for 5xx
/// and `warn` otherwise.
#[macro_export]
macro_rules! json_response {
    (status: $status:expr,data: $data:expr) => {
        ::axum::response::IntoResponse::into_response(
            $crate::response::EncapsulatedJson::<_>::ok($data).status_code($status),
        )
    };

    (status: $status:expr,error: $error:expr) => {
        ::axum::response::IntoResponse::into_response(
            $crate::response::EncapsulatedJsonError::<_>::err($error).status_code($status),
        )
    };

    (reason: $reason:expr,status: $status:expr,error: $error:expr) => {{
        let status: ::axum::http::StatusCode = $status;
        if status.is_server_error() {
            tracing::error!(status_code = status.as_u16(), "Internal Server Error: {}", $reason);
        } else {
            tracing::warn!(status_code = status.as_u16(), "Response Error: {}", $reason);
        }

        $crate::json_response! { status: status, error: $error }
    }};
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorType {
    Internal,
    Validation,
    Execution,
    NotFound,
    BadRequest,
    UnprocessableEntity,
}
