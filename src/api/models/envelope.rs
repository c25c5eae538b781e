//! The platform's response envelope.
//!
//! Every success body has the shape
//! `{ "statusCode": u16, "data": ..., "message": ..., "success": bool }`
//! with `success` computed from the status code. Errors are shaped by
//! [`crate::errors::Error`]'s `IntoResponse` and carry `data: null` plus an
//! `errors` array.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope<T> {
    pub status_code: u16,
    pub data: Option<T>,
    pub message: String,
    pub success: bool,
}

impl<T: Serialize> ApiEnvelope<T> {
    pub fn new(status: StatusCode, data: T, message: impl Into<String>) -> Self {
        Self {
            status_code: status.as_u16(),
            data: Some(data),
            message: message.into(),
            success: status.is_success() || status.is_redirection(),
        }
    }

    /// 200 envelope.
    pub fn ok(data: T, message: impl Into<String>) -> Self {
        Self::new(StatusCode::OK, data, message)
    }

    /// 201 envelope.
    pub fn created(data: T, message: impl Into<String>) -> Self {
        Self::new(StatusCode::CREATED, data, message)
    }
}

impl ApiEnvelope<()> {
    /// 200 envelope carrying only a message.
    pub fn message_only(message: impl Into<String>) -> Self {
        Self {
            status_code: StatusCode::OK.as_u16(),
            data: None,
            message: message.into(),
            success: true,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiEnvelope<T> {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::OK);
        (status, axum::Json(self)).into_response()
    }
}

/// An envelope plus `Set-Cookie` headers (login, refresh, logout).
pub struct WithCookies<T> {
    pub envelope: ApiEnvelope<T>,
    pub cookies: Vec<String>,
}

impl<T: Serialize> IntoResponse for WithCookies<T> {
    fn into_response(self) -> Response {
        let mut response = self.envelope.into_response();
        for cookie in &self.cookies {
            if let Ok(value) = axum::http::HeaderValue::from_str(cookie) {
                response.headers_mut().append(axum::http::header::SET_COOKIE, value);
            }
        }
        response
    }
}
