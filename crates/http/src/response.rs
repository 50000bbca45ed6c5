//! Uniform response envelope shared by every endpoint.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Outcome marker carried in every envelope
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Success,
    Fail,
}

/// `{status, message?, data?}` wrapper; absent parts are omitted from the JSON.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T = serde_json::Value> {
    pub status: Status,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Success carrying only data
    pub fn data(data: T) -> Self {
        Self {
            status: Status::Success,
            message: None,
            data: Some(data),
        }
    }

    /// Success carrying a message and data
    pub fn message_with_data(message: impl Into<String>, data: T) -> Self {
        Self {
            status: Status::Success,
            message: Some(message.into()),
            data: Some(data),
        }
    }

    /// Pair the envelope with a status code
    pub fn with_status(self, status: StatusCode) -> (StatusCode, Json<Self>) {
        (status, Json(self))
    }
}

impl ApiResponse {
    /// Success carrying only a message
    pub fn message(message: impl Into<String>) -> Self {
        Self {
            status: Status::Success,
            message: Some(message.into()),
            data: None,
        }
    }

    /// Failure carrying a message
    pub fn fail(message: impl Into<String>) -> Self {
        Self {
            status: Status::Fail,
            message: Some(message.into()),
            data: None,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        Json(self).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn message_only_envelope_omits_data() {
        let value = serde_json::to_value(ApiResponse::message("Buku berhasil dihapus")).unwrap();
        assert_eq!(
            value,
            json!({"status": "success", "message": "Buku berhasil dihapus"})
        );
    }

    #[test]
    fn data_only_envelope_omits_message() {
        let value = serde_json::to_value(ApiResponse::data(json!({"books": []}))).unwrap();
        assert_eq!(value, json!({"status": "success", "data": {"books": []}}));
    }

    #[test]
    fn fail_envelope_has_fail_status() {
        let value = serde_json::to_value(ApiResponse::fail("Buku tidak ditemukan")).unwrap();
        assert_eq!(value["status"], "fail");
        assert!(value.get("data").is_none());
    }
}
