//! Error responses for the JSON API.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::{json, Value};

/// A non-2xx response with a JSON body.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    body: Value,
}

impl ApiError {
    /// 400 with `{"error": message}`.
    #[must_use]
    pub fn bad_request(message: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            body: json!({ "error": message }),
        }
    }

    /// 503 with `{"message": ..., "error": ...}`.
    #[must_use]
    pub fn unavailable(message: &str, err: &crate::error::Error) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            body: json!({ "message": message, "error": err.to_string() }),
        }
    }

    /// 500 carrying the zeroed `payload` with `error` and `message` merged
    /// in, so clients can still render the shape.
    #[must_use]
    pub fn failed(message: &str, err: &crate::error::Error, payload: Value) -> Self {
        let mut body = match payload {
            Value::Object(map) => map,
            _ => serde_json::Map::new(),
        };
        body.insert("error".into(), json!(message));
        body.insert("message".into(), json!(err.to_string()));
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            body: Value::Object(body),
        }
    }

    #[must_use]
    pub fn status(&self) -> StatusCode {
        self.status
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self.body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    #[test]
    fn unavailable_carries_the_cause() {
        let err = ApiError::unavailable("no data", &Error::UpstreamUnavailable("all down".into()));
        assert_eq!(err.status(), StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.body["error"], "all down");
        assert_eq!(err.body["message"], "no data");
    }

    #[test]
    fn failed_keeps_the_payload_shape() {
        let err = ApiError::failed(
            "Failed to fetch whale alerts",
            &Error::invalid("blockchain.com", "bad body"),
            json!({ "transactions": [], "currentPrice": 0 }),
        );
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.body["transactions"], json!([]));
        assert_eq!(err.body["error"], "Failed to fetch whale alerts");
        assert_eq!(
            err.body["message"],
            "invalid response from blockchain.com: bad body"
        );
    }
}
