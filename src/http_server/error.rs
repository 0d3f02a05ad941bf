//! Defines the custom `ApiError` type for the HTTP server.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;

/// A custom error type for the API that can be converted into an HTTP response.
#[derive(Debug)]
pub enum ApiError {
    /// Missing, malformed or wrong bearer token.
    Unauthorized(String),

    /// The request body could not be decoded.
    BadRequest(String),

    /// The bridge could not process the request.
    InternalServerError(String),
}

/// The `{"Status": <code>, "Message": <text>}` body every webhook reply uses.
pub fn reply(status: StatusCode, message: impl Into<String>) -> (StatusCode, Json<serde_json::Value>) {
    (status, Json(json!({ "Status": status.as_u16(), "Message": message.into() })))
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            ApiError::Unauthorized(message) => {
                tracing::info!(reason = %message, "Rejected unauthenticated request.");
                reply(StatusCode::UNAUTHORIZED, message).into_response()
            }
            ApiError::BadRequest(message) => {
                tracing::error!(error = %message, "Bad request.");
                reply(StatusCode::BAD_REQUEST, message).into_response()
            }
            ApiError::InternalServerError(message) => {
                tracing::error!(error = %message, "Internal server error.");
                reply(StatusCode::INTERNAL_SERVER_ERROR, message).into_response()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;

    use super::*;

    #[tokio::test]
    async fn test_api_error_body_shape() {
        let response = ApiError::BadRequest("unexpected EOF".into()).into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let value: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(value, json!({ "Status": 400, "Message": "unexpected EOF" }));
    }
}
