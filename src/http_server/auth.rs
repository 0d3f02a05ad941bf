//! Authentication middleware for the HTTP server.

use axum::{
    body::Body,
    extract::State,
    http::{Request, header},
    middleware::Next,
    response::Response,
};

use super::{ApiState, error::ApiError};

/// Extracts the token from `Authorization: Bearer <token>`, falling back to
/// the `token` query parameter. A present but malformed header is an error
/// even if the query carries a token.
fn extract_token(request: &Request<Body>) -> Result<String, ApiError> {
    if let Some(value) = request.headers().get(header::AUTHORIZATION) {
        let malformed = || ApiError::Unauthorized("Malformed authorization header".to_string());
        let value = value.to_str().map_err(|_| malformed())?;
        let mut parts = value.splitn(2, ' ');
        return match (parts.next(), parts.next()) {
            (Some(scheme), Some(token)) if scheme.eq_ignore_ascii_case("bearer") =>
                Ok(token.trim().to_string()),
            _ => Err(malformed()),
        };
    }

    request
        .uri()
        .query()
        .and_then(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .find(|(key, _)| key == "token")
                .map(|(_, value)| value.into_owned())
        })
        .ok_or_else(|| {
            ApiError::Unauthorized("Request does not contain an authorization token".to_string())
        })
}

/// Middleware for authenticating requests using a bearer token. Passes every
/// request through when no token is configured.
pub async fn auth(
    State(state): State<ApiState>,
    request: Request<Body>,
    next: Next,
) -> Result<Response, ApiError> {
    let Some(expected) = state.config.server.bearer_token.as_deref() else {
        return Ok(next.run(request).await);
    };

    let token = extract_token(&request)?;
    if token == expected {
        Ok(next.run(request).await)
    } else {
        Err(ApiError::Unauthorized("Invalid bearer token".to_string()))
    }
}
