use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, HeaderMap},
    middleware::Next,
    response::{IntoResponse, Response},
};
use base64::{engine::general_purpose::STANDARD, Engine as _};

use crate::config::AuthCredentials;
use crate::error::AppError;

/// Decodes an `Authorization: Basic <base64(user:pass)>` header.
pub fn parse_basic_credentials(headers: &HeaderMap) -> Option<AuthCredentials> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }

    let decoded = STANDARD.decode(encoded.trim()).ok()?;
    let decoded = String::from_utf8(decoded).ok()?;
    let (username, password) = decoded.split_once(':')?;

    Some(AuthCredentials {
        username: username.to_string(),
        password: password.to_string(),
    })
}

pub async fn basic_auth(
    State(expected): State<AuthCredentials>,
    req: Request,
    next: Next,
) -> Response {
    match parse_basic_credentials(req.headers()) {
        Some(credentials) if credentials == expected => next.run(req).await,
        Some(credentials) => {
            tracing::warn!(username = %credentials.username, "Rejected webhook credentials");
            AppError::Unauthorized("Invalid credentials".to_string()).into_response()
        }
        None => AppError::Unauthorized("Missing credentials".to_string()).into_response(),
    }
}
