use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::llm::AnalysisError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Unsupported provider: {0}")]
    UnsupportedProvider(String),

    #[error("LLM analysis failed: {0}")]
    Analysis(AnalysisError),
}

impl AppError {
    fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            AppError::UnsupportedProvider(_) => StatusCode::BAD_REQUEST,
            AppError::Analysis(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<AnalysisError> for AppError {
    fn from(err: AnalysisError) -> Self {
        if err.is_client_error() {
            AppError::UnsupportedProvider(err.to_string())
        } else {
            AppError::Analysis(err)
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(json!({
            "error": self.to_string(),
            "status": status.as_u16(),
        }));

        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response.headers_mut().insert(
                header::WWW_AUTHENTICATE,
                HeaderValue::from_static("Basic realm=\"risk-sentinel\""),
            );
        }
        response
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::{ProviderName, UnknownProvider};

    #[test]
    fn test_validation_error_status_code() {
        let error = AppError::Validation("amount: must be a non-negative number".to_string());
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_bad_request_error_status_code() {
        let error = AppError::BadRequest("Invalid request format".to_string());
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_unsupported_provider_maps_to_client_error() {
        let error: AppError = AnalysisError::from(UnknownProvider("unknown_llm".to_string())).into();
        assert!(matches!(error, AppError::UnsupportedProvider(_)));
        assert_eq!(error.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn test_provider_failure_maps_to_server_error() {
        let error: AppError = AnalysisError::TooManyRequests {
            provider: ProviderName::OpenAi,
            attempts: 3,
        }
        .into();
        assert_eq!(error.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
        assert!(error.to_string().starts_with("LLM analysis failed"));
    }

    #[tokio::test]
    async fn test_unauthorized_response_challenges_basic_auth() {
        let response = AppError::Unauthorized("Invalid credentials".to_string()).into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            response.headers()[header::WWW_AUTHENTICATE],
            "Basic realm=\"risk-sentinel\""
        );
    }

    #[tokio::test]
    async fn test_error_body_shape() {
        let response = AppError::Validation("merchant.id: must not be empty".to_string()).into_response();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(body["status"], 400);
        assert_eq!(body["error"], "Validation error: merchant.id: must not be empty");
    }
}
