use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ApiError>;

#[derive(Debug, Error)]
pub enum ApiError {
    /// Input rejection: wrong extension, empty file, bad mapping, or any
    /// terminal analysis failure. Always carries a user-readable message.
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    PaymentRequired(String),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<analysis::AnalysisError> for ApiError {
    fn from(err: analysis::AnalysisError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::PaymentRequired(_) => StatusCode::PAYMENT_REQUIRED,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let body = Json(json!({
            "error": self.to_string(),
        }));

        (status, body).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_analysis_errors_map_to_bad_request() {
        let err: ApiError = analysis::AnalysisError::NoValidRows.into();
        assert!(matches!(err, ApiError::BadRequest(_)));
        assert!(err.to_string().contains("No valid rows"));
    }

    #[test]
    fn test_status_codes() {
        let resp = ApiError::BadRequest("nope".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let resp = ApiError::PaymentRequired("empty".to_string()).into_response();
        assert_eq!(resp.status(), StatusCode::PAYMENT_REQUIRED);
    }
}
