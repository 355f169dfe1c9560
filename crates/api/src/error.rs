use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use domain::{DomainError, ErrorKind};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error("Service unavailable: {0}")]
    ServiceUnavailable(String),
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: &'static str,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    field: Option<String>,
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::Unauthenticated => StatusCode::UNAUTHORIZED,
        ErrorKind::PermissionDenied => StatusCode::FORBIDDEN,
        ErrorKind::InvalidArgument => StatusCode::BAD_REQUEST,
        ErrorKind::NotFound => StatusCode::NOT_FOUND,
        ErrorKind::FailedPrecondition => StatusCode::CONFLICT,
        ErrorKind::Internal => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ApiError::Domain(err) => {
                let kind = err.kind();
                let message = if kind == ErrorKind::Internal {
                    tracing::error!("Internal error: {}", err);
                    "An internal error occurred".to_string()
                } else {
                    err.to_string()
                };
                (
                    status_for(kind),
                    ErrorBody {
                        error: kind.as_str(),
                        message,
                        field: err.field().map(str::to_string),
                    },
                )
            }
            ApiError::ServiceUnavailable(msg) => (
                StatusCode::SERVICE_UNAVAILABLE,
                ErrorBody {
                    error: "unavailable",
                    message: msg.clone(),
                    field: None,
                },
            ),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn body_json(response: Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[test]
    fn test_status_mapping() {
        let cases = [
            (DomainError::Unauthenticated, StatusCode::UNAUTHORIZED),
            (
                DomainError::PermissionDenied("Admins only.".into()),
                StatusCode::FORBIDDEN,
            ),
            (DomainError::missing("name"), StatusCode::BAD_REQUEST),
            (DomainError::NotFound("gone".into()), StatusCode::NOT_FOUND),
            (
                DomainError::FailedPrecondition("owner".into()),
                StatusCode::CONFLICT,
            ),
            (
                DomainError::Internal("boom".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(ApiError::from(err).into_response().status(), status);
        }
    }

    #[tokio::test]
    async fn test_invalid_argument_body_names_field() {
        let response = ApiError::from(DomainError::missing("name")).into_response();
        let body = body_json(response).await;
        assert_eq!(body["error"], "invalid-argument");
        assert_eq!(body["field"], "name");
        assert!(body["message"].as_str().unwrap().contains("name"));
    }

    #[tokio::test]
    async fn test_internal_message_is_masked() {
        let response =
            ApiError::from(DomainError::Internal("Store error: connection reset".into()))
                .into_response();
        let body = body_json(response).await;
        assert_eq!(body["error"], "internal");
        assert_eq!(body["message"], "An internal error occurred");
        assert!(body.get("field").is_none());
    }

    #[tokio::test]
    async fn test_service_unavailable() {
        let response = ApiError::ServiceUnavailable("store".into()).into_response();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body = body_json(response).await;
        assert_eq!(body["error"], "unavailable");
    }

    #[test]
    fn test_api_error_display() {
        assert_eq!(
            ApiError::from(DomainError::Unauthenticated).to_string(),
            "You must be logged in."
        );
        assert_eq!(
            ApiError::ServiceUnavailable("store".into()).to_string(),
            "Service unavailable: store"
        );
    }
}
