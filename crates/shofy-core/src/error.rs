use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Errors raised outside a service's own domain error enum, such as the
/// router fallback.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("route not found")]
    NotFound,
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),
}

impl AppError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound => "NOT_FOUND",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        if let Self::Internal(ref e) = self {
            tracing::error!(error = %e, kind = "INTERNAL", "internal error");
        }
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": self.to_string(),
        });
        (self.status(), axum::Json(body)).into_response()
    }
}

/// Router fallback: JSON 404 for unknown routes.
pub async fn not_found() -> AppError {
    AppError::NotFound
}
