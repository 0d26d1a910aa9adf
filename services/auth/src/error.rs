use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

/// Auth service domain error variants.
#[derive(Debug, thiserror::Error)]
pub enum AuthServiceError {
    #[error("user not found")]
    UserNotFound,
    #[error("otp not found")]
    OtpNotFound,
    #[error("otp expired, request a new one")]
    OtpExpired,
    #[error("otp already used")]
    OtpAlreadyUsed,
    #[error("otp conflict, request a new one")]
    OtpConflict,
    #[error("failed to deliver otp")]
    Delivery(#[source] anyhow::Error),
    #[error("invalid token")]
    InvalidToken,
    #[error("token revoked")]
    TokenRevoked,
    #[error("auth service misconfigured: {0}")]
    Configuration(&'static str),
    #[error("forbidden")]
    Forbidden,
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),
    #[error("internal error")]
    Internal(#[from] anyhow::Error),
}

impl AuthServiceError {
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UserNotFound => "USER_NOT_FOUND",
            Self::OtpNotFound => "OTP_NOT_FOUND",
            Self::OtpExpired => "OTP_EXPIRED",
            Self::OtpAlreadyUsed => "OTP_ALREADY_USED",
            Self::OtpConflict => "OTP_CONFLICT",
            Self::Delivery(_) => "DELIVERY_FAILED",
            Self::InvalidToken => "INVALID_TOKEN",
            Self::TokenRevoked => "TOKEN_REVOKED",
            Self::Configuration(_) => "CONFIGURATION",
            Self::Forbidden => "FORBIDDEN",
            Self::InvalidParameter(_) => "INVALID_PARAMETER",
            Self::Internal(_) => "INTERNAL",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            Self::UserNotFound | Self::OtpNotFound => StatusCode::NOT_FOUND,
            Self::OtpExpired => StatusCode::GONE,
            Self::OtpAlreadyUsed | Self::OtpConflict => StatusCode::CONFLICT,
            Self::Delivery(_) => StatusCode::BAD_GATEWAY,
            Self::InvalidToken | Self::TokenRevoked => StatusCode::UNAUTHORIZED,
            Self::Forbidden => StatusCode::FORBIDDEN,
            Self::InvalidParameter(_) => StatusCode::BAD_REQUEST,
            Self::Configuration(_) | Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AuthServiceError {
    fn into_response(self) -> Response {
        let status = self.status();
        // 4xx are expected client errors and are already recorded by the
        // TraceLayer; only server-side failures carry their cause chain here.
        match &self {
            Self::Internal(e) => {
                tracing::error!(error = ?e, kind = self.kind(), "internal error");
            }
            Self::Delivery(e) => {
                tracing::error!(error = ?e, kind = self.kind(), "otp delivery failed");
            }
            Self::Configuration(what) => {
                tracing::error!(missing = %what, kind = self.kind(), "misconfigured");
            }
            _ => {}
        }
        let message = match &self {
            // Never leak configuration detail to clients.
            Self::Configuration(_) => "internal error".to_owned(),
            other => other.to_string(),
        };
        let body = serde_json::json!({
            "kind": self.kind(),
            "message": message,
        });
        (status, axum::Json(body)).into_response()
    }
}
