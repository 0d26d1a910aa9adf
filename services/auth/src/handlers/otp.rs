use axum::{Json, extract::State};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use shofy_auth_types::cookie::set_token_cookie;
use shofy_domain::id::UserId;
use shofy_domain::role::RoleName;

use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::otp::{RequestOtpInput, RequestOtpUseCase, VerifyOtpInput, VerifyOtpUseCase};

// ── POST /v1/auth/otp/send ────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct SendOtpRequest {
    pub phone: String,
    /// Dialling prefix, e.g. "+62".
    pub code: String,
}

#[derive(Debug, Serialize)]
pub struct SendOtpResponse {
    pub phone_masked: String,
    pub pending: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub otp: Option<String>,
}

pub async fn send_otp(
    State(state): State<AppState>,
    Json(body): Json<SendOtpRequest>,
) -> Result<Json<SendOtpResponse>, AuthServiceError> {
    let phone = body.phone.trim();
    let code_area = body.code.trim();
    if phone.is_empty() || code_area.is_empty() {
        return Err(AuthServiceError::InvalidParameter(
            "phone and code are required".to_owned(),
        ));
    }

    let usecase = RequestOtpUseCase {
        users: state.user_repo(),
        otps: state.otp_repo(),
        sender: state.notifier.clone(),
        otp_length: state.otp_length,
        echo_code: state.otp_echo_code,
    };
    let output = usecase
        .execute(RequestOtpInput {
            phone: phone.to_owned(),
            code_area: code_area.to_owned(),
        })
        .await?;

    Ok(Json(SendOtpResponse {
        phone_masked: output.phone_masked,
        pending: output.pending,
        otp: output.code,
    }))
}

// ── POST /v1/auth/otp/verify ──────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct VerifyOtpRequest {
    pub otp: String,
    #[serde(default)]
    pub user_id: Option<UserId>,
}

#[derive(Debug, Serialize)]
pub struct VerifyOtpResponse {
    pub user_id: UserId,
    pub token: String,
    pub token_exp: u64,
    pub role: Vec<RoleName>,
}

pub async fn verify_otp(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(body): Json<VerifyOtpRequest>,
) -> Result<(CookieJar, Json<VerifyOtpResponse>), AuthServiceError> {
    let usecase = VerifyOtpUseCase {
        users: state.user_repo(),
        otps: state.otp_repo(),
        authority: state.authority.clone(),
    };
    let output = usecase
        .execute(VerifyOtpInput {
            code: body.otp.trim().to_owned(),
            user_id: body.user_id,
        })
        .await?;

    let jar = set_token_cookie(jar, output.token.clone());
    let body = VerifyOtpResponse {
        user_id: output.user_id,
        token: output.token,
        token_exp: output.token_exp,
        role: output.roles,
    };
    Ok((jar, Json(body)))
}
