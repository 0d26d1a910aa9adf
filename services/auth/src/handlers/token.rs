use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use axum_extra::extract::CookieJar;
use serde::{Deserialize, Serialize};

use shofy_auth_types::{cookie::clear_token_cookie, identity::BearerToken};
use shofy_domain::id::UserId;
use shofy_domain::role::RoleName;

use crate::error::AuthServiceError;
use crate::state::AppState;
use crate::usecase::token::{LogoutInput, LogoutUseCase};

// ── GET /v1/auth/token ────────────────────────────────────────────────────────

#[derive(Deserialize)]
pub struct CheckTokenQuery {
    /// Comma-separated role names; the token must carry at least one.
    pub roles: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CheckTokenResponse {
    pub user_id: UserId,
    pub role: Vec<RoleName>,
    pub exp: u64,
}

fn parse_roles(raw: &str) -> Result<Vec<RoleName>, AuthServiceError> {
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            RoleName::new(s).map_err(|e| AuthServiceError::InvalidParameter(e.to_string()))
        })
        .collect()
}

pub async fn check_token(
    State(state): State<AppState>,
    token: BearerToken,
    Query(query): Query<CheckTokenQuery>,
) -> Result<Json<CheckTokenResponse>, AuthServiceError> {
    let required = query
        .roles
        .as_deref()
        .map(parse_roles)
        .transpose()?
        .unwrap_or_default();

    let claims = if required.is_empty() {
        state.authority.validate(token.as_str()).await?
    } else {
        state.authority.authorize(token.as_str(), &required).await?
    };

    Ok(Json(CheckTokenResponse {
        user_id: claims.user_id,
        role: claims.roles,
        exp: claims.exp,
    }))
}

// ── POST /v1/users/logout/{user_id} ───────────────────────────────────────────

pub async fn logout(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
    token: BearerToken,
    jar: CookieJar,
) -> Result<(CookieJar, StatusCode), AuthServiceError> {
    let usecase = LogoutUseCase {
        otps: state.otp_repo(),
        authority: state.authority.clone(),
    };
    usecase
        .execute(LogoutInput {
            token: token.0,
            user_id,
        })
        .await?;

    Ok((clear_token_cookie(jar), StatusCode::NO_CONTENT))
}
