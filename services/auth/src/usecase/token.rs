use chrono::{DateTime, Duration, TimeZone, Utc};
use jsonwebtoken::{EncodingKey, Header, encode};

use shofy_auth_types::token::{
    AuthError, SESSION_TOKEN_EXP, SessionClaims, validate_session_token, verify_signature_only,
};
use shofy_domain::id::UserId;
use shofy_domain::role::{RoleName, has_any_role};

use crate::domain::repository::OtpRepository;
use crate::error::AuthServiceError;
use crate::infra::revocation::RevocationList;

fn now_secs() -> u64 {
    Utc::now().timestamp().max(0) as u64
}

fn map_auth_error(e: AuthError) -> AuthServiceError {
    tracing::debug!(error = %e, "session token rejected");
    AuthServiceError::InvalidToken
}

/// A freshly signed session token.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    /// Expiry, seconds since epoch.
    pub exp: u64,
    pub roles: Vec<RoleName>,
}

/// Issues, validates and revokes session tokens.
///
/// Holds the signing secret and the revocation list. Cloning shares the
/// revocation list, so every clone sees the same revocations.
#[derive(Clone)]
pub struct TokenAuthority {
    secret: Option<String>,
    revocations: RevocationList,
}

impl TokenAuthority {
    /// An empty secret counts as missing.
    pub fn new(secret: Option<String>, revocations: RevocationList) -> Self {
        let secret = secret.filter(|s| !s.is_empty());
        Self {
            secret,
            revocations,
        }
    }

    pub fn revocations(&self) -> &RevocationList {
        &self.revocations
    }

    pub fn ensure_configured(&self) -> Result<(), AuthServiceError> {
        self.secret().map(|_| ())
    }

    fn secret(&self) -> Result<&str, AuthServiceError> {
        self.secret
            .as_deref()
            .ok_or(AuthServiceError::Configuration("JWT_SECRET_KEY"))
    }

    /// Sign a token for `user_id` carrying `roles`, valid for
    /// [`SESSION_TOKEN_EXP`] seconds from now. Roles are deduplicated.
    pub fn issue(
        &self,
        user_id: UserId,
        roles: &[RoleName],
    ) -> Result<IssuedToken, AuthServiceError> {
        let secret = self.secret()?;

        let mut roles = roles.to_vec();
        roles.sort();
        roles.dedup();

        let now = now_secs();
        let claims = SessionClaims {
            user_id,
            roles: roles.clone(),
            iat: now,
            nbf: now,
            exp: now + SESSION_TOKEN_EXP,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .map_err(|e| AuthServiceError::Internal(e.into()))?;

        Ok(IssuedToken {
            token,
            exp: claims.exp,
            roles,
        })
    }

    /// Return the claims of a well-signed, unexpired, unrevoked token.
    ///
    /// Revocation is checked first: a revoked token is reported as revoked
    /// whatever else is wrong with it.
    pub async fn validate(&self, token: &str) -> Result<SessionClaims, AuthServiceError> {
        let secret = self.secret()?;

        if self.revocations.is_revoked(token).await {
            return Err(AuthServiceError::TokenRevoked);
        }

        validate_session_token(token, secret).map_err(map_auth_error)
    }

    /// Add a token to the revocation list until its own expiry.
    ///
    /// The signature must verify but expiry is not checked. A token without
    /// an `exp` claim is kept for [`SESSION_TOKEN_EXP`] seconds.
    pub async fn revoke(&self, token: &str) -> Result<DateTime<Utc>, AuthServiceError> {
        let secret = self.secret()?;

        let exp = verify_signature_only(token, secret).map_err(map_auth_error)?;
        let expires_at = exp
            .and_then(|secs| i64::try_from(secs).ok())
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .unwrap_or_else(|| Utc::now() + Duration::seconds(SESSION_TOKEN_EXP as i64));

        self.revocations.revoke(token, expires_at).await;
        tracing::info!(%expires_at, "session token revoked");
        Ok(expires_at)
    }

    /// Validate the token, then require at least one of `required` roles.
    pub async fn authorize(
        &self,
        token: &str,
        required: &[RoleName],
    ) -> Result<SessionClaims, AuthServiceError> {
        let claims = self.validate(token).await?;
        require_role(&claims, required)?;
        Ok(claims)
    }
}

/// Any-match role check: passes if the claims carry at least one of
/// `required`. An empty `required` list never passes.
pub fn require_role(
    claims: &SessionClaims,
    required: &[RoleName],
) -> Result<(), AuthServiceError> {
    if has_any_role(&claims.roles, required) {
        Ok(())
    } else {
        tracing::debug!(user_id = %claims.user_id, "role check failed");
        Err(AuthServiceError::Forbidden)
    }
}

// ── Logout ───────────────────────────────────────────────────────────────────

pub struct LogoutInput {
    pub token: String,
    pub user_id: UserId,
}

pub struct LogoutUseCase<O: OtpRepository> {
    pub otps: O,
    pub authority: TokenAuthority,
}

impl<O: OtpRepository> LogoutUseCase<O> {
    #[tracing::instrument(skip_all, fields(user_id = %input.user_id))]
    pub async fn execute(&self, input: LogoutInput) -> Result<(), AuthServiceError> {
        // 1. Only the token's own user may log out
        let claims = self.authority.validate(&input.token).await?;
        if claims.user_id != input.user_id {
            return Err(AuthServiceError::Forbidden);
        }

        // 2. Revoke the token, then retire any outstanding code
        self.authority.revoke(&input.token).await?;
        self.otps.reset_active_flag(input.user_id).await?;

        tracing::info!("user logged out");
        Ok(())
    }
}
