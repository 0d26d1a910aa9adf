//! Session-token (JWT) claims and validation.

use jsonwebtoken::{DecodingKey, Validation, decode};
use serde::Deserialize;
#[cfg(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test))]
use serde::Serialize;

use shofy_domain::id::UserId;
use shofy_domain::role::RoleName;

/// Session-token lifetime in seconds (24 hours).
pub const SESSION_TOKEN_EXP: u64 = 86_400;

/// Errors returned when decoding a session token.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid signature")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("token not yet valid")]
    NotYetValid,
    #[error("malformed token")]
    Malformed,
}

/// JWT claims payload shared by token creation (auth service) and validation.
///
/// # Fields
///
/// | Field | JWT claim | Rust type | Meaning |
/// |-------|-----------|-----------|---------|
/// | `user_id` | `user_id` | `i32` | user ID |
/// | `roles` | `role` | array of role names | roles granted at login |
/// | `iat` | `iat` | seconds since epoch | issue time |
/// | `nbf` | `nbf` | seconds since epoch | not valid before |
/// | `exp` | `exp` | seconds since epoch | token expiration |
///
/// # Feature gate
///
/// [`Deserialize`] is always available. [`Serialize`] requires the
/// **`USE_ONLY_IN_AUTH_SERVICE`** cargo feature: the auth service is the sole
/// token issuer.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[cfg_attr(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test), derive(Serialize))]
pub struct SessionClaims {
    pub user_id: UserId,
    #[serde(rename = "role", default)]
    pub roles: Vec<RoleName>,
    pub iat: u64,
    pub nbf: u64,
    pub exp: u64,
}

fn map_jwt_error(e: jsonwebtoken::errors::Error) -> AuthError {
    match e.kind() {
        jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::Expired,
        jsonwebtoken::errors::ErrorKind::ImmatureSignature => AuthError::NotYetValid,
        jsonwebtoken::errors::ErrorKind::InvalidSignature
        | jsonwebtoken::errors::ErrorKind::InvalidAlgorithm
        | jsonwebtoken::errors::ErrorKind::InvalidEcdsaKey
        | jsonwebtoken::errors::ErrorKind::InvalidRsaKey(_) => AuthError::InvalidSignature,
        _ => AuthError::Malformed,
    }
}

// ── Public: all consumers ────────────────────────────────────────────────

/// Validate a session token and return its claims.
///
/// Validation: HS256 only, `exp` and `nbf` checked, required claims: `exp`.
/// Default leeway = 60s. Revocation is not checked here; callers that own a
/// revocation list must consult it before calling this.
pub fn validate_session_token(token: &str, secret: &str) -> Result<SessionClaims, AuthError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = true;
    validation.validate_nbf = true;
    validation.required_spec_claims.clear();
    validation.set_required_spec_claims(&["exp"]);

    let data = decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(map_jwt_error)?;

    Ok(data.claims)
}

// ── Feature-gated: auth service only ─────────────────────────────────────

/// Claims read when revoking a token: only the expiry matters.
#[cfg(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test))]
#[derive(Debug, Deserialize)]
struct RevocationClaims {
    exp: Option<u64>,
}

/// Verify a token's signature without checking its time bounds and return
/// its `exp` claim, if any.
///
/// Used on logout: an already-expired token can still be revoked, but a
/// token the service did not sign cannot.
#[cfg(any(feature = "USE_ONLY_IN_AUTH_SERVICE", test))]
pub fn verify_signature_only(token: &str, secret: &str) -> Result<Option<u64>, AuthError> {
    let mut validation = Validation::new(jsonwebtoken::Algorithm::HS256);
    validation.validate_exp = false;
    validation.validate_nbf = false;
    validation.required_spec_claims.clear();

    let data = decode::<RevocationClaims>(
        token,
        &DecodingKey::from_secret(secret.as_bytes()),
        &validation,
    )
    .map_err(map_jwt_error)?;

    Ok(data.claims.exp)
}
