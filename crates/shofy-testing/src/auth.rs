//! Session helpers for integration tests.
//!
//! `MockSession` signs tokens with a test secret, so handlers that validate
//! session tokens can be driven without going through the OTP login flow.

use std::time::{SystemTime, UNIX_EPOCH};

use http::{HeaderMap, HeaderValue, header};
use jsonwebtoken::{EncodingKey, Header, encode};

use shofy_auth_types::cookie::SHOFY_TOKEN;
use shofy_auth_types::token::{SESSION_TOKEN_EXP, SessionClaims};
use shofy_domain::id::UserId;
use shofy_domain::role::RoleName;

/// Identity to sign into test tokens.
pub struct MockSession {
    pub user_id: UserId,
    pub roles: Vec<RoleName>,
    pub secret: String,
}

fn now_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_secs()
}

impl MockSession {
    /// Panics on an invalid role name.
    pub fn new(user_id: i32, roles: &[&str], secret: &str) -> Self {
        Self {
            user_id: UserId(user_id),
            roles: roles.iter().map(|r| RoleName::new(*r).unwrap()).collect(),
            secret: secret.to_owned(),
        }
    }

    fn sign(&self, iat: u64, exp: u64) -> String {
        let claims = SessionClaims {
            user_id: self.user_id,
            roles: self.roles.clone(),
            iat,
            nbf: iat,
            exp,
        };
        encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(self.secret.as_bytes()),
        )
        .unwrap()
    }

    /// A token valid for the usual session lifetime.
    pub fn token(&self) -> String {
        let now = now_secs();
        self.sign(now, now + SESSION_TOKEN_EXP)
    }

    /// A well-signed token that expired a day ago.
    pub fn expired_token(&self) -> String {
        let now = now_secs();
        self.sign(now - 2 * SESSION_TOKEN_EXP, now - SESSION_TOKEN_EXP)
    }

    /// `Authorization: Bearer <token>`.
    pub fn bearer_headers(token: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            header::AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {token}")).unwrap(),
        );
        map
    }

    /// `Cookie: token=<token>`.
    pub fn cookie_headers(token: &str) -> HeaderMap {
        let mut map = HeaderMap::new();
        map.insert(
            header::COOKIE,
            HeaderValue::from_str(&format!("{SHOFY_TOKEN}={token}")).unwrap(),
        );
        map
    }
}
