use serde::Deserialize;

use shofy_core::config::Config;

use crate::domain::types::{DEFAULT_OTP_LEN, REVOCATION_SWEEP_INTERVAL_SECS};

/// Auth service configuration loaded from environment variables.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthConfig {
    /// PostgreSQL connection URL. Env var: `DATABASE_URL`.
    pub database_url: String,
    /// HMAC secret for signing session tokens. Env var: `JWT_SECRET_KEY`.
    /// Optional at parse time; the service refuses to start without it.
    #[serde(default)]
    pub jwt_secret_key: Option<String>,
    /// TCP port to listen on (default 8080). Env var: `AUTH_PORT`.
    #[serde(default = "default_auth_port")]
    pub auth_port: u16,
    /// Number of digits in a login OTP (default 6). Env var: `OTP_LENGTH`.
    #[serde(default = "default_otp_length")]
    pub otp_length: usize,
    /// Echo the generated OTP in the send response (development only).
    /// Env var: `OTP_ECHO_CODE`.
    #[serde(default)]
    pub otp_echo_code: bool,
    /// WhatsApp Cloud API bearer token. Env var: `WHATSAPP_ACCESS_TOKEN`.
    #[serde(default)]
    pub whatsapp_access_token: Option<String>,
    /// WhatsApp sender phone-number ID. Env var: `WHATSAPP_PHONE_NUMBER_ID`.
    #[serde(default)]
    pub whatsapp_phone_number_id: Option<String>,
    /// Graph API base URL. Env var: `WHATSAPP_API_BASE`.
    #[serde(default = "default_whatsapp_api_base")]
    pub whatsapp_api_base: String,
    /// Seconds between revocation-list sweeps (default 3600).
    /// Env var: `REVOCATION_SWEEP_SECS`.
    #[serde(default = "default_revocation_sweep_secs")]
    pub revocation_sweep_secs: u64,
}

impl Config for AuthConfig {}

fn default_auth_port() -> u16 {
    8080
}

fn default_otp_length() -> usize {
    DEFAULT_OTP_LEN
}

fn default_whatsapp_api_base() -> String {
    "https://graph.facebook.com/v17.0".to_owned()
}

fn default_revocation_sweep_secs() -> u64 {
    REVOCATION_SWEEP_INTERVAL_SECS
}

impl AuthConfig {
    /// WhatsApp credentials, when both halves are configured.
    pub fn whatsapp_credentials(&self) -> Option<(&str, &str)> {
        match (&self.whatsapp_access_token, &self.whatsapp_phone_number_id) {
            (Some(token), Some(id)) if !token.is_empty() && !id.is_empty() => {
                Some((token.as_str(), id.as_str()))
            }
            _ => None,
        }
    }
}
