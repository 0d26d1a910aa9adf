use chrono::{DateTime, Utc};

use shofy_domain::id::UserId;

/// Auth-relevant user data resolved from a phone login.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub id: UserId,
    pub phone: String,
    pub code_area: String,
}

/// Login OTP stored against a user (one row per user, recycled in place).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OtpRecord {
    pub user_id: UserId,
    pub code: String,
    /// `false` while the code is outstanding, `true` once consumed.
    pub is_used: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl OtpRecord {
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at < now
    }

    /// Unused and unexpired: the user's currently outstanding code.
    pub fn is_active_at(&self, now: DateTime<Utc>) -> bool {
        !self.is_used && !self.is_expired_at(now)
    }

    /// Expiry wins over usage: an expired record is `Expired` even if unused.
    pub fn status_at(&self, now: DateTime<Utc>) -> OtpStatus {
        if self.is_expired_at(now) {
            OtpStatus::Expired
        } else if self.is_used {
            OtpStatus::Used
        } else {
            OtpStatus::Valid
        }
    }
}

/// Read-time classification of a submitted code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OtpStatus {
    Valid,
    Used,
    Expired,
}

/// Result of looking up the most recent record matching a submitted code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OtpClassification {
    pub status: OtpStatus,
    pub user_id: UserId,
}

/// Default login OTP length in digits.
pub const DEFAULT_OTP_LEN: usize = 6;

/// Login OTP time-to-live in seconds (5 minutes).
pub const OTP_TTL_SECS: i64 = 300;

/// Seconds between revocation-list sweeps (1 hour).
pub const REVOCATION_SWEEP_INTERVAL_SECS: u64 = 3600;
