#![allow(async_fn_in_trait)]

use shofy_domain::id::UserId;
use shofy_domain::role::RoleName;

use crate::domain::types::{AuthUser, OtpClassification, OtpRecord};
use crate::error::AuthServiceError;

/// Read-only port onto the users/roles tables.
pub trait UserRepository: Send + Sync {
    /// Find an active user by local phone number and area code.
    async fn find_by_phone(
        &self,
        phone: &str,
        code_area: &str,
    ) -> Result<Option<AuthUser>, AuthServiceError>;

    /// Names of the active roles granted to a user.
    async fn list_role_names(&self, user_id: UserId) -> Result<Vec<RoleName>, AuthServiceError>;
}

/// Repository for login OTPs (one row per user).
pub trait OtpRepository: Send + Sync {
    /// The user's OTP row, if one was ever issued.
    async fn find_by_user(&self, user_id: UserId) -> Result<Option<OtpRecord>, AuthServiceError>;

    /// Insert the user's first OTP row (`is_used = false`, expires in
    /// [`OTP_TTL_SECS`](crate::domain::types::OTP_TTL_SECS)).
    ///
    /// Returns `false` when a row already exists for the user (a concurrent
    /// request got there first); nothing is written in that case.
    async fn insert(&self, user_id: UserId, code: &str) -> Result<bool, AuthServiceError>;

    /// Recycle the user's row in place with a new code: `is_used = false`,
    /// `created_at = now`, `expires_at = now + TTL`.
    ///
    /// Only applies while the row is not active (used, or expired). Returns
    /// `false` when the row is active again (a concurrent request refreshed
    /// it first); nothing is written in that case.
    async fn refresh(&self, user_id: UserId, code: &str) -> Result<bool, AuthServiceError>;

    /// Consume the code. Returns `false` if the row was already consumed.
    async fn mark_used(&self, user_id: UserId, code: &str) -> Result<bool, AuthServiceError>;

    /// Retire the user's outstanding code on logout (`is_used = true`), so
    /// the next request issues a fresh one.
    async fn reset_active_flag(&self, user_id: UserId) -> Result<(), AuthServiceError>;

    /// Classify the most recent row matching `code`, optionally scoped to a
    /// user.
    async fn classify(
        &self,
        code: &str,
        user_id: Option<UserId>,
    ) -> Result<Option<OtpClassification>, AuthServiceError>;

    /// Count unexpired, unused rows matching `code`, optionally scoped to a user.
    async fn count_valid(
        &self,
        code: &str,
        user_id: Option<UserId>,
    ) -> Result<u64, AuthServiceError>;
}

/// Out-of-band delivery of a login OTP.
pub trait OtpSender: Send + Sync {
    /// Deliver `code` to `destination` (full international number).
    async fn send_otp(&self, destination: &str, code: &str) -> Result<(), AuthServiceError>;
}
