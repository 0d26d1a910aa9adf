use chrono::Utc;
use rand::RngExt;

use shofy_domain::id::UserId;
use shofy_domain::phone;
use shofy_domain::role::RoleName;

use crate::domain::repository::{OtpRepository, OtpSender, UserRepository};
use crate::domain::types::OtpStatus;
use crate::error::AuthServiceError;
use crate::usecase::token::TokenAuthority;

/// Uniformly random decimal code of `length` digits. Leading zeros are kept.
pub fn generate_otp(length: usize) -> Result<String, AuthServiceError> {
    if length == 0 {
        return Err(AuthServiceError::InvalidParameter(
            "otp length must be > 0".to_owned(),
        ));
    }

    let mut rng = rand::rng();
    Ok((0..length)
        .map(|_| char::from(b'0' + rng.random_range(0..10u8)))
        .collect())
}

// ── RequestOtp ───────────────────────────────────────────────────────────────

pub struct RequestOtpInput {
    pub phone: String,
    pub code_area: String,
}

#[derive(Debug)]
pub struct RequestOtpOutput {
    pub phone_masked: String,
    /// `true` when a code was already outstanding and nothing was sent.
    pub pending: bool,
    /// The sent code, only when echoing is enabled.
    pub code: Option<String>,
}

pub struct RequestOtpUseCase<U, O, S>
where
    U: UserRepository,
    O: OtpRepository,
    S: OtpSender,
{
    pub users: U,
    pub otps: O,
    pub sender: S,
    pub otp_length: usize,
    pub echo_code: bool,
}

impl<U, O, S> RequestOtpUseCase<U, O, S>
where
    U: UserRepository,
    O: OtpRepository,
    S: OtpSender,
{
    #[tracing::instrument(skip_all)]
    pub async fn execute(
        &self,
        input: RequestOtpInput,
    ) -> Result<RequestOtpOutput, AuthServiceError> {
        let destination = phone::full_number(&input.code_area, &input.phone);
        let phone_masked = phone::mask(&destination);
        let pending = || RequestOtpOutput {
            phone_masked: phone_masked.clone(),
            pending: true,
            code: None,
        };

        // 1. Find user by phone → 404 if not found
        let user = self
            .users
            .find_by_phone(&input.phone, &input.code_area)
            .await?
            .ok_or(AuthServiceError::UserNotFound)?;

        // 2. An outstanding code blocks a new one
        let existing = self.otps.find_by_user(user.id).await?;
        if existing
            .as_ref()
            .is_some_and(|r| r.is_active_at(Utc::now()))
        {
            tracing::info!(user_id = %user.id, "otp already pending");
            return Ok(pending());
        }

        // 3. Store the new code; losing a concurrent race counts as pending
        let code = generate_otp(self.otp_length)?;
        let stored = match existing {
            Some(_) => self.otps.refresh(user.id, &code).await?,
            None => self.otps.insert(user.id, &code).await?,
        };
        if !stored {
            tracing::info!(user_id = %user.id, "concurrent otp request won, not sending");
            return Ok(pending());
        }

        // 4. Deliver. A failed send leaves the code stored and active.
        self.sender.send_otp(&destination, &code).await?;
        tracing::info!(user_id = %user.id, "otp sent");

        Ok(RequestOtpOutput {
            phone_masked,
            pending: false,
            code: self.echo_code.then_some(code),
        })
    }
}

// ── VerifyOtp ────────────────────────────────────────────────────────────────

pub struct VerifyOtpInput {
    pub code: String,
    /// Scope the lookup to one user. Unscoped lookups rely on the conflict
    /// check to refuse ambiguous codes.
    pub user_id: Option<UserId>,
}

#[derive(Debug)]
pub struct VerifyOtpOutput {
    pub user_id: UserId,
    pub token: String,
    pub token_exp: u64,
    pub roles: Vec<RoleName>,
}

pub struct VerifyOtpUseCase<U, O>
where
    U: UserRepository,
    O: OtpRepository,
{
    pub users: U,
    pub otps: O,
    pub authority: TokenAuthority,
}

impl<U, O> VerifyOtpUseCase<U, O>
where
    U: UserRepository,
    O: OtpRepository,
{
    #[tracing::instrument(skip_all, fields(user_id = ?input.user_id))]
    pub async fn execute(&self, input: VerifyOtpInput) -> Result<VerifyOtpOutput, AuthServiceError> {
        if input.code.is_empty() || !input.code.bytes().all(|b| b.is_ascii_digit()) {
            return Err(AuthServiceError::InvalidParameter(
                "otp must be a string of digits".to_owned(),
            ));
        }

        // Refuse before consuming anything if no token could be issued.
        self.authority.ensure_configured()?;

        // 1. More than one live record with this code → ambiguous
        let live = self.otps.count_valid(&input.code, input.user_id).await?;
        if live > 1 {
            tracing::warn!(live, "otp matches several users");
            return Err(AuthServiceError::OtpConflict);
        }

        // 2. Classify the most recent matching record
        let found = self
            .otps
            .classify(&input.code, input.user_id)
            .await?
            .ok_or(AuthServiceError::OtpNotFound)?;

        match found.status {
            OtpStatus::Expired => return Err(AuthServiceError::OtpExpired),
            OtpStatus::Used => return Err(AuthServiceError::OtpAlreadyUsed),
            OtpStatus::Valid => {}
        }

        // 3. Consume; a concurrent verify may have consumed it first
        if !self.otps.mark_used(found.user_id, &input.code).await? {
            return Err(AuthServiceError::OtpAlreadyUsed);
        }

        // 4. Issue a token carrying the user's roles
        let roles = self.users.list_role_names(found.user_id).await?;
        let issued = self.authority.issue(found.user_id, &roles)?;
        tracing::info!(user_id = %found.user_id, "otp verified, session issued");

        Ok(VerifyOtpOutput {
            user_id: found.user_id,
            token: issued.token,
            token_exp: issued.exp,
            roles: issued.roles,
        })
    }
}
