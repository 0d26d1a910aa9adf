use sea_orm::DatabaseConnection;

use crate::infra::db::{DbOtpRepository, DbUserRepository};
use crate::infra::notification::Notifier;
use crate::usecase::token::TokenAuthority;

/// Shared application state passed to every handler via axum `State`.
#[derive(Clone)]
pub struct AppState {
    pub db: DatabaseConnection,
    pub authority: TokenAuthority,
    pub notifier: Notifier,
    pub otp_length: usize,
    pub otp_echo_code: bool,
}

impl AppState {
    pub fn user_repo(&self) -> DbUserRepository {
        DbUserRepository {
            db: self.db.clone(),
        }
    }

    pub fn otp_repo(&self) -> DbOtpRepository {
        DbOtpRepository {
            db: self.db.clone(),
        }
    }
}
