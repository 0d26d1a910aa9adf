use anyhow::Context as _;
use chrono::{Duration, Utc};
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{
    ActiveValue::{NotSet, Set},
    ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, QuerySelect, QueryTrait, RelationTrait,
};

use shofy_auth_schema::{roles, user_login_otp, user_roles, users};
use shofy_domain::id::UserId;
use shofy_domain::role::RoleName;

use crate::domain::repository::{OtpRepository, UserRepository};
use crate::domain::types::{AuthUser, OTP_TTL_SECS, OtpClassification, OtpRecord};
use crate::error::AuthServiceError;

// ── User repository ───────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbUserRepository {
    pub db: DatabaseConnection,
}

impl UserRepository for DbUserRepository {
    async fn find_by_phone(
        &self,
        phone: &str,
        code_area: &str,
    ) -> Result<Option<AuthUser>, AuthServiceError> {
        let model = users::Entity::find()
            .filter(users::Column::Phone.eq(phone))
            .filter(users::Column::CodeArea.eq(code_area))
            .filter(users::Column::IsActive.eq(true))
            .one(&self.db)
            .await
            .context("find user by phone")?;

        Ok(model.map(|m| AuthUser {
            id: UserId(m.id),
            phone: m.phone.unwrap_or_default(),
            code_area: m.code_area.unwrap_or_default(),
        }))
    }

    async fn list_role_names(&self, user_id: UserId) -> Result<Vec<RoleName>, AuthServiceError> {
        let models = roles::Entity::find()
            .join(
                sea_orm::JoinType::InnerJoin,
                roles::Relation::UserRoles.def(),
            )
            .filter(user_roles::Column::UserId.eq(user_id.0))
            .filter(roles::Column::IsActive.eq(true))
            .order_by_asc(roles::Column::Name)
            .all(&self.db)
            .await
            .context("list role names")?;

        // Role names are data; a malformed row must not lock the user out.
        Ok(models
            .into_iter()
            .filter_map(|m| match RoleName::new(m.name) {
                Ok(role) => Some(role),
                Err(e) => {
                    tracing::warn!(role_id = m.id, error = %e, "skipping malformed role name");
                    None
                }
            })
            .collect())
    }
}

// ── OTP repository ────────────────────────────────────────────────────────────

#[derive(Clone)]
pub struct DbOtpRepository {
    pub db: DatabaseConnection,
}

impl OtpRepository for DbOtpRepository {
    async fn find_by_user(&self, user_id: UserId) -> Result<Option<OtpRecord>, AuthServiceError> {
        let model = user_login_otp::Entity::find()
            .filter(user_login_otp::Column::UserId.eq(user_id.0))
            .one(&self.db)
            .await
            .context("find otp by user")?;
        Ok(model.map(otp_from_model))
    }

    async fn insert(&self, user_id: UserId, code: &str) -> Result<bool, AuthServiceError> {
        let now = Utc::now();
        let model = user_login_otp::ActiveModel {
            id: NotSet,
            user_id: Set(user_id.0),
            otp: Set(code.to_owned()),
            is_used: Set(false),
            created_at: Set(now),
            expires_at: Set(now + Duration::seconds(OTP_TTL_SECS)),
        };

        let rows = user_login_otp::Entity::insert(model)
            .on_conflict(
                OnConflict::column(user_login_otp::Column::UserId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await
            .context("insert otp")?;
        Ok(rows > 0)
    }

    async fn refresh(&self, user_id: UserId, code: &str) -> Result<bool, AuthServiceError> {
        let now = Utc::now();
        let result = user_login_otp::Entity::update_many()
            .col_expr(user_login_otp::Column::Otp, Expr::value(code.to_owned()))
            .col_expr(user_login_otp::Column::IsUsed, Expr::value(false))
            .col_expr(user_login_otp::Column::CreatedAt, Expr::value(now))
            .col_expr(
                user_login_otp::Column::ExpiresAt,
                Expr::value(now + Duration::seconds(OTP_TTL_SECS)),
            )
            .filter(user_login_otp::Column::UserId.eq(user_id.0))
            .filter(
                Condition::any()
                    .add(user_login_otp::Column::IsUsed.eq(true))
                    .add(user_login_otp::Column::ExpiresAt.lt(now)),
            )
            .exec(&self.db)
            .await
            .context("refresh otp")?;
        Ok(result.rows_affected > 0)
    }

    async fn mark_used(&self, user_id: UserId, code: &str) -> Result<bool, AuthServiceError> {
        let result = user_login_otp::Entity::update_many()
            .col_expr(user_login_otp::Column::IsUsed, Expr::value(true))
            .filter(user_login_otp::Column::UserId.eq(user_id.0))
            .filter(user_login_otp::Column::Otp.eq(code))
            .filter(user_login_otp::Column::IsUsed.eq(false))
            .exec(&self.db)
            .await
            .context("mark otp used")?;
        Ok(result.rows_affected > 0)
    }

    async fn reset_active_flag(&self, user_id: UserId) -> Result<(), AuthServiceError> {
        user_login_otp::Entity::update_many()
            .col_expr(user_login_otp::Column::IsUsed, Expr::value(true))
            .filter(user_login_otp::Column::UserId.eq(user_id.0))
            .exec(&self.db)
            .await
            .context("retire otp on logout")?;
        Ok(())
    }

    async fn classify(
        &self,
        code: &str,
        user_id: Option<UserId>,
    ) -> Result<Option<OtpClassification>, AuthServiceError> {
        let model = user_login_otp::Entity::find()
            .filter(user_login_otp::Column::Otp.eq(code))
            .apply_if(user_id, |q, id| {
                q.filter(user_login_otp::Column::UserId.eq(id.0))
            })
            .order_by_desc(user_login_otp::Column::CreatedAt)
            .one(&self.db)
            .await
            .context("classify otp")?;

        let now = Utc::now();
        Ok(model.map(otp_from_model).map(|r| OtpClassification {
            status: r.status_at(now),
            user_id: r.user_id,
        }))
    }

    async fn count_valid(
        &self,
        code: &str,
        user_id: Option<UserId>,
    ) -> Result<u64, AuthServiceError> {
        let now = Utc::now();
        let count = user_login_otp::Entity::find()
            .filter(user_login_otp::Column::Otp.eq(code))
            .filter(user_login_otp::Column::ExpiresAt.gte(now))
            .filter(user_login_otp::Column::IsUsed.eq(false))
            .apply_if(user_id, |q, id| {
                q.filter(user_login_otp::Column::UserId.eq(id.0))
            })
            .count(&self.db)
            .await
            .context("count valid otps")?;
        Ok(count)
    }
}

fn otp_from_model(model: user_login_otp::Model) -> OtpRecord {
    OtpRecord {
        user_id: UserId(model.user_id),
        code: model.otp,
        is_used: model.is_used,
        created_at: model.created_at,
        expires_at: model.expires_at,
    }
}
