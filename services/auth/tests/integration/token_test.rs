use shofy_auth::error::AuthServiceError;
use shofy_auth::infra::revocation::RevocationList;
use shofy_auth::usecase::token::{LogoutInput, LogoutUseCase, TokenAuthority, require_role};
use shofy_domain::id::UserId;
use shofy_testing::auth::MockSession;

use crate::helpers::{MockOtpRepo, TEST_JWT_SECRET, role, test_authority, test_otp};

#[tokio::test]
async fn should_validate_issued_token() {
    let authority = test_authority();
    let issued = authority
        .issue(UserId(7), &[role("ADMIN"), role("SUPER_ADMIN")])
        .unwrap();

    let claims = authority.validate(&issued.token).await.unwrap();

    assert_eq!(claims.user_id, UserId(7));
    assert_eq!(claims.roles, vec![role("ADMIN"), role("SUPER_ADMIN")]);
}

#[tokio::test]
async fn should_share_revocations_between_clones() {
    let authority = test_authority();
    let clone = authority.clone();
    let issued = authority.issue(UserId(7), &[]).unwrap();

    clone.revoke(&issued.token).await.unwrap();

    let result = authority.validate(&issued.token).await;
    assert!(
        matches!(result, Err(AuthServiceError::TokenRevoked)),
        "expected TokenRevoked, got {result:?}"
    );
}

#[tokio::test]
async fn should_reject_expired_token() {
    let token = MockSession::new(7, &["USER"], TEST_JWT_SECRET).expired_token();

    let result = test_authority().validate(&token).await;

    assert!(
        matches!(result, Err(AuthServiceError::InvalidToken)),
        "expected InvalidToken, got {result:?}"
    );
}

#[tokio::test]
async fn should_revoke_expired_token_until_sweep() {
    let revocations = RevocationList::new();
    let authority = TokenAuthority::new(Some(TEST_JWT_SECRET.to_owned()), revocations.clone());
    let token = MockSession::new(7, &[], TEST_JWT_SECRET).expired_token();

    authority.revoke(&token).await.unwrap();
    assert!(revocations.is_revoked(&token).await);

    let removed = revocations.sweep(chrono::Utc::now()).await;
    assert_eq!(removed, 1, "already-expired entry is swept");
}

#[tokio::test]
async fn should_report_configuration_error_without_secret() {
    let authority = TokenAuthority::new(None, RevocationList::new());
    let token = MockSession::new(7, &[], TEST_JWT_SECRET).token();

    let issue = authority.issue(UserId(7), &[]);
    let validate = authority.validate(&token).await;
    let revoke = authority.revoke(&token).await;

    assert!(matches!(issue, Err(AuthServiceError::Configuration(_))));
    assert!(matches!(validate, Err(AuthServiceError::Configuration(_))));
    assert!(matches!(revoke, Err(AuthServiceError::Configuration(_))));
}

#[tokio::test]
async fn should_allow_any_matching_role() {
    let authority = test_authority();
    let issued = authority.issue(UserId(1), &[role("ADMIN")]).unwrap();
    let claims = authority.validate(&issued.token).await.unwrap();

    assert!(require_role(&claims, &[role("ADMIN"), role("SUPER_ADMIN")]).is_ok());

    let denied = require_role(&claims, &[role("USER")]);
    assert!(
        matches!(denied, Err(AuthServiceError::Forbidden)),
        "expected Forbidden, got {denied:?}"
    );
}

#[tokio::test]
async fn should_deny_empty_role_requirement() {
    let authority = test_authority();
    let issued = authority.issue(UserId(1), &[role("ADMIN")]).unwrap();
    let claims = authority.validate(&issued.token).await.unwrap();

    assert!(matches!(
        require_role(&claims, &[]),
        Err(AuthServiceError::Forbidden)
    ));
}

// ── Logout ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_revoke_token_and_retire_code_on_logout() {
    let otps = MockOtpRepo::new(vec![test_otp(UserId(1), "123456", false, 120)]);
    let records = otps.records_handle();
    let authority = test_authority();
    let token = authority.issue(UserId(1), &[role("USER")]).unwrap().token;

    let uc = LogoutUseCase {
        otps,
        authority: authority.clone(),
    };
    uc.execute(LogoutInput {
        token: token.clone(),
        user_id: UserId(1),
    })
    .await
    .unwrap();

    let result = authority.validate(&token).await;
    assert!(
        matches!(result, Err(AuthServiceError::TokenRevoked)),
        "expected TokenRevoked, got {result:?}"
    );
    assert!(records.lock().unwrap()[0].is_used);
}

#[tokio::test]
async fn should_forbid_logout_of_another_user() {
    let otps = MockOtpRepo::new(vec![test_otp(UserId(2), "123456", false, 120)]);
    let records = otps.records_handle();
    let authority = test_authority();
    let token = authority.issue(UserId(1), &[]).unwrap().token;

    let uc = LogoutUseCase {
        otps,
        authority: authority.clone(),
    };
    let result = uc
        .execute(LogoutInput {
            token: token.clone(),
            user_id: UserId(2),
        })
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::Forbidden)),
        "expected Forbidden, got {result:?}"
    );
    assert!(authority.validate(&token).await.is_ok(), "token stays valid");
    assert!(!records.lock().unwrap()[0].is_used);
}

#[tokio::test]
async fn should_reject_logout_with_revoked_token() {
    let authority = test_authority();
    let token = authority.issue(UserId(1), &[]).unwrap().token;
    authority.revoke(&token).await.unwrap();

    let uc = LogoutUseCase {
        otps: MockOtpRepo::empty(),
        authority,
    };
    let result = uc
        .execute(LogoutInput {
            token,
            user_id: UserId(1),
        })
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::TokenRevoked)),
        "expected TokenRevoked, got {result:?}"
    );
}
