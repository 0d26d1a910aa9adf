use shofy_auth::domain::repository::OtpRepository;
use shofy_auth::error::AuthServiceError;
use shofy_auth::usecase::otp::{
    RequestOtpInput, RequestOtpUseCase, VerifyOtpInput, VerifyOtpUseCase,
};
use shofy_domain::id::UserId;

use crate::helpers::{
    MockOtpRepo, MockSender, MockUserRepo, other_user, role, test_authority, test_otp, test_user,
};

fn request_input() -> RequestOtpInput {
    let user = test_user();
    RequestOtpInput {
        phone: user.phone,
        code_area: user.code_area,
    }
}

fn request_usecase(
    otps: MockOtpRepo,
    sender: MockSender,
) -> RequestOtpUseCase<MockUserRepo, MockOtpRepo, MockSender> {
    RequestOtpUseCase {
        users: MockUserRepo::new(vec![test_user()]),
        otps,
        sender,
        otp_length: 6,
        echo_code: false,
    }
}

fn verify_usecase(otps: MockOtpRepo) -> VerifyOtpUseCase<MockUserRepo, MockOtpRepo> {
    let user = test_user();
    VerifyOtpUseCase {
        users: MockUserRepo::new(vec![user.clone()]).with_roles(user.id, &["USER", "ADMIN"]),
        otps,
        authority: test_authority(),
    }
}

// ── RequestOtp ───────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_send_code_for_known_user() {
    let otps = MockOtpRepo::empty();
    let records = otps.records_handle();
    let sender = MockSender::new();
    let sent = sender.sent_handle();

    let out = request_usecase(otps, sender)
        .execute(request_input())
        .await
        .unwrap();

    assert!(!out.pending);
    assert_eq!(out.phone_masked, "+*********7890");
    assert!(out.code.is_none(), "code must not be echoed by default");

    let records = records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].user_id, UserId(1));
    assert!(!records[0].is_used);
    assert_eq!(records[0].code.len(), 6);
    assert!(records[0].code.bytes().all(|b| b.is_ascii_digit()));

    let sent = sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].0, "+6281234567890");
    assert_eq!(sent[0].1, records[0].code);
}

#[tokio::test]
async fn should_echo_code_when_enabled() {
    let sender = MockSender::new();
    let sent = sender.sent_handle();
    let mut uc = request_usecase(MockOtpRepo::empty(), sender);
    uc.echo_code = true;

    let out = uc.execute(request_input()).await.unwrap();

    let sent = sent.lock().unwrap();
    assert_eq!(out.code.as_deref(), Some(sent[0].1.as_str()));
}

#[tokio::test]
async fn should_not_resend_while_code_is_pending() {
    let otps = MockOtpRepo::empty();
    let records = otps.records_handle();
    let sender = MockSender::new();
    let sent = sender.sent_handle();
    let uc = request_usecase(otps, sender);

    let first = uc.execute(request_input()).await.unwrap();
    let code_after_first = records.lock().unwrap()[0].code.clone();

    let second = uc.execute(request_input()).await.unwrap();

    assert!(!first.pending);
    assert!(second.pending);
    assert!(second.code.is_none());
    assert_eq!(sent.lock().unwrap().len(), 1, "second request must not send");

    let records = records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].code, code_after_first, "pending code must not change");
}

#[tokio::test]
async fn should_refresh_used_record_in_place() {
    let otps = MockOtpRepo::new(vec![test_otp(UserId(1), "111111", true, 120)]);
    let records = otps.records_handle();
    let sender = MockSender::new();
    let sent = sender.sent_handle();

    let out = request_usecase(otps, sender)
        .execute(request_input())
        .await
        .unwrap();

    assert!(!out.pending);
    let records = records.lock().unwrap();
    assert_eq!(records.len(), 1, "row is recycled, not duplicated");
    assert!(!records[0].is_used);
    assert_eq!(sent.lock().unwrap()[0].1, records[0].code);
}

#[tokio::test]
async fn should_refresh_expired_unused_record() {
    let otps = MockOtpRepo::new(vec![test_otp(UserId(1), "111111", false, -10)]);
    let records = otps.records_handle();
    let sender = MockSender::new();
    let sent = sender.sent_handle();

    let out = request_usecase(otps, sender)
        .execute(request_input())
        .await
        .unwrap();

    assert!(!out.pending);
    assert_eq!(sent.lock().unwrap().len(), 1);
    assert!(records.lock().unwrap()[0].expires_at > chrono::Utc::now());
}

#[tokio::test]
async fn should_report_pending_without_sending_when_race_is_lost() {
    let otps = MockOtpRepo {
        lose_races: true,
        ..MockOtpRepo::empty()
    };
    let sender = MockSender::new();
    let sent = sender.sent_handle();

    let out = request_usecase(otps, sender)
        .execute(request_input())
        .await
        .unwrap();

    assert!(out.pending);
    assert!(sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn should_return_not_found_when_phone_unknown() {
    let uc = RequestOtpUseCase {
        users: MockUserRepo::empty(),
        otps: MockOtpRepo::empty(),
        sender: MockSender::new(),
        otp_length: 6,
        echo_code: false,
    };

    let result = uc.execute(request_input()).await;

    assert!(
        matches!(result, Err(AuthServiceError::UserNotFound)),
        "expected UserNotFound, got {result:?}"
    );
}

#[tokio::test]
async fn should_keep_stored_code_when_delivery_fails() {
    let otps = MockOtpRepo::empty();
    let records = otps.records_handle();

    let result = request_usecase(otps, MockSender::failing())
        .execute(request_input())
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::Delivery(_))),
        "expected Delivery, got {result:?}"
    );
    let records = records.lock().unwrap();
    assert_eq!(records.len(), 1);
    assert!(!records[0].is_used, "undelivered code stays active");
}

#[tokio::test]
async fn should_reject_zero_otp_length() {
    let mut uc = request_usecase(MockOtpRepo::empty(), MockSender::new());
    uc.otp_length = 0;

    let result = uc.execute(request_input()).await;

    assert!(
        matches!(result, Err(AuthServiceError::InvalidParameter(_))),
        "expected InvalidParameter, got {result:?}"
    );
}

// ── VerifyOtp ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn should_log_in_once_with_sent_code() {
    let otps = MockOtpRepo::empty();
    let records = otps.records_handle();
    let sender = MockSender::new();
    let sent = sender.sent_handle();

    request_usecase(otps.clone(), sender)
        .execute(request_input())
        .await
        .unwrap();
    let code = sent.lock().unwrap()[0].1.clone();

    let verify = verify_usecase(otps);
    let out = verify
        .execute(VerifyOtpInput {
            code: code.clone(),
            user_id: None,
        })
        .await
        .unwrap();

    assert_eq!(out.user_id, UserId(1));
    assert_eq!(out.roles, vec![role("ADMIN"), role("USER")]);
    assert!(records.lock().unwrap()[0].is_used);

    let claims = verify.authority.validate(&out.token).await.unwrap();
    assert_eq!(claims.user_id, UserId(1));
    assert_eq!(claims.roles, out.roles);

    let again = verify
        .execute(VerifyOtpInput {
            code,
            user_id: None,
        })
        .await;
    assert!(
        matches!(again, Err(AuthServiceError::OtpAlreadyUsed)),
        "expected OtpAlreadyUsed, got {again:?}"
    );
}

#[tokio::test]
async fn should_reject_expired_code_even_if_unused() {
    let otps = MockOtpRepo::new(vec![test_otp(UserId(1), "123456", false, -1)]);

    let result = verify_usecase(otps)
        .execute(VerifyOtpInput {
            code: "123456".to_owned(),
            user_id: None,
        })
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::OtpExpired)),
        "expected OtpExpired, got {result:?}"
    );
}

#[tokio::test]
async fn should_return_otp_not_found_for_unknown_code() {
    let result = verify_usecase(MockOtpRepo::empty())
        .execute(VerifyOtpInput {
            code: "000000".to_owned(),
            user_id: None,
        })
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::OtpNotFound)),
        "expected OtpNotFound, got {result:?}"
    );
}

#[tokio::test]
async fn should_refuse_code_shared_by_two_users() {
    let otps = MockOtpRepo::new(vec![
        test_otp(test_user().id, "424242", false, 120),
        test_otp(other_user().id, "424242", false, 120),
    ]);
    let records = otps.records_handle();

    let result = verify_usecase(otps)
        .execute(VerifyOtpInput {
            code: "424242".to_owned(),
            user_id: None,
        })
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::OtpConflict)),
        "expected OtpConflict, got {result:?}"
    );
    assert!(
        records.lock().unwrap().iter().all(|r| !r.is_used),
        "nothing is consumed on conflict"
    );
}

#[tokio::test]
async fn should_ignore_consumed_record_sharing_the_code() {
    let mut consumed = test_otp(test_user().id, "424242", true, 120);
    consumed.created_at -= chrono::Duration::seconds(30);
    let otps = MockOtpRepo::new(vec![
        consumed,
        test_otp(other_user().id, "424242", false, 300),
    ]);
    let records = otps.records_handle();
    let other = other_user();
    let uc = VerifyOtpUseCase {
        users: MockUserRepo::new(vec![test_user(), other.clone()])
            .with_roles(other.id, &["USER"]),
        otps,
        authority: test_authority(),
    };

    let out = uc
        .execute(VerifyOtpInput {
            code: "424242".to_owned(),
            user_id: None,
        })
        .await
        .unwrap();

    assert_eq!(out.user_id, other.id);
    let records = records.lock().unwrap();
    assert!(records[1].is_used, "fresh record is consumed");
}

#[tokio::test]
async fn should_resolve_shared_code_when_scoped_to_user() {
    let otps = MockOtpRepo::new(vec![
        test_otp(test_user().id, "424242", false, 120),
        test_otp(other_user().id, "424242", false, 120),
    ]);
    let records = otps.records_handle();

    let out = verify_usecase(otps)
        .execute(VerifyOtpInput {
            code: "424242".to_owned(),
            user_id: Some(test_user().id),
        })
        .await
        .unwrap();

    assert_eq!(out.user_id, test_user().id);
    let records = records.lock().unwrap();
    assert!(records[0].is_used);
    assert!(!records[1].is_used);
}

#[tokio::test]
async fn should_reject_non_numeric_code() {
    let result = verify_usecase(MockOtpRepo::empty())
        .execute(VerifyOtpInput {
            code: "12ab56".to_owned(),
            user_id: None,
        })
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::InvalidParameter(_))),
        "expected InvalidParameter, got {result:?}"
    );
}

#[tokio::test]
async fn should_not_consume_code_without_signing_secret() {
    let otps = MockOtpRepo::new(vec![test_otp(UserId(1), "123456", false, 120)]);
    let records = otps.records_handle();
    let mut uc = verify_usecase(otps);
    uc.authority = shofy_auth::usecase::token::TokenAuthority::new(
        None,
        shofy_auth::infra::revocation::RevocationList::new(),
    );

    let result = uc
        .execute(VerifyOtpInput {
            code: "123456".to_owned(),
            user_id: None,
        })
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::Configuration(_))),
        "expected Configuration, got {result:?}"
    );
    assert!(!records.lock().unwrap()[0].is_used);
}

#[tokio::test]
async fn should_retire_code_on_logout_reset() {
    let otps = MockOtpRepo::new(vec![test_otp(UserId(1), "123456", false, 120)]);
    otps.reset_active_flag(UserId(1)).await.unwrap();

    let result = verify_usecase(otps)
        .execute(VerifyOtpInput {
            code: "123456".to_owned(),
            user_id: None,
        })
        .await;

    assert!(
        matches!(result, Err(AuthServiceError::OtpAlreadyUsed)),
        "expected OtpAlreadyUsed, got {result:?}"
    );
}
