//! Tokens, PINs and rate limits

use std::time::{Duration, Instant};

use jiff::Timestamp;
use lealtad::{
    pins::{hash_pin, verify_pin},
    rate_limit::{RateLimit, RateLimiter},
    tokens::{AdminAllowlist, AdminTokenAuthority, SecretComparison, SigningKey, SsoSecret},
};
use testresult::TestResult;

#[test]
fn any_altered_payload_byte_breaks_the_token() -> TestResult {
    let authority = AdminTokenAuthority::new(
        SigningKey::new("integration-secret")?,
        AdminAllowlist::from_csv("ops@example.com"),
    );

    let now = Timestamp::now();
    let token = authority.issue("ops@example.com", now)?.token;
    let payload_len = token.find('.').ok_or("missing separator")?;

    for position in 0..payload_len {
        let mut bytes = token.clone().into_bytes();

        if let Some(byte) = bytes.get_mut(position) {
            *byte = if *byte == b'A' { b'B' } else { b'A' };
        }

        let altered = String::from_utf8(bytes)?;

        assert!(authority.verify(&altered, now).is_none(), "position {position}");
    }

    Ok(())
}

#[test]
fn sso_secret_length_is_checked_first() {
    let secret = SsoSecret::new("0123456789abcdef");

    assert_eq!(secret.compare(b"0123456789abcde"), SecretComparison::LengthMismatch);
    assert_eq!(secret.compare(b"0123456789abcdef0"), SecretComparison::LengthMismatch);
    assert_eq!(secret.compare(b"0123456789abcdeX"), SecretComparison::Mismatch);
    assert_eq!(secret.compare(b"0123456789abcdef"), SecretComparison::Match);
}

#[test]
fn three_per_second_window() {
    let limiter = RateLimiter::default();
    let limit = RateLimit::new(3, Duration::from_millis(1_000));
    let now = Instant::now();

    for _ in 0..3 {
        assert!(limiter.check_at("submit:1.2.3.4:cafe", limit, now).allowed);
    }

    let denied = limiter.check_at("submit:1.2.3.4:cafe", limit, now);

    assert!(!denied.allowed);
    assert!(denied.retry_after_seconds >= 1);

    let after = limiter.check_at("submit:1.2.3.4:cafe", limit, now + Duration::from_millis(1_000));

    assert!(after.allowed);
    assert_eq!(after.remaining, 2);
}

#[test]
fn pin_hash_and_legacy_pin() -> TestResult {
    let hash = hash_pin("2468")?;

    assert!(verify_pin("2468", Some(&hash), None));
    assert!(!verify_pin("8642", Some(&hash), None));
    assert!(verify_pin("1234", None, Some("1234")));
    assert!(!verify_pin("4321", None, Some("1234")));

    Ok(())
}
