/// Wire-contract tests for the auth API
///
/// Note: These are self-contained checks of the shapes and rules the
/// HTTP surface promises. Workflow tests live next to the modules they
/// exercise.
use serde_json::{json, Value};

#[test]
fn test_success_envelope_shape() {
    let envelope = json!({
        "status": true,
        "message": "Login successful.",
        "data": {
            "user": {"id": 1, "name": "Jordan Example"},
            "token": "header.payload.signature"
        }
    });

    assert_eq!(envelope["status"], Value::Bool(true));
    assert!(envelope["message"].is_string());
    assert!(envelope["data"]["token"].is_string());
}

#[test]
fn test_message_only_envelope_omits_data() {
    // Payload-free responses drop the data key entirely
    let raw = r#"{"status":true,"message":"OTP sent successfully."}"#;
    let envelope: Value = serde_json::from_str(raw).unwrap();

    assert_eq!(envelope["status"], Value::Bool(true));
    assert!(envelope.get("data").is_none());
}

#[test]
fn test_error_envelope_shape() {
    let raw = r#"{"status":false,"message":"Wrong Password"}"#;
    let envelope: Value = serde_json::from_str(raw).unwrap();

    assert_eq!(envelope["status"], Value::Bool(false));
    assert_eq!(envelope["message"], "Wrong Password");
}

#[test]
fn test_bearer_header_parsing() {
    let auth_header = "Bearer abc123token";
    let token = auth_header.strip_prefix("Bearer ");
    assert_eq!(token, Some("abc123token"));

    let invalid_header = "abc123token";
    let token = invalid_header.strip_prefix("Bearer ");
    assert_eq!(token, None);
}

#[test]
fn test_forwarded_for_takes_first_entry() {
    let header = "203.0.113.9, 10.0.0.1, 172.16.0.1";
    let client_ip = header.split(',').next().map(str::trim);
    assert_eq!(client_ip, Some("203.0.113.9"));
}

#[test]
fn test_otp_code_shape() {
    use rand::Rng;
    let mut rng = rand::thread_rng();

    for _ in 0..50 {
        let code: String = (0..6)
            .map(|_| char::from(b'0' + rng.gen_range(0..10u8)))
            .collect();
        assert_eq!(code.len(), 6);
        assert!(code.chars().all(|c| c.is_ascii_digit()));
    }
}

#[test]
fn test_referral_codes_are_unique() {
    use rand::Rng;
    use std::collections::HashSet;
    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

    let mut codes = HashSet::new();
    for _ in 0..100 {
        let mut rng = rand::thread_rng();
        let code: String = (0..6)
            .map(|_| {
                let idx = rng.gen_range(0..CHARSET.len());
                CHARSET[idx] as char
            })
            .collect();
        assert!(code.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
        codes.insert(code);
    }

    // 36^6 possibilities make collisions across 100 draws vanishingly rare
    assert_eq!(codes.len(), 100);
}

#[test]
fn test_block_window_arithmetic() {
    use chrono::{Duration, Utc};

    let now = Utc::now();
    let blocked_until = now + Duration::minutes(1);
    assert!(blocked_until > now);

    // A block stamped over a minute ago has lapsed
    let stale_block = now - Duration::seconds(61) + Duration::minutes(1);
    assert!(stale_block <= now + Duration::seconds(1));
}

#[test]
fn test_failure_decay_window() {
    use chrono::{Duration, Utc};

    let now = Utc::now();
    let recent_failure = now - Duration::minutes(14);
    let stale_failure = now - Duration::minutes(16);

    assert!(now - recent_failure <= Duration::minutes(15));
    assert!(now - stale_failure > Duration::minutes(15));
}

#[test]
fn test_identifier_rules() {
    // Mobile numbers are exactly ten digits
    let valid = "9876543210";
    assert_eq!(valid.len(), 10);
    assert!(valid.chars().all(|c| c.is_ascii_digit()));

    let short = "98765";
    assert!(short.len() != 10);

    let alpha = "98765photo";
    assert!(!alpha.chars().all(|c| c.is_ascii_digit()));

    // Names and passwords are measured after trimming
    let padded_name = "  Jo  ";
    assert!(padded_name.trim().len() < 5);

    let padded_password = " longenough ";
    assert!(padded_password.trim().len() >= 8);
}
