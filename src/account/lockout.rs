/// Progressive login lockout policy
///
/// Three consecutive failures inside the decay window block the account
/// for one minute. Blocks clear lazily on the next attempt after expiry;
/// there is no background sweeper.
use crate::db::models::User;
use chrono::{DateTime, Duration, Utc};

/// Consecutive failures that trip a block
pub const MAX_FAILED_ATTEMPTS: i32 = 3;
/// How long a tripped block lasts
pub const BLOCK_MINUTES: i64 = 1;
/// The failure counter resets after this long without a new failure
pub const DECAY_MINUTES: i64 = 15;

/// Why a login attempt was refused before or at the secret check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    EmailNotVerified,
    MobileNotVerified,
    TemporarilyBlocked,
    WrongPassword,
}

/// Gate an attempt before the secret is checked: verification flags first,
/// then the block, then failure-count decay. Returns whether the identity
/// changed and must be persisted even if the attempt goes on to fail.
pub fn gate_attempt(user: &mut User, now: DateTime<Utc>) -> Result<bool, DenyReason> {
    if !user.is_email_verified {
        return Err(DenyReason::EmailNotVerified);
    }
    if !user.is_mobile_verified {
        return Err(DenyReason::MobileNotVerified);
    }

    let mut dirty = false;

    if user.is_blocked {
        if let Some(until) = user.blocked_until {
            if until > now {
                return Err(DenyReason::TemporarilyBlocked);
            }
        }
        // Lapsed block clears on the next attempt
        user.is_blocked = false;
        user.blocked_until = None;
        dirty = true;
    }

    if let Some(last_failed) = user.last_failed_login {
        if now - last_failed > Duration::minutes(DECAY_MINUTES) {
            user.failed_login_attempts = 0;
            user.last_failed_login = None;
            dirty = true;
        }
    }

    Ok(dirty)
}

/// Count a failed secret and trip the block on the third strike
pub fn record_failure(user: &mut User, now: DateTime<Utc>) {
    user.failed_login_attempts += 1;
    user.last_failed_login = Some(now);

    if user.failed_login_attempts >= MAX_FAILED_ATTEMPTS {
        user.is_blocked = true;
        user.blocked_until = Some(now + Duration::minutes(BLOCK_MINUTES));
    }
}

/// Clear every lockout track and stamp the successful login
pub fn record_success(user: &mut User, now: DateTime<Utc>) {
    user.failed_login_attempts = 0;
    user.last_failed_login = None;
    user.is_blocked = false;
    user.blocked_until = None;
    user.last_login = Some(now);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verified_user() -> User {
        let now = Utc::now();
        User {
            id: 1,
            name: "Jordan Example".to_string(),
            email: "jordan@example.com".to_string(),
            mobile: "9876543210".to_string(),
            password_hash: "hash".to_string(),
            role: "user".to_string(),
            profile_image: None,
            referral_code: "ABC123".to_string(),
            is_email_verified: true,
            is_mobile_verified: true,
            failed_login_attempts: 0,
            last_failed_login: None,
            is_blocked: false,
            blocked_until: None,
            last_login: None,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_unverified_email_denies_first() {
        let mut user = verified_user();
        user.is_email_verified = false;
        user.is_mobile_verified = false;

        let reason = gate_attempt(&mut user, Utc::now()).unwrap_err();
        assert_eq!(reason, DenyReason::EmailNotVerified);
    }

    #[test]
    fn test_unverified_mobile_denies_second() {
        let mut user = verified_user();
        user.is_mobile_verified = false;

        let reason = gate_attempt(&mut user, Utc::now()).unwrap_err();
        assert_eq!(reason, DenyReason::MobileNotVerified);
    }

    #[test]
    fn test_active_block_denies() {
        let now = Utc::now();
        let mut user = verified_user();
        user.is_blocked = true;
        user.blocked_until = Some(now + Duration::seconds(30));

        let reason = gate_attempt(&mut user, now).unwrap_err();
        assert_eq!(reason, DenyReason::TemporarilyBlocked);
        assert!(user.is_blocked);
    }

    #[test]
    fn test_lapsed_block_clears_lazily() {
        let now = Utc::now();
        let mut user = verified_user();
        user.is_blocked = true;
        user.blocked_until = Some(now - Duration::seconds(1));
        user.failed_login_attempts = 3;
        user.last_failed_login = Some(now - Duration::seconds(61));

        let dirty = gate_attempt(&mut user, now).unwrap();
        assert!(dirty);
        assert!(!user.is_blocked);
        assert_eq!(user.blocked_until, None);
        // Within the decay window the counter survives
        assert_eq!(user.failed_login_attempts, 3);
    }

    #[test]
    fn test_counter_decays_after_fifteen_minutes() {
        let now = Utc::now();
        let mut user = verified_user();
        user.failed_login_attempts = 2;
        user.last_failed_login = Some(now - Duration::minutes(16));

        let dirty = gate_attempt(&mut user, now).unwrap();
        assert!(dirty);
        assert_eq!(user.failed_login_attempts, 0);
        assert_eq!(user.last_failed_login, None);
    }

    #[test]
    fn test_counter_survives_inside_decay_window() {
        let now = Utc::now();
        let mut user = verified_user();
        user.failed_login_attempts = 2;
        user.last_failed_login = Some(now - Duration::minutes(14));

        let dirty = gate_attempt(&mut user, now).unwrap();
        assert!(!dirty);
        assert_eq!(user.failed_login_attempts, 2);
    }

    #[test]
    fn test_third_failure_trips_the_block() {
        let now = Utc::now();
        let mut user = verified_user();

        record_failure(&mut user, now);
        record_failure(&mut user, now);
        assert!(!user.is_blocked);

        record_failure(&mut user, now);
        assert!(user.is_blocked);
        assert_eq!(
            user.blocked_until,
            Some(now + Duration::minutes(BLOCK_MINUTES))
        );
        assert_eq!(user.failed_login_attempts, 3);
    }

    #[test]
    fn test_success_clears_all_lockout_state() {
        let now = Utc::now();
        let mut user = verified_user();
        user.failed_login_attempts = 2;
        user.last_failed_login = Some(now - Duration::minutes(1));
        user.is_blocked = true;
        user.blocked_until = Some(now - Duration::seconds(1));

        record_success(&mut user, now);
        assert_eq!(user.failed_login_attempts, 0);
        assert_eq!(user.last_failed_login, None);
        assert!(!user.is_blocked);
        assert_eq!(user.blocked_until, None);
        assert_eq!(user.last_login, Some(now));
    }
}
