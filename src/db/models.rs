/// Database models for users, OTP challenges, and login events
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

/// User account record in the database
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub password_hash: String,
    pub role: String,
    pub profile_image: Option<String>,
    pub referral_code: String,
    pub is_email_verified: bool,
    pub is_mobile_verified: bool,
    pub failed_login_attempts: i32,
    pub last_failed_login: Option<DateTime<Utc>>,
    pub is_blocked: bool,
    pub blocked_until: Option<DateTime<Utc>>,
    pub last_login: Option<DateTime<Utc>>,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Fields required to insert a new user
#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub mobile: String,
    pub password_hash: String,
    pub referral_code: String,
}

/// OTP challenge record
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct OtpCode {
    pub id: i64,
    pub user_id: i64,
    /// Exactly one of email/mobile is populated, matching the channel
    /// the code was issued on
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub code: String,
    pub purpose: String, // "verification" or "password-reset"
    pub expires_at: DateTime<Utc>,
    pub is_used: bool,
    pub is_deleted: bool,
    pub created_at: DateTime<Utc>,
}

/// Fields required to insert a new OTP challenge
#[derive(Debug, Clone)]
pub struct NewOtpCode {
    pub user_id: i64,
    pub email: Option<String>,
    pub mobile: Option<String>,
    pub code: String,
    pub purpose: String,
    pub expires_at: DateTime<Utc>,
}

/// Append-only audit record of a successful login
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct LoginEvent {
    pub id: i64,
    pub user_id: i64,
    pub ip_address: String,
    pub user_agent: String,
    pub created_at: DateTime<Utc>,
}
