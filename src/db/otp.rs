/// Typed store access for OTP challenge records
use crate::db::models::{NewOtpCode, OtpCode};
use crate::error::{AuthError, AuthResult};
use chrono::Utc;
use sqlx::SqlitePool;

/// OTP store backed by the shared SQLite pool
pub struct OtpStore {
    db: SqlitePool,
}

impl OtpStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Insert a new OTP record
    pub async fn create(&self, new_code: NewOtpCode) -> AuthResult<OtpCode> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO otp_codes (user_id, email, mobile, code, purpose, expires_at,
                                    is_used, is_deleted, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, 0, ?7)",
        )
        .bind(new_code.user_id)
        .bind(&new_code.email)
        .bind(&new_code.mobile)
        .bind(&new_code.code)
        .bind(&new_code.purpose)
        .bind(new_code.expires_at)
        .bind(now)
        .execute(&self.db)
        .await
        .map_err(AuthError::Database)?;

        Ok(OtpCode {
            id: result.last_insert_rowid(),
            user_id: new_code.user_id,
            email: new_code.email,
            mobile: new_code.mobile,
            code: new_code.code,
            purpose: new_code.purpose,
            expires_at: new_code.expires_at,
            is_used: false,
            is_deleted: false,
            created_at: now,
        })
    }

    /// Find the oldest unconsumed, unretired code for an email channel.
    /// Expiry is not filtered here; the lifecycle manager distinguishes
    /// expired matches from missing ones.
    pub async fn find_pending_by_email(
        &self,
        email: &str,
        code: &str,
    ) -> AuthResult<Option<OtpCode>> {
        sqlx::query_as::<_, OtpCode>(
            "SELECT * FROM otp_codes
             WHERE email = ?1 AND code = ?2 AND is_used = 0 AND is_deleted = 0
             ORDER BY id ASC LIMIT 1",
        )
        .bind(email)
        .bind(code)
        .fetch_optional(&self.db)
        .await
        .map_err(AuthError::Database)
    }

    /// Find the oldest unconsumed, unretired code for a mobile channel
    pub async fn find_pending_by_mobile(
        &self,
        mobile: &str,
        code: &str,
    ) -> AuthResult<Option<OtpCode>> {
        sqlx::query_as::<_, OtpCode>(
            "SELECT * FROM otp_codes
             WHERE mobile = ?1 AND code = ?2 AND is_used = 0 AND is_deleted = 0
             ORDER BY id ASC LIMIT 1",
        )
        .bind(mobile)
        .bind(code)
        .fetch_optional(&self.db)
        .await
        .map_err(AuthError::Database)
    }

    /// Mark a code consumed
    pub async fn mark_used(&self, id: i64) -> AuthResult<()> {
        sqlx::query("UPDATE otp_codes SET is_used = 1 WHERE id = ?1")
            .bind(id)
            .execute(&self.db)
            .await
            .map_err(AuthError::Database)?;

        Ok(())
    }

    /// Retire outstanding codes for a user's email channel and purpose.
    /// Returns the number of codes retired.
    pub async fn retire_outstanding_by_email(
        &self,
        user_id: i64,
        email: &str,
        purpose: &str,
    ) -> AuthResult<u64> {
        let result = sqlx::query(
            "UPDATE otp_codes SET is_deleted = 1
             WHERE user_id = ?1 AND email = ?2 AND purpose = ?3
               AND is_used = 0 AND is_deleted = 0",
        )
        .bind(user_id)
        .bind(email)
        .bind(purpose)
        .execute(&self.db)
        .await
        .map_err(AuthError::Database)?;

        Ok(result.rows_affected())
    }

    /// Retire outstanding codes for a user's mobile channel and purpose
    pub async fn retire_outstanding_by_mobile(
        &self,
        user_id: i64,
        mobile: &str,
        purpose: &str,
    ) -> AuthResult<u64> {
        let result = sqlx::query(
            "UPDATE otp_codes SET is_deleted = 1
             WHERE user_id = ?1 AND mobile = ?2 AND purpose = ?3
               AND is_used = 0 AND is_deleted = 0",
        )
        .bind(user_id)
        .bind(mobile)
        .bind(purpose)
        .execute(&self.db)
        .await
        .map_err(AuthError::Database)?;

        Ok(result.rows_affected())
    }
}
