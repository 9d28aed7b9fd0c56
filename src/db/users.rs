/// Typed store access for user records
use crate::db::models::{NewUser, User};
use crate::error::{AuthError, AuthResult};
use chrono::Utc;
use sqlx::SqlitePool;

/// User store backed by the shared SQLite pool
pub struct UserStore {
    db: SqlitePool,
}

impl UserStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Insert a new user with default verification and lockout state
    pub async fn create(&self, new_user: NewUser) -> AuthResult<User> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO users (name, email, mobile, password_hash, role, referral_code,
                                is_email_verified, is_mobile_verified, failed_login_attempts,
                                is_blocked, is_deleted, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, 0, 0, 0, 0, 0, ?7, ?7)",
        )
        .bind(&new_user.name)
        .bind(&new_user.email)
        .bind(&new_user.mobile)
        .bind(&new_user.password_hash)
        .bind("user")
        .bind(&new_user.referral_code)
        .bind(now)
        .execute(&self.db)
        .await
        .map_err(AuthError::Database)?;

        Ok(User {
            id: result.last_insert_rowid(),
            name: new_user.name,
            email: new_user.email,
            mobile: new_user.mobile,
            password_hash: new_user.password_hash,
            role: "user".to_string(),
            profile_image: None,
            referral_code: new_user.referral_code,
            is_email_verified: false,
            is_mobile_verified: false,
            failed_login_attempts: 0,
            last_failed_login: None,
            is_blocked: false,
            blocked_until: None,
            last_login: None,
            is_deleted: false,
            created_at: now,
            updated_at: now,
        })
    }

    /// Find a non-deleted user by id
    pub async fn find_by_id(&self, id: i64) -> AuthResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?1 AND is_deleted = 0")
            .bind(id)
            .fetch_optional(&self.db)
            .await
            .map_err(AuthError::Database)
    }

    /// Find a non-deleted user by email
    pub async fn find_by_email(&self, email: &str) -> AuthResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE email = ?1 AND is_deleted = 0")
            .bind(email)
            .fetch_optional(&self.db)
            .await
            .map_err(AuthError::Database)
    }

    /// Find a non-deleted user by mobile number
    pub async fn find_by_mobile(&self, mobile: &str) -> AuthResult<Option<User>> {
        sqlx::query_as::<_, User>("SELECT * FROM users WHERE mobile = ?1 AND is_deleted = 0")
            .bind(mobile)
            .fetch_optional(&self.db)
            .await
            .map_err(AuthError::Database)
    }

    /// Check whether an email is taken by a non-deleted user
    pub async fn email_exists(&self, email: &str) -> AuthResult<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE email = ?1 AND is_deleted = 0")
                .bind(email)
                .fetch_one(&self.db)
                .await
                .map_err(AuthError::Database)?;

        Ok(count > 0)
    }

    /// Check whether a mobile number is taken by a non-deleted user
    pub async fn mobile_exists(&self, mobile: &str) -> AuthResult<bool> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE mobile = ?1 AND is_deleted = 0")
                .bind(mobile)
                .fetch_one(&self.db)
                .await
                .map_err(AuthError::Database)?;

        Ok(count > 0)
    }

    /// Check whether a referral code exists on any row, soft-deleted included
    pub async fn referral_code_exists(&self, code: &str) -> AuthResult<bool> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE referral_code = ?1")
            .bind(code)
            .fetch_one(&self.db)
            .await
            .map_err(AuthError::Database)?;

        Ok(count > 0)
    }

    /// Persist the lockout and last-login fields after a login attempt
    pub async fn save_login_state(&self, user: &User) -> AuthResult<()> {
        sqlx::query(
            "UPDATE users
             SET failed_login_attempts = ?1, last_failed_login = ?2, is_blocked = ?3,
                 blocked_until = ?4, last_login = ?5, updated_at = ?6
             WHERE id = ?7",
        )
        .bind(user.failed_login_attempts)
        .bind(user.last_failed_login)
        .bind(user.is_blocked)
        .bind(user.blocked_until)
        .bind(user.last_login)
        .bind(Utc::now())
        .bind(user.id)
        .execute(&self.db)
        .await
        .map_err(AuthError::Database)?;

        Ok(())
    }

    /// Mark the email channel verified
    pub async fn mark_email_verified(&self, user_id: i64) -> AuthResult<()> {
        sqlx::query("UPDATE users SET is_email_verified = 1, updated_at = ?1 WHERE id = ?2")
            .bind(Utc::now())
            .bind(user_id)
            .execute(&self.db)
            .await
            .map_err(AuthError::Database)?;

        Ok(())
    }

    /// Mark the mobile channel verified
    pub async fn mark_mobile_verified(&self, user_id: i64) -> AuthResult<()> {
        sqlx::query("UPDATE users SET is_mobile_verified = 1, updated_at = ?1 WHERE id = ?2")
            .bind(Utc::now())
            .bind(user_id)
            .execute(&self.db)
            .await
            .map_err(AuthError::Database)?;

        Ok(())
    }

    /// Replace the stored password hash
    pub async fn update_password(&self, user_id: i64, password_hash: &str) -> AuthResult<()> {
        sqlx::query("UPDATE users SET password_hash = ?1, updated_at = ?2 WHERE id = ?3")
            .bind(password_hash)
            .bind(Utc::now())
            .bind(user_id)
            .execute(&self.db)
            .await
            .map_err(AuthError::Database)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_store() -> UserStore {
        let db = SqlitePool::connect(":memory:").await.unwrap();
        crate::db::run_migrations(&db).await.unwrap();
        UserStore::new(db)
    }

    fn sample_user(email: &str, mobile: &str) -> NewUser {
        NewUser {
            name: "Jordan Example".to_string(),
            email: email.to_string(),
            mobile: mobile.to_string(),
            password_hash: "$argon2id$fake".to_string(),
            referral_code: "AB12CD".to_string(),
        }
    }

    #[tokio::test]
    async fn test_create_and_find() {
        let store = setup_store().await;

        let user = store
            .create(sample_user("a@x.com", "9999999999"))
            .await
            .unwrap();
        assert!(user.id > 0);
        assert!(!user.is_email_verified);
        assert_eq!(user.failed_login_attempts, 0);

        let by_email = store.find_by_email("a@x.com").await.unwrap().unwrap();
        assert_eq!(by_email.id, user.id);

        let by_mobile = store.find_by_mobile("9999999999").await.unwrap().unwrap();
        assert_eq!(by_mobile.id, user.id);

        assert!(store.find_by_email("other@x.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_existence_checks_skip_deleted_rows() {
        let store = setup_store().await;

        let user = store
            .create(sample_user("gone@x.com", "8888888888"))
            .await
            .unwrap();

        assert!(store.email_exists("gone@x.com").await.unwrap());
        assert!(store.mobile_exists("8888888888").await.unwrap());

        sqlx::query("UPDATE users SET is_deleted = 1 WHERE id = ?1")
            .bind(user.id)
            .execute(&store.db)
            .await
            .unwrap();

        assert!(!store.email_exists("gone@x.com").await.unwrap());
        assert!(!store.mobile_exists("8888888888").await.unwrap());
        assert!(store.find_by_email("gone@x.com").await.unwrap().is_none());

        // Referral codes stay burned even after a soft delete
        assert!(store.referral_code_exists("AB12CD").await.unwrap());
    }

    #[tokio::test]
    async fn test_save_login_state_roundtrip() {
        let store = setup_store().await;

        let mut user = store
            .create(sample_user("lock@x.com", "7777777777"))
            .await
            .unwrap();

        user.failed_login_attempts = 3;
        user.last_failed_login = Some(Utc::now());
        user.is_blocked = true;
        user.blocked_until = Some(Utc::now() + chrono::Duration::minutes(1));
        store.save_login_state(&user).await.unwrap();

        let reloaded = store.find_by_id(user.id).await.unwrap().unwrap();
        assert_eq!(reloaded.failed_login_attempts, 3);
        assert!(reloaded.is_blocked);
        assert!(reloaded.blocked_until.is_some());
        assert!(reloaded.last_failed_login.is_some());
    }

    #[tokio::test]
    async fn test_verification_and_password_updates() {
        let store = setup_store().await;

        let user = store
            .create(sample_user("v@x.com", "6666666666"))
            .await
            .unwrap();

        store.mark_email_verified(user.id).await.unwrap();
        store.mark_mobile_verified(user.id).await.unwrap();
        store.update_password(user.id, "$argon2id$new").await.unwrap();

        let reloaded = store.find_by_id(user.id).await.unwrap().unwrap();
        assert!(reloaded.is_email_verified);
        assert!(reloaded.is_mobile_verified);
        assert_eq!(reloaded.password_hash, "$argon2id$new");
    }
}
