/// Typed store access for the login audit trail
use crate::db::models::LoginEvent;
use crate::error::{AuthError, AuthResult};
use chrono::Utc;
use sqlx::SqlitePool;

/// Login event store backed by the shared SQLite pool
pub struct LoginEventStore {
    db: SqlitePool,
}

impl LoginEventStore {
    pub fn new(db: SqlitePool) -> Self {
        Self { db }
    }

    /// Append an audit record for a successful login
    pub async fn record(
        &self,
        user_id: i64,
        ip_address: &str,
        user_agent: &str,
    ) -> AuthResult<LoginEvent> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO login_events (user_id, ip_address, user_agent, created_at)
             VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(user_id)
        .bind(ip_address)
        .bind(user_agent)
        .bind(now)
        .execute(&self.db)
        .await
        .map_err(AuthError::Database)?;

        Ok(LoginEvent {
            id: result.last_insert_rowid(),
            user_id,
            ip_address: ip_address.to_string(),
            user_agent: user_agent.to_string(),
            created_at: now,
        })
    }

    /// Most recent events for a user, newest first
    pub async fn recent_for_user(&self, user_id: i64, limit: i64) -> AuthResult<Vec<LoginEvent>> {
        sqlx::query_as::<_, LoginEvent>(
            "SELECT * FROM login_events WHERE user_id = ?1 ORDER BY id DESC LIMIT ?2",
        )
        .bind(user_id)
        .bind(limit)
        .fetch_all(&self.db)
        .await
        .map_err(AuthError::Database)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn setup_store() -> LoginEventStore {
        let db = SqlitePool::connect(":memory:").await.unwrap();
        crate::db::run_migrations(&db).await.unwrap();

        sqlx::query(
            "INSERT INTO users (name, email, mobile, password_hash, role, referral_code,
                                is_email_verified, is_mobile_verified, failed_login_attempts,
                                is_blocked, is_deleted, created_at, updated_at)
             VALUES ('Test User', 't@x.com', '9999999999', 'hash', 'user', 'ZZ99ZZ',
                     0, 0, 0, 0, 0, ?1, ?1)",
        )
        .bind(Utc::now())
        .execute(&db)
        .await
        .unwrap();

        LoginEventStore::new(db)
    }

    #[tokio::test]
    async fn test_record_and_fetch_recent() {
        let store = setup_store().await;

        store.record(1, "10.0.0.1", "curl/8.0").await.unwrap();
        store.record(1, "10.0.0.2", "Mozilla/5.0").await.unwrap();

        let events = store.recent_for_user(1, 10).await.unwrap();
        assert_eq!(events.len(), 2);
        // Newest first
        assert_eq!(events[0].ip_address, "10.0.0.2");
        assert_eq!(events[1].ip_address, "10.0.0.1");

        let limited = store.recent_for_user(1, 1).await.unwrap();
        assert_eq!(limited.len(), 1);
    }
}
