/// Referral code generation
///
/// Six symbols over [A-Z0-9], unique across every identity ever created,
/// soft-deleted rows included.
use crate::db::users::UserStore;
use crate::error::{AuthError, AuthResult};
use rand::Rng;

const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const CODE_LENGTH: usize = 6;

/// Collisions past this many candidates point at an entropy problem
const MAX_ATTEMPTS: usize = 32;

fn random_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LENGTH)
        .map(|_| char::from(CHARSET[rng.gen_range(0..CHARSET.len())]))
        .collect()
}

/// Mint a referral code no identity has used before
pub async fn generate_referral_code(users: &UserStore) -> AuthResult<String> {
    for _ in 0..MAX_ATTEMPTS {
        let candidate = random_code();
        if !users.referral_code_exists(&candidate).await? {
            return Ok(candidate);
        }
        tracing::warn!("Referral code collision on {}", candidate);
    }

    Err(AuthError::Internal(
        "Could not find a free referral code".to_string(),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db;
    use sqlx::SqlitePool;
    use std::collections::HashSet;

    #[test]
    fn test_codes_match_the_alphabet() {
        for _ in 0..50 {
            let code = random_code();
            assert_eq!(code.len(), 6);
            assert!(code.bytes().all(|b| CHARSET.contains(&b)));
        }
    }

    #[test]
    fn test_codes_are_pairwise_distinct() {
        let codes: HashSet<String> = (0..100).map(|_| random_code()).collect();
        assert_eq!(codes.len(), 100);
    }

    #[tokio::test]
    async fn test_generated_code_is_free_in_the_store() {
        let pool = SqlitePool::connect(":memory:").await.unwrap();
        db::run_migrations(&pool).await.unwrap();
        let users = UserStore::new(pool);

        let code = generate_referral_code(&users).await.unwrap();
        assert!(!users.referral_code_exists(&code).await.unwrap());
    }
}
