// src/auth/store.rs
// Users and login sessions. Session tokens are stored as SHA-256 digests only.

use sha2::{Digest, Sha256};
use sqlx::SqlitePool;

use super::types::{IdentityClaims, User};
use crate::error::{StoreError, StoreResult, now_ts, optional_text, require_text};

/// 32 random bytes, hex encoded.
pub fn generate_token() -> String {
    let bytes: [u8; 32] = rand::random();
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

pub fn hash_token(token: &str) -> String {
    format!("{:x}", Sha256::digest(token.as_bytes()))
}

#[derive(Clone)]
pub struct UserStore {
    pub pool: SqlitePool,
}

impl UserStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Insert or refresh a user from identity claims. `is_admin` is recomputed
    /// on every login.
    pub async fn upsert_user(&self, claims: &IdentityClaims, is_admin: bool) -> StoreResult<User> {
        let id = require_text("sub", &claims.sub)?;
        let email = optional_text(claims.email.clone()).map(|e| e.to_lowercase());
        let now = now_ts();

        let result = sqlx::query(
            r#"
            INSERT INTO users (id, email, first_name, last_name, profile_image_url, is_admin, created_at, updated_at)
            VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                email = excluded.email,
                first_name = excluded.first_name,
                last_name = excluded.last_name,
                profile_image_url = excluded.profile_image_url,
                is_admin = excluded.is_admin,
                updated_at = excluded.updated_at
            "#,
        )
        .bind(&id)
        .bind(&email)
        .bind(optional_text(claims.first_name.clone()))
        .bind(optional_text(claims.last_name.clone()))
        .bind(optional_text(claims.profile_image_url.clone()))
        .bind(is_admin)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await;

        match result {
            Ok(_) => {}
            Err(e) if StoreError::is_unique_violation(&e) => {
                return Err(StoreError::conflict("Email is already linked to another account"));
            }
            Err(e) => return Err(e.into()),
        }

        self.get_user(&id)
            .await?
            .ok_or(StoreError::Database(sqlx::Error::RowNotFound))
    }

    pub async fn get_user(&self, id: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>("SELECT * FROM users WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(user)
    }

    /// Create a session and return the plaintext token with its expiry.
    pub async fn create_session(&self, user_id: &str, ttl_secs: i64) -> StoreResult<(String, i64)> {
        let token = generate_token();
        let now = now_ts();
        let expires_at = now + ttl_secs;

        sqlx::query("INSERT INTO sessions (token_hash, user_id, created_at, expires_at) VALUES (?, ?, ?, ?)")
            .bind(hash_token(&token))
            .bind(user_id)
            .bind(now)
            .bind(expires_at)
            .execute(&self.pool)
            .await?;

        Ok((token, expires_at))
    }

    pub async fn user_for_token(&self, token: &str) -> StoreResult<Option<User>> {
        let user = sqlx::query_as::<_, User>(
            r#"
            SELECT u.* FROM sessions s
            JOIN users u ON u.id = s.user_id
            WHERE s.token_hash = ? AND s.expires_at > ?
            "#,
        )
        .bind(hash_token(token))
        .bind(now_ts())
        .fetch_optional(&self.pool)
        .await?;
        Ok(user)
    }

    pub async fn delete_session(&self, token: &str) -> StoreResult<bool> {
        let result = sqlx::query("DELETE FROM sessions WHERE token_hash = ?")
            .bind(hash_token(token))
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    pub async fn purge_expired_sessions(&self) -> StoreResult<u64> {
        let result = sqlx::query("DELETE FROM sessions WHERE expires_at <= ?")
            .bind(now_ts())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected())
    }

    pub async fn count_users(&self) -> StoreResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM users")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}
