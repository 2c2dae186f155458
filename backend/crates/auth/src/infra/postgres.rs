//! PostgreSQL Repository Implementations

use chrono::Utc;
use kernel::id::SessionId;
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::nonce::{Nonce, NonceRecord};
use crate::domain::repository::NonceStore;
use crate::error::{AuthError, AuthResult};

/// PostgreSQL-backed nonce store
#[derive(Clone)]
pub struct PgNonceStore {
    pool: PgPool,
}

impl PgNonceStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Clean up expired nonces
    pub async fn cleanup_expired(&self) -> AuthResult<u64> {
        let now_ms = Utc::now().timestamp_millis();

        let deleted = sqlx::query("DELETE FROM siwe_nonces WHERE expires_at_ms <= $1")
            .bind(now_ms)
            .execute(&self.pool)
            .await?
            .rows_affected();

        tracing::info!(nonces_deleted = deleted, "Cleaned up expired SIWE nonces");

        Ok(deleted)
    }
}

impl NonceStore for PgNonceStore {
    async fn issue(&self, record: &NonceRecord) -> AuthResult<()> {
        sqlx::query(
            r#"
            INSERT INTO siwe_nonces (
                session_id,
                nonce,
                issued_at_ms,
                expires_at_ms
            ) VALUES ($1, $2, $3, $4)
            ON CONFLICT (session_id) DO UPDATE SET
                nonce = EXCLUDED.nonce,
                issued_at_ms = EXCLUDED.issued_at_ms,
                expires_at_ms = EXCLUDED.expires_at_ms
            "#,
        )
        .bind(record.session_id.as_uuid())
        .bind(record.nonce.as_str())
        .bind(record.issued_at_ms)
        .bind(record.expires_at_ms)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn consume(&self, session_id: &SessionId) -> AuthResult<Option<NonceRecord>> {
        let now_ms = Utc::now().timestamp_millis();

        // Expired rows are deleted too, but not returned
        let row = sqlx::query_as::<_, NonceRow>(
            r#"
            DELETE FROM siwe_nonces
            WHERE session_id = $1
            RETURNING
                session_id,
                nonce,
                issued_at_ms,
                expires_at_ms
            "#,
        )
        .bind(session_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        match row {
            Some(row) => {
                let live = row.into_live(now_ms)?;
                if live.is_none() {
                    tracing::debug!(sid = %session_id, "Nonce expired before use");
                }
                Ok(live)
            }
            None => Ok(None),
        }
    }
}

#[derive(sqlx::FromRow)]
struct NonceRow {
    session_id: Uuid,
    nonce: String,
    issued_at_ms: i64,
    expires_at_ms: i64,
}

impl NonceRow {
    /// Decoded record, or `None` if it expired at or before `now_ms`
    fn into_live(self, now_ms: i64) -> AuthResult<Option<NonceRecord>> {
        Ok(self.into_record()?.live(now_ms))
    }

    fn into_record(self) -> AuthResult<NonceRecord> {
        let nonce = Nonce::parse(&self.nonce)
            .ok_or_else(|| AuthError::Internal("stored nonce is malformed".to_string()))?;

        Ok(NonceRecord {
            session_id: SessionId::from_uuid(self.session_id),
            nonce,
            issued_at_ms: self.issued_at_ms,
            expires_at_ms: self.expires_at_ms,
        })
    }
}
