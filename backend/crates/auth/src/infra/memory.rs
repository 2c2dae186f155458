//! In-Memory Nonce Store
//!
//! Process-local map keyed by session id. Suitable for a single instance
//! and for tests; nonces do not survive a restart.
//!
//! Every cookieless `/nonce` request mints a fresh session, so the map is
//! bounded: past capacity the oldest record is evicted.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use kernel::id::SessionId;

use crate::domain::nonce::NonceRecord;
use crate::domain::repository::NonceStore;
use crate::error::{AuthError, AuthResult};

/// Records held before the oldest is evicted
pub const DEFAULT_MAX_RECORDS: usize = 10_000;

#[derive(Clone)]
pub struct MemoryNonceStore {
    records: Arc<Mutex<HashMap<SessionId, NonceRecord>>>,
    max_records: usize,
}

impl Default for MemoryNonceStore {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_MAX_RECORDS)
    }
}

impl MemoryNonceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store holding at most `max_records` (minimum 1)
    pub fn with_capacity(max_records: usize) -> Self {
        Self {
            records: Arc::new(Mutex::new(HashMap::new())),
            max_records: max_records.max(1),
        }
    }

    /// Number of live records
    pub fn len(&self) -> usize {
        self.lock().map(|records| records.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> AuthResult<MutexGuard<'_, HashMap<SessionId, NonceRecord>>> {
        self.records
            .lock()
            .map_err(|_| AuthError::Internal("nonce store lock poisoned".to_string()))
    }
}

impl NonceStore for MemoryNonceStore {
    async fn issue(&self, record: &NonceRecord) -> AuthResult<()> {
        let now_ms = Utc::now().timestamp_millis();
        let mut records = self.lock()?;
        records.retain(|_, existing| !existing.is_expired(now_ms));

        while records.len() >= self.max_records && !records.contains_key(&record.session_id) {
            let oldest = records
                .values()
                .min_by_key(|existing| existing.issued_at_ms)
                .map(|existing| existing.session_id);
            let Some(oldest) = oldest else { break };
            tracing::debug!(sid = %oldest, "Nonce store full, evicting oldest record");
            records.remove(&oldest);
        }

        records.insert(record.session_id, record.clone());
        Ok(())
    }

    async fn consume(&self, session_id: &SessionId) -> AuthResult<Option<NonceRecord>> {
        let now_ms = Utc::now().timestamp_millis();
        let record = self.lock()?.remove(session_id);
        Ok(record.and_then(|record| record.live(now_ms)))
    }
}
