//! Nonce Value Object and Record
//!
//! The nonce is the single-use challenge the wallet signs. EIP-4361 requires
//! at least 8 alphanumeric characters; we issue 24 (~142 bits of entropy).

use derive_more::Display;
use kernel::id::SessionId;

/// Issued nonce length in characters
pub const NONCE_LEN: usize = 24;

/// Shortest nonce EIP-4361 allows
pub const MIN_NONCE_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Display)]
pub struct Nonce(String);

impl Nonce {
    /// Draw a fresh nonce from the OS CSPRNG
    pub fn generate() -> Self {
        Self(platform::crypto::random_alphanumeric(NONCE_LEN))
    }

    /// Accept a nonce read back from storage or a message
    pub fn parse(value: &str) -> Option<Self> {
        is_valid_nonce(value).then(|| Self(value.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

pub fn is_valid_nonce(value: &str) -> bool {
    value.len() >= MIN_NONCE_LEN && value.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Server-side record: the one live nonce of a session
#[derive(Debug, Clone)]
pub struct NonceRecord {
    pub session_id: SessionId,
    pub nonce: Nonce,
    pub issued_at_ms: i64,
    pub expires_at_ms: i64,
}

impl NonceRecord {
    pub fn new(session_id: SessionId, nonce: Nonce, now_ms: i64, ttl_ms: i64) -> Self {
        Self {
            session_id,
            nonce,
            issued_at_ms: now_ms,
            expires_at_ms: now_ms + ttl_ms,
        }
    }

    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms >= self.expires_at_ms
    }

    /// The record if still usable at `now_ms`
    pub fn live(self, now_ms: i64) -> Option<Self> {
        (!self.is_expired(now_ms)).then_some(self)
    }
}
