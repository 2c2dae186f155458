//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use crate::domain::nonce::NonceRecord;
use crate::error::AuthResult;
use kernel::id::SessionId;

/// Nonce store: at most one live nonce per session
#[trait_variant::make(NonceStore: Send)]
pub trait LocalNonceStore {
    /// Store the nonce for its session, replacing any previous one
    async fn issue(&self, record: &NonceRecord) -> AuthResult<()>;

    /// Remove and return the session's nonce atomically.
    /// Expired records are never returned.
    async fn consume(&self, session_id: &SessionId) -> AuthResult<Option<NonceRecord>>;
}
