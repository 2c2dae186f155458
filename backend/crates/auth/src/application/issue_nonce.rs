//! Issue Nonce Use Case

use std::sync::Arc;

use crate::application::config::SiweConfig;
use crate::domain::nonce::{Nonce, NonceRecord};
use crate::domain::repository::NonceStore;
use crate::domain::session::Session;
use crate::error::AuthResult;

/// Issue Nonce Use Case
pub struct IssueNonceUseCase<S>
where
    S: NonceStore,
{
    store: Arc<S>,
    config: Arc<SiweConfig>,
}

impl<S> IssueNonceUseCase<S>
where
    S: NonceStore,
{
    pub fn new(store: Arc<S>, config: Arc<SiweConfig>) -> Self {
        Self { store, config }
    }

    /// Replaces any pending nonce of the session. The session's identity
    /// (if any) is kept until the next verify.
    pub async fn execute(&self, session: &mut Session, now_ms: i64) -> AuthResult<Nonce> {
        let nonce = Nonce::generate();
        let record = NonceRecord::new(
            session.sid,
            nonce.clone(),
            now_ms,
            self.config.nonce_ttl_ms(),
        );

        self.store.issue(&record).await?;
        session.set_pending_nonce(&nonce);

        tracing::info!(sid = %session.sid, "Issued SIWE nonce");

        Ok(nonce)
    }
}
