//! Sign Out Use Case

use std::sync::Arc;

use crate::domain::repository::NonceStore;
use crate::domain::session::Session;
use crate::error::AuthResult;

/// Sign out use case
pub struct SignOutUseCase<S>
where
    S: NonceStore,
{
    store: Arc<S>,
}

impl<S> SignOutUseCase<S>
where
    S: NonceStore,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Drops any pending nonce; the caller clears the cookie.
    pub async fn execute(&self, session: &Session) -> AuthResult<()> {
        self.store.consume(&session.sid).await?;

        if let Some(address) = session.address() {
            tracing::info!(address = %address, "SIWE sign-out");
        }

        Ok(())
    }
}
