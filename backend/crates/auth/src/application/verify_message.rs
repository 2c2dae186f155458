//! Verify Message Use Case
//!
//! Anonymous -> Authenticated on success; any failure leaves the session
//! anonymous. The nonce is consumed on every path.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::application::config::SiweConfig;
use crate::domain::repository::NonceStore;
use crate::domain::services::{MessageVerifier, SignatureVerifier, VerifiedMessage};
use crate::domain::session::{Session, SiweIdentity};
use crate::error::AuthResult;

/// Verify input
pub struct VerifyInput {
    pub message: String,
    pub signature: Option<String>,
}

/// Verify Message Use Case
pub struct VerifyMessageUseCase<S>
where
    S: NonceStore,
{
    store: Arc<S>,
    verifier: MessageVerifier,
}

impl<S> VerifyMessageUseCase<S>
where
    S: NonceStore,
{
    pub fn new(
        store: Arc<S>,
        config: Arc<SiweConfig>,
        signature_verifier: Arc<dyn SignatureVerifier>,
    ) -> Self {
        Self {
            store,
            verifier: MessageVerifier::new(signature_verifier, config.expected_domain.clone()),
        }
    }

    pub async fn execute(
        &self,
        session: &mut Session,
        input: VerifyInput,
        now: DateTime<Utc>,
    ) -> AuthResult<VerifiedMessage> {
        let result = self.verify(session, &input, now).await;

        match &result {
            Ok(verified) => {
                session.authenticate(
                    SiweIdentity::from(&verified.message),
                    now.timestamp_millis(),
                );
                tracing::info!(
                    address = %verified.message.address,
                    chain_id = verified.message.chain_id,
                    sid = %session.sid,
                    "SIWE sign-in"
                );
            }
            Err(_) => session.invalidate(),
        }

        result
    }

    async fn verify(
        &self,
        session: &Session,
        input: &VerifyInput,
        now: DateTime<Utc>,
    ) -> AuthResult<VerifiedMessage> {
        let now_ms = now.timestamp_millis();
        let record = self.store.consume(&session.sid).await?;
        let expected_nonce = record
            .filter(|record| !record.is_expired(now_ms))
            .map(|record| record.nonce);

        self.verifier.verify(
            &input.message,
            input.signature.as_deref(),
            expected_nonce.as_ref().map(|nonce| nonce.as_str()),
            now,
        )
    }
}
