//! Session Entity
//!
//! Client-held session state. The session never lives on the server: it is
//! serialized into a signed cookie by `application::session_manager`.
//!
//! Two states:
//! - Anonymous: `siwe` is `None` (may carry a pending nonce)
//! - Authenticated: `siwe` holds the verified identity

use kernel::address::WalletAddress;
use kernel::id::SessionId;
use serde::{Deserialize, Serialize};

use crate::domain::message::SiweMessage;
use crate::domain::nonce::Nonce;

/// Current payload schema version
pub const SESSION_VERSION: u32 = 1;

/// Identity bound by a successful verify
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SiweIdentity {
    pub address: WalletAddress,
    pub chain_id: u64,
    pub domain: String,
    pub issued_at: String,
}

impl From<&SiweMessage> for SiweIdentity {
    fn from(message: &SiweMessage) -> Self {
        Self {
            address: message.address,
            chain_id: message.chain_id,
            domain: message.domain.clone(),
            issued_at: message.issued_at.as_str().to_string(),
        }
    }
}

/// Versioned session payload
///
/// Missing fields default and unknown fields are ignored, so the schema can
/// grow without invalidating live cookies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    #[serde(default = "default_version")]
    pub v: u32,
    #[serde(default)]
    pub sid: SessionId,
    #[serde(default)]
    pub created_at_ms: i64,
    #[serde(default)]
    pub nonce: Option<String>,
    #[serde(default)]
    pub siwe: Option<SiweIdentity>,
}

fn default_version() -> u32 {
    SESSION_VERSION
}

impl Session {
    /// Fresh anonymous session
    pub fn new(now_ms: i64) -> Self {
        Self {
            v: SESSION_VERSION,
            sid: SessionId::new(),
            created_at_ms: now_ms,
            nonce: None,
            siwe: None,
        }
    }

    pub fn is_expired(&self, now_ms: i64, max_age_ms: i64) -> bool {
        now_ms >= self.created_at_ms.saturating_add(max_age_ms)
    }

    pub fn identity(&self) -> Option<&SiweIdentity> {
        self.siwe.as_ref()
    }

    pub fn address(&self) -> Option<&WalletAddress> {
        self.siwe.as_ref().map(|identity| &identity.address)
    }

    pub fn is_authenticated(&self) -> bool {
        self.siwe.is_some()
    }

    pub fn set_pending_nonce(&mut self, nonce: &Nonce) {
        self.nonce = Some(nonce.to_string());
    }

    /// Anonymous -> Authenticated. The session id is rotated so a cookie
    /// captured before sign-in cannot be upgraded by someone else.
    pub fn authenticate(&mut self, identity: SiweIdentity, now_ms: i64) {
        self.sid = SessionId::new();
        self.created_at_ms = now_ms;
        self.nonce = None;
        self.siwe = Some(identity);
    }

    /// Any state -> Anonymous
    pub fn invalidate(&mut self) {
        self.nonce = None;
        self.siwe = None;
    }
}
