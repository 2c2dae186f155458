//! Session Manager
//!
//! Encodes the session into a tamper-evident cookie value and back.
//!
//! Format: `base64url(json(payload)) "." base64url(HMAC-SHA256(key, first part))`
//!
//! A value that fails the MAC check under every configured key, does not
//! decode, carries an unknown version, or is past its max age is treated as
//! an anonymous session. Callers never see why.

use std::sync::Arc;

use axum::http::HeaderMap;
use platform::cookie::extract_cookie;
use platform::crypto::{from_base64url, hmac_sha256, to_base64url, verify_hmac_sha256};

use crate::application::config::SiweConfig;
use crate::domain::session::{SESSION_VERSION, Session};
use crate::error::{AuthError, AuthResult};

#[derive(Clone)]
pub struct SessionManager {
    config: Arc<SiweConfig>,
}

impl SessionManager {
    pub fn new(config: Arc<SiweConfig>) -> Self {
        Self { config }
    }

    /// Session from the request cookie, or a fresh anonymous one
    pub fn load(&self, headers: &HeaderMap, now_ms: i64) -> Session {
        extract_cookie(headers, &self.config.session_cookie_name)
            .and_then(|value| self.decode(&value, now_ms))
            .unwrap_or_else(|| Session::new(now_ms))
    }

    pub fn decode(&self, value: &str, now_ms: i64) -> Option<Session> {
        let (payload_b64, mac_b64) = value.split_once('.')?;
        let mac = from_base64url(mac_b64).ok()?;

        let authentic = self
            .config
            .session_secrets
            .iter()
            .any(|key| verify_hmac_sha256(key, payload_b64.as_bytes(), &mac));
        if !authentic {
            tracing::debug!("Session cookie failed integrity check");
            return None;
        }

        let payload = from_base64url(payload_b64).ok()?;
        let session: Session = serde_json::from_slice(&payload).ok()?;

        if session.v == 0 || session.v > SESSION_VERSION {
            tracing::debug!(version = session.v, "Unsupported session version");
            return None;
        }
        if session.is_expired(now_ms, self.config.session_max_age_ms()) {
            tracing::debug!(sid = %session.sid, "Session expired");
            return None;
        }

        Some(session)
    }

    pub fn encode(&self, session: &Session) -> AuthResult<String> {
        let key = self
            .config
            .session_secrets
            .first()
            .ok_or_else(|| AuthError::Internal("no session signing key configured".to_string()))?;

        let payload =
            serde_json::to_vec(session).map_err(|e| AuthError::Internal(e.to_string()))?;
        let payload_b64 = to_base64url(&payload);
        let mac = hmac_sha256(key, payload_b64.as_bytes());

        Ok(format!("{}.{}", payload_b64, to_base64url(&mac)))
    }

    /// `Set-Cookie` value carrying the session
    pub fn set_cookie(&self, session: &Session) -> AuthResult<String> {
        Ok(self.config.cookie().build_set_cookie(&self.encode(session)?))
    }

    /// `Set-Cookie` value deleting the session
    pub fn clear_cookie(&self) -> String {
        self.config.cookie().build_delete_cookie()
    }
}
