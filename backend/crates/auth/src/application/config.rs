//! Application Configuration
//!
//! Configuration for the SIWE application layer.

use std::time::Duration;

use platform::cookie::CookieConfig;

use crate::domain::allow_list::AllowList;

/// Re-export SameSite from platform
pub use platform::cookie::SameSite;

/// SIWE application configuration
#[derive(Debug, Clone)]
pub struct SiweConfig {
    /// Session cookie name
    pub session_cookie_name: String,
    /// HMAC keys for the session cookie. The first signs, any verifies.
    /// Empty by default: encoding fails until a key is supplied.
    pub session_secrets: Vec<[u8; 32]>,
    /// Session max age (also the cookie Max-Age)
    pub session_max_age: Duration,
    /// Nonce lifetime
    pub nonce_ttl: Duration,
    /// Expected message domain; `None` accepts any
    pub expected_domain: Option<String>,
    /// Admin addresses
    pub admins: AllowList,
    /// Whether to require Secure cookie
    pub cookie_secure: bool,
    /// SameSite policy
    pub cookie_same_site: SameSite,
}

impl Default for SiweConfig {
    fn default() -> Self {
        Self {
            session_cookie_name: "session".to_string(),
            session_secrets: Vec::new(),
            session_max_age: Duration::from_secs(24 * 3600), // 24 hours
            nonce_ttl: Duration::from_secs(5 * 60),          // 5 minutes
            expected_domain: None,
            admins: AllowList::default(),
            cookie_secure: true,
            cookie_same_site: SameSite::Lax,
        }
    }
}

impl SiweConfig {
    /// Create config with a random session secret (for development)
    pub fn with_random_secret() -> Self {
        Self {
            session_secrets: vec![platform::crypto::random_key()],
            ..Default::default()
        }
    }

    /// Create config for development (insecure cookie)
    pub fn development() -> Self {
        Self {
            cookie_secure: false,
            ..Self::with_random_secret()
        }
    }

    pub fn session_max_age_ms(&self) -> i64 {
        self.session_max_age.as_millis() as i64
    }

    pub fn nonce_ttl_ms(&self) -> i64 {
        self.nonce_ttl.as_millis() as i64
    }

    pub fn cookie(&self) -> CookieConfig {
        CookieConfig {
            name: self.session_cookie_name.clone(),
            secure: self.cookie_secure,
            http_only: true,
            same_site: self.cookie_same_site,
            path: "/".to_string(),
            max_age_secs: Some(self.session_max_age.as_secs()),
        }
    }
}
