//! Server Configuration
//!
//! Read once at startup from the environment (after `.env` is loaded) and
//! split into the per-crate configs.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

use article::ArticleConfig;
use auth::{AllowList, SiweConfig};
use base64::Engine;
use base64::engine::general_purpose;

const DEFAULT_FRONTEND_ORIGINS: &str = "http://localhost:5173,http://localhost:5174,\
http://localhost:5175,http://localhost:5176,http://localhost:5177,http://localhost:5178,\
http://localhost:5179,http://localhost:5180";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Where SIWE nonces live
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NonceStoreKind {
    Memory,
    Postgres,
}

#[derive(Clone)]
pub struct Config {
    pub database_url: String,
    pub port: u16,
    pub session_secrets: Vec<[u8; 32]>,
    pub admins: AllowList,
    pub siwe_domain: Option<String>,
    pub nonce_store: NonceStoreKind,
    pub frontend_origins: Vec<String>,
    pub upload_dir: PathBuf,
    pub public_base_url: String,
    pub max_upload_bytes: usize,
}

impl std::fmt::Debug for Config {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Config")
            .field("database_url", &"[REDACTED]")
            .field("port", &self.port)
            .field("session_secrets", &format!("[{} REDACTED]", self.session_secrets.len()))
            .field("admins", &self.admins.len())
            .field("siwe_domain", &self.siwe_domain)
            .field("nonce_store", &self.nonce_store)
            .field("frontend_origins", &self.frontend_origins)
            .field("upload_dir", &self.upload_dir)
            .field("public_base_url", &self.public_base_url)
            .field("max_upload_bytes", &self.max_upload_bytes)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// Release builds refuse to start without `SESSION_SECRET`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok(), !cfg!(debug_assertions))
    }

    fn from_lookup<F>(lookup: F, require_secret: bool) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url =
            var("DATABASE_URL").ok_or_else(|| ConfigError::MissingVar("DATABASE_URL".to_string()))?;

        let port = parse_or_default(var("PORT"), "PORT", 3000)?;

        let session_secrets = match var("SESSION_SECRET") {
            Some(raw) => parse_secrets(&raw)?,
            None if require_secret => {
                return Err(ConfigError::MissingVar("SESSION_SECRET".to_string()));
            }
            None => {
                tracing::warn!("SESSION_SECRET not set, using a random key (sessions end on restart)");
                vec![platform::crypto::random_key()]
            }
        };

        let admins = AllowList::from_env_list(&var("ADMIN_ADDRESSES").unwrap_or_default())
            .map_err(|e| ConfigError::InvalidValue("ADMIN_ADDRESSES".to_string(), e.to_string()))?;

        let siwe_domain = var("SIWE_DOMAIN").map(|d| d.trim().to_string());

        let nonce_store = match var("NONCE_STORE").as_deref().map(str::trim) {
            None | Some("postgres") => NonceStoreKind::Postgres,
            Some("memory") => NonceStoreKind::Memory,
            Some(other) => {
                return Err(ConfigError::InvalidValue(
                    "NONCE_STORE".to_string(),
                    format!("expected 'memory' or 'postgres', got '{other}'"),
                ));
            }
        };

        let frontend_origins = var("FRONTEND_ORIGINS")
            .unwrap_or_else(|| DEFAULT_FRONTEND_ORIGINS.to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let upload_dir = PathBuf::from(var("UPLOAD_DIR").unwrap_or_else(|| "uploads".to_string()));

        let public_base_url = var("PUBLIC_BASE_URL")
            .unwrap_or_else(|| "http://localhost:3000".to_string())
            .trim_end_matches('/')
            .to_string();

        let max_upload_bytes =
            parse_or_default(var("MAX_UPLOAD_BYTES"), "MAX_UPLOAD_BYTES", 10 * 1024 * 1024)?;

        Ok(Config {
            database_url,
            port,
            session_secrets,
            admins,
            siwe_domain,
            nonce_store,
            frontend_origins,
            upload_dir,
            public_base_url,
            max_upload_bytes,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    pub fn siwe_config(&self) -> SiweConfig {
        SiweConfig {
            session_secrets: self.session_secrets.clone(),
            expected_domain: self.siwe_domain.clone(),
            admins: self.admins.clone(),
            // Secure cookies only reach the browser over https
            cookie_secure: self.public_base_url.starts_with("https://"),
            ..SiweConfig::default()
        }
    }

    pub fn article_config(&self) -> ArticleConfig {
        ArticleConfig {
            upload_dir: self.upload_dir.clone(),
            public_base_url: self.public_base_url.clone(),
            max_upload_bytes: self.max_upload_bytes,
            ..ArticleConfig::default()
        }
    }
}

/// Comma-separated base64 keys, 32 bytes each. The first one signs.
fn parse_secrets(raw: &str) -> Result<Vec<[u8; 32]>, ConfigError> {
    let invalid = |msg: String| ConfigError::InvalidValue("SESSION_SECRET".to_string(), msg);

    let secrets = raw
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|encoded| {
            let bytes = general_purpose::STANDARD
                .decode(encoded)
                .map_err(|e| invalid(format!("invalid base64: {e}")))?;
            <[u8; 32]>::try_from(bytes.as_slice())
                .map_err(|_| invalid(format!("expected 32 bytes, got {}", bytes.len())))
        })
        .collect::<Result<Vec<_>, _>>()?;

    if secrets.is_empty() {
        return Err(invalid("no keys given".to_string()));
    }
    Ok(secrets)
}

fn parse_or_default<T>(value: Option<String>, key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match value {
        Some(val) => val
            .trim()
            .parse::<T>()
            .map_err(|e| ConfigError::InvalidValue(key.to_string(), format!("{e}: {val}"))),
        None => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    // 32 zero bytes and 32 0x01 bytes
    const KEY_A: &str = "AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA=";
    const KEY_B: &str = "AQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQEBAQE=";

    fn load(vars: &[(&str, &str)], require_secret: bool) -> Result<Config, ConfigError> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_lookup(|key| map.get(key).cloned(), require_secret)
    }

    fn minimal() -> Vec<(&'static str, &'static str)> {
        vec![("DATABASE_URL", "postgres://localhost/news")]
    }

    #[test]
    fn test_defaults() {
        let config = load(&minimal(), false).unwrap();

        assert_eq!(config.port, 3000);
        assert_eq!(config.nonce_store, NonceStoreKind::Postgres);
        assert_eq!(config.frontend_origins.len(), 8);
        assert_eq!(config.frontend_origins[0], "http://localhost:5173");
        assert_eq!(config.frontend_origins[7], "http://localhost:5180");
        assert_eq!(config.upload_dir, PathBuf::from("uploads"));
        assert_eq!(config.public_base_url, "http://localhost:3000");
        assert_eq!(config.max_upload_bytes, 10_485_760);
        assert!(config.admins.is_empty());
        assert_eq!(config.session_secrets.len(), 1);
        assert!(!config.siwe_config().cookie_secure);
    }

    #[test]
    fn test_missing_database_url() {
        assert!(matches!(
            load(&[], false),
            Err(ConfigError::MissingVar(ref v)) if v == "DATABASE_URL"
        ));
    }

    #[test]
    fn test_secret_required_in_release() {
        assert!(matches!(
            load(&minimal(), true),
            Err(ConfigError::MissingVar(ref v)) if v == "SESSION_SECRET"
        ));

        let mut vars = minimal();
        vars.push(("SESSION_SECRET", KEY_A));
        assert_eq!(load(&vars, true).unwrap().session_secrets, vec![[0u8; 32]]);
    }

    #[test]
    fn test_secret_rotation_list() {
        let secrets = parse_secrets(&format!("{KEY_B}, {KEY_A}")).unwrap();
        assert_eq!(secrets, vec![[1u8; 32], [0u8; 32]]);
    }

    #[test]
    fn test_invalid_secret() {
        assert!(parse_secrets("not base64!!").is_err());
        assert!(parse_secrets("AAAAAAAAAAAAAAAAAAAAAA==").is_err()); // 16 bytes
    }

    #[test]
    fn test_empty_secret_list_rejected() {
        for raw in ["", ",", " , ", " ,, "] {
            assert!(matches!(
                parse_secrets(raw),
                Err(ConfigError::InvalidValue(ref v, _)) if v == "SESSION_SECRET"
            ));
        }

        // Set but empty is an error even where a random key would be allowed
        for require_secret in [false, true] {
            let mut vars = minimal();
            vars.push(("SESSION_SECRET", ","));
            assert!(matches!(
                load(&vars, require_secret),
                Err(ConfigError::InvalidValue(ref v, _)) if v == "SESSION_SECRET"
            ));
        }
    }

    #[test]
    fn test_admins_and_overrides() {
        let mut vars = minimal();
        vars.extend([
            (
                "ADMIN_ADDRESSES",
                "0x242dfb7849544ee242b2265ca7e585bdec60456b, 0xDBCA8AB9EB325A8F550FFC6E45277081A6C7D681",
            ),
            ("PORT", "8080"),
            ("NONCE_STORE", "memory"),
            ("SIWE_DOMAIN", "news.example"),
            ("PUBLIC_BASE_URL", "https://news.example/"),
            ("FRONTEND_ORIGINS", "https://news.example, "),
            ("MAX_UPLOAD_BYTES", "1024"),
        ]);
        let config = load(&vars, false).unwrap();

        assert_eq!(config.admins.len(), 2);
        assert!(config.admins.is_privileged("0xdbca8ab9eb325a8f550ffc6e45277081a6c7d681"));
        assert_eq!(config.bind_addr().port(), 8080);
        assert_eq!(config.nonce_store, NonceStoreKind::Memory);
        assert_eq!(config.frontend_origins, vec!["https://news.example"]);

        let siwe = config.siwe_config();
        assert_eq!(siwe.expected_domain.as_deref(), Some("news.example"));
        assert!(siwe.cookie_secure);

        let article = config.article_config();
        assert_eq!(article.public_base_url, "https://news.example");
        assert_eq!(article.max_upload_bytes, 1024);
    }

    #[test]
    fn test_invalid_values() {
        for (key, value) in [
            ("ADMIN_ADDRESSES", "0x1234"),
            ("NONCE_STORE", "redis"),
            ("PORT", "http"),
            ("MAX_UPLOAD_BYTES", "-1"),
        ] {
            let mut vars = minimal();
            vars.push((key, value));
            assert!(
                matches!(load(&vars, false), Err(ConfigError::InvalidValue(ref k, _)) if k == key),
                "{key}={value}"
            );
        }
    }
}
