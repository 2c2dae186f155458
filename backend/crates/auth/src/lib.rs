//! Auth (Sign-In with Ethereum) Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - SIWE message, nonce, session, allow-list, repository traits
//! - `application/` - Use cases and the session cookie codec
//! - `infra/` - Nonce store implementations (memory, PostgreSQL)
//! - `presentation/` - HTTP handlers, DTOs, router, caller middleware
//!
//! ## Flow
//! 1. `GET /nonce` issues a nonce bound to the browser session
//! 2. The wallet signs an EIP-4361 message embedding that nonce
//! 3. `POST /verify` consumes the nonce, recovers the signer and binds it
//!    to the session
//! 4. `GET /me` reports the bound address and whether it is an admin
//!
//! ## Security Model
//! - Nonces are single-use; the server-side record is authoritative, so a
//!   replayed cookie still listing an old nonce is rejected
//! - Sessions are client-held, HMAC-SHA256 signed, versioned, and expire
//!   after 24 hours
//! - Any failed verify signs the session out
//! - Admin rights come only from the static allow-list

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::SiweConfig;
pub use domain::allow_list::AllowList;
pub use error::{AuthError, AuthResult};
pub use infra::{memory::MemoryNonceStore, postgres::PgNonceStore};
pub use presentation::middleware::{CallerState, resolve_caller};
pub use presentation::router::{siwe_router, siwe_router_generic};

// Re-export kernel error types for unified error handling
pub use kernel::error::{
    app_error::{AppError, AppResult},
    kind::ErrorKind,
};
