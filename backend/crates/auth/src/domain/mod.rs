//! Domain Layer
//!
//! SIWE message grammar, nonce and session state, the admin allow-list,
//! signature recovery, and the nonce store trait.

pub mod allow_list;
pub mod message;
pub mod nonce;
pub mod repository;
pub mod services;
pub mod session;

// Re-exports
pub use allow_list::AllowList;
pub use message::SiweMessage;
pub use nonce::{Nonce, NonceRecord};
pub use repository::NonceStore;
pub use services::{Eip191Verifier, MessageVerifier, SignatureVerifier};
pub use session::{Session, SiweIdentity};
