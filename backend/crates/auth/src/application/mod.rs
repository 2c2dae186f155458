//! Application Layer
//!
//! Use cases and application services.

pub mod check_session;
pub mod config;
pub mod issue_nonce;
pub mod session_manager;
pub mod sign_out;
pub mod verify_message;

// Re-exports
pub use check_session::{CheckSessionUseCase, SessionInfoOutput};
pub use config::SiweConfig;
pub use issue_nonce::IssueNonceUseCase;
pub use session_manager::SessionManager;
pub use sign_out::SignOutUseCase;
pub use verify_message::{VerifyInput, VerifyMessageUseCase};
