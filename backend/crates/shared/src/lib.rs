//! Shared Kernel - Domain-crossing minimal core
//!
//! This crate contains the "smallest core" of domain vocabulary:
//! - Common error types and result aliases
//! - Wallet addresses and the request caller identity
//! - Common primitive value objects (ID types, etc.)
//!
//! **Design Principle**: Only include things that are "hard to change"
//! and have consistent meaning across all domains.

pub mod address;
pub mod caller;
pub mod error {
    pub mod app_error;
    pub mod kind;
    pub mod response;
}
pub mod id;

pub use address::WalletAddress;
pub use caller::Caller;
