//! Infrastructure Layer
//!
//! Nonce store implementations.

pub mod memory;
pub mod postgres;

pub use memory::MemoryNonceStore;
pub use postgres::PgNonceStore;
