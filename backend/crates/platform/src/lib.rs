//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (CSPRNG, HMAC-SHA256, Keccak-256, Base64)
//! - Cookie header building and parsing

pub mod cookie;
pub mod crypto;
