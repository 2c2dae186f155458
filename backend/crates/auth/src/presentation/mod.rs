//! Presentation Layer
//!
//! HTTP handlers, DTOs, router, and middleware.

pub mod dto;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use handlers::SiweAppState;
pub use middleware::{CallerState, resolve_caller};
pub use router::{siwe_router, siwe_router_generic, siwe_router_with_state};
