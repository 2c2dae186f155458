//! Article Backend Module
//!
//! Clean Architecture structure:
//! - `domain/` - Article entity, block content, repository traits
//! - `application/` - Use cases and configuration
//! - `infra/` - PostgreSQL repository, on-disk upload store
//! - `presentation/` - HTTP handlers, DTOs, router
//!
//! ## Access Model
//! - Reads are public, but drafts exist only for privileged callers
//! - Writes and uploads require a privileged [`kernel::caller::Caller`]
//!   (401 when anonymous, 403 when not in the allow-list)
//! - The author of a new article is the signed-in caller, upserted by address

pub mod application;
pub mod domain;
pub mod error;
pub mod infra;
pub mod presentation;

// Re-exports for convenience
pub use application::config::ArticleConfig;
pub use error::{ArticleError, ArticleResult};
pub use infra::{DiskUploadStore, PgArticleRepository};
pub use presentation::router::{article_router, article_router_generic};

#[cfg(test)]
mod tests;
