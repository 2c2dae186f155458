//! Domain Layer
//!
//! Contains entities, value objects, and repository traits.

pub mod article;
pub mod content;
pub mod repository;

// Re-exports
pub use article::{Article, ArticleStatus, ArticleTitle, ArticleWithAuthor, Author};
pub use content::{ArticleContent, Block, BlockDocument};
pub use repository::{ArticleRepository, AuthorRepository, UploadStore};
