//! Application Layer
//!
//! Use cases and application services.

pub mod config;
pub mod get_article;
pub mod list_articles;
pub mod manage_article;
pub mod upload_image;

// Re-exports
pub use config::ArticleConfig;
pub use get_article::GetArticleUseCase;
pub use list_articles::ListArticlesUseCase;
pub use manage_article::{
    ArticleInput, CreateArticleUseCase, DeleteArticleUseCase, UpdateArticleUseCase,
};
pub use upload_image::{UploadImageUseCase, UploadInput, UploadOutput};
