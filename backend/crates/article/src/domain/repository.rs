//! Repository Traits
//!
//! Interfaces for data persistence. Implementation is in infrastructure layer.

use kernel::address::WalletAddress;
use kernel::id::ArticleId;

use crate::domain::article::{Article, ArticleWithAuthor, Author};
use crate::error::ArticleResult;

/// Article repository trait
#[trait_variant::make(ArticleRepository: Send)]
pub trait LocalArticleRepository {
    /// Newest first. Drafts only when `include_drafts`.
    async fn list(&self, include_drafts: bool) -> ArticleResult<Vec<ArticleWithAuthor>>;

    async fn find_by_id(&self, id: &ArticleId) -> ArticleResult<Option<ArticleWithAuthor>>;

    async fn create(&self, article: &Article) -> ArticleResult<()>;

    /// Returns false when the article does not exist
    async fn update(&self, article: &Article) -> ArticleResult<bool>;

    /// Returns false when the article does not exist
    async fn delete(&self, id: &ArticleId) -> ArticleResult<bool>;
}

/// Author repository trait
#[trait_variant::make(AuthorRepository: Send)]
pub trait LocalAuthorRepository {
    /// Upsert by lower-cased address
    async fn find_or_create(&self, address: &WalletAddress) -> ArticleResult<Author>;
}

/// Upload storage trait
#[trait_variant::make(UploadStore: Send)]
pub trait LocalUploadStore {
    /// Store `bytes` under `file_name`, never exposing a partial file
    async fn save(&self, file_name: &str, bytes: &[u8]) -> ArticleResult<()>;
}
