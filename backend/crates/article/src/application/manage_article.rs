//! Manage Article Use Cases
//!
//! Create, update and delete. All three are privileged: the caller gate
//! runs before any input is looked at.

use std::sync::Arc;

use chrono::Utc;
use kernel::caller::Caller;
use kernel::id::ArticleId;
use serde_json::Value;

use crate::domain::article::{Article, ArticleStatus, ArticleTitle, ArticleWithAuthor};
use crate::domain::content::ArticleContent;
use crate::domain::repository::{ArticleRepository, AuthorRepository};
use crate::error::{ArticleError, ArticleResult};

/// Article write input
#[derive(Debug, Clone)]
pub struct ArticleInput {
    pub title: String,
    pub content: Value,
    /// `None` means DRAFT on create and "unchanged" on update
    pub status: Option<String>,
}

struct ValidatedInput {
    title: ArticleTitle,
    content: String,
    status: Option<ArticleStatus>,
}

impl ArticleInput {
    fn validate(self) -> ArticleResult<ValidatedInput> {
        let title = ArticleTitle::new(&self.title)?;
        let content = ArticleContent::from_value(self.content)?.to_json_string()?;
        let status = self.status.as_deref().map(ArticleStatus::parse).transpose()?;
        Ok(ValidatedInput { title, content, status })
    }
}

/// Create article use case
pub struct CreateArticleUseCase<R>
where
    R: ArticleRepository + AuthorRepository,
{
    repo: Arc<R>,
}

impl<R> CreateArticleUseCase<R>
where
    R: ArticleRepository + AuthorRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, caller: &Caller, input: ArticleInput) -> ArticleResult<ArticleWithAuthor> {
        let address = caller.require_privileged()?;
        let input = input.validate()?;

        let author = self.repo.find_or_create(address).await?;
        let article = Article::new(
            input.title,
            input.content,
            input.status.unwrap_or_default(),
            author.id,
            Utc::now(),
        );
        self.repo.create(&article).await?;

        tracing::info!(
            article_id = %article.id,
            author = %address,
            status = article.status.as_str(),
            "Article created"
        );

        Ok(ArticleWithAuthor { article, author })
    }
}

/// Update article use case
pub struct UpdateArticleUseCase<R>
where
    R: ArticleRepository,
{
    repo: Arc<R>,
}

impl<R> UpdateArticleUseCase<R>
where
    R: ArticleRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        caller: &Caller,
        id: &ArticleId,
        input: ArticleInput,
    ) -> ArticleResult<ArticleWithAuthor> {
        caller.require_privileged()?;
        let input = input.validate()?;

        let ArticleWithAuthor { mut article, author } = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(ArticleError::NotFound)?;

        let status = input.status.unwrap_or(article.status);
        article.edit(input.title, input.content, status, Utc::now());

        // Deleted between the read and the write
        if !self.repo.update(&article).await? {
            return Err(ArticleError::NotFound);
        }

        tracing::info!(article_id = %article.id, status = article.status.as_str(), "Article updated");

        Ok(ArticleWithAuthor { article, author })
    }
}

/// Delete article use case
pub struct DeleteArticleUseCase<R>
where
    R: ArticleRepository,
{
    repo: Arc<R>,
}

impl<R> DeleteArticleUseCase<R>
where
    R: ArticleRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, caller: &Caller, id: &ArticleId) -> ArticleResult<()> {
        caller.require_privileged()?;

        if !self.repo.delete(id).await? {
            return Err(ArticleError::NotFound);
        }

        tracing::info!(article_id = %id, "Article deleted");
        Ok(())
    }
}
