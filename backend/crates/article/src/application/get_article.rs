//! Get Article Use Case

use std::sync::Arc;

use kernel::caller::Caller;
use kernel::id::ArticleId;

use crate::domain::article::ArticleWithAuthor;
use crate::domain::repository::ArticleRepository;
use crate::error::{ArticleError, ArticleResult};

pub struct GetArticleUseCase<R>
where
    R: ArticleRepository,
{
    repo: Arc<R>,
}

impl<R> GetArticleUseCase<R>
where
    R: ArticleRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    /// A draft is reported as missing to non-privileged callers.
    pub async fn execute(&self, caller: &Caller, id: &ArticleId) -> ArticleResult<ArticleWithAuthor> {
        let found = self
            .repo
            .find_by_id(id)
            .await?
            .ok_or(ArticleError::NotFound)?;

        if !found.article.is_published() && !caller.is_privileged() {
            return Err(ArticleError::NotFound);
        }
        Ok(found)
    }
}
