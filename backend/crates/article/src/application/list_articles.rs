//! List Articles Use Case
//!
//! Backs `GET /articles`. Drafts are visible to privileged callers only.

use std::sync::Arc;

use kernel::caller::Caller;

use crate::domain::article::ArticleWithAuthor;
use crate::domain::repository::ArticleRepository;
use crate::error::ArticleResult;

pub struct ListArticlesUseCase<R>
where
    R: ArticleRepository,
{
    repo: Arc<R>,
}

impl<R> ListArticlesUseCase<R>
where
    R: ArticleRepository,
{
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub async fn execute(&self, caller: &Caller) -> ArticleResult<Vec<ArticleWithAuthor>> {
        self.repo.list(caller.is_privileged()).await
    }
}
