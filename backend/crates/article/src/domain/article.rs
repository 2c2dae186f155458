//! Article Entity and Value Objects

use chrono::{DateTime, Utc};
use kernel::id::{ArticleId, AuthorId};
use serde::{Deserialize, Serialize};

use crate::error::{ArticleError, ArticleResult};

/// Longest title accepted, in characters
pub const MAX_TITLE_CHARS: usize = 200;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ArticleStatus {
    #[default]
    Draft,
    Published,
}

impl ArticleStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ArticleStatus::Draft => "DRAFT",
            ArticleStatus::Published => "PUBLISHED",
        }
    }

    pub fn parse(value: &str) -> ArticleResult<Self> {
        match value {
            "DRAFT" => Ok(ArticleStatus::Draft),
            "PUBLISHED" => Ok(ArticleStatus::Published),
            other => Err(ArticleError::InvalidInput(format!(
                "status must be DRAFT or PUBLISHED, got '{other}'"
            ))),
        }
    }
}

/// Trimmed, 1 to 200 characters
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArticleTitle(String);

impl ArticleTitle {
    pub fn new(value: &str) -> ArticleResult<Self> {
        let trimmed = value.trim();
        let len = trimmed.chars().count();
        if len == 0 {
            return Err(ArticleError::InvalidInput("title is required".to_string()));
        }
        if len > MAX_TITLE_CHARS {
            return Err(ArticleError::InvalidInput(format!(
                "title must be at most {MAX_TITLE_CHARS} characters"
            )));
        }
        Ok(Self(trimmed.to_string()))
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

/// Wallet user that wrote at least one article
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Author {
    pub id: AuthorId,
    /// Lower-case hex
    pub address: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Article {
    pub id: ArticleId,
    pub title: String,
    /// Block document as JSON text
    pub content: String,
    pub status: ArticleStatus,
    pub author_id: AuthorId,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub published_at: Option<DateTime<Utc>>,
}

impl Article {
    pub fn new(
        title: ArticleTitle,
        content: String,
        status: ArticleStatus,
        author_id: AuthorId,
        now: DateTime<Utc>,
    ) -> Self {
        let mut article = Self {
            id: ArticleId::new(),
            title: title.into_inner(),
            content,
            status: ArticleStatus::Draft,
            author_id,
            created_at: now,
            updated_at: now,
            published_at: None,
        };
        article.set_status(status, now);
        article
    }

    pub fn edit(&mut self, title: ArticleTitle, content: String, status: ArticleStatus, now: DateTime<Utc>) {
        self.title = title.into_inner();
        self.content = content;
        self.updated_at = now;
        self.set_status(status, now);
    }

    /// `published_at` is stamped on the first publish and cleared on unpublish.
    fn set_status(&mut self, status: ArticleStatus, now: DateTime<Utc>) {
        self.status = status;
        match status {
            ArticleStatus::Published => {
                self.published_at.get_or_insert(now);
            }
            ArticleStatus::Draft => self.published_at = None,
        }
    }

    pub fn is_published(&self) -> bool {
        self.status == ArticleStatus::Published
    }
}

/// Article as returned by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArticleWithAuthor {
    #[serde(flatten)]
    pub article: Article,
    pub author: Author,
}
