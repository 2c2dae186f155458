//! PostgreSQL Repository Implementations

use chrono::{DateTime, Utc};
use kernel::address::WalletAddress;
use kernel::id::{ArticleId, AuthorId};
use sqlx::PgPool;
use uuid::Uuid;

use crate::domain::article::{Article, ArticleStatus, ArticleWithAuthor, Author};
use crate::domain::repository::{ArticleRepository, AuthorRepository};
use crate::error::{ArticleError, ArticleResult};

const SELECT_WITH_AUTHOR: &str = r#"
    SELECT
        a.article_id,
        a.title,
        a.content,
        a.status,
        a.author_id,
        a.created_at,
        a.updated_at,
        a.published_at,
        u.address AS author_address,
        u.created_at AS author_created_at
    FROM articles a
    JOIN authors u ON u.author_id = a.author_id
"#;

/// PostgreSQL-backed article and author repository
#[derive(Clone)]
pub struct PgArticleRepository {
    pool: PgPool,
}

impl PgArticleRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl ArticleRepository for PgArticleRepository {
    async fn list(&self, include_drafts: bool) -> ArticleResult<Vec<ArticleWithAuthor>> {
        let sql = format!(
            "{SELECT_WITH_AUTHOR} WHERE ($1 OR a.status = 'PUBLISHED') ORDER BY a.created_at DESC"
        );

        let rows = sqlx::query_as::<_, ArticleRow>(&sql)
            .bind(include_drafts)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(ArticleRow::into_article).collect()
    }

    async fn find_by_id(&self, id: &ArticleId) -> ArticleResult<Option<ArticleWithAuthor>> {
        let sql = format!("{SELECT_WITH_AUTHOR} WHERE a.article_id = $1");

        let row = sqlx::query_as::<_, ArticleRow>(&sql)
            .bind(id.as_uuid())
            .fetch_optional(&self.pool)
            .await?;

        row.map(ArticleRow::into_article).transpose()
    }

    async fn create(&self, article: &Article) -> ArticleResult<()> {
        sqlx::query(
            r#"
            INSERT INTO articles (
                article_id,
                title,
                content,
                status,
                author_id,
                created_at,
                updated_at,
                published_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(article.id.as_uuid())
        .bind(&article.title)
        .bind(&article.content)
        .bind(article.status.as_str())
        .bind(article.author_id.as_uuid())
        .bind(article.created_at)
        .bind(article.updated_at)
        .bind(article.published_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn update(&self, article: &Article) -> ArticleResult<bool> {
        let updated = sqlx::query(
            r#"
            UPDATE articles SET
                title = $2,
                content = $3,
                status = $4,
                updated_at = $5,
                published_at = $6
            WHERE article_id = $1
            "#,
        )
        .bind(article.id.as_uuid())
        .bind(&article.title)
        .bind(&article.content)
        .bind(article.status.as_str())
        .bind(article.updated_at)
        .bind(article.published_at)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(updated > 0)
    }

    async fn delete(&self, id: &ArticleId) -> ArticleResult<bool> {
        let deleted = sqlx::query("DELETE FROM articles WHERE article_id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?
            .rows_affected();

        Ok(deleted > 0)
    }
}

impl AuthorRepository for PgArticleRepository {
    async fn find_or_create(&self, address: &WalletAddress) -> ArticleResult<Author> {
        // The no-op update makes RETURNING yield the existing row on conflict
        let row = sqlx::query_as::<_, AuthorRow>(
            r#"
            INSERT INTO authors (author_id, address)
            VALUES ($1, $2)
            ON CONFLICT (address) DO UPDATE SET address = EXCLUDED.address
            RETURNING author_id, address, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(address.to_lowercase_hex())
        .fetch_one(&self.pool)
        .await?;

        Ok(row.into_author())
    }
}

#[derive(sqlx::FromRow)]
struct AuthorRow {
    author_id: Uuid,
    address: String,
    created_at: DateTime<Utc>,
}

impl AuthorRow {
    fn into_author(self) -> Author {
        Author {
            id: AuthorId::from_uuid(self.author_id),
            address: self.address,
            created_at: self.created_at,
        }
    }
}

#[derive(sqlx::FromRow)]
struct ArticleRow {
    article_id: Uuid,
    title: String,
    content: String,
    status: String,
    author_id: Uuid,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    published_at: Option<DateTime<Utc>>,
    author_address: String,
    author_created_at: DateTime<Utc>,
}

impl ArticleRow {
    fn into_article(self) -> ArticleResult<ArticleWithAuthor> {
        // The CHECK constraint makes a bad status a storage fault, not input
        let status = ArticleStatus::parse(&self.status)
            .map_err(|_| ArticleError::Internal(format!("invalid stored status '{}'", self.status)))?;
        let author_id = AuthorId::from_uuid(self.author_id);

        Ok(ArticleWithAuthor {
            article: Article {
                id: ArticleId::from_uuid(self.article_id),
                title: self.title,
                content: self.content,
                status,
                author_id,
                created_at: self.created_at,
                updated_at: self.updated_at,
                published_at: self.published_at,
            },
            author: Author {
                id: author_id,
                address: self.author_address,
                created_at: self.author_created_at,
            },
        })
    }
}
