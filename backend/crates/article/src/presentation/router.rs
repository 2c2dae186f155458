//! Article Router

use axum::{
    Router,
    extract::{DefaultBodyLimit, Request},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use tower_http::services::ServeDir;

use crate::application::config::ArticleConfig;
use crate::domain::repository::{ArticleRepository, AuthorRepository, UploadStore};
use crate::infra::{DiskUploadStore, PgArticleRepository};
use crate::presentation::handlers::{self, ArticleAppState};

/// Create the article router with PostgreSQL and on-disk uploads
pub fn article_router(
    repo: PgArticleRepository,
    uploads: DiskUploadStore,
    config: ArticleConfig,
) -> Router {
    article_router_generic(repo, uploads, config)
}

/// Create a generic article router for any repository implementation
///
/// Uploaded files are served from `config.upload_dir` at `/uploads`.
/// Dotfiles, including in-flight upload temp files, are never served.
pub fn article_router_generic<R, S>(repo: R, uploads: S, config: ArticleConfig) -> Router
where
    R: ArticleRepository + AuthorRepository + Clone + Send + Sync + 'static,
    S: UploadStore + Clone + Send + Sync + 'static,
{
    let body_limit = config.max_upload_bytes;
    let static_files: Router = Router::new()
        .fallback_service(ServeDir::new(&config.upload_dir))
        .layer(middleware::from_fn(hide_dotfiles));
    let state = ArticleAppState::new(repo, uploads, config);

    Router::new()
        .route(
            "/articles",
            get(handlers::list_articles::<R, S>).post(handlers::create_article::<R, S>),
        )
        .route(
            "/articles/{id}",
            get(handlers::get_article::<R, S>)
                .put(handlers::update_article::<R, S>)
                .delete(handlers::delete_article::<R, S>),
        )
        .route(
            "/upload",
            post(handlers::upload_image::<R, S>).layer(DefaultBodyLimit::max(body_limit)),
        )
        .nest_service("/uploads", static_files)
        .with_state(state)
}

/// 404 for any path segment that is, or decodes to, a dotfile
async fn hide_dotfiles(request: Request, next: Next) -> Response {
    let hidden = request.uri().path().split('/').any(|segment| {
        segment.starts_with('.') || segment.get(..3).is_some_and(|p| p.eq_ignore_ascii_case("%2e"))
    });
    if hidden {
        tracing::debug!(path = %request.uri().path(), "Refusing to serve dotfile");
        return StatusCode::NOT_FOUND.into_response();
    }
    next.run(request).await
}
