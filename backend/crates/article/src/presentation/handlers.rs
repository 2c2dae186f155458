//! HTTP Handlers

use std::sync::Arc;

use axum::Json;
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use kernel::caller::Caller;
use kernel::id::ArticleId;

use crate::application::config::ArticleConfig;
use crate::application::{
    CreateArticleUseCase, DeleteArticleUseCase, GetArticleUseCase, ListArticlesUseCase,
    UpdateArticleUseCase, UploadImageUseCase, UploadInput,
};
use crate::domain::repository::{ArticleRepository, AuthorRepository, UploadStore};
use crate::error::{ArticleError, ArticleResult};
use crate::presentation::dto::{ArticleRequest, UploadResponse, UploadedFile};

/// Multipart field carrying the image
pub const UPLOAD_FIELD: &str = "image";

/// Shared state for article handlers
#[derive(Clone)]
pub struct ArticleAppState<R, S>
where
    R: ArticleRepository + AuthorRepository + Clone + Send + Sync + 'static,
    S: UploadStore + Clone + Send + Sync + 'static,
{
    pub repo: Arc<R>,
    pub uploads: Arc<S>,
    pub config: Arc<ArticleConfig>,
}

impl<R, S> ArticleAppState<R, S>
where
    R: ArticleRepository + AuthorRepository + Clone + Send + Sync + 'static,
    S: UploadStore + Clone + Send + Sync + 'static,
{
    pub fn new(repo: R, uploads: S, config: ArticleConfig) -> Self {
        Self {
            repo: Arc::new(repo),
            uploads: Arc::new(uploads),
            config: Arc::new(config),
        }
    }
}

/// Unknown and malformed ids are both "not found".
fn parse_id(raw: &str) -> ArticleResult<ArticleId> {
    raw.parse().map_err(|_| ArticleError::NotFound)
}

fn parse_body(body: Result<Json<ArticleRequest>, JsonRejection>) -> ArticleResult<ArticleRequest> {
    body.map(|Json(req)| req)
        .map_err(|rejection| ArticleError::InvalidInput(rejection.body_text()))
}

// ============================================================================
// Read
// ============================================================================

/// GET /articles
pub async fn list_articles<R, S>(
    State(state): State<ArticleAppState<R, S>>,
    caller: Caller,
) -> ArticleResult<impl IntoResponse>
where
    R: ArticleRepository + AuthorRepository + Clone + Send + Sync + 'static,
    S: UploadStore + Clone + Send + Sync + 'static,
{
    let use_case = ListArticlesUseCase::new(state.repo.clone());
    let articles = use_case.execute(&caller).await?;

    Ok(Json(articles))
}

/// GET /articles/{id}
pub async fn get_article<R, S>(
    State(state): State<ArticleAppState<R, S>>,
    caller: Caller,
    Path(id): Path<String>,
) -> ArticleResult<impl IntoResponse>
where
    R: ArticleRepository + AuthorRepository + Clone + Send + Sync + 'static,
    S: UploadStore + Clone + Send + Sync + 'static,
{
    let id = parse_id(&id)?;

    let use_case = GetArticleUseCase::new(state.repo.clone());
    let article = use_case.execute(&caller, &id).await?;

    Ok(Json(article))
}

// ============================================================================
// Write (admin only)
// ============================================================================
//
// The caller is checked before the body so anonymous requests get 401
// whatever they send.

/// POST /articles
pub async fn create_article<R, S>(
    State(state): State<ArticleAppState<R, S>>,
    caller: Caller,
    body: Result<Json<ArticleRequest>, JsonRejection>,
) -> ArticleResult<impl IntoResponse>
where
    R: ArticleRepository + AuthorRepository + Clone + Send + Sync + 'static,
    S: UploadStore + Clone + Send + Sync + 'static,
{
    caller.require_privileged()?;
    let req = parse_body(body)?;

    let use_case = CreateArticleUseCase::new(state.repo.clone());
    let article = use_case.execute(&caller, req.into()).await?;

    Ok(Json(article))
}

/// PUT /articles/{id}
pub async fn update_article<R, S>(
    State(state): State<ArticleAppState<R, S>>,
    caller: Caller,
    Path(id): Path<String>,
    body: Result<Json<ArticleRequest>, JsonRejection>,
) -> ArticleResult<impl IntoResponse>
where
    R: ArticleRepository + AuthorRepository + Clone + Send + Sync + 'static,
    S: UploadStore + Clone + Send + Sync + 'static,
{
    caller.require_privileged()?;
    let id = parse_id(&id)?;
    let req = parse_body(body)?;

    let use_case = UpdateArticleUseCase::new(state.repo.clone());
    let article = use_case.execute(&caller, &id, req.into()).await?;

    Ok(Json(article))
}

/// DELETE /articles/{id}
pub async fn delete_article<R, S>(
    State(state): State<ArticleAppState<R, S>>,
    caller: Caller,
    Path(id): Path<String>,
) -> ArticleResult<StatusCode>
where
    R: ArticleRepository + AuthorRepository + Clone + Send + Sync + 'static,
    S: UploadStore + Clone + Send + Sync + 'static,
{
    caller.require_privileged()?;
    let id = parse_id(&id)?;

    let use_case = DeleteArticleUseCase::new(state.repo.clone());
    use_case.execute(&caller, &id).await?;

    Ok(StatusCode::NO_CONTENT)
}

// ============================================================================
// Upload (admin only)
// ============================================================================

/// POST /upload
///
/// Multipart form with the image in field `image`. Other fields are ignored.
pub async fn upload_image<R, S>(
    State(state): State<ArticleAppState<R, S>>,
    caller: Caller,
    multipart: Result<Multipart, MultipartRejection>,
) -> ArticleResult<impl IntoResponse>
where
    R: ArticleRepository + AuthorRepository + Clone + Send + Sync + 'static,
    S: UploadStore + Clone + Send + Sync + 'static,
{
    caller.require_privileged()?;

    // Not a multipart request at all: nothing was uploaded
    let file = match multipart {
        Ok(multipart) => read_image_field(multipart).await?,
        Err(_) => None,
    };

    let use_case = UploadImageUseCase::new(state.uploads.clone(), state.config.clone());
    let output = use_case.execute(&caller, file).await?;

    Ok(Json(UploadResponse {
        success: 1,
        file: UploadedFile { url: output.url },
    }))
}

async fn read_image_field(mut multipart: Multipart) -> ArticleResult<Option<UploadInput>> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Ok(None),
            Err(e) => return Err(multipart_error(e)),
        };

        if field.name() != Some(UPLOAD_FIELD) {
            continue;
        }

        let original_name = field.file_name().map(str::to_string);
        let bytes = field.bytes().await.map_err(multipart_error)?;
        if bytes.is_empty() {
            return Ok(None);
        }

        return Ok(Some(UploadInput {
            original_name,
            bytes: bytes.to_vec(),
        }));
    }
}

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ArticleError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ArticleError::PayloadTooLarge
    } else {
        ArticleError::InvalidUpload(err.body_text())
    }
}
