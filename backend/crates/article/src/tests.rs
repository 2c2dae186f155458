//! HTTP-level tests for articles and uploads
//!
//! Routers run in-process over in-memory repositories. The caller is
//! injected as a request extension, standing in for the auth middleware.

#[cfg(test)]
mod support {
    use std::collections::HashMap;
    use std::sync::{Arc, Mutex};

    use axum::body::{Body, to_bytes};
    use axum::http::{Request, header};
    use axum::response::Response;
    use axum::{Extension, Router};
    use chrono::Utc;
    use kernel::address::WalletAddress;
    use kernel::caller::Caller;
    use kernel::id::{ArticleId, AuthorId};
    use serde_json::Value;
    use tower::ServiceExt;

    use crate::application::config::ArticleConfig;
    use crate::domain::article::{Article, ArticleWithAuthor, Author};
    use crate::domain::repository::{ArticleRepository, AuthorRepository, UploadStore};
    use crate::error::ArticleResult;
    use crate::presentation::router::article_router_generic;

    pub const ADMIN: &str = "0x242dfb7849544ee242b2265ca7e585bdec60456b";
    pub const USER: &str = "0xdbca8ab9eb325a8f550ffc6e45277081a6c7d681";

    #[derive(Clone, Default)]
    pub struct MemoryArticles {
        articles: Arc<Mutex<Vec<Article>>>,
        authors: Arc<Mutex<HashMap<String, Author>>>,
    }

    impl MemoryArticles {
        fn with_author(&self, article: &Article) -> ArticleWithAuthor {
            let authors = self.authors.lock().unwrap();
            let author = authors
                .values()
                .find(|a| a.id == article.author_id)
                .cloned()
                .unwrap();
            ArticleWithAuthor {
                article: article.clone(),
                author,
            }
        }

        pub fn author_count(&self) -> usize {
            self.authors.lock().unwrap().len()
        }
    }

    impl ArticleRepository for MemoryArticles {
        async fn list(&self, include_drafts: bool) -> ArticleResult<Vec<ArticleWithAuthor>> {
            let mut visible: Vec<Article> = self
                .articles
                .lock()
                .unwrap()
                .iter()
                .rev()
                .filter(|a| include_drafts || a.is_published())
                .cloned()
                .collect();
            visible.sort_by(|a, b| b.created_at.cmp(&a.created_at));
            Ok(visible.iter().map(|a| self.with_author(a)).collect())
        }

        async fn find_by_id(&self, id: &ArticleId) -> ArticleResult<Option<ArticleWithAuthor>> {
            let found = self
                .articles
                .lock()
                .unwrap()
                .iter()
                .find(|a| a.id == *id)
                .cloned();
            Ok(found.map(|a| self.with_author(&a)))
        }

        async fn create(&self, article: &Article) -> ArticleResult<()> {
            self.articles.lock().unwrap().push(article.clone());
            Ok(())
        }

        async fn update(&self, article: &Article) -> ArticleResult<bool> {
            let mut articles = self.articles.lock().unwrap();
            match articles.iter_mut().find(|a| a.id == article.id) {
                Some(existing) => {
                    *existing = article.clone();
                    Ok(true)
                }
                None => Ok(false),
            }
        }

        async fn delete(&self, id: &ArticleId) -> ArticleResult<bool> {
            let mut articles = self.articles.lock().unwrap();
            let before = articles.len();
            articles.retain(|a| a.id != *id);
            Ok(articles.len() < before)
        }
    }

    impl AuthorRepository for MemoryArticles {
        async fn find_or_create(&self, address: &WalletAddress) -> ArticleResult<Author> {
            let key = address.to_lowercase_hex();
            let mut authors = self.authors.lock().unwrap();
            let author = authors.entry(key.clone()).or_insert_with(|| Author {
                id: AuthorId::new(),
                address: key,
                created_at: Utc::now(),
            });
            Ok(author.clone())
        }
    }

    #[derive(Clone, Default)]
    pub struct MemoryUploads {
        pub files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl UploadStore for MemoryUploads {
        async fn save(&self, file_name: &str, bytes: &[u8]) -> ArticleResult<()> {
            self.files
                .lock()
                .unwrap()
                .insert(file_name.to_string(), bytes.to_vec());
            Ok(())
        }
    }

    pub fn admin() -> Caller {
        Caller::authenticated(WalletAddress::parse(ADMIN).unwrap(), true)
    }

    pub fn user() -> Caller {
        Caller::authenticated(WalletAddress::parse(USER).unwrap(), false)
    }

    pub struct TestApp {
        pub repo: MemoryArticles,
        pub uploads: MemoryUploads,
        pub config: ArticleConfig,
    }

    impl TestApp {
        pub fn new() -> Self {
            Self {
                repo: MemoryArticles::default(),
                uploads: MemoryUploads::default(),
                config: ArticleConfig::development(),
            }
        }

        fn router(&self, caller: Option<Caller>) -> Router {
            let router = article_router_generic(
                self.repo.clone(),
                self.uploads.clone(),
                self.config.clone(),
            );
            match caller {
                Some(caller) => router.layer(Extension(caller)),
                None => router,
            }
        }

        pub async fn send(&self, caller: Option<Caller>, request: Request<Body>) -> Response {
            self.router(caller).oneshot(request).await.unwrap()
        }

        pub async fn json(
            &self,
            caller: Option<Caller>,
            method: &str,
            uri: &str,
            body: Value,
        ) -> Response {
            let request = Request::builder()
                .method(method)
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap();
            self.send(caller, request).await
        }

        pub async fn empty(&self, caller: Option<Caller>, method: &str, uri: &str) -> Response {
            let request = Request::builder()
                .method(method)
                .uri(uri)
                .body(Body::empty())
                .unwrap();
            self.send(caller, request).await
        }
    }

    pub async fn body_json(response: Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }
}

#[cfg(test)]
mod article_tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header};
    use serde_json::{Value, json};

    use super::support::*;

    fn doc(text: &str) -> Value {
        json!({ "blocks": [{ "type": "paragraph", "data": { "text": text } }] })
    }

    async fn create(app: &TestApp, title: &str, status: &str) -> Value {
        let response = app
            .json(
                Some(admin()),
                "POST",
                "/articles",
                json!({ "title": title, "content": doc(title), "status": status }),
            )
            .await;
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await
    }

    #[tokio::test]
    async fn test_create_requires_session() {
        let app = TestApp::new();
        let response = app
            .json(None, "POST", "/articles", json!({ "title": "A", "content": "x" }))
            .await;

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(body_json(response).await["message"], "Unauthorized: No session");
        assert_eq!(app.repo.author_count(), 0);
    }

    #[tokio::test]
    async fn test_create_requires_admin() {
        let app = TestApp::new();
        let response = app
            .json(Some(user()), "POST", "/articles", json!({ "title": "A", "content": "x" }))
            .await;

        assert_eq!(response.status(), StatusCode::FORBIDDEN);
        assert_eq!(body_json(response).await["message"], "Forbidden: Admins only");
    }

    #[tokio::test]
    async fn test_gate_runs_before_validation() {
        let app = TestApp::new();
        let request = Request::builder()
            .method("POST")
            .uri("/articles")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("not json"))
            .unwrap();

        let response = app.send(None, request).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_admin_creates_article() {
        let app = TestApp::new();
        let created = create(&app, "First post", "DRAFT").await;

        assert_eq!(created["title"], "First post");
        assert_eq!(created["status"], "DRAFT");
        assert!(created["publishedAt"].is_null());
        assert_eq!(created["author"]["address"], ADMIN);
        assert_eq!(created["authorId"], created["author"]["id"]);

        // Stored as JSON text the editor can parse back
        let content: Value = serde_json::from_str(created["content"].as_str().unwrap()).unwrap();
        assert_eq!(content["blocks"][0]["data"]["text"], "First post");
    }

    #[tokio::test]
    async fn test_author_is_reused() {
        let app = TestApp::new();
        let a = create(&app, "A", "DRAFT").await;
        let b = create(&app, "B", "PUBLISHED").await;

        assert_eq!(a["author"]["id"], b["author"]["id"]);
        assert_eq!(app.repo.author_count(), 1);
    }

    #[tokio::test]
    async fn test_plain_text_and_stringified_content() {
        let app = TestApp::new();

        let response = app
            .json(
                Some(admin()),
                "POST",
                "/articles",
                json!({ "title": "Plain", "content": "just text" }),
            )
            .await;
        let created = body_json(response).await;
        let content: Value = serde_json::from_str(created["content"].as_str().unwrap()).unwrap();
        assert_eq!(content["blocks"][0]["type"], "paragraph");
        assert_eq!(content["blocks"][0]["data"]["text"], "just text");
        assert_eq!(created["status"], "DRAFT");

        let stringified = doc("from editor").to_string();
        let response = app
            .json(
                Some(admin()),
                "POST",
                "/articles",
                json!({ "title": "Editor", "content": stringified, "status": "PUBLISHED" }),
            )
            .await;
        let created = body_json(response).await;
        let stored: Value = serde_json::from_str(created["content"].as_str().unwrap()).unwrap();
        assert_eq!(stored, doc("from editor"));
    }

    #[tokio::test]
    async fn test_validation_errors() {
        let app = TestApp::new();
        let bodies = [
            json!({ "title": "   ", "content": "x" }),
            json!({ "title": "a".repeat(201), "content": "x" }),
            json!({ "title": "A", "content": "x", "status": "ARCHIVED" }),
            json!({ "title": "A", "content": 7 }),
            json!({ "content": "x" }),
        ];

        for body in bodies {
            let response = app.json(Some(admin()), "POST", "/articles", body.clone()).await;
            assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY, "{body}");
        }
        assert_eq!(app.repo.author_count(), 0);
    }

    #[tokio::test]
    async fn test_drafts_hidden_from_public() {
        let app = TestApp::new();
        create(&app, "Draft", "DRAFT").await;
        create(&app, "Live", "PUBLISHED").await;

        for caller in [None, Some(user())] {
            let list = body_json(app.empty(caller, "GET", "/articles").await).await;
            let titles: Vec<&str> = list
                .as_array()
                .unwrap()
                .iter()
                .map(|a| a["title"].as_str().unwrap())
                .collect();
            assert_eq!(titles, ["Live"]);
        }

        let list = body_json(app.empty(Some(admin()), "GET", "/articles").await).await;
        let titles: Vec<&str> = list
            .as_array()
            .unwrap()
            .iter()
            .map(|a| a["title"].as_str().unwrap())
            .collect();
        assert_eq!(titles, ["Live", "Draft"]);
    }

    #[tokio::test]
    async fn test_get_article() {
        let app = TestApp::new();
        let draft = create(&app, "Draft", "DRAFT").await;
        let live = create(&app, "Live", "PUBLISHED").await;
        let draft_uri = format!("/articles/{}", draft["id"].as_str().unwrap());
        let live_uri = format!("/articles/{}", live["id"].as_str().unwrap());

        let response = app.empty(None, "GET", &live_uri).await;
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["author"]["address"], ADMIN);

        assert_eq!(app.empty(None, "GET", &draft_uri).await.status(), StatusCode::NOT_FOUND);
        assert_eq!(app.empty(Some(user()), "GET", &draft_uri).await.status(), StatusCode::NOT_FOUND);
        assert_eq!(app.empty(Some(admin()), "GET", &draft_uri).await.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_unknown_and_malformed_ids() {
        let app = TestApp::new();
        for uri in [
            "/articles/9a1bb3ee-0c8f-4b8a-9d55-2fbd1a2e1a10",
            "/articles/not-an-id",
        ] {
            assert_eq!(app.empty(Some(admin()), "GET", uri).await.status(), StatusCode::NOT_FOUND);
            assert_eq!(
                app.json(Some(admin()), "PUT", uri, json!({ "title": "A", "content": "x" }))
                    .await
                    .status(),
                StatusCode::NOT_FOUND
            );
            assert_eq!(app.empty(Some(admin()), "DELETE", uri).await.status(), StatusCode::NOT_FOUND);
        }
    }

    #[tokio::test]
    async fn test_update_tracks_published_at() {
        let app = TestApp::new();
        let created = create(&app, "Draft", "DRAFT").await;
        let uri = format!("/articles/{}", created["id"].as_str().unwrap());

        let published = body_json(
            app.json(
                Some(admin()),
                "PUT",
                &uri,
                json!({ "title": "Now live", "content": doc("body"), "status": "PUBLISHED" }),
            )
            .await,
        )
        .await;
        assert_eq!(published["title"], "Now live");
        assert_eq!(published["status"], "PUBLISHED");
        assert!(published["publishedAt"].is_string());

        // Omitted status keeps the current one, and the first publish time
        let edited = body_json(
            app.json(Some(admin()), "PUT", &uri, json!({ "title": "Edited", "content": "x" }))
                .await,
        )
        .await;
        assert_eq!(edited["status"], "PUBLISHED");
        assert_eq!(edited["publishedAt"], published["publishedAt"]);

        let unpublished = body_json(
            app.json(
                Some(admin()),
                "PUT",
                &uri,
                json!({ "title": "Edited", "content": "x", "status": "DRAFT" }),
            )
            .await,
        )
        .await;
        assert!(unpublished["publishedAt"].is_null());
    }

    #[tokio::test]
    async fn test_update_and_delete_require_admin() {
        let app = TestApp::new();
        let created = create(&app, "A", "PUBLISHED").await;
        let uri = format!("/articles/{}", created["id"].as_str().unwrap());
        let body = json!({ "title": "Hijacked", "content": "x" });

        assert_eq!(app.json(None, "PUT", &uri, body.clone()).await.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(app.json(Some(user()), "PUT", &uri, body).await.status(), StatusCode::FORBIDDEN);
        assert_eq!(app.empty(None, "DELETE", &uri).await.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(app.empty(Some(user()), "DELETE", &uri).await.status(), StatusCode::FORBIDDEN);

        let still = body_json(app.empty(None, "GET", &uri).await).await;
        assert_eq!(still["title"], "A");
    }

    #[tokio::test]
    async fn test_delete_article() {
        let app = TestApp::new();
        let created = create(&app, "Gone soon", "PUBLISHED").await;
        let uri = format!("/articles/{}", created["id"].as_str().unwrap());

        assert_eq!(app.empty(Some(admin()), "DELETE", &uri).await.status(), StatusCode::NO_CONTENT);
        assert_eq!(app.empty(None, "GET", &uri).await.status(), StatusCode::NOT_FOUND);
        assert_eq!(app.empty(Some(admin()), "DELETE", &uri).await.status(), StatusCode::NOT_FOUND);
    }
}

#[cfg(test)]
mod upload_tests {
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode, header};
    use axum::response::Response;
    use axum::{Extension, Router};
    use serde_json::json;
    use tempfile::TempDir;
    use tower::ServiceExt;

    use super::support::*;
    use crate::application::config::ArticleConfig;
    use crate::infra::DiskUploadStore;
    use crate::presentation::router::article_router_generic;

    const BOUNDARY: &str = "X-DECENTRANEWS-BOUNDARY";

    fn multipart_body(field: &str, file_name: &str, bytes: &[u8]) -> Vec<u8> {
        let mut body = format!(
            "--{BOUNDARY}\r\n\
             Content-Disposition: form-data; name=\"{field}\"; filename=\"{file_name}\"\r\n\
             Content-Type: application/octet-stream\r\n\r\n"
        )
        .into_bytes();
        body.extend_from_slice(bytes);
        body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    async fn upload(app: &TestApp, caller: Option<kernel::caller::Caller>, body: Vec<u8>) -> Response {
        let request = Request::builder()
            .method("POST")
            .uri("/upload")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap();
        app.send(caller, request).await
    }

    #[tokio::test]
    async fn test_admin_upload() {
        let app = TestApp::new();
        let response = upload(&app, Some(admin()), multipart_body("image", "Photo.PNG", b"\x89PNG data")).await;

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], 1);

        let url = body["file"]["url"].as_str().unwrap();
        let name = url.strip_prefix("http://localhost:3000/uploads/").unwrap();
        let (millis, suffix) = name.strip_suffix(".png").unwrap().split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok(), "{name}");
        assert_eq!(suffix.len(), 8, "{name}");
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()), "{name}");

        let files = app.uploads.files.lock().unwrap();
        assert_eq!(files.get(name).map(Vec::as_slice), Some(&b"\x89PNG data"[..]));
    }

    #[tokio::test]
    async fn test_upload_requires_admin() {
        let app = TestApp::new();
        let body = || multipart_body("image", "a.png", b"data");

        assert_eq!(upload(&app, None, body()).await.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(upload(&app, Some(user()), body()).await.status(), StatusCode::FORBIDDEN);
        assert!(app.uploads.files.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_file() {
        let app = TestApp::new();
        let response = upload(&app, Some(admin()), multipart_body("attachment", "a.png", b"data")).await;

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({ "success": 0, "file": null }));

        // Not multipart at all
        let response = app.empty(Some(admin()), "POST", "/upload").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(body_json(response).await, json!({ "success": 0, "file": null }));
    }

    #[tokio::test]
    async fn test_rejects_non_image_extension() {
        let app = TestApp::new();
        for name in ["script.exe", "noext", "vector.svg", "page.html"] {
            let response = upload(&app, Some(admin()), multipart_body("image", name, b"data")).await;
            assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{name}");
        }
        assert!(app.uploads.files.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_upload_size_limit() {
        let mut app = TestApp::new();
        app.config.max_upload_bytes = 64;

        let response = upload(&app, Some(admin()), multipart_body("image", "big.png", &[0u8; 1024])).await;
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        assert!(app.uploads.files.lock().unwrap().is_empty());
    }

    /// Router over a real upload directory, returned with the directory guard
    fn disk_app() -> (Router, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let config = ArticleConfig {
            upload_dir: temp_dir.path().to_path_buf(),
            ..ArticleConfig::development()
        };
        let router = article_router_generic(
            MemoryArticles::default(),
            DiskUploadStore::new(temp_dir.path()),
            config,
        )
        .layer(Extension(admin()));
        (router, temp_dir)
    }

    async fn fetch(router: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
        let response = router
            .clone()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn test_back_to_back_uploads_serve_their_own_bytes() {
        let (router, _dir) = disk_app();

        let mut paths = Vec::new();
        for bytes in [&b"first image"[..], &b"second image"[..]] {
            let request = Request::builder()
                .method("POST")
                .uri("/upload")
                .header(
                    header::CONTENT_TYPE,
                    format!("multipart/form-data; boundary={BOUNDARY}"),
                )
                .body(Body::from(multipart_body("image", "same.png", bytes)))
                .unwrap();
            let response = router.clone().oneshot(request).await.unwrap();
            assert_eq!(response.status(), StatusCode::OK);
            let url = body_json(response).await["file"]["url"].as_str().unwrap().to_string();
            paths.push(url.strip_prefix("http://localhost:3000").unwrap().to_string());
        }

        assert_ne!(paths[0], paths[1]);
        assert_eq!(fetch(&router, &paths[0]).await, (StatusCode::OK, b"first image".to_vec()));
        assert_eq!(fetch(&router, &paths[1]).await, (StatusCode::OK, b"second image".to_vec()));
    }

    #[tokio::test]
    async fn test_dotfiles_are_not_served() {
        let (router, dir) = disk_app();
        std::fs::write(dir.path().join("a.png"), b"visible").unwrap();
        std::fs::write(dir.path().join(".a.png.Ab12Cd34.tmp"), b"partial").unwrap();
        std::fs::write(dir.path().join(".env"), b"SECRET=1").unwrap();

        assert_eq!(fetch(&router, "/uploads/a.png").await, (StatusCode::OK, b"visible".to_vec()));
        for uri in [
            "/uploads/.a.png.Ab12Cd34.tmp",
            "/uploads/.env",
            "/uploads/%2eenv",
            "/uploads/%2Eenv",
        ] {
            assert_eq!(fetch(&router, uri).await.0, StatusCode::NOT_FOUND, "{uri}");
        }
    }
}
