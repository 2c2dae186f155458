//! Data Transfer Objects

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::ArticleInput;

/// Body of `POST /articles` and `PUT /articles/{id}`
#[derive(Debug, Deserialize)]
pub struct ArticleRequest {
    pub title: String,
    /// Block document, or the same document as a JSON string
    pub content: Value,
    #[serde(default)]
    pub status: Option<String>,
}

impl From<ArticleRequest> for ArticleInput {
    fn from(req: ArticleRequest) -> Self {
        ArticleInput {
            title: req.title,
            content: req.content,
            status: req.status,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct UploadedFile {
    pub url: String,
}

/// Editor image-tool response
#[derive(Debug, Serialize)]
pub struct UploadResponse {
    pub success: u8,
    pub file: UploadedFile,
}
