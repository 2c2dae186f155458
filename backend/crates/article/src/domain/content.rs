//! Block Content
//!
//! Article bodies are block documents as produced by the web editor:
//! `{"time"?, "blocks": [{"id"?, "type", "data"}], "version"?}`.
//! They are stored and returned as JSON text.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::error::{ArticleError, ArticleResult};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub data: Value,
}

impl Block {
    pub fn paragraph(text: &str) -> Self {
        Self {
            id: None,
            kind: "paragraph".to_string(),
            data: json!({ "text": text }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BlockDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<i64>,
    pub blocks: Vec<Block>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// Normalized article body
#[derive(Debug, Clone, PartialEq)]
pub struct ArticleContent(BlockDocument);

impl ArticleContent {
    /// Accepts a block document, a JSON string holding one, or plain text.
    /// Plain text becomes a single paragraph.
    pub fn from_value(value: Value) -> ArticleResult<Self> {
        match value {
            Value::String(text) => Ok(Self::from_text(&text)),
            Value::Object(_) => serde_json::from_value(value)
                .map(Self)
                .map_err(|e| ArticleError::InvalidInput(format!("Invalid content: {e}"))),
            _ => Err(ArticleError::InvalidInput(
                "content must be a block document or a string".to_string(),
            )),
        }
    }

    fn from_text(text: &str) -> Self {
        match serde_json::from_str::<BlockDocument>(text) {
            Ok(document) => Self(document),
            Err(_) => Self(BlockDocument {
                time: None,
                blocks: vec![Block::paragraph(text)],
                version: None,
            }),
        }
    }

    pub fn document(&self) -> &BlockDocument {
        &self.0
    }

    pub fn to_json_string(&self) -> ArticleResult<String> {
        serde_json::to_string(&self.0).map_err(|e| ArticleError::Internal(e.to_string()))
    }
}
