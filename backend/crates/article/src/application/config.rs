//! Application Configuration
//!
//! Configuration for the article application layer.

use std::path::PathBuf;

/// Image extensions accepted by `POST /upload`
pub const DEFAULT_IMAGE_EXTENSIONS: [&str; 5] = ["png", "jpg", "jpeg", "gif", "webp"];

/// Article application configuration
#[derive(Debug, Clone)]
pub struct ArticleConfig {
    /// Directory uploaded files are written to and served from
    pub upload_dir: PathBuf,
    /// Prefix for returned upload URLs (no trailing slash)
    pub public_base_url: String,
    /// Upload request body limit
    pub max_upload_bytes: usize,
    /// Lower-case extensions without the dot
    pub allowed_extensions: Vec<String>,
}

impl Default for ArticleConfig {
    fn default() -> Self {
        Self {
            upload_dir: PathBuf::from("uploads"),
            public_base_url: "http://localhost:3000".to_string(),
            max_upload_bytes: 10 * 1024 * 1024, // 10 MiB
            allowed_extensions: DEFAULT_IMAGE_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}

impl ArticleConfig {
    /// Create config for development
    pub fn development() -> Self {
        Self::default()
    }

    /// Public URL of an uploaded file
    pub fn upload_url(&self, file_name: &str) -> String {
        format!(
            "{}/uploads/{}",
            self.public_base_url.trim_end_matches('/'),
            file_name
        )
    }

    pub fn is_allowed_extension(&self, ext: &str) -> bool {
        self.allowed_extensions
            .iter()
            .any(|allowed| allowed.eq_ignore_ascii_case(ext))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_upload_url() {
        let config = ArticleConfig {
            public_base_url: "https://news.example/".to_string(),
            ..Default::default()
        };
        assert_eq!(
            config.upload_url("1700000000000.png"),
            "https://news.example/uploads/1700000000000.png"
        );
        assert_eq!(
            ArticleConfig::default().upload_url("a.gif"),
            "http://localhost:3000/uploads/a.gif"
        );
    }

    #[test]
    fn test_extensions() {
        let config = ArticleConfig::default();
        assert!(config.is_allowed_extension("png"));
        assert!(config.is_allowed_extension("JPEG"));
        assert!(!config.is_allowed_extension("exe"));
        assert!(!config.is_allowed_extension(""));
        // Scriptable formats are not served back from our origin
        assert!(!config.is_allowed_extension("svg"));
        assert!(!config.is_allowed_extension("html"));
    }
}
