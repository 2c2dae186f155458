//! Upload Image Use Case
//!
//! Backs `POST /upload`. Files are named `<unix-ms>-<suffix>.<ext>` with an
//! 8 character random suffix, so uploads in the same millisecond never share
//! a name. The client supplied name only contributes its extension.

use std::path::Path;
use std::sync::Arc;

use chrono::Utc;
use kernel::caller::Caller;
use platform::crypto::random_alphanumeric;

use crate::application::config::ArticleConfig;
use crate::domain::repository::UploadStore;
use crate::error::{ArticleError, ArticleResult};

const UPLOAD_SUFFIX_LEN: usize = 8;

/// Received upload
#[derive(Debug, Clone)]
pub struct UploadInput {
    pub original_name: Option<String>,
    pub bytes: Vec<u8>,
}

/// Upload output
#[derive(Debug, Clone)]
pub struct UploadOutput {
    pub file_name: String,
    pub url: String,
}

pub struct UploadImageUseCase<S>
where
    S: UploadStore,
{
    store: Arc<S>,
    config: Arc<ArticleConfig>,
}

impl<S> UploadImageUseCase<S>
where
    S: UploadStore,
{
    pub fn new(store: Arc<S>, config: Arc<ArticleConfig>) -> Self {
        Self { store, config }
    }

    pub async fn execute(&self, caller: &Caller, file: Option<UploadInput>) -> ArticleResult<UploadOutput> {
        caller.require_privileged()?;
        let file = file.ok_or(ArticleError::MissingFile)?;

        let ext = file
            .original_name
            .as_deref()
            .and_then(|name| Path::new(name).extension())
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.to_ascii_lowercase())
            .ok_or_else(|| ArticleError::InvalidUpload("file name has no extension".to_string()))?;

        if !self.config.is_allowed_extension(&ext) {
            return Err(ArticleError::InvalidUpload(format!(
                "extension '.{ext}' is not an accepted image type"
            )));
        }

        let file_name = format!(
            "{}-{}.{}",
            Utc::now().timestamp_millis(),
            random_alphanumeric(UPLOAD_SUFFIX_LEN),
            ext
        );
        self.store.save(&file_name, &file.bytes).await?;

        tracing::info!(file = %file_name, bytes = file.bytes.len(), "Image uploaded");

        Ok(UploadOutput {
            url: self.config.upload_url(&file_name),
            file_name,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::DiskUploadStore;
    use kernel::address::WalletAddress;
    use tempfile::TempDir;

    fn admin() -> Caller {
        Caller::authenticated(
            WalletAddress::parse("0x242dfb7849544ee242b2265ca7e585bdec60456b").unwrap(),
            true,
        )
    }

    fn input(name: &str, bytes: &[u8]) -> Option<UploadInput> {
        Some(UploadInput {
            original_name: Some(name.to_string()),
            bytes: bytes.to_vec(),
        })
    }

    #[tokio::test]
    async fn test_back_to_back_uploads_keep_their_bytes() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(DiskUploadStore::new(temp_dir.path()));
        let use_case = UploadImageUseCase::new(store, Arc::new(ArticleConfig::default()));
        let admin = admin();

        let first = use_case.execute(&admin, input("a.png", b"first")).await.unwrap();
        let second = use_case.execute(&admin, input("b.png", b"second")).await.unwrap();

        assert_ne!(first.file_name, second.file_name);
        assert_ne!(first.url, second.url);
        assert_eq!(std::fs::read(temp_dir.path().join(&first.file_name)).unwrap(), b"first");
        assert_eq!(std::fs::read(temp_dir.path().join(&second.file_name)).unwrap(), b"second");
    }

    #[tokio::test]
    async fn test_file_name_shape() {
        let temp_dir = TempDir::new().unwrap();
        let store = Arc::new(DiskUploadStore::new(temp_dir.path()));
        let use_case = UploadImageUseCase::new(store, Arc::new(ArticleConfig::default()));
        let admin = admin();

        let output = use_case.execute(&admin, input("Photo.JPG", b"x")).await.unwrap();
        let stem = output.file_name.strip_suffix(".jpg").unwrap();
        let (millis, suffix) = stem.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(suffix.len(), UPLOAD_SUFFIX_LEN);
        assert!(suffix.chars().all(|c| c.is_ascii_alphanumeric()));
    }
}
