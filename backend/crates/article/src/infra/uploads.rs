//! Upload storage on the local filesystem.
//!
//! Files live flat under the upload directory, which is also served
//! read-only at `/uploads`.

use std::path::{Path, PathBuf};

use platform::crypto::random_alphanumeric;
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::domain::repository::UploadStore;
use crate::error::{ArticleError, ArticleResult};

#[derive(Debug, Clone)]
pub struct DiskUploadStore {
    root: PathBuf,
}

impl DiskUploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Creates the upload directory if it doesn't exist.
    pub async fn init(&self) -> ArticleResult<()> {
        fs::create_dir_all(&self.root).await?;
        Ok(())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn file_path(&self, file_name: &str) -> ArticleResult<PathBuf> {
        let is_plain = !file_name.is_empty()
            && !file_name.starts_with('.')
            && !file_name.contains(['/', '\\'])
            && !file_name.contains("..");
        if !is_plain {
            return Err(ArticleError::InvalidUpload(format!(
                "invalid file name '{file_name}'"
            )));
        }
        Ok(self.root.join(file_name))
    }
}

impl UploadStore for DiskUploadStore {
    async fn save(&self, file_name: &str, bytes: &[u8]) -> ArticleResult<()> {
        let path = self.file_path(file_name)?;
        fs::create_dir_all(&self.root).await?;

        // Write to a hidden temp file unique to this call, then rename into place
        let temp_path = self
            .root
            .join(format!(".{file_name}.{}.tmp", random_alphanumeric(8)));
        if let Err(e) = write_synced(&temp_path, bytes).await {
            let _ = fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        fs::rename(&temp_path, &path).await?;

        Ok(())
    }
}

async fn write_synced(path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    let mut file = fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
        .await?;
    file.write_all(bytes).await?;
    file.sync_all().await
}
