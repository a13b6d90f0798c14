use std::path::PathBuf;

use async_trait::async_trait;
use tracing::debug;

use crate::error::AppError;
use crate::source::MapSource;

/// Reads a map that was downloaded ahead of time.
pub struct FileSource {
    path: PathBuf,
}

impl FileSource {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl MapSource for FileSource {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    async fn fetch(&self) -> Result<Vec<u8>, AppError> {
        let bytes = tokio::fs::read(&self.path)
            .await
            .map_err(|e| AppError::fetch(self.name(), e))?;
        debug!(path = %self.path.display(), len = bytes.len(), "read map file");
        Ok(bytes)
    }
}
