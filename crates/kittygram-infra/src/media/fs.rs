//! Filesystem media store.

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use uuid::Uuid;

use kittygram_core::error::MediaError;
use kittygram_core::ports::MediaStore;

/// Media store backed by a directory on disk.
///
/// Files are addressed by media-relative paths such as `posts/<uuid>.jpg`.
pub struct FsMediaStore {
    root: PathBuf,
}

impl FsMediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Resolve a media-relative path, rejecting anything that would escape
    /// the media root.
    fn resolve(&self, path: &str) -> Result<PathBuf, MediaError> {
        let rel = Path::new(path);
        let safe = rel
            .components()
            .all(|c| matches!(c, Component::Normal(_)));
        if !safe {
            return Err(MediaError::NotFound(path.to_string()));
        }
        Ok(self.root.join(rel))
    }
}

#[async_trait]
impl MediaStore for FsMediaStore {
    async fn save(&self, prefix: &str, ext: &str, bytes: &[u8]) -> Result<String, MediaError> {
        let rel = format!("{prefix}/{}.{ext}", Uuid::new_v4());
        let full = self.resolve(&rel)?;

        if let Some(dir) = full.parent() {
            tokio::fs::create_dir_all(dir)
                .await
                .map_err(|e| MediaError::Io(e.to_string()))?;
        }

        tokio::fs::write(&full, bytes)
            .await
            .map_err(|e| MediaError::Io(e.to_string()))?;

        tracing::debug!(path = %rel, size = bytes.len(), "Stored media file");
        Ok(rel)
    }

    async fn load(&self, path: &str) -> Result<Vec<u8>, MediaError> {
        let full = self.resolve(path)?;

        tokio::fs::read(&full).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                MediaError::NotFound(path.to_string())
            } else {
                MediaError::Io(e.to_string())
            }
        })
    }

    async fn remove(&self, path: &str) -> Result<(), MediaError> {
        let full = self.resolve(path)?;

        match tokio::fs::remove_file(&full).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(MediaError::Io(e.to_string())),
        }
    }
}
