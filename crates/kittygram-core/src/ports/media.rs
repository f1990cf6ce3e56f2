//! Media storage port - where uploaded and generated images live.

use async_trait::async_trait;

use crate::error::MediaError;

/// Image formats accepted for upload.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageKind {
    Jpeg,
    Png,
}

impl ImageKind {
    pub fn extension(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "jpg",
            ImageKind::Png => "png",
        }
    }

    pub fn content_type(self) -> &'static str {
        match self {
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Png => "image/png",
        }
    }
}

/// Identify an image payload by its magic bytes.
pub fn sniff_image_kind(bytes: &[u8]) -> Option<ImageKind> {
    // JPEG: FF D8 FF
    if bytes.len() >= 3 && bytes[0] == 0xFF && bytes[1] == 0xD8 && bytes[2] == 0xFF {
        return Some(ImageKind::Jpeg);
    }
    // PNG: 89 50 4E 47 0D 0A 1A 0A
    if bytes.len() >= 8 && &bytes[..8] == b"\x89PNG\r\n\x1a\n" {
        return Some(ImageKind::Png);
    }
    None
}

/// Media storage - persists image blobs under a relative content path.
#[async_trait]
pub trait MediaStore: Send + Sync {
    /// Store `bytes` under `prefix` with the given extension.
    /// Returns the media-relative path of the stored file.
    async fn save(&self, prefix: &str, ext: &str, bytes: &[u8]) -> Result<String, MediaError>;

    /// Read a previously stored file back.
    async fn load(&self, path: &str) -> Result<Vec<u8>, MediaError>;

    /// Remove a stored file. Missing files are not an error.
    async fn remove(&self, path: &str) -> Result<(), MediaError>;
}
