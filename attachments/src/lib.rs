//! Screenshot attachments for internal testing cases.
//!
//! Testers attach one image per checklist section. Before a case is stored
//! each image is uploaded to the testing bucket under a generated name and
//! replaced by its public URL; this crate covers the local half of that:
//! reading the file, recognising the image type and building the name.

pub mod naming;

pub use naming::{original_extension, storage_filename, underscore_whitespace};

use std::path::Path;
use thiserror::Error;
use tracing::debug;

/// Errors related to loading attachments
#[derive(Error, Debug)]
pub enum AttachmentError {
    #[error("Not an image: {0}")]
    NotAnImage(String),
    #[error("Attachment is empty: {0}")]
    Empty(String),
    #[error("Invalid file name: {0}")]
    InvalidName(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type AttachmentResult<T> = Result<T, AttachmentError>;

/// Image formats accepted as screenshots
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Png,
    Jpeg,
    Gif,
    Webp,
    Bmp,
    Svg,
    Heic,
}

impl ImageKind {
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_ascii_lowercase().as_str() {
            "png" => Some(ImageKind::Png),
            "jpg" | "jpeg" => Some(ImageKind::Jpeg),
            "gif" => Some(ImageKind::Gif),
            "webp" => Some(ImageKind::Webp),
            "bmp" => Some(ImageKind::Bmp),
            "svg" => Some(ImageKind::Svg),
            "heic" | "heif" => Some(ImageKind::Heic),
            _ => None,
        }
    }

    /// Recognise the common raster formats by their leading bytes.
    pub fn sniff(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(b"\x89PNG\r\n\x1a\n") {
            Some(ImageKind::Png)
        } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            Some(ImageKind::Jpeg)
        } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            Some(ImageKind::Gif)
        } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
            Some(ImageKind::Webp)
        } else if bytes.starts_with(b"BM") {
            Some(ImageKind::Bmp)
        } else {
            None
        }
    }

    pub fn content_type(&self) -> &'static str {
        match self {
            ImageKind::Png => "image/png",
            ImageKind::Jpeg => "image/jpeg",
            ImageKind::Gif => "image/gif",
            ImageKind::Webp => "image/webp",
            ImageKind::Bmp => "image/bmp",
            ImageKind::Svg => "image/svg+xml",
            ImageKind::Heic => "image/heic",
        }
    }
}

/// An image picked for upload, held in memory until submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    /// File name as picked, without directories
    pub file_name: String,
    pub kind: ImageKind,
    pub bytes: Vec<u8>,
}

impl Attachment {
    /// Build an attachment from bytes already in memory.
    ///
    /// The extension decides the image kind; when it is missing or unknown
    /// the content is sniffed instead.
    pub fn from_bytes(file_name: impl Into<String>, bytes: Vec<u8>) -> AttachmentResult<Self> {
        let file_name = file_name.into();
        if file_name.trim().is_empty() {
            return Err(AttachmentError::InvalidName(file_name));
        }
        if bytes.is_empty() {
            return Err(AttachmentError::Empty(file_name));
        }

        let kind = file_name
            .rsplit_once('.')
            .and_then(|(_, ext)| ImageKind::from_extension(ext))
            .or_else(|| ImageKind::sniff(&bytes))
            .ok_or_else(|| AttachmentError::NotAnImage(file_name.clone()))?;

        Ok(Self {
            file_name,
            kind,
            bytes,
        })
    }

    /// Read an image from disk.
    pub fn load(path: &Path) -> AttachmentResult<Self> {
        let file_name = path
            .file_name()
            .and_then(|n| n.to_str())
            .ok_or_else(|| AttachmentError::InvalidName(path.display().to_string()))?
            .to_string();

        let bytes = std::fs::read(path)?;
        debug!("Loaded attachment {} ({} bytes)", file_name, bytes.len());

        Self::from_bytes(file_name, bytes)
    }

    pub fn content_type(&self) -> &'static str {
        self.kind.content_type()
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const PNG_HEADER: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[test]
    fn test_kind_from_extension() {
        assert_eq!(ImageKind::from_extension("PNG"), Some(ImageKind::Png));
        assert_eq!(ImageKind::from_extension("jpeg"), Some(ImageKind::Jpeg));
        assert_eq!(ImageKind::from_extension("txt"), None);
        assert_eq!(ImageKind::Jpeg.content_type(), "image/jpeg");
    }

    #[test]
    fn test_sniff_without_extension() {
        let attachment = Attachment::from_bytes("screenshot", PNG_HEADER.to_vec()).unwrap();
        assert_eq!(attachment.kind, ImageKind::Png);
        assert_eq!(attachment.content_type(), "image/png");
    }

    #[test]
    fn test_rejects_non_images() {
        let result = Attachment::from_bytes("notes.txt", b"hello".to_vec());
        assert!(matches!(result, Err(AttachmentError::NotAnImage(_))));

        let result = Attachment::from_bytes("empty.png", vec![]);
        assert!(matches!(result, Err(AttachmentError::Empty(_))));

        let result = Attachment::from_bytes("  ", PNG_HEADER.to_vec());
        assert!(matches!(result, Err(AttachmentError::InvalidName(_))));
    }

    #[test]
    fn test_load_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("home page.jpg");
        let mut file = std::fs::File::create(&path).unwrap();
        file.write_all(&[0xFF, 0xD8, 0xFF, 0xE0]).unwrap();

        let attachment = Attachment::load(&path).unwrap();
        assert_eq!(attachment.file_name, "home page.jpg");
        assert_eq!(attachment.kind, ImageKind::Jpeg);
        assert_eq!(attachment.len(), 4);
        assert!(!attachment.is_empty());
    }

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let result = Attachment::load(&dir.path().join("missing.png"));
        assert!(matches!(result, Err(AttachmentError::Io(_))));
    }
}
