//! File kind and MIME type detection for certificate files.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Coarse file kind used to route certificates to extraction or OCR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FileKind {
    Pdf,
    Docx,
    Doc,
    Text,
    ImageJpeg,
    ImagePng,
    ImageTiff,
    Unknown,
}

impl FileKind {
    /// Classify from a MIME type, falling back to the extension.
    pub fn detect(path: &Path) -> Self {
        if let Some(mime) = guess_mime_type(path) {
            let kind = Self::from_mime(&mime);
            if kind != Self::Unknown {
                return kind;
            }
        }
        path.extension()
            .and_then(|e| e.to_str())
            .map(Self::from_extension)
            .unwrap_or(Self::Unknown)
    }

    pub fn from_mime(mime: &str) -> Self {
        match mime {
            "application/pdf" => Self::Pdf,
            "application/vnd.openxmlformats-officedocument.wordprocessingml.document" => Self::Docx,
            "application/msword" => Self::Doc,
            "text/plain" => Self::Text,
            "image/jpeg" => Self::ImageJpeg,
            "image/png" => Self::ImagePng,
            "image/tiff" => Self::ImageTiff,
            _ => Self::Unknown,
        }
    }

    pub fn from_extension(ext: &str) -> Self {
        match ext.to_ascii_lowercase().as_str() {
            "pdf" => Self::Pdf,
            "docx" => Self::Docx,
            "doc" => Self::Doc,
            "txt" => Self::Text,
            "jpg" | "jpeg" => Self::ImageJpeg,
            "png" => Self::ImagePng,
            "tif" | "tiff" => Self::ImageTiff,
            _ => Self::Unknown,
        }
    }

    pub fn is_document(&self) -> bool {
        matches!(self, Self::Pdf | Self::Docx | Self::Doc | Self::Text)
    }

    pub fn is_image(&self) -> bool {
        matches!(self, Self::ImageJpeg | Self::ImagePng | Self::ImageTiff)
    }

    /// Scanned images need OCR before any text extraction.
    pub fn requires_ocr(&self) -> bool {
        self.is_image()
    }
}

/// Extension-based MIME type guess.
pub fn guess_mime_type(path: &Path) -> Option<String> {
    mime_guess::from_path(path).first().map(|m| m.essence_str().to_string())
}
