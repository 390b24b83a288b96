// In-memory documents selected for upload.

use anyhow::{Context, Result};
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::Path;

/// Media type sent for every selected document.
pub const PDF_MEDIA_TYPE: &str = "application/pdf";

/// A file held in memory until the next index build. The cursor may have
/// been advanced by an earlier read; `read_all` always starts from zero.
#[derive(Debug, Clone)]
pub struct UploadedDocument {
    filename: String,
    media_type: String,
    content: Cursor<Vec<u8>>,
}

impl UploadedDocument {
    pub fn new(filename: impl Into<String>, media_type: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            media_type: media_type.into(),
            content: Cursor::new(bytes),
        }
    }

    /// Convenience constructor for a PDF buffer.
    pub fn pdf(filename: impl Into<String>, bytes: Vec<u8>) -> Self {
        Self::new(filename, PDF_MEDIA_TYPE, bytes)
    }

    /// Load a PDF from disk. Only files with a `.pdf` extension are accepted.
    pub fn from_path(path: &Path) -> Result<Self> {
        if !is_pdf(path) {
            anyhow::bail!("{} is not a PDF file", path.display());
        }
        let filename = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("document.pdf")
            .to_string();
        let bytes = std::fs::read(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
        Ok(Self::pdf(filename, bytes))
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    pub fn media_type(&self) -> &str {
        &self.media_type
    }

    pub fn len(&self) -> usize {
        self.content.get_ref().len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.get_ref().is_empty()
    }

    /// Rewind to the start and read the whole buffer.
    pub fn read_all(&mut self) -> std::io::Result<Vec<u8>> {
        self.content.seek(SeekFrom::Start(0))?;
        let mut buf = Vec::with_capacity(self.len());
        self.content.read_to_end(&mut buf)?;
        Ok(buf)
    }

    /// Mutable access to the underlying reader.
    pub fn reader(&mut self) -> &mut Cursor<Vec<u8>> {
        &mut self.content
    }
}

fn is_pdf(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}
