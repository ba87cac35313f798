//! OCR provider abstraction.
//!
//! Defines the [`OcrProvider`] trait that every vendor binding implements, so
//! sibling providers expose the same feature methods and return the same
//! normalized records.

pub mod base64_ai;
pub mod transport;

use std::path::Path;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};

use crate::error::Result;
use crate::schema::{
    IdentityParserDataClass, InvoiceParserDataClass, ProviderCallResult, ReceiptParserDataClass,
};

/// A document read fully into memory.
#[derive(Debug, Clone)]
pub struct DocumentFile {
    pub filename: String,
    pub data: Vec<u8>,
}

impl DocumentFile {
    pub fn new(filename: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            filename: filename.into(),
            data,
        }
    }

    /// Read a document from disk.
    pub fn open(path: &Path) -> Result<Self> {
        let data = std::fs::read(path)?;
        let filename = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { filename, data })
    }

    /// MIME type guessed from the file name.
    pub fn mime_type(&self) -> String {
        mime_guess::from_path(&self.filename)
            .first_or_octet_stream()
            .essence_str()
            .to_string()
    }

    /// The document as a `data:<mime>;base64,<payload>` URI.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime_type(), BASE64.encode(&self.data))
    }
}

/// Async trait implemented by each OCR vendor binding.
///
/// `language` and `filename` are part of the shared interface; a provider
/// may ignore them.
#[async_trait::async_trait]
pub trait OcrProvider: Send + Sync {
    fn name(&self) -> &str;

    /// Plain text OCR.
    async fn ocr(&self, file: &DocumentFile, language: Option<&str>) -> Result<serde_json::Value>;

    async fn invoice_parser(
        &self,
        file: &DocumentFile,
        language: Option<&str>,
    ) -> Result<ProviderCallResult<InvoiceParserDataClass>>;

    async fn receipt_parser(
        &self,
        file: &DocumentFile,
        language: Option<&str>,
    ) -> Result<ProviderCallResult<ReceiptParserDataClass>>;

    async fn identity_parser(
        &self,
        file: &DocumentFile,
        filename: Option<&str>,
    ) -> Result<ProviderCallResult<IdentityParserDataClass>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_uses_guessed_mime() {
        let file = DocumentFile::new("scan.png", b"abc".to_vec());
        assert_eq!(file.to_data_url(), "data:image/png;base64,YWJj");
    }

    #[test]
    fn test_unknown_extension_is_octet_stream() {
        let file = DocumentFile::new("scan", vec![0xff]);
        assert_eq!(file.mime_type(), "application/octet-stream");
        assert_eq!(file.to_data_url(), "data:application/octet-stream;base64,/w==");
    }

    #[test]
    fn test_open_reads_whole_file() {
        let tmp = tempfile::Builder::new().suffix(".jpg").tempfile().unwrap();
        std::fs::write(tmp.path(), b"jpeg bytes").unwrap();
        let file = DocumentFile::open(tmp.path()).unwrap();
        assert_eq!(file.data, b"jpeg bytes");
        assert!(file.filename.ends_with(".jpg"));
        assert_eq!(file.mime_type(), "image/jpeg");
    }

    #[test]
    fn test_open_missing_file_is_io_error() {
        let err = DocumentFile::open(Path::new("/definitely/not/here.png")).unwrap_err();
        assert!(matches!(err, crate::error::ProviderError::Io(_)));
    }
}
