//! Base64.ai OCR provider binding.
//!
//! This crate provides:
//! - A transport wrapper sending documents to the vendor as `data:` URIs
//! - Normalization of vendor invoice, receipt and identity responses
//! - Loose number and date coercion for partially populated vendor fields

pub mod config;
pub mod conversion;
pub mod country;
pub mod error;
pub mod fields;
pub mod ocr;
pub mod schema;

pub use error::{ProviderError, Result};
pub use ocr::{DocumentFile, OcrProvider};
pub use schema::{
    IdentityParserDataClass, InvoiceParserDataClass, ProviderCallResult, ReceiptParserDataClass,
};
