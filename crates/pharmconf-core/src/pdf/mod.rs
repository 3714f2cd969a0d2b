//! PDF processing module.

mod extractor;

pub use extractor::PdfExtractor;

use crate::error::PdfError;

/// Type of PDF content.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PdfType {
    /// Contains extractable text.
    Text,
    /// No extractable text (scanned or empty document).
    Empty,
}

/// Where page text comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSource {
    /// pdf-extract layout text for the whole document, split on form feeds.
    Layout,
    /// Text operators of each page's content stream.
    PerPage,
}

impl TextSource {
    /// The source used as fallback for this one.
    pub fn other(self) -> Self {
        match self {
            Self::Layout => Self::PerPage,
            Self::PerPage => Self::Layout,
        }
    }
}

/// Lines of one page, in reading order.
pub type PageLines = Vec<String>;

/// Result type for PDF operations.
pub type Result<T> = std::result::Result<T, PdfError>;

/// Trait for PDF processing implementations.
pub trait PdfProcessor {
    /// Load a PDF from bytes.
    fn load(&mut self, data: &[u8]) -> Result<()>;

    /// Get the number of pages in the PDF.
    fn page_count(&self) -> u32;

    /// Analyze the PDF to determine its type.
    fn analyze(&self) -> PdfType;

    /// Extract text from the entire PDF.
    fn extract_text(&self) -> Result<String>;

    /// Extract text from a specific page (1-indexed).
    fn extract_page_text(&self, page: u32) -> Result<String>;

    /// Extract every page as an ordered sequence of lines.
    fn extract_pages(&self) -> Result<Vec<PageLines>>;
}
