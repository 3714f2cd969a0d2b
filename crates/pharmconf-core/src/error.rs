//! Error types for the pharmconf-core library.

use thiserror::Error;

/// Main error type for the pharmconf library.
#[derive(Error, Debug)]
pub enum PharmconfError {
    /// PDF processing error.
    #[error("PDF error: {0}")]
    Pdf(#[from] PdfError),

    /// Conference session error.
    #[error("conference error: {0}")]
    Session(#[from] SessionError),

    /// Report rendering error.
    #[error("report error: {0}")]
    Report(#[from] ReportError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(String),
}

/// Errors related to PDF processing.
#[derive(Error, Debug)]
pub enum PdfError {
    /// Failed to open/parse the PDF file.
    #[error("failed to parse PDF: {0}")]
    Parse(String),

    /// Failed to extract text from PDF.
    #[error("failed to extract text: {0}")]
    TextExtraction(String),

    /// The PDF is encrypted and cannot be processed.
    #[error("PDF is encrypted")]
    Encrypted,

    /// The PDF is empty or has no pages.
    #[error("PDF has no pages")]
    NoPages,

    /// Invalid page number requested.
    #[error("invalid page number: {0}")]
    InvalidPage(u32),
}

/// Errors raised by the conference workflow.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// The order has no items, so there is nothing to review.
    #[error("no items loaded")]
    NothingLoaded,

    /// A quantity was entered for a slot that does not exist.
    #[error("position {position} out of range (order has {total} items)")]
    PositionOutOfRange { position: usize, total: usize },
}

/// Errors related to rendering the audit report.
#[derive(Error, Debug)]
pub enum ReportError {
    /// The PDF writer rejected the document.
    #[error("failed to render report: {0}")]
    Render(String),
}

impl From<lopdf::Error> for ReportError {
    fn from(err: lopdf::Error) -> Self {
        ReportError::Render(err.to_string())
    }
}

/// Result type for the pharmconf library.
pub type Result<T> = std::result::Result<T, PharmconfError>;
