//! Core library for pharmacy dispensing-order conference.
//!
//! This crate provides:
//! - PDF text extraction (pages of lines)
//! - Order extraction (header signature line and attended items section)
//! - A cursor-based conference session with per-item classification
//! - A color-coded audit report rendered to PDF

pub mod error;
pub mod models;
pub mod pdf;
pub mod extraction;
pub mod conference;
pub mod report;
pub mod workflow;

pub use error::{PharmconfError, Result};
pub use models::order::{LineItem, Order, OrderHeader};
pub use models::config::PharmconfConfig;
pub use pdf::{PdfExtractor, PdfProcessor, PdfType, TextSource};
pub use extraction::{DispensingOrderParser, ExtractionResult, OrderParser};
pub use conference::{classify, Classification, ClassificationCounts, ConferenceSession, Summary};
pub use report::{build_report, render_pdf, ReportDocument, RowFill};
pub use workflow::{
    enter_conference_mode, extract_order, generate_report, upload_document, RenderedReport,
};
