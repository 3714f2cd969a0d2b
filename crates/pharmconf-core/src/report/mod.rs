//! Audit report generation.
//!
//! Content is collected by [`build_report`] and laid out as an A4 landscape
//! PDF by [`render_pdf`].

mod builder;
mod render;

pub use builder::{
    build_report, render_text_review, ReportDocument, ReportRow, RowFill, TABLE_HEADERS,
};
pub use render::render_pdf;

/// MIME type of the rendered report.
pub const REPORT_MIME_TYPE: &str = "application/pdf";
