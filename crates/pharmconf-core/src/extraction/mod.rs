//! Order extraction from the dispensing document's text lines.

pub mod header;
pub mod items;
pub mod patterns;

pub use header::{HeaderExtractor, HeaderScan};
pub use items::{ItemExtractor, ItemScan};

use std::time::Instant;

use tracing::info;

use crate::models::config::ExtractionConfig;
use crate::models::order::Order;
use crate::pdf::PageLines;

/// Trait for single-line extractors.
pub trait LineExtractor {
    /// The type of value this extractor produces.
    type Output;

    /// Extract a value from one line, or `None` if the line does not fit.
    fn extract_line(&self, line: &str) -> Option<Self::Output>;
}

/// Result of order extraction.
#[derive(Debug, Clone)]
pub struct ExtractionResult {
    /// Extracted order.
    pub order: Order,
    /// Lines inside the items section that were dropped.
    pub skipped_lines: usize,
    /// Number of lines matching the header signature.
    pub header_matches: usize,
    /// Extraction warnings. Informational only.
    pub warnings: Vec<String>,
    /// Processing time in milliseconds.
    pub processing_time_ms: u64,
}

/// Trait for order parsing.
pub trait OrderParser {
    /// Parse an order from a flat, ordered line stream.
    fn parse_lines(&self, lines: &[String]) -> ExtractionResult;

    /// Parse an order from pages of lines.
    fn parse_pages(&self, pages: &[PageLines]) -> ExtractionResult {
        self.parse_lines(&flatten_pages(pages))
    }

    /// Parse an order from plain text.
    fn parse_text(&self, text: &str) -> ExtractionResult {
        self.parse_lines(&lines_from_text(text))
    }
}

/// Parser for the dispensing order layout.
pub struct DispensingOrderParser {
    header: HeaderExtractor,
    items: ItemExtractor,
}

impl DispensingOrderParser {
    /// Create a parser with the default keywords and markers.
    pub fn new() -> Self {
        Self {
            header: HeaderExtractor::default(),
            items: ItemExtractor::default(),
        }
    }

    /// Create a parser from configuration.
    pub fn from_config(config: &ExtractionConfig) -> Self {
        Self::new()
            .with_stock_keywords(&config.stock_keywords)
            .with_section_markers(&config.items_start_marker, &config.items_end_marker)
    }

    /// Set the keywords identifying the requested stock.
    pub fn with_stock_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.header = HeaderExtractor::new(keywords);
        self
    }

    /// Set the lines opening and closing the attended items section.
    pub fn with_section_markers(mut self, start: &str, end: &str) -> Self {
        self.items = ItemExtractor::new(start, end);
        self
    }
}

impl Default for DispensingOrderParser {
    fn default() -> Self {
        Self::new()
    }
}

impl OrderParser for DispensingOrderParser {
    fn parse_lines(&self, lines: &[String]) -> ExtractionResult {
        let start = Instant::now();
        let mut warnings = Vec::new();

        let header_scan = self.header.scan(lines.iter().map(String::as_str));
        if header_scan.matches == 0 {
            warnings.push("No header signature line found".to_string());
        }

        let item_scan = self.items.scan(lines.iter().map(String::as_str));
        if !item_scan.section_found {
            warnings.push("Attended items section not found".to_string());
        } else if item_scan.items.is_empty() {
            warnings.push("Attended items section has no items".to_string());
        }

        info!(
            "Extracted order {:?} with {} items ({} lines skipped) from {} lines",
            header_scan.header.order_number,
            item_scan.items.len(),
            item_scan.skipped_lines,
            lines.len()
        );

        ExtractionResult {
            order: Order::new(header_scan.header, item_scan.items),
            skipped_lines: item_scan.skipped_lines,
            header_matches: header_scan.matches,
            warnings,
            processing_time_ms: start.elapsed().as_millis() as u64,
        }
    }
}

/// Flatten pages into one ordered line stream.
pub fn flatten_pages(pages: &[PageLines]) -> Vec<String> {
    pages.iter().flatten().cloned().collect()
}

/// Split plain text into lines.
pub fn lines_from_text(text: &str) -> Vec<String> {
    text.lines().map(str::to_string).collect()
}
