//! PDF text extraction using lopdf and pdf-extract.

use std::collections::BTreeMap;

use lopdf::content::Content;
use lopdf::{Document, Encoding, Object};
use tracing::{debug, trace, warn};

use super::{PageLines, PdfProcessor, PdfType, Result, TextSource};
use crate::error::PdfError;
use crate::models::config::PdfConfig;

/// Page separator emitted by pdf-extract between pages.
const FORM_FEED: char = '\u{000C}';

/// Baseline shift, in text space units, treated as a new line.
const LINE_TOLERANCE: f32 = 1.0;

/// PDF text extractor using lopdf for structure and pdf-extract for layout text.
pub struct PdfExtractor {
    document: Option<Document>,
    raw_data: Vec<u8>,
    config: PdfConfig,
}

impl PdfExtractor {
    /// Create a new PDF extractor.
    pub fn new() -> Self {
        Self::with_config(PdfConfig::default())
    }

    /// Create an extractor with the given configuration.
    pub fn with_config(config: PdfConfig) -> Self {
        Self {
            document: None,
            raw_data: Vec::new(),
            config,
        }
    }

    fn document(&self) -> Result<&Document> {
        self.document
            .as_ref()
            .ok_or_else(|| PdfError::Parse("No document loaded".to_string()))
    }

    /// The text source tried first by [`PdfProcessor::extract_pages`].
    pub fn preferred_source(&self) -> TextSource {
        if self.config.prefer_per_page_text {
            TextSource::PerPage
        } else {
            TextSource::Layout
        }
    }

    /// Pages of lines from one text source, without fallback.
    pub fn pages_from(&self, source: TextSource) -> Result<Vec<PageLines>> {
        match source {
            TextSource::Layout => self.pages_from_layout_text(),
            TextSource::PerPage => self.pages_from_operators(),
        }
    }

    /// Pages from the content stream text operators, page by page.
    fn pages_from_operators(&self) -> Result<Vec<PageLines>> {
        (1..=self.page_count())
            .map(|page| self.extract_page_text(page).map(|text| split_lines(&text)))
            .collect()
    }

    /// Pages from pdf-extract's layout text, split on form feeds.
    fn pages_from_layout_text(&self) -> Result<Vec<PageLines>> {
        let text = self.extract_text()?;
        Ok(text
            .split(FORM_FEED)
            .map(split_lines)
            .filter(|lines| !lines.is_empty())
            .collect())
    }
}

impl Default for PdfExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl PdfProcessor for PdfExtractor {
    fn load(&mut self, data: &[u8]) -> Result<()> {
        let mut doc = Document::load_mem(data).map_err(|e| PdfError::Parse(e.to_string()))?;

        // Handle PDFs with empty password encryption
        if doc.is_encrypted() {
            if doc.decrypt("").is_err() {
                return Err(PdfError::Encrypted);
            }
            debug!("Decrypted PDF with empty password");

            // pdf-extract reads the raw bytes, so keep the decrypted copy
            let mut decrypted_data = Vec::new();
            doc.save_to(&mut decrypted_data)
                .map_err(|e| PdfError::Parse(format!("Failed to save decrypted PDF: {}", e)))?;
            self.raw_data = decrypted_data;
        } else {
            self.raw_data = data.to_vec();
        }

        let page_count = doc.get_pages().len();
        if page_count == 0 {
            return Err(PdfError::NoPages);
        }

        debug!("Loaded PDF with {} pages", page_count);
        self.document = Some(doc);
        Ok(())
    }

    fn page_count(&self) -> u32 {
        self.document
            .as_ref()
            .map(|doc| doc.get_pages().len() as u32)
            .unwrap_or(0)
    }

    fn analyze(&self) -> PdfType {
        let text_len = self
            .extract_pages()
            .map(|pages| pages.iter().flatten().map(|line| line.len()).sum::<usize>())
            .unwrap_or(0);

        let pdf_type = if text_len >= self.config.min_text_length {
            PdfType::Text
        } else {
            PdfType::Empty
        };

        debug!("PDF analysis: {} chars of text -> {:?}", text_len, pdf_type);
        pdf_type
    }

    fn extract_text(&self) -> Result<String> {
        pdf_extract::extract_text_from_mem(&self.raw_data)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))
    }

    fn extract_page_text(&self, page: u32) -> Result<String> {
        let doc = self.document()?;
        if page == 0 || page > self.page_count() {
            return Err(PdfError::InvalidPage(page));
        }
        let pages = doc.get_pages();
        let page_id = *pages.get(&page).ok_or(PdfError::InvalidPage(page))?;

        let fonts = doc
            .get_page_fonts(page_id)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;
        let encodings: BTreeMap<Vec<u8>, Encoding<'_>> = fonts
            .into_iter()
            .filter_map(|(name, font)| match font.get_font_encoding(doc) {
                Ok(encoding) => Some((name, encoding)),
                Err(e) => {
                    debug!(
                        "No usable encoding for font {}: {}",
                        String::from_utf8_lossy(&name),
                        e
                    );
                    None
                }
            })
            .collect();

        let data = doc
            .get_page_content(page_id)
            .map_err(|e| PdfError::TextExtraction(e.to_string()))?;
        let content =
            Content::decode(&data).map_err(|e| PdfError::TextExtraction(e.to_string()))?;

        let mut writer = LineWriter::default();
        let mut encoding = None;
        for operation in &content.operations {
            let operands = &operation.operands;
            match operation.operator.as_str() {
                "BT" => writer.begin_text(),
                "Tf" => {
                    encoding = operands
                        .first()
                        .and_then(|name| name.as_name().ok())
                        .and_then(|name| encodings.get(name));
                }
                "Td" | "TD" => {
                    let dy = operands.get(1).and_then(|o| o.as_float().ok()).unwrap_or(0.0);
                    writer.move_by(dy);
                }
                "Tm" => {
                    let baseline = operands
                        .get(5)
                        .and_then(|o| o.as_float().ok())
                        .unwrap_or(0.0);
                    writer.move_to(baseline);
                }
                "T*" => writer.next_line(),
                "Tj" | "TJ" => writer.show(&decode_operands(encoding, operands)),
                "'" | "\"" => {
                    writer.next_line();
                    let text = operands.last().map(std::slice::from_ref).unwrap_or_default();
                    writer.show(&decode_operands(encoding, text));
                }
                _ => {}
            }
        }

        Ok(writer.finish())
    }

    fn extract_pages(&self) -> Result<Vec<PageLines>> {
        self.document()?;

        let source = self.preferred_source();
        match self.pages_from(source) {
            Ok(pages) if pages.iter().any(|lines| !lines.is_empty()) => Ok(pages),
            Ok(_) => {
                debug!("{:?} text extraction returned no lines, trying fallback", source);
                self.pages_from(source.other())
            }
            Err(e) => {
                warn!("{:?} text extraction failed ({}), trying fallback", source, e);
                self.pages_from(source.other())
            }
        }
    }
}

/// Rebuilds text lines from text positioning operators.
///
/// A change of baseline starts a new line; a horizontal move on the same
/// baseline separates words.
#[derive(Default)]
struct LineWriter {
    text: String,
    /// Baseline of the current text line, in text space.
    baseline: f32,
    /// Baseline of the last shown text, if any.
    shown_at: Option<f32>,
    moved: bool,
}

impl LineWriter {
    fn begin_text(&mut self) {
        self.baseline = 0.0;
        self.moved = true;
    }

    fn move_by(&mut self, dy: f32) {
        self.baseline += dy;
        self.moved = true;
    }

    fn move_to(&mut self, baseline: f32) {
        self.baseline = baseline;
        self.moved = true;
    }

    fn next_line(&mut self) {
        // Leading is not tracked; any shift past the tolerance starts a line.
        self.baseline -= LINE_TOLERANCE * 2.0;
        self.moved = true;
    }

    fn show(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.shown_at {
            Some(last) if (last - self.baseline).abs() > LINE_TOLERANCE => self.text.push('\n'),
            Some(_) if self.moved && !self.text.ends_with(' ') && !text.starts_with(' ') => {
                self.text.push(' ')
            }
            _ => {}
        }
        trace!("Text at baseline {}: {:?}", self.baseline, text);
        self.text.push_str(text);
        self.shown_at = Some(self.baseline);
        self.moved = false;
    }

    fn finish(self) -> String {
        self.text
    }
}

/// Decode `Tj`/`TJ` operands; large negative kerning counts as a space.
fn decode_operands(encoding: Option<&Encoding>, operands: &[Object]) -> String {
    let mut text = String::new();
    for operand in operands {
        match operand {
            Object::String(bytes, _) => text.push_str(&decode_bytes(encoding, bytes)),
            Object::Array(items) => text.push_str(&decode_operands(encoding, items)),
            Object::Integer(i) if *i < -100 => text.push(' '),
            Object::Real(r) if *r < -100.0 => text.push(' '),
            _ => {}
        }
    }
    text
}

/// Decode string bytes with the font encoding, or as Latin-1 without one.
fn decode_bytes(encoding: Option<&Encoding>, bytes: &[u8]) -> String {
    encoding
        .and_then(|encoding| Document::decode_text(encoding, bytes).ok())
        .unwrap_or_else(|| bytes.iter().map(|&b| b as char).collect())
}

/// Split a page of text into trimmed, non-empty lines.
fn split_lines(text: &str) -> PageLines {
    text.lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}
