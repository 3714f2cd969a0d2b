//! PDF rendering of the audit report using lopdf.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, ObjectId, Stream, StringFormat};
use tracing::debug;

use super::builder::{ReportDocument, TABLE_HEADERS};
use crate::error::ReportError;
use crate::models::config::ReportConfig;

/// A4 landscape, in points.
const PAGE_WIDTH: f32 = 841.89;
const PAGE_HEIGHT: f32 = 595.28;
const MARGIN: f32 = 36.0;

const TITLE_SIZE: f32 = 18.0;
const SPACER: f32 = 12.0;
const SIGNATURE_GAP: f32 = 36.0;

/// Item table column widths; they add up to the usable page width.
const COLUMN_WIDTHS: [f32; 6] = [36.0, 330.0, 120.0, 80.0, 90.0, 113.89];

const HEADER_FILL: [f32; 3] = [0.5, 0.5, 0.5];
const HEADER_TEXT: [f32; 3] = [0.96, 0.96, 0.96];
const GRID_WIDTH: f32 = 0.4;

/// Average Helvetica glyph width as a fraction of the font size.
const AVG_GLYPH_WIDTH: f32 = 0.55;

const REGULAR: &str = "F1";
const BOLD: &str = "F2";

/// Result type for rendering.
pub type Result<T> = std::result::Result<T, ReportError>;

/// Render the report to PDF bytes.
pub fn render_pdf(report: &ReportDocument, config: &ReportConfig) -> Result<Vec<u8>> {
    let mut layout = PageLayout::new();
    let body = config.body_font_size;
    let body_line = body * 1.4;

    // Title
    let title_width = estimate_width(&report.title, TITLE_SIZE);
    layout.text(
        BOLD,
        TITLE_SIZE,
        (PAGE_WIDTH - title_width) / 2.0,
        layout.y - TITLE_SIZE,
        &report.title,
    );
    layout.y -= TITLE_SIZE * 1.2 + SPACER;

    // Header fields
    for (label, value) in &report.header_fields {
        layout.ensure_space(body_line);
        layout.labeled_line(body, label, value);
        layout.y -= body_line;
    }
    layout.y -= SPACER;

    // Summary
    for (label, count) in report.summary_lines() {
        layout.ensure_space(body_line);
        layout.labeled_line(body, label, &count.to_string());
        layout.y -= body_line;
    }
    layout.y -= SPACER;

    // Item table, header row repeated on every page
    let font_size = config.table_font_size;
    let row_height = font_size * 1.75;
    let header_cells = TABLE_HEADERS.map(String::from);

    layout.ensure_space(row_height * 2.0);
    layout.table_row(&header_cells, font_size, row_height, HEADER_FILL, HEADER_TEXT, BOLD);
    for row in &report.rows {
        if layout.y - row_height < MARGIN {
            layout.new_page();
            layout.table_row(&header_cells, font_size, row_height, HEADER_FILL, HEADER_TEXT, BOLD);
        }
        layout.table_row(
            &row.cells,
            font_size,
            row_height,
            row.fill.rgb(),
            [0.0, 0.0, 0.0],
            REGULAR,
        );
    }

    // Signatures
    layout.y -= SIGNATURE_GAP;
    for line in report.signature_lines() {
        layout.ensure_space(body_line);
        layout.text(REGULAR, body, MARGIN, layout.y - body, &line);
        layout.y -= body_line + SPACER;
    }

    let pages = layout.finish();
    debug!("Rendering report with {} rows on {} pages", report.rows.len(), pages.len());
    write_document(report, pages)
}

/// Assemble pages into a PDF document.
fn write_document(report: &ReportDocument, pages: Vec<Vec<Operation>>) -> Result<Vec<u8>> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let regular_id = doc.add_object(font_dictionary("Helvetica"));
    let bold_id = doc.add_object(font_dictionary("Helvetica-Bold"));
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! {
            REGULAR => regular_id,
            BOLD => bold_id,
        },
    });

    let mut kids: Vec<Object> = Vec::with_capacity(pages.len());
    for operations in pages {
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(dictionary! {}, content.encode()?));
        let page_id: ObjectId = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
        });
        kids.push(page_id.into());
    }

    let page_count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => page_count,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), PAGE_WIDTH.into(), PAGE_HEIGHT.into()],
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut info = dictionary! {
        "Title" => pdf_string(&report.title),
        "Producer" => Object::string_literal("pharmconf"),
    };
    if let Some(generated_at) = report.generated_at {
        info.set(
            "CreationDate",
            Object::string_literal(generated_at.format("D:%Y%m%d%H%M%S").to_string()),
        );
    }
    let info_id = doc.add_object(info);
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes)
        .map_err(|e| ReportError::Render(format!("Failed to save report: {}", e)))?;
    Ok(bytes)
}

fn font_dictionary(base_font: &str) -> lopdf::Dictionary {
    dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => base_font,
        "Encoding" => "WinAnsiEncoding",
    }
}

/// Page-by-page content builder with a top-down cursor.
struct PageLayout {
    finished: Vec<Vec<Operation>>,
    operations: Vec<Operation>,
    y: f32,
}

impl PageLayout {
    fn new() -> Self {
        Self {
            finished: Vec::new(),
            operations: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
        }
    }

    fn new_page(&mut self) {
        let page = std::mem::take(&mut self.operations);
        self.finished.push(page);
        self.y = PAGE_HEIGHT - MARGIN;
    }

    fn ensure_space(&mut self, height: f32) {
        if self.y - height < MARGIN {
            self.new_page();
        }
    }

    fn finish(mut self) -> Vec<Vec<Operation>> {
        self.finished.push(self.operations);
        self.finished
    }

    fn text(&mut self, font: &str, size: f32, x: f32, baseline: f32, text: &str) {
        self.operations.extend([
            Operation::new("BT", vec![]),
            Operation::new("Tf", vec![font.into(), size.into()]),
            Operation::new("Td", vec![x.into(), baseline.into()]),
            Operation::new("Tj", vec![pdf_string(text)]),
            Operation::new("ET", vec![]),
        ]);
    }

    /// `label: value` with a bold label.
    fn labeled_line(&mut self, size: f32, label: &str, value: &str) {
        let label = format!("{}:", label);
        let baseline = self.y - size;
        self.text(BOLD, size, MARGIN, baseline, &label);
        let value_x = MARGIN + estimate_width(&label, size) + size * 0.4;
        self.text(REGULAR, size, value_x, baseline, value);
    }

    fn table_row(
        &mut self,
        cells: &[String; 6],
        size: f32,
        height: f32,
        fill: [f32; 3],
        text_color: [f32; 3],
        font: &str,
    ) {
        let top = self.y;
        let bottom = top - height;
        let mut x = MARGIN;

        for (cell, width) in cells.iter().zip(COLUMN_WIDTHS) {
            self.operations.extend([
                Operation::new("q", vec![]),
                Operation::new("rg", fill.iter().map(|&c| c.into()).collect()),
                Operation::new("re", vec![x.into(), bottom.into(), width.into(), height.into()]),
                Operation::new("f", vec![]),
                Operation::new("w", vec![GRID_WIDTH.into()]),
                Operation::new("RG", vec![0.into(), 0.into(), 0.into()]),
                Operation::new("re", vec![x.into(), bottom.into(), width.into(), height.into()]),
                Operation::new("S", vec![]),
                Operation::new("rg", text_color.iter().map(|&c| c.into()).collect()),
            ]);

            let text = fit_to_width(cell, width - 4.0, size);
            let text_x = x + (width - estimate_width(&text, size)).max(0.0) / 2.0;
            let baseline = bottom + (height - size) / 2.0 + size * 0.2;
            self.text(font, size, text_x, baseline, &text);
            self.operations.push(Operation::new("Q", vec![]));

            x += width;
        }

        self.y = bottom;
    }
}

fn estimate_width(text: &str, size: f32) -> f32 {
    text.chars().count() as f32 * size * AVG_GLYPH_WIDTH
}

/// Truncate text so its estimated width fits.
fn fit_to_width(text: &str, max_width: f32, size: f32) -> String {
    if estimate_width(text, size) <= max_width {
        return text.to_string();
    }
    let max_chars = (max_width / (size * AVG_GLYPH_WIDTH)) as usize;
    let kept: String = text.chars().take(max_chars.saturating_sub(3)).collect();
    format!("{}...", kept.trim_end())
}

/// Encode text for the standard fonts' WinAnsi encoding.
///
/// Latin-1 characters map to their own byte; anything else becomes `?`.
fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c as u32 {
            code @ (0x20..=0x7E | 0xA0..=0xFF) => code as u8,
            _ => b'?',
        })
        .collect()
}

fn pdf_string(text: &str) -> Object {
    Object::String(encode_win_ansi(text), StringFormat::Literal)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::order::{LineItem, Order, OrderHeader};
    use crate::report::build_report;

    fn order(items: usize) -> Order {
        let items = (0..items)
            .map(|i| LineItem {
                sequence: i as u64 + 1,
                active_ingredient_code: 500 + i as u64,
                name: format!("SORO FISIOLÓGICO 0,9% {}", i),
                batch_lot: "SF.0912".to_string(),
                unit: "BOLSA".to_string(),
                quantity_requested: 6,
                quantity_available: if i % 2 == 0 {
                    "6".to_string()
                } else {
                    String::new()
                },
            })
            .collect();
        Order::new(
            OrderHeader {
                order_number: "20240311".to_string(),
                timestamp: "11/03/2024 07:45:12".to_string(),
                ..Default::default()
            },
            items,
        )
    }

    fn page_strings(doc: &Document, page_id: ObjectId) -> Vec<Vec<u8>> {
        let data = doc.get_page_content(page_id).unwrap();
        let content = Content::decode(&data).unwrap();
        content
            .operations
            .iter()
            .filter(|op| op.operator == "Tj")
            .filter_map(|op| op.operands.first())
            .filter_map(|operand| operand.as_str().ok())
            .map(|bytes| bytes.to_vec())
            .collect()
    }

    #[test]
    fn test_render_is_valid_pdf() {
        let config = ReportConfig::default();
        let bytes = render_pdf(&build_report(&order(3), &config), &config).unwrap();

        assert!(bytes.starts_with(b"%PDF-1.5"));
        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_render_contains_sections() {
        let config = ReportConfig::default();
        let bytes = render_pdf(&build_report(&order(2), &config), &config).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let page_id = *doc.get_pages().get(&1).unwrap();
        let strings = page_strings(&doc, page_id);

        for expected in [
            "Relatório de Conferência de Medicamentos",
            "Número do Pedido:",
            "20240311",
            "Total de Itens:",
            "Zerados:",
            "Qtd. Disponível",
            "SF.0912",
        ] {
            assert!(
                strings.contains(&encode_win_ansi(expected)),
                "missing {:?}",
                expected
            );
        }
        assert!(strings.iter().any(|s| s.starts_with(b"Assinatura do Conferente:")));
        assert!(strings.iter().any(|s| s.starts_with(b"Assinatura do Recebedor:")));
    }

    #[test]
    fn test_long_table_repeats_header_row() {
        let config = ReportConfig::default();
        let bytes = render_pdf(&build_report(&order(120), &config), &config).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        let pages = doc.get_pages();
        assert!(pages.len() > 1);

        let header = encode_win_ansi("Princípio Ativo");
        for (_, page_id) in pages.iter() {
            let strings = page_strings(&doc, *page_id);
            if strings.iter().any(|s| s.starts_with(b"SORO")) {
                assert!(strings.contains(&header));
            }
        }
    }

    #[test]
    fn test_empty_order_still_renders() {
        let config = ReportConfig::default();
        let bytes = render_pdf(&build_report(&Order::default(), &config), &config).unwrap();
        assert!(Document::load_mem(&bytes).is_ok());
    }

    #[test]
    fn test_encode_win_ansi() {
        assert_eq!(encode_win_ansi("Nº Ç"), vec![b'N', 0xBA, b' ', 0xC7]);
        assert_eq!(encode_win_ansi("—"), b"?".to_vec());
    }

    #[test]
    fn test_fit_to_width() {
        assert_eq!(fit_to_width("CURTO", 100.0, 8.0), "CURTO");
        let long = "X".repeat(200);
        let fitted = fit_to_width(&long, 100.0, 8.0);
        assert!(fitted.ends_with("..."));
        assert!(estimate_width(&fitted, 8.0) <= 100.0);
    }
}
