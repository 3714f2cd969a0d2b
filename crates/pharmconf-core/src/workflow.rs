//! Operator-facing operations: upload, review, report.
//!
//! The session value is passed to every call; nothing is kept in global state.

use chrono::Local;
use tracing::{debug, info, warn};

use crate::conference::{ClassificationCounts, ConferenceSession};
use crate::error::Result;
use crate::extraction::{DispensingOrderParser, ExtractionResult, OrderParser};
use crate::models::config::PharmconfConfig;
use crate::models::order::Order;
use crate::pdf::{PdfExtractor, PdfProcessor};
use crate::report::{build_report, render_pdf, REPORT_MIME_TYPE};

/// A rendered audit report ready to be offered for download.
#[derive(Debug, Clone)]
pub struct RenderedReport {
    /// PDF bytes.
    pub bytes: Vec<u8>,
    /// Classification counts printed in the summary block.
    pub counts: ClassificationCounts,
    /// Suggested file name.
    pub file_name: String,
    /// Always `application/pdf`.
    pub mime_type: &'static str,
}

/// Read a dispensing PDF and extract its order.
///
/// An order without items is returned as-is; refusing to review it is the
/// session's job.
pub fn upload_document(bytes: &[u8], config: &PharmconfConfig) -> Result<Order> {
    let result = extract_order(bytes, config)?;
    for warning in &result.warnings {
        warn!("{}", warning);
    }

    info!(
        "Uploaded order {:?}: {} items extracted",
        result.order.header.order_number,
        result.order.len()
    );
    Ok(result.order)
}

/// Parse the order from a PDF, with extraction statistics.
///
/// When the preferred text source yields no items, the other source is
/// parsed too.
pub fn extract_order(bytes: &[u8], config: &PharmconfConfig) -> Result<ExtractionResult> {
    config.validate()?;

    let mut extractor = PdfExtractor::with_config(config.pdf.clone());
    extractor.load(bytes)?;

    let parser = DispensingOrderParser::from_config(&config.extraction);
    let mut result = parser.parse_pages(&extractor.extract_pages()?);
    if result.order.is_empty() {
        let fallback = extractor.preferred_source().other();
        match extractor.pages_from(fallback) {
            Ok(pages) => {
                let retry = parser.parse_pages(&pages);
                if !retry.order.is_empty() {
                    info!("No items from preferred text source, using {:?} text", fallback);
                    result = retry;
                }
            }
            Err(e) => debug!("{:?} text unavailable: {}", fallback, e),
        }
    }

    Ok(result)
}

/// Start reviewing an order. Fails when there is nothing to review.
pub fn enter_conference_mode(order: Order) -> Result<ConferenceSession> {
    Ok(ConferenceSession::start(order)?)
}

/// Render the audit report for the session's order.
pub fn generate_report(
    session: &ConferenceSession,
    config: &PharmconfConfig,
) -> Result<RenderedReport> {
    let document = build_report(session.order(), &config.report)
        .with_generated_at(Local::now().naive_local());
    let bytes = render_pdf(&document, &config.report)?;

    info!(
        "Generated report: {} complete, {} partial, {} zero, {} pending",
        document.counts.complete,
        document.counts.partial,
        document.counts.zero,
        document.counts.unset
    );

    Ok(RenderedReport {
        bytes,
        counts: document.counts,
        file_name: config.report.file_name.clone(),
        mime_type: REPORT_MIME_TYPE,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{PharmconfError, SessionError};
    use crate::models::order::{LineItem, OrderHeader};
    use crate::pdf::test_support::text_pdf;
    use crate::pdf::TextSource;

    fn order() -> Order {
        let item = |sequence: u64, requested: u64| LineItem {
            sequence,
            active_ingredient_code: 1,
            name: "CEFTRIAXONA 1G".to_string(),
            batch_lot: "C1".to_string(),
            unit: "FA".to_string(),
            quantity_requested: requested,
            quantity_available: String::new(),
        };
        Order::new(OrderHeader::default(), vec![item(1, 4), item(2, 8), item(3, 2)])
    }

    #[test]
    fn test_enter_conference_mode_with_empty_order() {
        let err = enter_conference_mode(Order::default()).unwrap_err();
        assert!(matches!(err, PharmconfError::Session(SessionError::NothingLoaded)));
    }

    #[test]
    fn test_generate_report_counts() {
        let config = PharmconfConfig::default();
        let mut session = enter_conference_mode(order()).unwrap();
        session.set_available(0, "4").unwrap();
        session.set_available(1, "3").unwrap();

        let report = generate_report(&session, &config).unwrap();

        assert_eq!(report.counts.complete, 1);
        assert_eq!(report.counts.partial, 1);
        assert_eq!(report.counts.zero, 0);
        assert_eq!(report.counts.unset, 1);
        assert_eq!(report.file_name, "relatorio_conferencia.pdf");
        assert_eq!(report.mime_type, "application/pdf");
        assert!(report.bytes.starts_with(b"%PDF"));
    }

    #[test]
    fn test_generate_report_leaves_session_unchanged() {
        let config = PharmconfConfig::default();
        let mut session = enter_conference_mode(order()).unwrap();
        session.next();
        session.set_current_available("0");
        let before = session.order().clone();

        generate_report(&session, &config).unwrap();

        assert_eq!(session.order(), &before);
        assert_eq!(session.position(), 1);
    }

    const PAGE_ONE: &[&str] = &[
        "HOSPITAL REGIONAL - REQUISICAO DE MEDICAMENTOS",
        "20240311 8812 UTI-ADULTO FARMACIA CENTRAL 11/03/2024 07:45:12 Atendido",
        "ITENS ATENDIDOS",
        "1 1001 DIPIRONA SODICA 500MG/ML L2301 AMP 20",
    ];
    const PAGE_TWO: &[&str] = &["2 1002 OMEPRAZOL 20MG 23B-77 CAP 14"];

    fn assert_sample_order(order: &Order) {
        assert_eq!(order.header.order_number, "20240311");
        assert_eq!(order.header.requester_code, "8812");
        assert_eq!(order.header.requested_stock, "UTI-ADULTO FARMACIA CENTRAL");
        assert_eq!(order.header.timestamp, "11/03/2024 07:45:12");
        assert_eq!(order.len(), 2);
        let name: Vec<&str> = order.items[0].name.split_whitespace().collect();
        assert_eq!(name, ["DIPIRONA", "SODICA", "500MG/ML"]);
        assert_eq!(order.items[1].batch_lot, "23B-77");
        assert_eq!(order.items[1].quantity_requested, 14);
    }

    #[test]
    fn test_upload_pdf_with_layout_text() {
        let bytes = text_pdf(&[PAGE_ONE, PAGE_TWO]);
        let order = upload_document(&bytes, &PharmconfConfig::default()).unwrap();
        assert_sample_order(&order);
    }

    #[test]
    fn test_upload_pdf_with_per_page_text() {
        let mut config = PharmconfConfig::default();
        config.pdf.prefer_per_page_text = true;

        let bytes = text_pdf(&[PAGE_ONE, PAGE_TWO]);
        let order = upload_document(&bytes, &config).unwrap();
        assert_sample_order(&order);
    }

    #[test]
    fn test_per_page_source_alone_keeps_lines_apart() {
        let mut extractor = PdfExtractor::new();
        extractor.load(&text_pdf(&[PAGE_ONE, PAGE_TWO])).unwrap();

        let pages = extractor.pages_from(TextSource::PerPage).unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(pages[0], PAGE_ONE.iter().map(|l| l.to_string()).collect::<Vec<_>>());
        assert_eq!(pages[1], vec![PAGE_TWO[0].to_string()]);
    }

    #[test]
    fn test_upload_rejects_non_pdf() {
        let err = upload_document(b"plain text", &PharmconfConfig::default()).unwrap_err();
        assert!(matches!(err, PharmconfError::Pdf(_)));
    }
}
